use crate::config::{CustomValueMode, FieldDecl, MapperConfig, NullRule, Scope, TypeDecl};
use serde::Deserialize;

/// Top-level TOML schema file structure.
#[derive(Debug, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub mapper: MapperSection,
    #[serde(default, rename = "type")]
    pub types: Vec<TomlType>,
}

/// The `[mapper]` section.
#[derive(Debug, Default, Deserialize)]
pub struct MapperSection {
    /// `"literal"` (default) or `"typed"`.
    #[serde(default)]
    pub custom_values: String,
    #[serde(default)]
    pub pretty: bool,
}

/// A single `[[type]]` entry.
#[derive(Debug, Deserialize)]
pub struct TomlType {
    pub name: String,
    pub rule: Option<TomlRule>,
    #[serde(default)]
    pub field: Vec<TomlField>,
}

/// A single `[[type.field]]` entry.
#[derive(Debug, Deserialize)]
pub struct TomlField {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub rule: Option<TomlRule>,
}

/// A `rule` table, at type or field level.
#[derive(Debug, Deserialize)]
pub struct TomlRule {
    #[serde(default)]
    pub exclude: bool,
    pub custom: Option<String>,
    #[serde(default = "enabled")]
    pub boolean: bool,
    #[serde(default)]
    pub boolean_default: bool,
    #[serde(default = "enabled")]
    pub number: bool,
    #[serde(default)]
    pub number_default: i64,
    #[serde(default = "enabled")]
    pub string: bool,
    #[serde(default)]
    pub string_default: String,
    #[serde(default = "enabled")]
    pub collection: bool,
}

fn enabled() -> bool {
    true
}

impl TomlConfig {
    pub fn mapper_config(&self) -> MapperConfig {
        let custom_values = match self.mapper.custom_values.to_lowercase().as_str() {
            "typed" => CustomValueMode::Typed,
            _ => CustomValueMode::Literal,
        };

        MapperConfig {
            custom_values,
            pretty: self.mapper.pretty,
        }
    }

    pub fn type_decls(&self) -> Vec<TypeDecl> {
        self.types.iter().map(TomlType::to_type_decl).collect()
    }
}

impl TomlType {
    /// Convert to the core `TypeDecl` type.
    pub fn to_type_decl(&self) -> TypeDecl {
        TypeDecl {
            name: self.name.clone(),
            rule: self.rule.as_ref().map(|r| r.to_null_rule(Scope::Type)),
            fields: self
                .field
                .iter()
                .map(|f| FieldDecl {
                    name: f.name.clone(),
                    type_name: f.type_name.clone(),
                    rule: f.rule.as_ref().map(|r| r.to_null_rule(Scope::Field)),
                })
                .collect(),
        }
    }
}

impl TomlRule {
    pub fn to_null_rule(&self, scope: Scope) -> NullRule {
        NullRule {
            scope,
            exclude: self.exclude,
            custom_value: self.custom.clone(),
            boolean: self.boolean,
            boolean_default: self.boolean_default,
            number: self.number,
            number_default: self.number_default,
            string: self.string,
            string_default: self.string_default.clone(),
            collection: self.collection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
[mapper]
custom_values = "Typed"
pretty = true

[[type]]
name = "Test"
[type.rule]

[[type.field]]
name = "bool"
type = "Boolean"
[type.field.rule]
boolean = false

[[type.field]]
name = "doubleT"
type = "Double"
[type.field.rule]
custom = "0.5"

[[type.field]]
name = "intT"
type = "Integer"

[[type]]
name = "Test1"
[type.rule]
string = false
"#;

    #[test]
    fn parses_types_fields_and_rules() {
        let config: TomlConfig = toml::from_str(SCHEMA).unwrap();
        let decls = config.type_decls();
        assert_eq!(decls.len(), 2);

        let test = &decls[0];
        assert_eq!(test.rule, Some(NullRule::for_type()));
        assert_eq!(test.fields.len(), 3);

        let bool_rule = test.fields[0].rule.as_ref().unwrap();
        assert_eq!(bool_rule.scope, Scope::Field);
        assert!(!bool_rule.boolean);
        assert!(bool_rule.number && bool_rule.string && bool_rule.collection);

        assert_eq!(test.fields[1].rule.as_ref().unwrap().custom(), Some("0.5"));
        assert!(test.fields[2].rule.is_none());

        let test1 = decls[1].rule.as_ref().unwrap();
        assert!(!test1.string);
        assert!(test1.number);
    }

    #[test]
    fn mapper_section() {
        let config: TomlConfig = toml::from_str(SCHEMA).unwrap();
        assert_eq!(
            config.mapper_config(),
            MapperConfig {
                custom_values: CustomValueMode::Typed,
                pretty: true,
            }
        );

        let config: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(config.mapper_config(), MapperConfig::default());
        assert!(config.types.is_empty());
    }

    #[test]
    fn missing_field_type_is_an_error() {
        let text = "[[type]]\nname = \"T\"\n[[type.field]]\nname = \"x\"\n";
        assert!(toml::from_str::<TomlConfig>(text).is_err());
    }
}
