/// Where a rule was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Declared on the enclosing type; applies to every field without its own rule.
    Type,
    /// Declared on a single field; replaces the type rule for that field.
    Field,
}

/// How a configured custom value is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomValueMode {
    /// Emit the literal as a JSON string, whatever the field's type.
    #[default]
    Literal,
    /// Convert the literal to the field's category first, falling back to the string.
    Typed,
}

/// Substitution policy for absent values.
#[derive(Debug, Clone, PartialEq)]
pub struct NullRule {
    pub scope: Scope,
    /// Let null pass through unchanged. Only meaningful at field scope.
    pub exclude: bool,
    /// Literal emitted for any field type; wins over every category rule.
    pub custom_value: Option<String>,
    pub boolean: bool,
    pub boolean_default: bool,
    pub number: bool,
    pub number_default: i64,
    pub string: bool,
    pub string_default: String,
    /// Arrays and collections become `[]`.
    pub collection: bool,
}

impl NullRule {
    pub fn for_type() -> Self {
        Self::default()
    }

    pub fn for_field() -> Self {
        Self {
            scope: Scope::Field,
            ..Self::default()
        }
    }

    /// The custom value, if one is configured and non-empty.
    pub fn custom(&self) -> Option<&str> {
        self.custom_value.as_deref().filter(|v| !v.is_empty())
    }
}

impl Default for NullRule {
    fn default() -> Self {
        Self {
            scope: Scope::Type,
            exclude: false,
            custom_value: None,
            boolean: true,
            boolean_default: false,
            number: true,
            number_default: 0,
            string: true,
            string_default: String::new(),
            collection: true,
        }
    }
}

/// Mapper-wide settings, built once and passed to every serialization call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapperConfig {
    pub custom_values: CustomValueMode,
    pub pretty: bool,
}

/// A type declaration as read from a schema file, before validation.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub name: String,
    pub rule: Option<NullRule>,
    pub fields: Vec<FieldDecl>,
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub type_name: String,
    pub rule: Option<NullRule>,
}
