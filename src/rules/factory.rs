use crate::config::{FieldDecl, MapperConfig, TypeDecl};
use crate::rules::kind::{base_type_name, element_type_name, FieldKind};
use crate::rules::registration::TypeRegistration;
use crate::rules::RuleBuildError;
use crate::writer;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;

#[derive(Debug)]
pub enum FactoryError {
    DuplicateType(String),
    BuildError(RuleBuildError),
}

impl fmt::Display for FactoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactoryError::DuplicateType(t) => write!(f, "type '{}' is declared twice", t),
            FactoryError::BuildError(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for FactoryError {}

impl From<RuleBuildError> for FactoryError {
    fn from(e: RuleBuildError) -> Self {
        FactoryError::BuildError(e)
    }
}

/// Errors raised while filling a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    UnknownType(String),
    NotAnObject(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::UnknownType(t) => write!(f, "unknown type: '{}'", t),
            DocumentError::NotAnObject(t) => {
                write!(f, "expected a JSON object (or array of objects) for type '{}'", t)
            }
        }
    }
}

impl std::error::Error for DocumentError {}

/// All registered types plus the mapper settings they are serialized with.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    config: MapperConfig,
    types: BTreeMap<String, TypeRegistration>,
}

impl Registry {
    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeRegistration> {
        self.types.get(type_name)
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeRegistration> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Substitute absent fields of `value`, read as an instance of `type_name`.
    ///
    /// A top-level array is filled element by element.
    pub fn fill(&self, type_name: &str, value: Value) -> Result<Value, DocumentError> {
        let registration = self
            .get(type_name)
            .ok_or_else(|| DocumentError::UnknownType(type_name.to_string()))?;

        match value {
            Value::Object(map) => Ok(Value::Object(writer::fill_object(self, registration, map))),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(map) => {
                        Ok(Value::Object(writer::fill_object(self, registration, map)))
                    }
                    _ => Err(DocumentError::NotAnObject(type_name.to_string())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            _ => Err(DocumentError::NotAnObject(type_name.to_string())),
        }
    }
}

/// Build a registry from schema declarations.
///
/// Field types naming another declared type become nested fields.
pub fn build_registry(decls: &[TypeDecl], config: MapperConfig) -> Result<Registry, FactoryError> {
    let mut names = HashSet::new();
    for decl in decls {
        if !names.insert(decl.name.as_str()) {
            return Err(FactoryError::DuplicateType(decl.name.clone()));
        }
    }

    let mut types = BTreeMap::new();
    for decl in decls {
        let registration = build_type(decl, &names)?;
        types.insert(decl.name.clone(), registration);
    }

    tracing::debug!(types = types.len(), "built type registry");
    Ok(Registry { config, types })
}

fn build_type(decl: &TypeDecl, known: &HashSet<&str>) -> Result<TypeRegistration, RuleBuildError> {
    let mut builder = TypeRegistration::builder(decl.name.clone());
    if let Some(ref rule) = decl.rule {
        builder = builder.rule(rule.clone());
    }

    for FieldDecl {
        name,
        type_name,
        rule,
    } in &decl.fields
    {
        let base = base_type_name(type_name);
        let kind = FieldKind::from_type_name(type_name);
        let element = element_type_name(type_name).filter(|e| known.contains(e));

        builder = match (kind, element) {
            (FieldKind::Other, _) if known.contains(base) => {
                builder.nested_field(name.clone(), base, rule.clone())
            }
            (FieldKind::Sequence, Some(element)) => {
                builder.nested_seq_field(name.clone(), element, rule.clone())
            }
            _ => builder.field_named(name.clone(), type_name, rule.clone()),
        };
    }

    builder.build()
}
