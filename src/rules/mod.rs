pub mod factory;
pub mod kind;
pub mod registration;
pub mod resolve;

pub use kind::{DeclaredKind, FieldKind};
pub use registration::{FieldPlan, RegistrationBuilder, TypeRegistration};
pub use resolve::{resolve, Substitute};

use std::fmt;

/// Errors raised while validating a type registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleBuildError {
    EmptyTypeName,
    EmptyFieldName(String),
    DuplicateField(String, String),
    ExcludeAtTypeScope(String),
}

impl fmt::Display for RuleBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleBuildError::EmptyTypeName => write!(f, "type name must not be empty"),
            RuleBuildError::EmptyFieldName(ty) => {
                write!(f, "type '{}': field name must not be empty", ty)
            }
            RuleBuildError::DuplicateField(ty, field) => {
                write!(f, "type '{}': field '{}' is declared twice", ty, field)
            }
            RuleBuildError::ExcludeAtTypeScope(ty) => write!(
                f,
                "type '{}': 'exclude' can only be set on a field rule",
                ty
            ),
        }
    }
}

impl std::error::Error for RuleBuildError {}
