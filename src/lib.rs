//! Serialize absent JSON fields as type-appropriate defaults.
//!
//! Types register a [`TypeRegistration`] describing their fields and the
//! [`NullRule`]s that apply at type and field scope. When a field is absent,
//! [`resolve`] picks what to write instead of `null`.

pub mod cli;
pub mod config;
pub mod fill;
pub mod rules;
pub mod writer;

pub use config::{CustomValueMode, MapperConfig, NullRule, Scope};
pub use rules::factory::{build_registry, DocumentError, FactoryError, Registry};
pub use rules::{resolve, DeclaredKind, FieldKind, FieldPlan, RuleBuildError, Substitute, TypeRegistration};
pub use writer::{Mapped, MappedSeq, Mapper, NullAware, ObjectWriter};
