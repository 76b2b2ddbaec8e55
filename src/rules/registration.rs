use crate::config::{NullRule, Scope};
use crate::rules::kind::{DeclaredKind, FieldKind};
use crate::rules::RuleBuildError;
use std::collections::HashMap;

/// One field of a registered type, with its effective rule already chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldPlan {
    pub name: String,
    pub kind: FieldKind,
    /// Registered type this field refers to, if any.
    pub nested: Option<String>,
    /// Registered type of the elements, for sequences of registered types.
    pub nested_elements: Option<String>,
    /// Field rule if declared, otherwise the type rule.
    pub rule: Option<NullRule>,
}

impl FieldPlan {
    /// Scope of the effective rule, if there is one.
    pub fn scope(&self) -> Option<Scope> {
        self.rule.as_ref().map(|r| r.scope)
    }
}

/// Immutable substitution plan for one type, built once and shared.
#[derive(Debug, Clone)]
pub struct TypeRegistration {
    name: String,
    rule: Option<NullRule>,
    fields: Vec<FieldPlan>,
    index: HashMap<String, usize>,
}

impl TypeRegistration {
    pub fn builder(name: impl Into<String>) -> RegistrationBuilder {
        RegistrationBuilder {
            name: name.into(),
            rule: None,
            fields: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The type-scope rule.
    pub fn rule(&self) -> Option<&NullRule> {
        self.rule.as_ref()
    }

    pub fn fields(&self) -> &[FieldPlan] {
        &self.fields
    }

    pub fn plan(&self, field: &str) -> Option<&FieldPlan> {
        self.index.get(field).map(|&i| &self.fields[i])
    }

    /// Effective rule for `field`. Unregistered fields fall back to the type rule.
    pub fn rule_for(&self, field: &str) -> Option<&NullRule> {
        match self.plan(field) {
            Some(plan) => plan.rule.as_ref(),
            None => self.rule.as_ref(),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug)]
struct PendingField {
    name: String,
    kind: FieldKind,
    nested: Option<String>,
    nested_elements: Option<String>,
    rule: Option<NullRule>,
}

/// Collects the type rule and field declarations for a [`TypeRegistration`].
#[derive(Debug)]
pub struct RegistrationBuilder {
    name: String,
    rule: Option<NullRule>,
    fields: Vec<PendingField>,
}

impl RegistrationBuilder {
    /// Set the type-scope rule.
    pub fn rule(mut self, rule: NullRule) -> Self {
        self.rule = Some(NullRule {
            scope: Scope::Type,
            ..rule
        });
        self
    }

    /// Declare a field whose category comes from its Rust type.
    pub fn field<T: DeclaredKind + ?Sized>(self, name: impl Into<String>) -> Self {
        self.field_kind(name, T::KIND, None)
    }

    /// Declare a field with its own rule.
    pub fn field_with<T: DeclaredKind + ?Sized>(
        self,
        name: impl Into<String>,
        rule: NullRule,
    ) -> Self {
        self.field_kind(name, T::KIND, Some(rule))
    }

    pub fn field_kind(
        mut self,
        name: impl Into<String>,
        kind: FieldKind,
        rule: Option<NullRule>,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.into(),
            kind,
            nested: None,
            nested_elements: None,
            rule,
        });
        self
    }

    /// Declare a field that holds another registered type.
    pub fn nested_field(
        mut self,
        name: impl Into<String>,
        type_name: impl Into<String>,
        rule: Option<NullRule>,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.into(),
            kind: FieldKind::Other,
            nested: Some(type_name.into()),
            nested_elements: None,
            rule,
        });
        self
    }

    /// Declare a sequence field whose elements are another registered type.
    pub fn nested_seq_field(
        mut self,
        name: impl Into<String>,
        element_type: impl Into<String>,
        rule: Option<NullRule>,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.into(),
            kind: FieldKind::Sequence,
            nested: None,
            nested_elements: Some(element_type.into()),
            rule,
        });
        self
    }

    /// Declare a field by type name, e.g. `"List<Integer>"`.
    pub fn field_named(
        self,
        name: impl Into<String>,
        type_name: &str,
        rule: Option<NullRule>,
    ) -> Self {
        self.field_kind(name, FieldKind::from_type_name(type_name), rule)
    }

    pub fn build(self) -> Result<TypeRegistration, RuleBuildError> {
        if self.name.trim().is_empty() {
            return Err(RuleBuildError::EmptyTypeName);
        }
        if self.rule.as_ref().is_some_and(|r| r.exclude) {
            return Err(RuleBuildError::ExcludeAtTypeScope(self.name));
        }

        let mut fields = Vec::with_capacity(self.fields.len());
        let mut index = HashMap::with_capacity(self.fields.len());

        for pending in self.fields {
            if pending.name.is_empty() {
                return Err(RuleBuildError::EmptyFieldName(self.name));
            }
            if index.contains_key(&pending.name) {
                return Err(RuleBuildError::DuplicateField(self.name, pending.name));
            }

            // A field rule replaces the type rule outright; the two never merge.
            let rule = match pending.rule {
                Some(rule) => Some(NullRule {
                    scope: Scope::Field,
                    ..rule
                }),
                None => self.rule.clone(),
            };

            index.insert(pending.name.clone(), fields.len());
            fields.push(FieldPlan {
                name: pending.name,
                kind: pending.kind,
                nested: pending.nested,
                nested_elements: pending.nested_elements,
                rule,
            });
        }

        Ok(TypeRegistration {
            name: self.name,
            rule: self.rule,
            fields,
            index,
        })
    }
}
