use crate::config::{CustomValueMode, NullRule};
use crate::rules::kind::FieldKind;
use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;

/// The value written in place of an absent field.
#[derive(Debug, Clone, PartialEq)]
pub enum Substitute<'r> {
    Null,
    /// Custom value, written as a JSON string.
    Custom(&'r str),
    /// Custom value converted to the field's category.
    Typed(Value),
    Bool(bool),
    Number(i64),
    Text(&'r str),
    EmptySequence,
}

impl Substitute<'_> {
    pub fn is_null(&self) -> bool {
        matches!(self, Substitute::Null)
    }

    pub fn to_value(&self) -> Value {
        match self {
            Substitute::Null => Value::Null,
            Substitute::Custom(s) | Substitute::Text(s) => Value::String((*s).to_string()),
            Substitute::Typed(v) => v.clone(),
            Substitute::Bool(b) => Value::Bool(*b),
            Substitute::Number(n) => Value::from(*n),
            Substitute::EmptySequence => Value::Array(Vec::new()),
        }
    }
}

impl Serialize for Substitute<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Substitute::Null => serializer.serialize_none(),
            Substitute::Custom(s) | Substitute::Text(s) => serializer.serialize_str(s),
            Substitute::Typed(v) => v.serialize(serializer),
            Substitute::Bool(b) => serializer.serialize_bool(*b),
            Substitute::Number(n) => serializer.serialize_i64(*n),
            Substitute::EmptySequence => serializer.serialize_seq(Some(0))?.end(),
        }
    }
}

/// Decide what to write for an absent field of category `kind`.
///
/// `rule` is the field's effective rule. The first matching step wins:
/// exclusion, custom value, boolean, number, string, sequence, then null.
pub fn resolve(kind: FieldKind, rule: Option<&NullRule>, mode: CustomValueMode) -> Substitute<'_> {
    let Some(rule) = rule else {
        return Substitute::Null;
    };

    if rule.exclude {
        return Substitute::Null;
    }

    if let Some(custom) = rule.custom() {
        return match mode {
            CustomValueMode::Literal => Substitute::Custom(custom),
            CustomValueMode::Typed => typed_custom(kind, custom),
        };
    }

    match kind {
        FieldKind::Boolean if rule.boolean => Substitute::Bool(rule.boolean_default),
        FieldKind::Number if rule.number => Substitute::Number(rule.number_default),
        FieldKind::String if rule.string => Substitute::Text(&rule.string_default),
        FieldKind::Sequence if rule.collection => Substitute::EmptySequence,
        _ => Substitute::Null,
    }
}

fn typed_custom(kind: FieldKind, custom: &str) -> Substitute<'_> {
    let converted = match kind {
        FieldKind::Boolean => custom.trim().parse::<bool>().ok().map(Value::Bool),
        FieldKind::Number => parse_number(custom.trim()),
        FieldKind::String => return Substitute::Custom(custom),
        FieldKind::Sequence => serde_json::from_str::<Value>(custom)
            .ok()
            .filter(Value::is_array),
        FieldKind::Other => serde_json::from_str::<Value>(custom).ok(),
    };

    match converted {
        Some(value) => Substitute::Typed(value),
        None => {
            tracing::debug!(
                kind = kind.as_str(),
                custom,
                "custom value does not convert to field type, writing it as a string"
            );
            Substitute::Custom(custom)
        }
    }
}

fn parse_number(s: &str) -> Option<Value> {
    if let Ok(n) = s.parse::<i64>() {
        return Some(Value::from(n));
    }
    if let Ok(n) = s.parse::<u64>() {
        return Some(Value::from(n));
    }
    s.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}
