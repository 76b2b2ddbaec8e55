use regex::Regex;
use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, HashMap, HashSet, LinkedList, VecDeque};
use std::rc::Rc;
use std::sync::{Arc, OnceLock};

/// Category of a field's declared type, used to pick a default for absent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    Number,
    String,
    /// Arrays and collection-like types.
    Sequence,
    /// Composites, maps and anything else without a category default.
    Other,
}

impl FieldKind {
    /// Category of a Rust type, known at compile time.
    pub fn of<T: DeclaredKind + ?Sized>() -> Self {
        T::KIND
    }

    /// Classify a declared type name such as `Integer`, `Option<bool>` or `List<String>`.
    ///
    /// Names without a recognised category are `Other`.
    pub fn from_type_name(name: &str) -> Self {
        let name = strip_reference(name);

        if name.ends_with("[]") || (name.starts_with('[') && name.ends_with(']')) {
            return FieldKind::Sequence;
        }

        if let Some((base, inner)) = split_generic(name) {
            let base = short_name(base).to_ascii_lowercase();
            if WRAPPERS.contains(&base.as_str()) {
                return FieldKind::from_type_name(strip_lifetime(inner));
            }
            if SEQUENCES.contains(&base.as_str()) {
                return FieldKind::Sequence;
            }
            return FieldKind::Other;
        }

        let short = short_name(name).to_ascii_lowercase();
        let short = short.as_str();
        if BOOLEANS.contains(&short) {
            FieldKind::Boolean
        } else if NUMBERS.contains(&short) {
            FieldKind::Number
        } else if STRINGS.contains(&short) {
            FieldKind::String
        } else if SEQUENCES.contains(&short) {
            FieldKind::Sequence
        } else {
            FieldKind::Other
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Boolean => "boolean",
            FieldKind::Number => "number",
            FieldKind::String => "string",
            FieldKind::Sequence => "sequence",
            FieldKind::Other => "other",
        }
    }
}

/// Strip wrapper types (`Option<T>`, `Box<T>`, ...) from a declared type name.
///
/// `Option<Box<Inner>>` yields `Inner`; names without wrappers come back trimmed.
pub fn base_type_name(name: &str) -> &str {
    let name = strip_reference(name);
    match split_generic(name) {
        Some((base, inner)) if WRAPPERS.contains(&short_name(base).to_ascii_lowercase().as_str()) => {
            base_type_name(strip_lifetime(inner))
        }
        _ => name,
    }
}

/// Element type name of a sequence type name, with wrappers stripped.
///
/// `Option<List<Inner>>`, `Vec<Box<Inner>>`, `Inner[]` and `[Inner; 4]` all yield `Inner`.
/// Anything that is not a sequence yields `None`.
pub fn element_type_name(name: &str) -> Option<&str> {
    let name = base_type_name(name);

    if let Some(element) = name.strip_suffix("[]") {
        return Some(base_type_name(element));
    }
    if let Some(inner) = name.strip_prefix('[').and_then(|n| n.strip_suffix(']')) {
        let element = inner.split_once(';').map_or(inner, |(element, _)| element);
        return Some(base_type_name(element));
    }

    let (base, inner) = split_generic(name)?;
    if SEQUENCES.contains(&short_name(base).to_ascii_lowercase().as_str()) {
        Some(base_type_name(inner))
    } else {
        None
    }
}

const BOOLEANS: &[&str] = &["bool", "boolean"];

const NUMBERS: &[&str] = &[
    "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64", "u128", "usize",
    "f32", "f64", "number", "byte", "short", "int", "integer", "long", "float", "double",
    "decimal", "bigdecimal", "biginteger", "atomicinteger", "atomiclong", "longadder",
    "doubleadder",
];

const STRINGS: &[&str] = &["string", "str", "char"];

const SEQUENCES: &[&str] = &[
    "vec", "vecdeque", "linkedlist", "binaryheap", "hashset", "btreeset", "array", "list",
    "arraylist", "set", "treeset", "linkedhashset", "sortedset", "collection", "queue", "deque",
    "arraydeque",
];

const WRAPPERS: &[&str] = &["option", "optional", "box", "rc", "arc", "cow"];

fn generic_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z_][A-Za-z0-9_.:]*)\s*<(.*)>$").expect("generic type pattern is valid")
    })
}

fn split_generic(name: &str) -> Option<(&str, &str)> {
    let caps = generic_pattern().captures(name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str().trim()))
}

// `std::vec::Vec` and `java.util.List` both reduce to their last segment.
fn short_name(name: &str) -> &str {
    name.rsplit(|c| c == ':' || c == '.').next().unwrap_or(name)
}

fn strip_reference(name: &str) -> &str {
    let name = name.trim().trim_start_matches('&').trim_start();
    if name.starts_with('\'') {
        // `&'a str`
        return name.split_once(' ').map(|(_, rest)| rest.trim()).unwrap_or(name);
    }
    name.strip_prefix("mut ").map(str::trim).unwrap_or(name)
}

// `Cow<'a, str>` carries a lifetime ahead of the wrapped type.
fn strip_lifetime(inner: &str) -> &str {
    if inner.starts_with('\'') {
        inner.split_once(',').map(|(_, rest)| rest.trim()).unwrap_or(inner)
    } else {
        inner
    }
}

/// Static category of a Rust type.
///
/// Wrappers such as `Option<T>` and `Box<T>` report the category of `T`.
/// Composite types implement this with `FieldKind::Other`.
pub trait DeclaredKind {
    const KIND: FieldKind;
}

macro_rules! declare_kind {
    ($kind:ident => $($ty:ty),+ $(,)?) => {
        $(impl DeclaredKind for $ty {
            const KIND: FieldKind = FieldKind::$kind;
        })+
    };
}

declare_kind!(Boolean => bool);
declare_kind!(Number =>
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64,
    serde_json::Number,
);
declare_kind!(String => String, str, char);
declare_kind!(Other => serde_json::Value, serde_json::Map<String, serde_json::Value>);

impl<T> DeclaredKind for [T] {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T, const N: usize> DeclaredKind for [T; N] {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T> DeclaredKind for Vec<T> {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T> DeclaredKind for VecDeque<T> {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T> DeclaredKind for LinkedList<T> {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T> DeclaredKind for BinaryHeap<T> {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T, S> DeclaredKind for HashSet<T, S> {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<T> DeclaredKind for BTreeSet<T> {
    const KIND: FieldKind = FieldKind::Sequence;
}

impl<K, V, S> DeclaredKind for HashMap<K, V, S> {
    const KIND: FieldKind = FieldKind::Other;
}

impl<K, V> DeclaredKind for BTreeMap<K, V> {
    const KIND: FieldKind = FieldKind::Other;
}

impl<T: DeclaredKind> DeclaredKind for Option<T> {
    const KIND: FieldKind = T::KIND;
}

impl<T: DeclaredKind + ?Sized> DeclaredKind for Box<T> {
    const KIND: FieldKind = T::KIND;
}

impl<T: DeclaredKind + ?Sized> DeclaredKind for Rc<T> {
    const KIND: FieldKind = T::KIND;
}

impl<T: DeclaredKind + ?Sized> DeclaredKind for Arc<T> {
    const KIND: FieldKind = T::KIND;
}

impl<T: DeclaredKind + ?Sized> DeclaredKind for &T {
    const KIND: FieldKind = T::KIND;
}

impl<T: DeclaredKind + ToOwned + ?Sized> DeclaredKind for Cow<'_, T> {
    const KIND: FieldKind = T::KIND;
}
