use crate::config::MapperConfig;
use crate::rules::factory::Registry;
use crate::rules::registration::TypeRegistration;
use crate::rules::resolve::{resolve, Substitute};
use crate::rules::FieldKind;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map, Value};
use std::io;

/// A type whose fields are written through an [`ObjectWriter`].
///
/// `registration` should return a value built once, e.g. from a `OnceLock`.
pub trait NullAware {
    fn registration() -> &'static TypeRegistration;

    fn write_fields<S: Serializer>(&self, writer: &mut ObjectWriter<'_, S>) -> Result<(), S::Error>;
}

/// Writes one JSON object, substituting absent fields by their plan.
pub struct ObjectWriter<'a, S: Serializer> {
    map: S::SerializeMap,
    registration: &'a TypeRegistration,
    config: &'a MapperConfig,
}

impl<'a, S: Serializer> ObjectWriter<'a, S> {
    pub fn begin(
        serializer: S,
        registration: &'a TypeRegistration,
        config: &'a MapperConfig,
    ) -> Result<Self, S::Error> {
        // `write_fields` may skip registered fields or add unregistered ones.
        let map = serializer.serialize_map(None)?;
        Ok(Self {
            map,
            registration,
            config,
        })
    }

    pub fn config(&self) -> &'a MapperConfig {
        self.config
    }

    /// Write an optional field. `None` goes through the resolver.
    pub fn field<T: Serialize>(&mut self, name: &str, value: &Option<T>) -> Result<(), S::Error> {
        match value {
            Some(v) => self.map.serialize_entry(name, v),
            None => self.absent(name),
        }
    }

    /// Write a field that can never be absent.
    pub fn present<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) -> Result<(), S::Error> {
        self.map.serialize_entry(name, value)
    }

    /// Write an optional field of another [`NullAware`] type under the same config.
    pub fn nested<T: NullAware>(&mut self, name: &str, value: &Option<T>) -> Result<(), S::Error> {
        match value {
            Some(v) => self.map.serialize_entry(name, &Mapped::new(v, self.config)),
            None => self.absent(name),
        }
    }

    /// Write an optional sequence of [`NullAware`] values, each under its own registration.
    pub fn nested_seq<T: NullAware, C: AsRef<[T]>>(
        &mut self,
        name: &str,
        value: &Option<C>,
    ) -> Result<(), S::Error> {
        match value {
            Some(items) => self
                .map
                .serialize_entry(name, &MappedSeq::new(items.as_ref(), self.config)),
            None => self.absent(name),
        }
    }

    /// Write the substitute for an absent field.
    pub fn absent(&mut self, name: &str) -> Result<(), S::Error> {
        let kind = self
            .registration
            .plan(name)
            .map_or(FieldKind::Other, |plan| plan.kind);
        let substitute = resolve(kind, self.registration.rule_for(name), self.config.custom_values);
        trace_substitute(self.registration.name(), name, &substitute);
        self.map.serialize_entry(name, &substitute)
    }

    pub fn end(self) -> Result<S::Ok, S::Error> {
        self.map.end()
    }
}

/// A [`NullAware`] value paired with the config it is serialized with.
pub struct Mapped<'a, T: ?Sized> {
    value: &'a T,
    config: &'a MapperConfig,
}

impl<'a, T: ?Sized> Mapped<'a, T> {
    pub fn new(value: &'a T, config: &'a MapperConfig) -> Self {
        Self { value, config }
    }
}

impl<T: NullAware> Serialize for Mapped<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut writer = ObjectWriter::begin(serializer, T::registration(), self.config)?;
        self.value.write_fields(&mut writer)?;
        writer.end()
    }
}

/// A slice of [`NullAware`] values, each written through its registration.
pub struct MappedSeq<'a, T> {
    items: &'a [T],
    config: &'a MapperConfig,
}

impl<'a, T> MappedSeq<'a, T> {
    pub fn new(items: &'a [T], config: &'a MapperConfig) -> Self {
        Self { items, config }
    }
}

impl<T: NullAware> Serialize for MappedSeq<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.items.len()))?;
        for item in self.items {
            seq.serialize_element(&Mapped::new(item, self.config))?;
        }
        seq.end()
    }
}

/// Entry point for serializing [`NullAware`] values with a fixed config.
#[derive(Debug, Clone, Default)]
pub struct Mapper {
    config: MapperConfig,
}

impl Mapper {
    pub fn new(config: MapperConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    pub fn wrap<'a, T: NullAware>(&'a self, value: &'a T) -> Mapped<'a, T> {
        Mapped::new(value, &self.config)
    }

    pub fn to_string<T: NullAware>(&self, value: &T) -> serde_json::Result<String> {
        if self.config.pretty {
            serde_json::to_string_pretty(&self.wrap(value))
        } else {
            serde_json::to_string(&self.wrap(value))
        }
    }

    pub fn to_value<T: NullAware>(&self, value: &T) -> serde_json::Result<Value> {
        serde_json::to_value(self.wrap(value))
    }

    pub fn to_writer<W: io::Write, T: NullAware>(&self, writer: W, value: &T) -> serde_json::Result<()> {
        if self.config.pretty {
            serde_json::to_writer_pretty(writer, &self.wrap(value))
        } else {
            serde_json::to_writer(writer, &self.wrap(value))
        }
    }
}

/// Fill one parsed JSON object. Missing keys count as absent.
///
/// Registered fields come first in declaration order, followed by any
/// unregistered keys. Objects inside nested fields and inside sequences of
/// registered types are filled under their own registration.
pub(crate) fn fill_object(
    registry: &Registry,
    registration: &TypeRegistration,
    mut input: Map<String, Value>,
) -> Map<String, Value> {
    let mut out = Map::new();

    for plan in registration.fields() {
        let filled = match input.get_mut(&plan.name).map(Value::take) {
            None | Some(Value::Null) => {
                let substitute = resolve(
                    plan.kind,
                    plan.rule.as_ref(),
                    registry.config().custom_values,
                );
                trace_substitute(registration.name(), &plan.name, &substitute);
                substitute.to_value()
            }
            Some(Value::Object(inner)) => {
                match plan.nested.as_deref().and_then(|name| registry.get(name)) {
                    Some(nested) => Value::Object(fill_object(registry, nested, inner)),
                    None => Value::Object(inner),
                }
            }
            Some(Value::Array(items)) => {
                match plan.nested_elements.as_deref().and_then(|name| registry.get(name)) {
                    Some(element) => Value::Array(
                        items
                            .into_iter()
                            .map(|item| match item {
                                Value::Object(inner) => {
                                    Value::Object(fill_object(registry, element, inner))
                                }
                                other => other,
                            })
                            .collect(),
                    ),
                    None => Value::Array(items),
                }
            }
            Some(value) => value,
        };
        out.insert(plan.name.clone(), filled);
    }

    // Unregistered keys are `Other` under the type rule, as in `ObjectWriter::absent`.
    for (key, value) in input {
        if registration.plan(&key).is_some() {
            continue;
        }
        let value = match value {
            Value::Null => {
                let substitute = resolve(
                    FieldKind::Other,
                    registration.rule(),
                    registry.config().custom_values,
                );
                trace_substitute(registration.name(), &key, &substitute);
                substitute.to_value()
            }
            other => other,
        };
        out.insert(key, value);
    }

    out
}

fn trace_substitute(type_name: &str, field: &str, substitute: &Substitute<'_>) {
    tracing::trace!(
        ty = type_name,
        field,
        substitute = ?substitute,
        "absent value"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CustomValueMode, NullRule};
    use serde_json::json;
    use std::sync::OnceLock;

    #[derive(Default)]
    struct Account {
        id: u64,
        name: Option<String>,
        tags: Option<Vec<String>>,
        active: Option<bool>,
        balance: Option<f64>,
    }

    impl NullAware for Account {
        fn registration() -> &'static TypeRegistration {
            static REGISTRATION: OnceLock<TypeRegistration> = OnceLock::new();
            REGISTRATION.get_or_init(|| {
                TypeRegistration::builder("Account")
                    .rule(NullRule::for_type())
                    .field::<u64>("id")
                    .field::<Option<String>>("name")
                    .field::<Option<Vec<String>>>("tags")
                    .field_with::<Option<bool>>(
                        "active",
                        NullRule {
                            boolean_default: true,
                            ..NullRule::for_field()
                        },
                    )
                    .field_with::<Option<f64>>(
                        "balance",
                        NullRule {
                            custom_value: Some("0.00".into()),
                            ..NullRule::for_field()
                        },
                    )
                    .build()
                    .expect("valid registration")
            })
        }

        fn write_fields<S: Serializer>(&self, w: &mut ObjectWriter<'_, S>) -> Result<(), S::Error> {
            w.present("id", &self.id)?;
            w.field("name", &self.name)?;
            w.field("tags", &self.tags)?;
            w.field("active", &self.active)?;
            w.field("balance", &self.balance)
        }
    }

    #[derive(Default)]
    struct Ledger {
        owner: Option<String>,
        accounts: Option<Vec<Account>>,
    }

    impl NullAware for Ledger {
        fn registration() -> &'static TypeRegistration {
            static REGISTRATION: OnceLock<TypeRegistration> = OnceLock::new();
            REGISTRATION.get_or_init(|| {
                TypeRegistration::builder("Ledger")
                    .rule(NullRule::for_type())
                    .field::<Option<String>>("owner")
                    .nested_seq_field("accounts", "Account", None)
                    .build()
                    .expect("valid registration")
            })
        }

        fn write_fields<S: Serializer>(&self, w: &mut ObjectWriter<'_, S>) -> Result<(), S::Error> {
            w.field("owner", &self.owner)?;
            w.nested_seq("accounts", &self.accounts)
        }
    }

    /// Type rule with a custom value and one registered field; writes an extra key.
    #[derive(Default)]
    struct Tagged {
        id: Option<i32>,
        extra: Option<i32>,
    }

    fn tagged_rule() -> NullRule {
        NullRule {
            custom_value: Some("n/a".into()),
            ..NullRule::for_type()
        }
    }

    impl NullAware for Tagged {
        fn registration() -> &'static TypeRegistration {
            static REGISTRATION: OnceLock<TypeRegistration> = OnceLock::new();
            REGISTRATION.get_or_init(|| {
                TypeRegistration::builder("Tagged")
                    .rule(tagged_rule())
                    .field::<Option<i32>>("id")
                    .build()
                    .expect("valid registration")
            })
        }

        fn write_fields<S: Serializer>(&self, w: &mut ObjectWriter<'_, S>) -> Result<(), S::Error> {
            w.field("id", &self.id)?;
            w.field("extra", &self.extra)
        }
    }

    #[test]
    fn sequence_elements_use_their_registration() {
        let ledger = Ledger {
            owner: None,
            accounts: Some(vec![Account::default()]),
        };
        let out = Mapper::default().to_value(&ledger).unwrap();
        assert_eq!(
            out,
            json!({
                "owner": "",
                "accounts": [
                    { "id": 0, "name": "", "tags": [], "active": true, "balance": "0.00" }
                ],
            })
        );

        let out = Mapper::default().to_value(&Ledger::default()).unwrap();
        assert_eq!(out, json!({ "owner": "", "accounts": [] }));
    }

    #[test]
    fn unregistered_null_keys_agree_across_paths() {
        let tagged = Tagged {
            id: Some(1),
            extra: None,
        };
        let written = Mapper::default().to_value(&tagged).unwrap();

        let registry = crate::rules::factory::build_registry(
            &[crate::config::TypeDecl {
                name: "Tagged".into(),
                rule: Some(tagged_rule()),
                fields: vec![crate::config::FieldDecl {
                    name: "id".into(),
                    type_name: "Integer".into(),
                    rule: None,
                }],
            }],
            MapperConfig::default(),
        )
        .unwrap();
        let filled = registry
            .fill("Tagged", json!({ "id": 1, "extra": null }))
            .unwrap();

        assert_eq!(written, json!({ "id": 1, "extra": "n/a" }));
        assert_eq!(filled, written);
    }

    mod length_hint {
        use serde::ser::{Impossible, Serialize, Serializer};
        use std::fmt;

        #[derive(Debug)]
        pub enum Stop {
            MapLen(Option<usize>),
            Other,
        }

        impl fmt::Display for Stop {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{:?}", self)
            }
        }

        impl std::error::Error for Stop {}

        impl serde::ser::Error for Stop {
            fn custom<T: fmt::Display>(_: T) -> Self {
                Stop::Other
            }
        }

        /// Records the length passed to `serialize_map`, rejecting everything else.
        pub struct MapLenRecorder;

        macro_rules! reject {
            ($($method:ident($($arg:ty),*) -> $ret:ty;)*) => {
                $(fn $method(self, $(_: $arg),*) -> Result<$ret, Stop> {
                    Err(Stop::Other)
                })*
            };
        }

        impl Serializer for MapLenRecorder {
            type Ok = ();
            type Error = Stop;
            type SerializeSeq = Impossible<(), Stop>;
            type SerializeTuple = Impossible<(), Stop>;
            type SerializeTupleStruct = Impossible<(), Stop>;
            type SerializeTupleVariant = Impossible<(), Stop>;
            type SerializeMap = Impossible<(), Stop>;
            type SerializeStruct = Impossible<(), Stop>;
            type SerializeStructVariant = Impossible<(), Stop>;

            reject! {
                serialize_bool(bool) -> ();
                serialize_i8(i8) -> ();
                serialize_i16(i16) -> ();
                serialize_i32(i32) -> ();
                serialize_i64(i64) -> ();
                serialize_u8(u8) -> ();
                serialize_u16(u16) -> ();
                serialize_u32(u32) -> ();
                serialize_u64(u64) -> ();
                serialize_f32(f32) -> ();
                serialize_f64(f64) -> ();
                serialize_char(char) -> ();
                serialize_str(&str) -> ();
                serialize_bytes(&[u8]) -> ();
                serialize_none() -> ();
                serialize_unit() -> ();
                serialize_unit_struct(&'static str) -> ();
                serialize_unit_variant(&'static str, u32, &'static str) -> ();
                serialize_seq(Option<usize>) -> Self::SerializeSeq;
                serialize_tuple(usize) -> Self::SerializeTuple;
                serialize_tuple_struct(&'static str, usize) -> Self::SerializeTupleStruct;
                serialize_tuple_variant(&'static str, u32, &'static str, usize) -> Self::SerializeTupleVariant;
                serialize_struct(&'static str, usize) -> Self::SerializeStruct;
                serialize_struct_variant(&'static str, u32, &'static str, usize) -> Self::SerializeStructVariant;
            }

            fn serialize_some<T: ?Sized + Serialize>(self, _: &T) -> Result<(), Stop> {
                Err(Stop::Other)
            }

            fn serialize_newtype_struct<T: ?Sized + Serialize>(
                self,
                _: &'static str,
                _: &T,
            ) -> Result<(), Stop> {
                Err(Stop::Other)
            }

            fn serialize_newtype_variant<T: ?Sized + Serialize>(
                self,
                _: &'static str,
                _: u32,
                _: &'static str,
                _: &T,
            ) -> Result<(), Stop> {
                Err(Stop::Other)
            }

            fn serialize_map(self, len: Option<usize>) -> Result<Self::SerializeMap, Stop> {
                Err(Stop::MapLen(len))
            }
        }
    }

    #[test]
    fn map_length_is_not_promised() {
        use length_hint::{MapLenRecorder, Stop};

        let config = MapperConfig::default();
        let err = Mapped::new(&Tagged::default(), &config)
            .serialize(MapLenRecorder)
            .unwrap_err();
        assert!(matches!(err, Stop::MapLen(None)), "got {:?}", err);
    }

    #[test]
    fn absent_fields_are_substituted() {
        let mapper = Mapper::default();
        let out = mapper.to_value(&Account::default()).unwrap();
        assert_eq!(
            out,
            json!({ "id": 0, "name": "", "tags": [], "active": true, "balance": "0.00" })
        );
    }

    #[test]
    fn present_fields_are_untouched() {
        let account = Account {
            id: 9,
            name: Some("ada".into()),
            tags: Some(vec!["x".into()]),
            active: Some(false),
            balance: Some(1.5),
        };
        let out = Mapper::default().to_value(&account).unwrap();
        assert_eq!(
            out,
            json!({ "id": 9, "name": "ada", "tags": ["x"], "active": false, "balance": 1.5 })
        );
    }

    #[test]
    fn output_keeps_field_order() {
        let out = Mapper::default().to_string(&Account::default()).unwrap();
        assert_eq!(
            out,
            r#"{"id":0,"name":"","tags":[],"active":true,"balance":"0.00"}"#
        );
    }

    #[test]
    fn typed_mode_applies_through_mapper() {
        let mapper = Mapper::new(MapperConfig {
            custom_values: CustomValueMode::Typed,
            pretty: false,
        });
        let out = mapper.to_value(&Account::default()).unwrap();
        assert_eq!(out["balance"], json!(0.0));
    }

    #[test]
    fn writer_errors_propagate() {
        struct Broken;

        impl io::Write for Broken {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = Mapper::default()
            .to_writer(Broken, &Account::default())
            .unwrap_err();
        assert!(err.is_io());
    }
}
