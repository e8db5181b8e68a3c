//! Structural validation of stored values against declared types.
//!
//! A stored value is checked against the accessor's [`TypeDescriptor`]
//! before it is deserialized, so a mismatch names the exact position that is
//! wrong (`$.limits["7"][2].name`) instead of a bare serde message.

use errors::ConfigError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::descriptor::{Describe, TypeDescriptor};

/// Where in the stored value a mismatch was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub path: String,
    pub expected: String,
    pub found: String
}

impl Mismatch {
    fn new(path: &str, expected: impl ToString, found: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            expected: expected.to_string(),
            found: found.into()
        }
    }

    pub fn into_error(self, alias: &str) -> ConfigError {
        ConfigError::TypeMismatch {
            alias: alias.to_string(),
            path: self.path,
            expected: self.expected,
            found: self.found
        }
    }
}

/// Check `value` against `descriptor`. `path` is the position of `value`
/// within the stored value, `$` for the root.
pub fn validate(value: &Value, descriptor: &TypeDescriptor, path: &str) -> Result<(), Mismatch> {
    match descriptor {
        TypeDescriptor::Any => Ok(()),

        TypeDescriptor::Optional(inner) => match value {
            Value::Null => Ok(()),
            other => validate(other, inner, path)
        },

        TypeDescriptor::Bool => match value {
            Value::Bool(_) => Ok(()),
            other => Err(Mismatch::new(path, descriptor, found(other)))
        },

        TypeDescriptor::Integer { min, max, .. } => {
            let as_int = match value {
                Value::Number(n) => n
                    .as_i64()
                    .map(i128::from)
                    .or_else(|| n.as_u64().map(i128::from)),
                _ => None
            };
            match as_int {
                Some(i) if (*min..=*max).contains(&i) => Ok(()),
                _ => Err(Mismatch::new(path, descriptor, found(value)))
            }
        }

        TypeDescriptor::Float { bits, .. } => {
            let fits = match value {
                Value::Number(n) => n
                    .as_f64()
                    .is_some_and(|f| *bits > 32 || (f as f32).is_finite()),
                _ => false
            };
            if fits {
                Ok(())
            } else {
                Err(Mismatch::new(path, descriptor, found(value)))
            }
        }

        TypeDescriptor::String => match value {
            Value::String(_) => Ok(()),
            other => Err(Mismatch::new(path, descriptor, found(other)))
        },

        TypeDescriptor::Uuid => match value {
            Value::String(s) if Uuid::parse_str(s).is_ok() => Ok(()),
            other => Err(Mismatch::new(path, descriptor, found(other)))
        },

        TypeDescriptor::List(element) | TypeDescriptor::Set { element, .. } => match value {
            Value::Array(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| validate(item, element, &format!("{}[{}]", path, i))),
            other => Err(Mismatch::new(path, descriptor, found(other)))
        },

        TypeDescriptor::Map { key, value: element, .. } => match value {
            Value::Object(entries) => entries.iter().try_for_each(|(k, v)| {
                let entry_path = format!("{}[{:?}]", path, k);
                if !key_matches(k, key) {
                    return Err(Mismatch::new(
                        &entry_path,
                        format!("key of type {}", key),
                        format!("key {:?}", k)
                    ));
                }
                validate(v, element, &entry_path)
            }),
            other => Err(Mismatch::new(path, descriptor, found(other)))
        },

        TypeDescriptor::Object { fields, .. } => match value {
            Value::Object(entries) => fields.iter().try_for_each(|field| {
                let field_path = format!("{}.{}", path, field.name);
                let entry = entries.get(field.name);
                let absent = match entry {
                    None => true,
                    Some(Value::Null) => field.descriptor != TypeDescriptor::Any,
                    Some(_) => false
                };
                if absent && field.is_required() {
                    return Err(Mismatch::new(&field_path, &field.descriptor, "missing field"));
                }
                entry.map_or(Ok(()), |v| validate(v, &field.descriptor, &field_path))
            }),
            other => Err(Mismatch::new(path, descriptor, found(other)))
        }
    }
}

fn key_matches(key: &str, descriptor: &TypeDescriptor) -> bool {
    match descriptor {
        TypeDescriptor::String => true,
        TypeDescriptor::Uuid => Uuid::parse_str(key).is_ok(),
        TypeDescriptor::Integer { min, max, .. } => key
            .parse::<i128>()
            .is_ok_and(|i| (*min..=*max).contains(&i)),
        _ => false
    }
}

/// Short description of a JSON value for error messages.
fn found(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => format!("boolean {}", b),
        Value::Number(n) => format!("number {}", n),
        Value::String(s) if s.chars().count() <= 40 => format!("string {:?}", s),
        Value::String(_) => "string".to_string(),
        Value::Array(items) => format!("array of {}", items.len()),
        Value::Object(_) => "object".to_string()
    }
}

/// Validate `raw` against `descriptor` and deserialize it.
///
/// # Errors
///
/// `TypeMismatch` naming `alias` and the offending path.
pub fn decode_with<T: DeserializeOwned>(
    alias: &str,
    raw: &Value,
    descriptor: &TypeDescriptor
) -> Result<T, ConfigError> {
    validate(raw, descriptor, "$").map_err(|m| m.into_error(alias))?;

    serde_json::from_value(raw.clone()).map_err(|e| ConfigError::TypeMismatch {
        alias: alias.to_string(),
        path: "$".to_string(),
        expected: descriptor.to_string(),
        found: e.to_string()
    })
}

/// [`decode_with`] using `T`'s own descriptor.
pub fn decode<T: Describe + DeserializeOwned>(alias: &str, raw: &Value) -> Result<T, ConfigError> {
    decode_with(alias, raw, &T::describe())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe_object;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap, HashSet};

    #[derive(Debug, Deserialize, PartialEq)]
    struct Obj {
        k: String
    }

    describe_object!(Obj { k: String });

    #[derive(Debug, Deserialize, PartialEq)]
    struct Limits {
        max: u8,
        label: Option<String>
    }

    describe_object!(Limits {
        max: u8,
        label: Option<String>
    });

    fn mismatch(result: Result<impl std::fmt::Debug, ConfigError>) -> (String, String, String) {
        match result {
            Err(ConfigError::TypeMismatch {
                path,
                expected,
                found,
                ..
            }) => (path, expected, found),
            other => panic!("Expected TypeMismatch, got {:?}", other)
        }
    }

    #[test]
    fn test_decode_scalars() {
        assert!(decode::<bool>("a.b.c", &json!(true)).unwrap());
        assert_eq!(decode::<String>("s", &json!("x")).unwrap(), "x");
        assert_eq!(decode::<u16>("n", &json!(8080)).unwrap(), 8080);
        assert_eq!(decode::<f64>("f", &json!(3)).unwrap(), 3.0);
        assert_eq!(decode::<Value>("v", &json!({"x": [1]})).unwrap(), json!({"x": [1]}));
    }

    #[test]
    fn test_decode_uuid_keyed_map_of_objects() {
        let raw = json!({"11111111-1111-1111-1111-111111111111": [{"k": "A"}]});
        let decoded: HashMap<Uuid, Vec<Obj>> = decode("m", &raw).unwrap();

        assert_eq!(decoded.len(), 1);
        let id = Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap();
        assert_eq!(decoded[&id], vec![Obj { k: "A".to_string() }]);
    }

    #[test]
    fn test_decode_integer_keyed_map_and_sets() {
        let decoded: BTreeMap<u32, HashSet<String>> =
            decode("m", &json!({"1": ["a", "b", "a"], "20": []})).unwrap();
        assert_eq!(decoded[&1].len(), 2);
        assert!(decoded[&20].is_empty());
    }

    #[test]
    fn test_unknown_object_fields_ignored() {
        let decoded: Limits = decode("l", &json!({"max": 3, "extra": true})).unwrap();
        assert_eq!(
            decoded,
            Limits {
                max: 3,
                label: None
            }
        );
    }

    #[test]
    fn test_wrong_scalar_type() {
        let (path, expected, found) = mismatch(decode::<bool>("a.b.c", &json!("yes")));
        assert_eq!(path, "$");
        assert_eq!(expected, "bool");
        assert_eq!(found, "string \"yes\"");
    }

    #[test]
    fn test_integer_out_of_range() {
        let (path, expected, found) = mismatch(decode::<u8>("n", &json!(300)));
        assert_eq!(path, "$");
        assert_eq!(expected, "u8");
        assert_eq!(found, "number 300");

        mismatch(decode::<u32>("n", &json!(-1)));
        mismatch(decode::<i32>("n", &json!(1.5)));
    }

    #[test]
    fn test_float_out_of_f32_range() {
        let (path, expected, found) = mismatch(decode::<f32>("f", &json!(1e300)));
        assert_eq!(path, "$");
        assert_eq!(expected, "f32");
        assert_eq!(found, "number 1e300");

        assert_eq!(decode::<f32>("f", &json!(1.5)).unwrap(), 1.5);
        assert_eq!(decode::<f64>("f", &json!(1e300)).unwrap(), 1e300);
        mismatch(decode::<Vec<f32>>("f", &json!([1.0, -1e39])));
    }

    #[test]
    fn test_nested_mismatch_path() {
        let raw = json!({"11111111-1111-1111-1111-111111111111": [{"k": "A"}, {"k": 7}]});
        let (path, expected, found) = mismatch(decode::<HashMap<Uuid, Vec<Obj>>>("m", &raw));
        assert_eq!(path, "$[\"11111111-1111-1111-1111-111111111111\"][1].k");
        assert_eq!(expected, "String");
        assert_eq!(found, "number 7");
    }

    #[test]
    fn test_bad_map_key() {
        let (path, expected, _) =
            mismatch(decode::<HashMap<Uuid, String>>("m", &json!({"not-a-uuid": "x"})));
        assert_eq!(path, "$[\"not-a-uuid\"]");
        assert_eq!(expected, "key of type Uuid");
    }

    #[test]
    fn test_missing_required_field() {
        let (path, _, found) = mismatch(decode::<Limits>("l", &json!({"label": "x"})));
        assert_eq!(path, "$.max");
        assert_eq!(found, "missing field");

        let (path, expected, _) = mismatch(decode::<Limits>("l", &json!({"max": 256})));
        assert_eq!(path, "$.max");
        assert_eq!(expected, "u8");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Extension {
        name: String,
        payload: Value
    }

    describe_object!(Extension {
        name: String,
        payload: Value
    });

    #[test]
    fn test_null_in_value_field_is_kept() {
        let decoded: Extension = decode("e", &json!({"name": "x", "payload": null})).unwrap();
        assert_eq!(decoded.payload, Value::Null);

        let (path, _, found) = mismatch(decode::<Extension>("e", &json!({"name": "x"})));
        assert_eq!(path, "$.payload");
        assert_eq!(found, "missing field");
    }

    #[test]
    fn test_container_shape_mismatch() {
        let (_, expected, found) = mismatch(decode::<Vec<String>>("l", &json!({"a": 1})));
        assert_eq!(expected, "Vec<String>");
        assert_eq!(found, "object");

        let (path, _, _) = mismatch(decode::<Vec<String>>("l", &json!(["a", 2])));
        assert_eq!(path, "$[1]");
    }

    #[test]
    fn test_optional_accepts_null() {
        assert_eq!(decode::<Option<u8>>("o", &Value::Null).unwrap(), None);
        assert_eq!(decode::<Option<u8>>("o", &json!(4)).unwrap(), Some(4));
        assert_eq!(
            decode::<Vec<Option<bool>>>("o", &json!([true, null])).unwrap(),
            vec![Some(true), None]
        );
    }

    #[test]
    fn test_mismatch_names_alias() {
        match decode::<bool>("some.configuration.flag", &json!(1)) {
            Err(ConfigError::TypeMismatch { alias, .. }) => {
                assert_eq!(alias, "some.configuration.flag")
            }
            other => panic!("Expected TypeMismatch, got {:?}", other)
        }
    }
}
