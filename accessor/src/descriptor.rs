//! Declared-type trees for accessor return types.

use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;
use uuid::Uuid;

/// Structural description of a Rust type, built once per accessor method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDescriptor {
    Bool,

    /// Integer bounded to the Rust type's range.
    Integer {
        name: &'static str,
        min: i128,
        max: i128
    },

    /// IEEE float of `bits` width; values must fit without overflowing.
    Float {
        name: &'static str,
        bits: u8
    },

    String,

    Uuid,

    /// Any JSON value (`serde_json::Value`).
    Any,

    /// Absent or `null` allowed.
    Optional(Box<TypeDescriptor>),

    List(Box<TypeDescriptor>),

    Set {
        name: &'static str,
        element: Box<TypeDescriptor>
    },

    /// JSON object keyed by strings convertible to `key`.
    Map {
        name: &'static str,
        key: Box<TypeDescriptor>,
        value: Box<TypeDescriptor>
    },

    /// Named record with declared fields; undeclared fields are ignored.
    Object {
        name: &'static str,
        fields: Vec<FieldDescriptor>
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub descriptor: TypeDescriptor
}

impl FieldDescriptor {
    pub fn new(name: &'static str, descriptor: TypeDescriptor) -> Self {
        Self { name, descriptor }
    }

    /// Fields typed `Option<_>` may be missing.
    pub fn is_required(&self) -> bool {
        !matches!(self.descriptor, TypeDescriptor::Optional(_))
    }
}

impl TypeDescriptor {
    /// Whether values of this type can appear as JSON object keys.
    pub fn is_key_type(&self) -> bool {
        matches!(self, Self::String | Self::Uuid | Self::Integer { .. })
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "bool"),
            Self::Integer { name, .. } | Self::Float { name, .. } => write!(f, "{}", name),
            Self::String => write!(f, "String"),
            Self::Uuid => write!(f, "Uuid"),
            Self::Any => write!(f, "Value"),
            Self::Optional(inner) => write!(f, "Option<{}>", inner),
            Self::List(element) => write!(f, "Vec<{}>", element),
            Self::Set { name, element } => write!(f, "{}<{}>", name, element),
            Self::Map { name, key, value } => write!(f, "{}<{}, {}>", name, key, value),
            Self::Object { name, .. } => write!(f, "{}", name)
        }
    }
}

/// Types an accessor can return.
///
/// Implemented for the scalar and container types a configuration value can
/// take; user records implement it through [`describe_object!`](crate::describe_object).
pub trait Describe {
    fn describe() -> TypeDescriptor;
}

impl Describe for bool {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Bool
    }
}

macro_rules! describe_integer {
    ($($t:ty),*) => {
        $(
            impl Describe for $t {
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::Integer {
                        name: stringify!($t),
                        min: <$t>::MIN as i128,
                        max: <$t>::MAX as i128
                    }
                }
            }
        )*
    };
}

describe_integer!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl Describe for f32 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Float {
            name: "f32",
            bits: 32
        }
    }
}

impl Describe for f64 {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Float {
            name: "f64",
            bits: 64
        }
    }
}

impl Describe for String {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::String
    }
}

impl Describe for Uuid {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Uuid
    }
}

impl Describe for Value {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Any
    }
}

impl<T: Describe> Describe for Option<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Optional(Box::new(T::describe()))
    }
}

impl<T: Describe> Describe for Vec<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::List(Box::new(T::describe()))
    }
}

impl<T: Describe, S> Describe for HashSet<T, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Set {
            name: "HashSet",
            element: Box::new(T::describe())
        }
    }
}

impl<T: Describe> Describe for BTreeSet<T> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Set {
            name: "BTreeSet",
            element: Box::new(T::describe())
        }
    }
}

impl<K: Describe, V: Describe, S> Describe for HashMap<K, V, S> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map {
            name: "HashMap",
            key: Box::new(K::describe()),
            value: Box::new(V::describe())
        }
    }
}

impl<K: Describe, V: Describe> Describe for BTreeMap<K, V> {
    fn describe() -> TypeDescriptor {
        TypeDescriptor::Map {
            name: "BTreeMap",
            key: Box::new(K::describe()),
            value: Box::new(V::describe())
        }
    }
}

/// Implement [`Describe`] for a record type.
///
/// The type must also implement `serde::Deserialize`; field names are the
/// serialized names.
///
/// ```
/// use accessor::{Describe, describe_object};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Limits {
///     max: u32,
///     label: Option<String>,
/// }
///
/// describe_object!(Limits { max: u32, label: Option<String> });
///
/// assert_eq!(Limits::describe().to_string(), "Limits");
/// ```
#[macro_export]
macro_rules! describe_object {
    ($name:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        impl $crate::Describe for $name {
            fn describe() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Object {
                    name: stringify!($name),
                    fields: vec![
                        $(
                            $crate::FieldDescriptor::new(
                                stringify!($field),
                                <$ty as $crate::Describe>::describe()
                            ),
                        )*
                    ]
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(serde::Deserialize)]
    struct Obj {
        k: String
    }

    describe_object!(Obj { k: String });

    #[test]
    fn test_nested_descriptor_display() {
        assert_eq!(
            <HashMap<Uuid, Vec<Obj>>>::describe().to_string(),
            "HashMap<Uuid, Vec<Obj>>"
        );
        assert_eq!(<Option<BTreeSet<u8>>>::describe().to_string(), "Option<BTreeSet<u8>>");
        assert_eq!(<Value>::describe().to_string(), "Value");
    }

    #[test]
    fn test_integer_bounds() {
        assert_eq!(
            u8::describe(),
            TypeDescriptor::Integer {
                name: "u8",
                min: 0,
                max: 255
            }
        );
        match i64::describe() {
            TypeDescriptor::Integer { min, max, .. } => {
                assert_eq!(min, i64::MIN as i128);
                assert_eq!(max, i64::MAX as i128);
            }
            other => panic!("Expected Integer, got {:?}", other)
        }
    }

    #[test]
    fn test_object_fields() {
        match Obj::describe() {
            TypeDescriptor::Object { name, fields } => {
                assert_eq!(name, "Obj");
                assert_eq!(fields, vec![FieldDescriptor::new("k", TypeDescriptor::String)]);
                assert!(fields[0].is_required());
            }
            other => panic!("Expected Object, got {:?}", other)
        }
    }

    #[test]
    fn test_key_types() {
        assert!(String::describe().is_key_type());
        assert!(Uuid::describe().is_key_type());
        assert!(u32::describe().is_key_type());
        assert!(!bool::describe().is_key_type());
        assert!(!<Vec<String>>::describe().is_key_type());
    }
}
