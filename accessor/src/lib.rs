//! # hotconf Typed Accessors
//!
//! Live, typed views over a configuration repository.
//!
//! This crate provides:
//! - [`TypeDescriptor`] trees describing accessor return types
//! - Path-aware structural decoding of stored values
//! - [`AccessorRegistry`] and the [`ConfigAccessor`] dispatcher
//! - The [`config_interface!`] and [`describe_object!`] macros
//!
//! Values are read from the repository's current snapshot on every call; an
//! absent or `null` value yields the declared fallback and a value of the
//! wrong shape yields [`ConfigError::TypeMismatch`].

pub mod accessor;
pub mod decode;
pub mod descriptor;
mod macros;
pub mod registry;

pub use accessor::ConfigAccessor;
pub use decode::{Mismatch, decode, decode_with};
pub use descriptor::{Describe, FieldDescriptor, TypeDescriptor};
pub use errors::ConfigError;
pub use registry::{AccessorDescriptor, AccessorRegistry};
