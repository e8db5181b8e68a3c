//! # hotconf Storage
//!
//! Raw configuration loaders. Each loader fetches the full payload from its
//! backing store on every call and hands the text to the parser:
//!
//! - [`FileSystemLoader`]: local file, re-read in full on each call
//! - [`S3Loader`]: object-store GET by bucket and key, with optional
//!   KMS decryption of the fetched bytes
//!
//! Loaders neither cache nor retry. Retry policy belongs to the refresh
//! schedule of the repository that owns the loader.

pub mod file_loader;
pub mod kms_integration;
pub mod object_store;

pub use file_loader::FileSystemLoader;
pub use kms_integration::{
    CiphertextEncoding, KmsClient, KmsConfig, KmsDecryptor, KmsError, KmsProvider,
    LocalKmsProvider
};
pub use object_store::{AwsObjectStore, ObjectStore, ObjectStoreError, S3ClientSettings, S3Loader};
