//! Key Management System (KMS) integration
//!
//! Decrypts at-rest configuration payloads. AWS KMS is the production
//! provider; the local provider exists for development and tests.

use async_trait::async_trait;
use base64::Engine;
use errors::ConfigError;
use hc_core::PayloadDecryptor;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KmsError {
    #[error("KMS operation failed: {0}")]
    OperationFailed(String),

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Malformed ciphertext: {0}")]
    MalformedCiphertext(String)
}

/// KMS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "provider")]
pub enum KmsConfig {
    /// AWS KMS configuration
    #[serde(rename = "aws-kms")]
    AwsKms {
        region: Option<String>,
        key_id: Option<String>,
        endpoint: Option<String>
    },

    /// Local development (insecure, for testing only)
    #[serde(rename = "local")]
    Local { keys: HashMap<String, String> }
}

/// How the ciphertext is stored in the object body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CiphertextEncoding {
    /// The object body is the raw ciphertext blob.
    #[default]
    Binary,
    /// The object body is the base64 armour of the ciphertext blob.
    Base64
}

impl CiphertextEncoding {
    pub fn decode(self, body: &[u8]) -> Result<Vec<u8>, KmsError> {
        match self {
            Self::Binary => Ok(body.to_vec()),
            Self::Base64 => {
                let text = std::str::from_utf8(body)
                    .map_err(|e| KmsError::MalformedCiphertext(e.to_string()))?;
                let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                base64::engine::general_purpose::STANDARD
                    .decode(compact)
                    .map_err(|e| KmsError::MalformedCiphertext(e.to_string()))
            }
        }
    }
}

/// Trait for KMS providers
#[async_trait]
pub trait KmsProvider: Send + Sync {
    /// Encrypt data directly with KMS (for small payloads)
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError>;

    /// Decrypt data encrypted with KMS
    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError>;
}

/// AWS KMS provider implementation
pub struct AwsKmsProvider {
    client: aws_sdk_kms::Client,
    key_id: Option<String>
}

impl AwsKmsProvider {
    pub async fn new(
        region: Option<String>,
        key_id: Option<String>,
        endpoint: Option<String>
    ) -> Result<Self, KmsError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_sdk_kms::config::Region::new(region));
        }
        let config = loader.load().await;

        let mut client_config = aws_sdk_kms::config::Builder::from(&config);
        if let Some(ep) = endpoint {
            client_config = client_config.endpoint_url(ep);
        }

        let client = aws_sdk_kms::Client::from_conf(client_config.build());

        Ok(Self { client, key_id })
    }

    pub fn from_client(client: aws_sdk_kms::Client, key_id: Option<String>) -> Self {
        Self { client, key_id }
    }
}

#[async_trait]
impl KmsProvider for AwsKmsProvider {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let result = self
            .client
            .encrypt()
            .key_id(key_id)
            .plaintext(aws_sdk_kms::primitives::Blob::new(plaintext))
            .send()
            .await
            .map_err(|e| {
                KmsError::OperationFailed(aws_sdk_kms::error::DisplayErrorContext(&e).to_string())
            })?;

        let ciphertext = result
            .ciphertext_blob()
            .ok_or_else(|| KmsError::OperationFailed("No ciphertext returned".to_string()))?
            .as_ref()
            .to_vec();

        Ok(ciphertext)
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let mut request = self
            .client
            .decrypt()
            .ciphertext_blob(aws_sdk_kms::primitives::Blob::new(ciphertext));
        // Symmetric ciphertext blobs embed the key; pinning it only narrows
        // which key KMS is allowed to use.
        if let Some(key_id) = &self.key_id {
            request = request.key_id(key_id);
        }

        let result = request.send().await.map_err(|e| {
            KmsError::OperationFailed(aws_sdk_kms::error::DisplayErrorContext(&e).to_string())
        })?;

        let plaintext = result
            .plaintext()
            .ok_or_else(|| KmsError::OperationFailed("No plaintext returned".to_string()))?
            .as_ref()
            .to_vec();

        Ok(plaintext)
    }
}

/// Local KMS provider (for development/testing only - NOT SECURE)
///
/// Ciphertext layout: one byte key-id length, the key id, then the payload
/// XOR-ed with the 32-byte key.
pub struct LocalKmsProvider {
    keys: HashMap<String, Vec<u8>>
}

impl LocalKmsProvider {
    pub fn new(keys: HashMap<String, String>) -> Result<Self, KmsError> {
        let mut parsed_keys = HashMap::new();

        for (key_id, key_hex) in keys {
            let key_bytes = hex::decode(&key_hex)
                .map_err(|e| KmsError::InvalidConfig(format!("Invalid key hex: {}", e)))?;

            if key_bytes.len() != 32 {
                return Err(KmsError::InvalidConfig(
                    "Key must be 32 bytes (256 bits)".to_string()
                ));
            }

            if key_id.is_empty() || key_id.len() > usize::from(u8::MAX) {
                return Err(KmsError::InvalidConfig(format!(
                    "Key id must be 1-255 bytes: {:?}",
                    key_id
                )));
            }

            parsed_keys.insert(key_id, key_bytes);
        }

        Ok(Self { keys: parsed_keys })
    }

    fn xor(data: &[u8], key: &[u8]) -> Vec<u8> {
        data.iter().zip(key.iter().cycle()).map(|(a, b)| a ^ b).collect()
    }
}

#[async_trait]
impl KmsProvider for LocalKmsProvider {
    async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let key = self
            .keys
            .get(key_id)
            .ok_or_else(|| KmsError::KeyNotFound(key_id.to_string()))?;

        let id_len = u8::try_from(key_id.len())
            .map_err(|_| KmsError::InvalidConfig("Key id too long".to_string()))?;

        let mut ciphertext = Vec::with_capacity(1 + key_id.len() + plaintext.len());
        ciphertext.push(id_len);
        ciphertext.extend_from_slice(key_id.as_bytes());
        ciphertext.extend(Self::xor(plaintext, key));

        Ok(ciphertext)
    }

    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        let (&id_len, rest) = ciphertext
            .split_first()
            .ok_or_else(|| KmsError::MalformedCiphertext("empty ciphertext".to_string()))?;
        let id_len = usize::from(id_len);
        if rest.len() < id_len {
            return Err(KmsError::MalformedCiphertext(
                "truncated key id header".to_string()
            ));
        }

        let (key_id, body) = rest.split_at(id_len);
        let key_id = std::str::from_utf8(key_id)
            .map_err(|e| KmsError::MalformedCiphertext(e.to_string()))?;
        let key = self
            .keys
            .get(key_id)
            .ok_or_else(|| KmsError::KeyNotFound(key_id.to_string()))?;

        Ok(Self::xor(body, key))
    }
}

/// KMS client that wraps different providers
#[derive(Clone)]
pub struct KmsClient {
    provider: Arc<dyn KmsProvider>
}

impl KmsClient {
    pub async fn new(config: KmsConfig) -> Result<Self, KmsError> {
        let provider: Arc<dyn KmsProvider> = match config {
            KmsConfig::AwsKms {
                region,
                key_id,
                endpoint
            } => Arc::new(AwsKmsProvider::new(region, key_id, endpoint).await?),
            KmsConfig::Local { keys } => Arc::new(LocalKmsProvider::new(keys)?)
        };

        Ok(Self { provider })
    }

    pub fn from_provider(provider: Arc<dyn KmsProvider>) -> Self {
        Self { provider }
    }

    pub async fn encrypt(&self, key_id: &str, plaintext: &[u8]) -> Result<Vec<u8>, KmsError> {
        self.provider.encrypt(key_id, plaintext).await
    }

    pub async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KmsError> {
        self.provider.decrypt(ciphertext).await
    }
}

/// Decrypts configuration payloads through a [`KmsClient`].
#[derive(Clone)]
pub struct KmsDecryptor {
    client: KmsClient,
    encoding: CiphertextEncoding
}

impl KmsDecryptor {
    pub fn new(client: KmsClient, encoding: CiphertextEncoding) -> Self {
        Self { client, encoding }
    }
}

#[async_trait]
impl PayloadDecryptor for KmsDecryptor {
    async fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, ConfigError> {
        let blob = self
            .encoding
            .decode(ciphertext)
            .map_err(|e| ConfigError::decrypt("kms", e))?;
        self.client
            .decrypt(&blob)
            .await
            .map_err(|e| ConfigError::decrypt("kms", e))
    }
}
