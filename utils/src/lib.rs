//! # hotconf Utilities
//!
//! Content hashing for snapshot versions and alias naming helpers.

use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of a raw configuration payload.
///
/// # Examples
///
/// ```
/// use utils::compute_content_hash;
///
/// let hash = compute_content_hash("[]");
/// assert_eq!(hash.len(), 64);
/// ```
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Convert an identifier into the dotted, lower-cased alias form.
///
/// Word boundaries are underscores, dashes, dots, and lower→upper case
/// transitions. A run of capitals followed by a lowercase letter starts a new
/// word at the last capital (`HTTPServer` → `http.server`).
///
/// ```
/// use utils::to_dotted;
///
/// assert_eq!(to_dotted("SomeConfiguration"), "some.configuration");
/// assert_eq!(to_dotted("is_this_true"), "is.this.true");
/// ```
#[must_use]
pub fn to_dotted(identifier: &str) -> String {
    let chars: Vec<char> = identifier.chars().collect();
    let mut words: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if c.is_uppercase() && !current.is_empty() {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_is_lower)
            {
                words.push(std::mem::take(&mut current));
            }
        }

        current.extend(c.to_lowercase());
    }

    if !current.is_empty() {
        words.push(current);
    }

    words.join(".")
}

/// Build the alias of an accessor method from its interface and method names.
#[must_use]
pub fn accessor_alias(interface: &str, method: &str) -> String {
    let namespace = to_dotted(interface);
    let name = to_dotted(method);
    match (namespace.is_empty(), name.is_empty()) {
        (true, _) => name,
        (_, true) => namespace,
        _ => format!("{namespace}.{name}")
    }
}
