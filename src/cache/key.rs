//! Cache key derivation.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Fingerprint of an optimization request.
///
/// Derived from `description`, `context` and `model`. Each field is hashed as
/// `<byte-len>:<bytes>` so that shifting a separator between fields always
/// yields a different key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub hash: String,
}

impl CacheKey {
    pub fn derive(description: &str, context: &str, model: &str) -> Self {
        let mut hasher = Sha256::new();
        for (i, field) in [description, context, model].iter().enumerate() {
            if i > 0 {
                hasher.update(b"|");
            }
            hasher.update(field.len().to_string().as_bytes());
            hasher.update(b":");
            hasher.update(field.as_bytes());
        }
        let hash: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect();
        Self { hash }
    }

    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Short prefix used in log lines.
    pub fn short(&self) -> &str {
        &self.hash[..8.min(self.hash.len())]
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_triple_same_key() {
        let a = CacheKey::derive("Write a haiku", "", "claude-haiku");
        let b = CacheKey::derive("Write a haiku", "", "claude-haiku");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn each_field_changes_the_key() {
        let base = CacheKey::derive("d", "c", "m");
        assert_ne!(base, CacheKey::derive("d2", "c", "m"));
        assert_ne!(base, CacheKey::derive("d", "c2", "m"));
        assert_ne!(base, CacheKey::derive("d", "c", "m2"));
    }

    #[test]
    fn shifted_boundaries_do_not_collide() {
        assert_ne!(
            CacheKey::derive("ab", "c", "m"),
            CacheKey::derive("a", "bc", "m")
        );
        assert_ne!(
            CacheKey::derive("a|b", "c", "m"),
            CacheKey::derive("a", "b|c", "m")
        );
        assert_ne!(
            CacheKey::derive("", "", "m"),
            CacheKey::derive("", "m", "")
        );
    }

    #[test]
    fn short_prefix_is_eight_chars() {
        let key = CacheKey::derive("x", "y", "m");
        assert_eq!(key.short().len(), 8);
        assert!(key.as_str().starts_with(key.short()));
    }
}
