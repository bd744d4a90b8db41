//! Process-wide trust root for attestation evidence.

use std::path::Path;

use ed25519_dalek::VerifyingKey;

use crate::error::{Result, VerifyError};

/// Pinned public key of an authority allowed to sign evidence.
#[derive(Debug, Clone)]
pub struct TrustedAttestationKey {
    key: VerifyingKey,
}

impl TrustedAttestationKey {
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let bytes = hex::decode(encoded.trim()).map_err(|_| VerifyError::NoTrustedKeysConfigured)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| VerifyError::NoTrustedKeysConfigured)?;
        let key =
            VerifyingKey::from_bytes(&arr).map_err(|_| VerifyError::NoTrustedKeysConfigured)?;
        Ok(Self { key })
    }

    pub fn key_bytes(&self) -> &[u8; 32] {
        self.key.as_bytes()
    }
}

/// Immutable set of trusted attestation keys, loaded once at startup.
///
/// Construction fails closed: a store with no keys cannot exist, so a
/// verifier holding a `TrustStore` always has a non-empty trust root.
#[derive(Debug, Clone)]
pub struct TrustStore {
    keys: Vec<TrustedAttestationKey>,
}

impl TrustStore {
    /// Load the trust root from a JSON file containing an array of
    /// hex-encoded Ed25519 public keys.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "cannot read trust store");
            VerifyError::NoTrustedKeysConfigured
        })?;

        let encoded: Vec<String> = serde_json::from_str(&contents).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "cannot parse trust store");
            VerifyError::NoTrustedKeysConfigured
        })?;

        let keys = encoded
            .iter()
            .map(|k| TrustedAttestationKey::from_hex(k))
            .collect::<Result<Vec<_>>>()?;

        Self::from_keys(keys)
    }

    pub fn from_keys(keys: Vec<TrustedAttestationKey>) -> Result<Self> {
        if keys.is_empty() {
            return Err(VerifyError::NoTrustedKeysConfigured);
        }
        Ok(Self { keys })
    }

    pub fn contains(&self, key_bytes: &[u8; 32]) -> bool {
        self.keys.iter().any(|k| k.key_bytes() == key_bytes)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::SigningKey;
    use std::io::Write;

    fn test_key(seed: u8) -> TrustedAttestationKey {
        let signing = SigningKey::from_bytes(&[seed; 32]);
        TrustedAttestationKey::from_bytes(signing.verifying_key().as_bytes()).unwrap()
    }

    #[test]
    fn test_empty_store_fails_closed() {
        let err = TrustStore::from_keys(vec![]).unwrap_err();
        assert!(matches!(err, VerifyError::NoTrustedKeysConfigured));
    }

    #[test]
    fn test_contains_pinned_key() {
        let key = test_key(1);
        let pinned = *key.key_bytes();
        let store = TrustStore::from_keys(vec![key]).unwrap();

        assert!(store.contains(&pinned));
        assert!(!store.contains(test_key(2).key_bytes()));
    }

    #[test]
    fn test_load_from_json_file() {
        let key = test_key(3);
        let pinned = *key.key_bytes();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        let json = serde_json::to_string(&vec![hex::encode(pinned)]).unwrap();
        file.write_all(json.as_bytes()).unwrap();

        let store = TrustStore::load(file.path()).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.contains(&pinned));
    }

    #[test]
    fn test_load_missing_file_fails_closed() {
        let err = TrustStore::load(std::path::Path::new("/nonexistent/keys.json")).unwrap_err();
        assert!(matches!(err, VerifyError::NoTrustedKeysConfigured));
    }

    #[test]
    fn test_load_empty_list_fails_closed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();

        let err = TrustStore::load(file.path()).unwrap_err();
        assert!(matches!(err, VerifyError::NoTrustedKeysConfigured));
    }
}
