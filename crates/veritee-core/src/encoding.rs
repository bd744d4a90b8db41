//! Serde helpers for byte fields carried inside JSON documents.

/// Base64-encoded byte fields (`#[serde(with = "encoding::base64_bytes")]`).
pub mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(&encoded).map_err(serde::de::Error::custom)
    }
}

/// Byte fields that upstream producers write either as base64 or as plain
/// text (the work-unit `nonce` fields). Serialized back out as base64.
pub mod base64_or_text {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(STANDARD.decode(&raw).unwrap_or_else(|_| raw.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct B64 {
        #[serde(with = "super::base64_bytes")]
        data: Vec<u8>,
    }

    #[derive(Serialize, Deserialize)]
    struct Loose {
        #[serde(with = "super::base64_or_text")]
        nonce: Vec<u8>,
    }

    #[test]
    fn test_base64_round_trip() {
        let json = serde_json::to_string(&B64 { data: vec![1, 2, 3] }).unwrap();
        assert_eq!(json, r#"{"data":"AQID"}"#);

        let back: B64 = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_base64_rejects_invalid() {
        let result: Result<B64, _> = serde_json::from_str(r#"{"data":"not base64!!"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_loose_nonce_accepts_base64() {
        let parsed: Loose = serde_json::from_str(r#"{"nonce":"AQID"}"#).unwrap();
        assert_eq!(parsed.nonce, vec![1, 2, 3]);
    }

    #[test]
    fn test_loose_nonce_falls_back_to_text() {
        let parsed: Loose = serde_json::from_str(r#"{"nonce":"N1!"}"#).unwrap();
        assert_eq!(parsed.nonce, b"N1!".to_vec());
    }
}
