//! # Service Configuration
//!
//! Credentials and protocol settings shared by the aggregation and
//! extension clients.
//!
//! ## Environment overrides
//!
//! | Variable | Field | Format |
//! |----------|-------|--------|
//! | `KSI_LOGIN_ID` | `login_id` | text |
//! | `KSI_LOGIN_KEY` | `login_key` | hex |
//! | `KSI_PDU_VERSION` | `pdu_version` | `v1` / `v2` |

use ksi_crypto::HashAlgorithm;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::pdu::PduVersion;

/// KSI service client configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Login id sent in every PDU header
    pub login_id: String,
    /// Shared HMAC key
    #[serde(with = "hex_bytes")]
    pub login_key: Vec<u8>,
    /// PDU generation spoken to the gateway
    pub pdu_version: PduVersion,
    /// HMAC algorithm for outgoing PDUs
    pub mac_algorithm: HashAlgorithm,
    /// Client instance id placed in PDU headers
    pub instance_id: Option<u64>,
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        hex::decode(text).map_err(serde::de::Error::custom)
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            login_id: "anon".to_string(),
            login_key: b"anon".to_vec(),
            pdu_version: PduVersion::V2,
            mac_algorithm: HashAlgorithm::Sha2_256,
            instance_id: None,
        }
    }
}

impl ServiceConfig {
    /// Config with fixed test credentials.
    pub fn for_testing() -> Self {
        Self {
            login_id: "test-user".to_string(),
            login_key: b"test-key".to_vec(),
            pdu_version: PduVersion::V2,
            mac_algorithm: HashAlgorithm::Sha2_256,
            instance_id: Some(1),
        }
    }

    /// Default config with `KSI_*` environment overrides applied.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Default config with overrides read through `lookup`.
    ///
    /// Malformed values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(login_id) = lookup("KSI_LOGIN_ID") {
            config.login_id = login_id;
        }
        if let Some(key_hex) = lookup("KSI_LOGIN_KEY") {
            match hex::decode(key_hex.trim()) {
                Ok(key) => {
                    config.login_key = key;
                    info!("Loaded KSI login key from environment");
                }
                Err(e) => warn!(error = %e, "Ignoring malformed KSI_LOGIN_KEY"),
            }
        }
        if let Some(version) = lookup("KSI_PDU_VERSION") {
            match version.trim().to_ascii_lowercase().as_str() {
                "1" | "v1" => config.pdu_version = PduVersion::V1,
                "2" | "v2" => config.pdu_version = PduVersion::V2,
                other => warn!(value = other, "Ignoring unknown KSI_PDU_VERSION"),
            }
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_default_speaks_v2() {
        let config = ServiceConfig::default();
        assert_eq!(config.pdu_version, PduVersion::V2);
        assert_eq!(config.mac_algorithm, HashAlgorithm::Sha2_256);
    }

    #[test]
    fn test_overrides_applied() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("KSI_LOGIN_ID", "alice"),
            ("KSI_LOGIN_KEY", "0a0b0c"),
            ("KSI_PDU_VERSION", "v1"),
        ]));
        assert_eq!(config.login_id, "alice");
        assert_eq!(config.login_key, vec![0x0a, 0x0b, 0x0c]);
        assert_eq!(config.pdu_version, PduVersion::V1);
    }

    #[test]
    fn test_malformed_overrides_ignored() {
        let config = ServiceConfig::from_lookup(lookup(&[
            ("KSI_LOGIN_KEY", "not-hex"),
            ("KSI_PDU_VERSION", "3"),
        ]));
        assert_eq!(config, ServiceConfig::default());
    }

    #[test]
    fn test_serde_key_is_hex() {
        let config = ServiceConfig::for_testing();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(&hex::encode(b"test-key")));
        let back: ServiceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
