//! Access service configuration.
//!
//! Loaded from environment variables with defaults matching the stored
//! schema. The library never reads the environment on its own; the host
//! process calls [`AccessConfig::from_env`] once at startup.

use std::sync::Arc;

use kaid_org::{RoleCatalog, STATUS_LABEL_MAX_LEN};
use kaid_rbac::{EqualRankPolicy, HierarchyEngine};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Configuration for the access services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessConfig {
    /// How callers of the same rank as a resource owner are treated.
    pub equal_rank_policy: EqualRankPolicy,

    /// Maximum length of a membership status label.
    pub status_label_max_len: usize,

    /// Status label written on new invitations.
    pub pending_status_label: String,

    /// Status label written when an invitation is accepted.
    pub active_status_label: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            equal_rank_policy: EqualRankPolicy::Deny,
            status_label_max_len: STATUS_LABEL_MAX_LEN,
            pending_status_label: "pending".to_string(),
            active_status_label: "active".to_string(),
        }
    }
}

impl AccessConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `KAID_EQUAL_RANK_POLICY`: `deny` or `allow_reads` (default: deny)
    /// - `KAID_STATUS_LABEL_MAX_LEN`: Maximum status label length (default: 20)
    /// - `KAID_PENDING_STATUS_LABEL`: Label for new invitations (default: pending)
    /// - `KAID_ACTIVE_STATUS_LABEL`: Label for accepted invitations (default: active)
    ///
    /// Unparseable values fall back to the default and are logged.
    pub fn from_env() -> Self {
        let default = Self::default();

        let equal_rank_policy = match std::env::var("KAID_EQUAL_RANK_POLICY") {
            Ok(raw) => EqualRankPolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Unknown KAID_EQUAL_RANK_POLICY, using default");
                default.equal_rank_policy
            }),
            Err(_) => default.equal_rank_policy,
        };

        Self {
            equal_rank_policy,
            status_label_max_len: std::env::var("KAID_STATUS_LABEL_MAX_LEN")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(default.status_label_max_len),
            pending_status_label: std::env::var("KAID_PENDING_STATUS_LABEL")
                .unwrap_or(default.pending_status_label),
            active_status_label: std::env::var("KAID_ACTIVE_STATUS_LABEL")
                .unwrap_or(default.active_status_label),
        }
    }

    /// Validate the configuration.
    ///
    /// The label limit may not exceed the stored column width, and both
    /// default labels must be non-empty and fit it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.status_label_max_len == 0 || self.status_label_max_len > STATUS_LABEL_MAX_LEN {
            return Err(ConfigError::InvalidValue {
                key: "KAID_STATUS_LABEL_MAX_LEN".to_string(),
                message: format!("must be between 1 and {}", STATUS_LABEL_MAX_LEN),
            });
        }

        for (key, label) in [
            ("KAID_PENDING_STATUS_LABEL", &self.pending_status_label),
            ("KAID_ACTIVE_STATUS_LABEL", &self.active_status_label),
        ] {
            if label.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            if label.chars().count() > self.status_label_max_len {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("longer than {} characters", self.status_label_max_len),
                });
            }
        }

        Ok(())
    }

    /// Build a hierarchy engine over the standard role catalog.
    pub fn engine(&self) -> HierarchyEngine {
        HierarchyEngine::new(Arc::new(RoleCatalog::standard()))
            .with_equal_rank_policy(self.equal_rank_policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AccessConfig::default();
        assert_eq!(config.equal_rank_policy, EqualRankPolicy::Deny);
        assert_eq!(config.status_label_max_len, 20);
        assert!(config.validate().is_ok());
        assert_eq!(config.engine().equal_rank_policy(), EqualRankPolicy::Deny);
    }

    #[test]
    fn test_validate_rejects_oversized_label() {
        let config = AccessConfig {
            active_status_label: "a".repeat(21),
            ..AccessConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("KAID_ACTIVE_STATUS_LABEL"));
    }

    #[test]
    fn test_validate_rejects_limit_beyond_column() {
        let config = AccessConfig {
            status_label_max_len: 64,
            ..AccessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_label() {
        let config = AccessConfig {
            pending_status_label: "  ".to_string(),
            ..AccessConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var("KAID_EQUAL_RANK_POLICY", "allow_reads");
        std::env::set_var("KAID_STATUS_LABEL_MAX_LEN", "not-a-number");
        std::env::set_var("KAID_PENDING_STATUS_LABEL", "invited");

        let config = AccessConfig::from_env();

        std::env::remove_var("KAID_EQUAL_RANK_POLICY");
        std::env::remove_var("KAID_STATUS_LABEL_MAX_LEN");
        std::env::remove_var("KAID_PENDING_STATUS_LABEL");

        assert_eq!(config.equal_rank_policy, EqualRankPolicy::AllowReads);
        assert_eq!(config.status_label_max_len, 20);
        assert_eq!(config.pending_status_label, "invited");
        assert_eq!(config.active_status_label, "active");
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = AccessConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"equal_rank_policy\":\"deny\""));
        let back: AccessConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
