//! Bulk operation configuration

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BulkrestError, BulkrestResult, ConfigError};

/// Default attribute used to match payload items to stored records.
pub const DEFAULT_LOOKUP_FIELD: &str = "id";

/// Policy deciding whether a bulk destroy may proceed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum DestroyPolicy {
    /// The filtered collection must be a different collection than the base,
    /// i.e. a filter was actually applied. Its contents are not inspected.
    #[default]
    Distinct,
    /// As `Distinct`, and the filtered collection must also hold fewer
    /// records than the base.
    ProperSubset,
}

impl FromStr for DestroyPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "distinct" => Ok(DestroyPolicy::Distinct),
            "proper_subset" | "proper-subset" => Ok(DestroyPolicy::ProperSubset),
            other => Err(ConfigError::InvalidValue {
                field: "destroy_policy".to_string(),
                value: other.to_string(),
                reason: "expected distinct or proper_subset".to_string(),
            }),
        }
    }
}

impl fmt::Display for DestroyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestroyPolicy::Distinct => f.write_str("distinct"),
            DestroyPolicy::ProperSubset => f.write_str("proper_subset"),
        }
    }
}

/// Settings shared by the bulk create, update and destroy operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BulkConfig {
    /// Field matched between payload items and stored records.
    pub lookup_field: String,
    /// Safety policy for bulk destroy.
    pub destroy_policy: DestroyPolicy,
    /// Maximum number of items in one bulk request. `None` = unlimited.
    pub max_batch_size: Option<usize>,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            lookup_field: DEFAULT_LOOKUP_FIELD.to_string(),
            destroy_policy: DestroyPolicy::Distinct,
            max_batch_size: None,
        }
    }
}

impl BulkConfig {
    /// Create BulkConfig from environment variables.
    ///
    /// Environment variables:
    /// - `BULKREST_LOOKUP_FIELD`: Lookup field for bulk update (default: "id")
    /// - `BULKREST_DESTROY_POLICY`: "distinct" or "proper_subset" (default: distinct)
    /// - `BULKREST_MAX_BATCH_SIZE`: Maximum items per bulk request (default: unlimited)
    pub fn from_env() -> BulkrestResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> BulkrestResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(field) = lookup("BULKREST_LOOKUP_FIELD") {
            config.lookup_field = field.trim().to_string();
        }

        if let Some(policy) = lookup("BULKREST_DESTROY_POLICY") {
            config.destroy_policy = policy.parse()?;
        }

        if let Some(max) = lookup("BULKREST_MAX_BATCH_SIZE") {
            let parsed = max.trim().parse::<usize>().map_err(|e| ConfigError::InvalidValue {
                field: "BULKREST_MAX_BATCH_SIZE".to_string(),
                value: max.clone(),
                reason: e.to_string(),
            })?;
            config.max_batch_size = Some(parsed);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Validates:
    /// - lookup_field is not empty
    /// - max_batch_size, when set, is greater than 0
    pub fn validate(&self) -> BulkrestResult<()> {
        if self.lookup_field.trim().is_empty() {
            return Err(BulkrestError::Config(ConfigError::MissingRequired {
                field: "lookup_field".to_string(),
            }));
        }

        if self.max_batch_size == Some(0) {
            return Err(BulkrestError::Config(ConfigError::InvalidValue {
                field: "max_batch_size".to_string(),
                value: "0".to_string(),
                reason: "max_batch_size must be greater than 0".to_string(),
            }));
        }

        Ok(())
    }

    pub fn with_lookup_field(mut self, field: impl Into<String>) -> Self {
        self.lookup_field = field.into();
        self
    }

    pub fn with_destroy_policy(mut self, policy: DestroyPolicy) -> Self {
        self.destroy_policy = policy;
        self
    }

    pub fn with_max_batch_size(mut self, max: Option<usize>) -> Self {
        self.max_batch_size = max;
        self
    }
}
