use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

/// Seed version written by a successful rollback.
pub const ROLLBACK_SEED_VERSION: i64 = 0;

///
/// ConfigSchemaError
///

#[derive(Debug, ThisError)]
pub enum ConfigSchemaError {
    #[error("validation error: {0}")]
    ValidationError(String),
}

///
/// Validate
///

pub trait Validate {
    fn validate(&self) -> Result<(), ConfigSchemaError>;
}

///
/// ConfigModel
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigModel {
    pub seed: SeedConfig,
    pub identity: IdentityConfig,
    pub reader: ReaderConfig,
}

impl Validate for ConfigModel {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        self.seed.validate()?;
        self.identity.validate()?;
        self.reader.validate()?;

        Ok(())
    }
}

///
/// SeedConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedConfig {
    /// Version every profile should be seeded up to.
    pub current_version: i64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { current_version: 1 }
    }
}

impl Validate for SeedConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if self.current_version <= ROLLBACK_SEED_VERSION {
            return Err(ConfigSchemaError::ValidationError(format!(
                "seed.current_version must be greater than {ROLLBACK_SEED_VERSION}, got {}",
                self.current_version
            )));
        }

        Ok(())
    }
}

///
/// IdentityConfig
///
/// Demo detection inputs. Username prefixes are matched case-insensitively and
/// always take precedence over session claims.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IdentityConfig {
    pub demo_username_prefixes: Vec<String>,
    pub demo_group: String,
    pub demo_role: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            demo_username_prefixes: vec!["demo-".to_string(), "demo_".to_string()],
            demo_group: "Demo".to_string(),
            demo_role: "Demo".to_string(),
        }
    }
}

impl Validate for IdentityConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if let Some(prefix) = self
            .demo_username_prefixes
            .iter()
            .find(|p| p.trim().is_empty())
        {
            return Err(ConfigSchemaError::ValidationError(format!(
                "identity.demo_username_prefixes contains a blank entry: {prefix:?}"
            )));
        }

        if self.demo_group.trim().is_empty() || self.demo_role.trim().is_empty() {
            return Err(ConfigSchemaError::ValidationError(
                "identity.demo_group and identity.demo_role must not be blank".to_string(),
            ));
        }

        Ok(())
    }
}

///
/// ReaderConfig
///

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReaderConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 500,
        }
    }
}

impl ReaderConfig {
    /// Resolve a caller-supplied page size against the configured bounds.
    #[must_use]
    pub fn clamp_page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}

impl Validate for ReaderConfig {
    fn validate(&self) -> Result<(), ConfigSchemaError> {
        if self.max_page_size == 0 {
            return Err(ConfigSchemaError::ValidationError(
                "reader.max_page_size must be at least 1".to_string(),
            ));
        }

        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigSchemaError::ValidationError(format!(
                "reader.default_page_size must be within 1..={}, got {}",
                self.max_page_size, self.default_page_size
            )));
        }

        Ok(())
    }
}
