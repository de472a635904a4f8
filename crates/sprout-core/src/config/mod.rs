pub mod schema;

use crate::{InternalError, InternalErrorClass, InternalErrorOrigin, log, log::Topic};
use schema::{ConfigSchemaError, Validate};
use std::sync::Arc;
use thiserror::Error as ThisError;

pub use schema::{ConfigModel, IdentityConfig, ReaderConfig, SeedConfig};

/// Errors related to configuration parsing and validation.
#[derive(Debug, ThisError)]
pub enum ConfigError {
    /// TOML could not be parsed into the expected structure.
    #[error("toml error: {0}")]
    CannotParseToml(String),

    /// Wrapper for data schema-level errors.
    #[error(transparent)]
    ConfigSchema(#[from] ConfigSchemaError),
}

impl From<ConfigError> for InternalError {
    fn from(err: ConfigError) -> Self {
        Self::new(
            InternalErrorClass::Config,
            InternalErrorOrigin::Config,
            err.to_string(),
        )
    }
}

impl ConfigModel {
    /// Parse and validate a configuration from a TOML string.
    pub fn from_toml(config_str: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(config_str).map_err(|e| ConfigError::CannotParseToml(e.to_string()))?;

        config.validate()?;

        log!(
            Topic::Config,
            Info,
            "config loaded: seed.current_version={} demo_prefixes={}",
            config.seed.current_version,
            config.identity.demo_username_prefixes.len()
        );

        Ok(config)
    }

    /// Parse a configuration and wrap it for sharing between services.
    pub fn shared_from_toml(config_str: &str) -> Result<Arc<Self>, ConfigError> {
        Self::from_toml(config_str).map(Arc::new)
    }

    /// Return the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::CannotParseToml(e.to_string()))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = ConfigModel::from_toml("").expect("empty config should parse");

        assert_eq!(cfg.seed.current_version, 1);
        assert_eq!(cfg.identity.demo_group, "Demo");
        assert_eq!(cfg.reader.default_page_size, 50);
    }

    #[test]
    fn explicit_sections_override_defaults() {
        let cfg = ConfigModel::from_toml(
            r#"
            [seed]
            current_version = 3

            [identity]
            demo_username_prefixes = ["sandbox-"]
            demo_group = "Sandbox"
            demo_role = "Sandbox"

            [reader]
            default_page_size = 10
            max_page_size = 20
            "#,
        )
        .expect("config should parse");

        assert_eq!(cfg.seed.current_version, 3);
        assert_eq!(cfg.identity.demo_username_prefixes, vec!["sandbox-"]);
        assert_eq!(cfg.reader.clamp_page_size(Some(500)), 20);
        assert_eq!(cfg.reader.clamp_page_size(None), 10);
        assert_eq!(cfg.reader.clamp_page_size(Some(0)), 1);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        struct Case {
            name: &'static str,
            toml: &'static str,
        }

        let cases = [
            Case {
                name: "zero seed version",
                toml: "[seed]\ncurrent_version = 0\n",
            },
            Case {
                name: "negative seed version",
                toml: "[seed]\ncurrent_version = -1\n",
            },
            Case {
                name: "blank demo prefix",
                toml: "[identity]\ndemo_username_prefixes = [\" \"]\n",
            },
            Case {
                name: "default page larger than max",
                toml: "[reader]\ndefault_page_size = 100\nmax_page_size = 10\n",
            },
            Case {
                name: "unknown field",
                toml: "[seed]\ncurrent_version = 1\nlease_secs = 30\n",
            },
        ];

        for case in cases {
            assert!(
                ConfigModel::from_toml(case.toml).is_err(),
                "{} should be rejected",
                case.name
            );
        }
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = ConfigModel::default();
        let text = cfg.to_toml().expect("serialize");
        let parsed = ConfigModel::from_toml(&text).expect("reparse");

        assert_eq!(parsed.seed.current_version, cfg.seed.current_version);
        assert_eq!(
            parsed.identity.demo_username_prefixes,
            cfg.identity.demo_username_prefixes
        );
    }
}
