use crate::domain::profile::Profile;
use async_trait::async_trait;
use thiserror::Error as ThisError;

///
/// SeedError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
#[error("seed generation failed: {message}")]
pub struct SeedError {
    message: String,
}

impl SeedError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

///
/// SeedGenerator
///
/// Opaque one-time content generation for a profile. Invoked only by the
/// holder of a seed claim; it has no timeout of its own.
///

#[async_trait]
pub trait SeedGenerator: Send + Sync {
    async fn generate(&self, profile: &Profile) -> Result<(), SeedError>;
}
