use crate::domain::identity::{Identity, IdentityAttributes, SessionClaims};
use async_trait::async_trait;
use thiserror::Error as ThisError;

///
/// IdentityError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum IdentityError {
    #[error("no authenticated identity")]
    NotAuthenticated,

    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

///
/// IdentityProvider
///
/// Source of the current authenticated identity. Every call re-resolves the
/// identity; implementations must not serve a cached identity across sign-out.
///

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_identity(&self) -> Result<Identity, IdentityError>;

    async fn current_attributes(&self) -> Result<IdentityAttributes, IdentityError>;

    /// Best-effort; callers tolerate failure.
    async fn current_session_claims(&self) -> Result<SessionClaims, IdentityError>;
}
