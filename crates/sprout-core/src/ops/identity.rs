use crate::{
    InternalError, InternalErrorOrigin,
    domain::identity::{Identity, IdentityAttributes, SessionClaims},
    interface::identity::{IdentityError, IdentityProvider},
    log,
    log::Topic,
};

impl From<IdentityError> for InternalError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::NotAuthenticated => {
                Self::access(InternalErrorOrigin::Identity, err.to_string())
            }
            IdentityError::Unavailable(_) => {
                Self::infra(InternalErrorOrigin::Identity, err.to_string())
            }
        }
    }
}

///
/// IdentityOps
///

pub struct IdentityOps;

impl IdentityOps {
    /// Resolve the caller's identity for this operation.
    pub async fn current(provider: &dyn IdentityProvider) -> Result<Identity, InternalError> {
        let identity = provider.current_identity().await?;
        if identity.id.as_str().trim().is_empty() {
            return Err(IdentityError::NotAuthenticated.into());
        }

        Ok(identity)
    }

    pub async fn attributes(
        provider: &dyn IdentityProvider,
    ) -> Result<IdentityAttributes, InternalError> {
        Ok(provider.current_attributes().await?)
    }

    /// Attributes for best-effort paths: only a lost session is an error.
    pub async fn attributes_best_effort(
        provider: &dyn IdentityProvider,
    ) -> Result<IdentityAttributes, InternalError> {
        match provider.current_attributes().await {
            Ok(attrs) => Ok(attrs),
            Err(IdentityError::NotAuthenticated) => Err(IdentityError::NotAuthenticated.into()),
            Err(err) => {
                log!(Topic::Identity, Warn, "attributes unavailable: {err}");
                Ok(IdentityAttributes::default())
            }
        }
    }

    /// Session claims, or `None` when they cannot be read.
    pub async fn session_claims_best_effort(
        provider: &dyn IdentityProvider,
    ) -> Result<Option<SessionClaims>, InternalError> {
        match provider.current_session_claims().await {
            Ok(claims) => Ok(Some(claims)),
            Err(IdentityError::NotAuthenticated) => Err(IdentityError::NotAuthenticated.into()),
            Err(err) => {
                log!(Topic::Identity, Debug, "session claims unavailable: {err}");
                Ok(None)
            }
        }
    }
}
