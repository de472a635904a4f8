use async_trait::async_trait;
use sprout_core::{
    Identity, IdentityAttributes, SessionClaims,
    interface::identity::{IdentityError, IdentityProvider},
};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Clone, Debug)]
struct Script {
    identity: Option<Identity>,
    attributes: Result<IdentityAttributes, IdentityError>,
    claims: Result<SessionClaims, IdentityError>,
}

///
/// ScriptedIdentity
///
/// Identity provider whose answers are set by the test. Every call reads the
/// current script, so signing out takes effect immediately.
///

pub struct ScriptedIdentity {
    script: Mutex<Script>,
}

impl ScriptedIdentity {
    #[must_use]
    pub fn signed_in(identity: Identity, attributes: IdentityAttributes) -> Self {
        Self {
            script: Mutex::new(Script {
                identity: Some(identity),
                attributes: Ok(attributes),
                claims: Ok(SessionClaims::default()),
            }),
        }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self {
            script: Mutex::new(Script {
                identity: None,
                attributes: Err(IdentityError::NotAuthenticated),
                claims: Err(IdentityError::NotAuthenticated),
            }),
        }
    }

    #[must_use]
    pub fn with_claims(self, claims: SessionClaims) -> Self {
        self.lock().claims = Ok(claims);
        self
    }

    pub fn sign_in(&self, identity: Identity, attributes: IdentityAttributes) {
        let mut script = self.lock();
        script.identity = Some(identity);
        script.attributes = Ok(attributes);
        script.claims = Ok(SessionClaims::default());
    }

    pub fn sign_out(&self) {
        let mut script = self.lock();
        script.identity = None;
        script.attributes = Err(IdentityError::NotAuthenticated);
        script.claims = Err(IdentityError::NotAuthenticated);
    }

    pub fn set_attributes(&self, attributes: IdentityAttributes) {
        self.lock().attributes = Ok(attributes);
    }

    pub fn fail_attributes(&self, err: IdentityError) {
        self.lock().attributes = Err(err);
    }

    pub fn set_claims(&self, claims: SessionClaims) {
        self.lock().claims = Ok(claims);
    }

    pub fn fail_claims(&self, err: IdentityError) {
        self.lock().claims = Err(err);
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn current_identity(&self) -> Result<Identity, IdentityError> {
        self.lock().identity.clone().ok_or(IdentityError::NotAuthenticated)
    }

    async fn current_attributes(&self) -> Result<IdentityAttributes, IdentityError> {
        self.lock().attributes.clone()
    }

    async fn current_session_claims(&self) -> Result<SessionClaims, IdentityError> {
        self.lock().claims.clone()
    }
}
