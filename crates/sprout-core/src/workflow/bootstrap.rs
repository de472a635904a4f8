//! Profile bootstrap: exactly one profile per identity.
//!
//! Responsibilities:
//! - create the profile on first sight of an identity
//! - reconcile a non-PRO tier with what the identity resolves to today
//! - self-heal `email` / `displayName` on legacy rows
//!
//! Tier reconciliation and self-heal are best-effort: their failures are
//! logged and never block the caller, except a lost session which always
//! propagates as not-authenticated.

use crate::{
    config::ConfigModel,
    domain::{
        identity::{Identity, SubjectId},
        profile::{Profile, Tier},
    },
    interface::{identity::IdentityProvider, store::RecordStore},
    ops::{
        classify::{classify, is_race_loss},
        clock::ClockOps,
        identity::IdentityOps,
        profile::{ProfileStoreOps, SelfHealOutcome},
    },
    policy::{display_name::resolve_display_name, tier::TierPolicy},
    storage::{
        condition::equals,
        record::{ClientProfileUpdate, FieldValue, ProfileField, ProfilePatch},
    },
    workflow::{prelude::*, read::EmailFallbackReader},
};
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// BootstrapWorkflowError
///

#[derive(Debug, ThisError)]
pub enum BootstrapWorkflowError {
    /// First-time creation needs this identity attribute.
    #[error("identity is missing required attribute '{0}'")]
    MissingRequiredAttribute(&'static str),

    #[error("profile {0} reported as existing but could not be read back")]
    VanishedAfterConflict(SubjectId),

    #[error("update carried only server-managed or unknown fields: {0}")]
    EmptyClientUpdate(String),
}

impl From<BootstrapWorkflowError> for InternalError {
    fn from(err: BootstrapWorkflowError) -> Self {
        match err {
            BootstrapWorkflowError::MissingRequiredAttribute(_) => {
                Self::domain(InternalErrorOrigin::Workflow, err.to_string())
            }
            BootstrapWorkflowError::EmptyClientUpdate(_) => {
                Self::input(InternalErrorOrigin::Workflow, err.to_string())
            }
            BootstrapWorkflowError::VanishedAfterConflict(_) => {
                Self::invariant(InternalErrorOrigin::Workflow, err.to_string())
            }
        }
    }
}

///
/// ProfileBootstrapper
///

pub struct ProfileBootstrapper {
    store: Arc<dyn RecordStore>,
    identity: Arc<dyn IdentityProvider>,
    reader: EmailFallbackReader,
    config: Arc<ConfigModel>,
}

impl ProfileBootstrapper {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        config: Arc<ConfigModel>,
    ) -> Self {
        Self {
            reader: EmailFallbackReader::new(Arc::clone(&store), Arc::clone(&config)),
            store,
            identity,
            config,
        }
    }

    /// Return the identity's profile, creating it on first bootstrap.
    ///
    /// The existence check goes through the email fallback reader, so legacy
    /// rows with a null email are still found (and then healed).
    pub async fn ensure_profile(&self, identity: &Identity) -> Result<Profile, InternalError> {
        let existing = self.reader.get_profile(&identity.id).await?;
        if existing.is_degraded() {
            log!(
                Topic::Bootstrap,
                Warn,
                "profile {} has a null email; read with reduced projection",
                identity.id
            );
        }

        match existing.into_inner() {
            Some(profile) => self.refresh_existing(identity, profile).await,
            None => self.create(identity).await,
        }
    }

    /// Apply a client-supplied update to the caller's own profile.
    ///
    /// Server-managed fields are stripped, and the write is guarded by the
    /// stored owner so it can never land on somebody else's record.
    pub async fn update_own_profile(
        &self,
        identity: &Identity,
        update: ClientProfileUpdate,
    ) -> Result<Profile, InternalError> {
        let (patch, rejected) = ProfilePatch::from_client(update);
        if !rejected.is_empty() {
            log!(
                Topic::Bootstrap,
                Warn,
                "profile {}: ignored client fields [{}]",
                identity.id,
                rejected.join(", ")
            );
        }
        if patch.is_empty() {
            return Err(BootstrapWorkflowError::EmptyClientUpdate(rejected.join(", ")).into());
        }

        let owner_guard = equals(ProfileField::Owner, FieldValue::str(identity.id.as_str()));
        let updated = self
            .store
            .update(&identity.id, patch, Some(owner_guard))
            .await?;

        Ok(updated)
    }

    // -------------------------------------------------------------------------
    // Existing profile
    // -------------------------------------------------------------------------

    async fn refresh_existing(
        &self,
        identity: &Identity,
        mut profile: Profile,
    ) -> Result<Profile, InternalError> {
        let desired = self.resolve_tier(identity).await?;
        if TierPolicy::should_reconcile(profile.tier, desired) {
            match ProfileStoreOps::reconcile_tier(self.store.as_ref(), &profile.id, desired).await
            {
                Ok(updated) => {
                    log!(
                        Topic::Tier,
                        Info,
                        "profile {}: tier {} -> {}",
                        profile.id,
                        profile.tier,
                        updated.tier
                    );
                    profile.tier = updated.tier;
                }
                Err(err) => {
                    log!(
                        Topic::Tier,
                        Warn,
                        "profile {}: tier {} -> {desired} not applied: {err}",
                        profile.id,
                        profile.tier
                    );
                }
            }
        }

        let attrs = IdentityOps::attributes_best_effort(self.identity.as_ref()).await?;
        if let Some(email) = attrs.email() {
            self.heal(&mut profile, ProfileField::Email, email).await;
        }
        let display_name = resolve_display_name(&identity.username, &attrs);
        self.heal(&mut profile, ProfileField::DisplayName, &display_name)
            .await;

        Ok(profile)
    }

    async fn heal(&self, profile: &mut Profile, field: ProfileField, candidate: &str) {
        match ProfileStoreOps::self_heal(self.store.as_ref(), &profile.id, field, candidate).await {
            Ok(SelfHealOutcome::Healed(healed)) => {
                log!(Topic::SelfHeal, Info, "profile {}: healed {field}", profile.id);
                match field {
                    ProfileField::Email => profile.email = healed.email,
                    ProfileField::DisplayName => profile.display_name = healed.display_name,
                    _ => {}
                }
            }
            Ok(SelfHealOutcome::AlreadySet | SelfHealOutcome::Skipped) => {}
            Err(err) => {
                log!(
                    Topic::SelfHeal,
                    Warn,
                    "profile {}: self-heal of {field} failed: {err}",
                    profile.id
                );
            }
        }
    }

    // -------------------------------------------------------------------------
    // First bootstrap
    // -------------------------------------------------------------------------

    async fn create(&self, identity: &Identity) -> Result<Profile, InternalError> {
        let attrs = IdentityOps::attributes(self.identity.as_ref()).await?;
        let email = attrs
            .email()
            .ok_or(BootstrapWorkflowError::MissingRequiredAttribute("email"))?
            .to_string();

        let display_name = resolve_display_name(&identity.username, &attrs);
        if display_name.is_empty() {
            return Err(BootstrapWorkflowError::MissingRequiredAttribute("displayName").into());
        }

        let tier = self.resolve_tier(identity).await?;
        let profile = Profile::new_default(
            identity.id.clone(),
            email,
            display_name,
            tier,
            ClockOps::now_secs(),
        );

        match ProfileStoreOps::create(self.store.as_ref(), profile).await {
            Ok(created) => {
                log!(
                    Topic::Bootstrap,
                    Ok,
                    "profile {} created tier={}",
                    created.id,
                    created.tier
                );
                Ok(created)
            }
            Err(err) if is_race_loss(classify(&err)) => {
                log!(
                    Topic::Bootstrap,
                    Info,
                    "profile {}: concurrent bootstrap created it first",
                    identity.id
                );

                self.reader
                    .get_profile(&identity.id)
                    .await?
                    .into_inner()
                    .ok_or_else(|| {
                        BootstrapWorkflowError::VanishedAfterConflict(identity.id.clone()).into()
                    })
            }
            Err(err) => Err(err.into()),
        }
    }

    // -------------------------------------------------------------------------
    // Tier
    // -------------------------------------------------------------------------

    async fn resolve_tier(&self, identity: &Identity) -> Result<Tier, InternalError> {
        let cfg = &self.config.identity;
        if TierPolicy::is_demo_username(&identity.username, cfg) {
            return Ok(Tier::Demo);
        }

        let claims = IdentityOps::session_claims_best_effort(self.identity.as_ref()).await?;

        Ok(TierPolicy::resolve(&identity.username, claims.as_ref(), cfg))
    }
}

///
/// TESTS
///
