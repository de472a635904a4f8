use crate::{
    InternalError,
    config::{ConfigError, ConfigModel},
    domain::{identity::SubjectId, profile::Profile},
    dto::{bootstrap::BootstrapResponse, error::Error},
    interface::{identity::IdentityProvider, seed::SeedGenerator, store::RecordStore},
    log,
    log::Topic,
    ops::identity::IdentityOps,
    storage::record::ClientProfileUpdate,
    workflow::{bootstrap::ProfileBootstrapper, seed::SeedClaimCoordinator},
};
use std::{future::Future, sync::Arc};

///
/// BootstrapApi
///
/// Entry point a client calls after sign-in. Safe to call on every session
/// start and from several contexts at once for the same identity.
///

pub struct BootstrapApi {
    identity: Arc<dyn IdentityProvider>,
    bootstrapper: ProfileBootstrapper,
    seeds: SeedClaimCoordinator,
}

impl BootstrapApi {
    #[must_use]
    pub fn new(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        seeder: Arc<dyn SeedGenerator>,
        config: Arc<ConfigModel>,
    ) -> Self {
        Self {
            seeds: SeedClaimCoordinator::new(Arc::clone(&store), seeder, &config),
            bootstrapper: ProfileBootstrapper::new(store, Arc::clone(&identity), config),
            identity,
        }
    }

    /// Build from a TOML configuration document.
    pub fn from_toml(
        store: Arc<dyn RecordStore>,
        identity: Arc<dyn IdentityProvider>,
        seeder: Arc<dyn SeedGenerator>,
        config: &str,
    ) -> Result<Self, ConfigError> {
        let config = ConfigModel::shared_from_toml(config)?;

        Ok(Self::new(store, identity, seeder, config))
    }

    /// Ensure the caller owns a profile and, when `want_seed` is set, run the
    /// one-time seed for the current version.
    pub async fn bootstrap_identity(&self, want_seed: bool) -> Result<BootstrapResponse, Error> {
        self.bootstrap_identity_until(want_seed, futures::future::pending::<()>())
            .await
    }

    /// As [`Self::bootstrap_identity`], but a seed populate still running when
    /// `cancel` completes is abandoned and its claim rolled back.
    pub async fn bootstrap_identity_until<C>(
        &self,
        want_seed: bool,
        cancel: C,
    ) -> Result<BootstrapResponse, Error>
    where
        C: Future<Output = ()>,
    {
        self.flush_orphaned_claims().await;

        self.bootstrap(want_seed, cancel).await.map_err(|err| {
            log!(
                Topic::Bootstrap,
                Warn,
                "bootstrap failed [{}/{}]: {err}",
                err.origin(),
                err.class()
            );
            err.public()
        })
    }

    /// Apply a client update to the caller's own profile.
    pub async fn update_own_profile(&self, update: ClientProfileUpdate) -> Result<Profile, Error> {
        let identity = IdentityOps::current(self.identity.as_ref()).await?;
        let profile = self
            .bootstrapper
            .update_own_profile(&identity, update)
            .await?;

        Ok(profile)
    }

    /// Roll back seed claims left behind by dropped bootstrap calls.
    pub async fn flush_orphaned_claims(&self) -> usize {
        self.seeds.flush_orphaned_claims().await
    }

    #[must_use]
    pub fn orphaned_claims(&self) -> Vec<SubjectId> {
        self.seeds.orphaned_claims()
    }

    async fn bootstrap<C>(
        &self,
        want_seed: bool,
        cancel: C,
    ) -> Result<BootstrapResponse, InternalError>
    where
        C: Future<Output = ()>,
    {
        let identity = IdentityOps::current(self.identity.as_ref()).await?;
        let profile = self.bootstrapper.ensure_profile(&identity).await?;

        let did_seed_demo = if want_seed {
            self.seeds.seed_until(&profile, cancel).await?.did_seed()
        } else {
            false
        };

        log!(
            Topic::Bootstrap,
            Info,
            "bootstrap {}: want_seed={want_seed} did_seed={did_seed_demo}",
            profile.id
        );

        Ok(BootstrapResponse {
            profile_id: profile.id,
            did_seed_demo,
        })
    }
}
