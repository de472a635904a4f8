#![allow(dead_code)]

use futures::executor::block_on;
use sprout_core::{
    BootstrapApi, ConfigModel, Identity, IdentityAttributes, Profile, SubjectId, Tier,
    interface::store::RecordStore,
    storage::{memory::MemoryRecordStore, record::Projection},
};
use sprout_testkit::{FaultyStore, RecordingSeeder, ScriptedIdentity};
use std::sync::Arc;

///
/// Harness
///
/// One signed-in caller against a fault-injectable in-memory store.
///

pub struct Harness {
    pub memory: Arc<MemoryRecordStore>,
    pub store: Arc<FaultyStore>,
    pub identity: Arc<ScriptedIdentity>,
    pub seeder: Arc<RecordingSeeder>,
    pub config: Arc<ConfigModel>,
    pub api: BootstrapApi,
}

impl Harness {
    pub fn new(identity: Identity, attributes: IdentityAttributes) -> Self {
        Self::with_memory(MemoryRecordStore::new(), identity, attributes)
    }

    pub fn with_memory(
        memory: MemoryRecordStore,
        identity: Identity,
        attributes: IdentityAttributes,
    ) -> Self {
        let memory = Arc::new(memory);
        let store = Arc::new(FaultyStore::new(Arc::clone(&memory)));
        let identity = Arc::new(ScriptedIdentity::signed_in(identity, attributes));
        let seeder = Arc::new(RecordingSeeder::succeeding());
        let config = Arc::new(ConfigModel::default());
        let api = BootstrapApi::new(
            store.clone(),
            identity.clone(),
            seeder.clone(),
            Arc::clone(&config),
        );

        Self {
            memory,
            store,
            identity,
            seeder,
            config,
            api,
        }
    }

    /// A second client for the same store, identity and seeder.
    pub fn another_client(&self) -> BootstrapApi {
        BootstrapApi::new(
            self.store.clone(),
            self.identity.clone(),
            self.seeder.clone(),
            Arc::clone(&self.config),
        )
    }

    pub fn stored(&self, id: &SubjectId) -> Option<Profile> {
        block_on(self.memory.get(id, &Projection::full())).unwrap()
    }

    pub fn seed_version(&self, id: &SubjectId) -> i64 {
        self.stored(id).expect("profile should exist").seed_version
    }

    /// Seed versions written for `id`, applied writes only.
    pub fn applied_seed_writes(&self, id: &SubjectId) -> Vec<i64> {
        self.memory
            .writes_for(id)
            .iter()
            .filter(|w| w.applied)
            .filter_map(|w| w.seed_version())
            .collect()
    }

    pub fn insert_profile(&self, profile: Profile) {
        block_on(self.memory.create(profile)).unwrap();
    }
}

pub fn profile(identity: &Identity, tier: Tier) -> Profile {
    Profile::new_default(identity.id.clone(), "stored@example.com", "Stored", tier, 1)
}
