//! Identity bootstrap and at-most-once seed claim coordination.
//!
//! Sprout makes sure every authenticated identity owns exactly one profile
//! record, repairs legacy records that are missing required fields, and runs
//! one-time seed generation at most once per identity and seed version. The
//! only synchronization primitive it relies on is a single-record conditional
//! write (compare-and-swap) offered by the backing [`interface::store::RecordStore`].
//!
//! ## Layering
//!
//! - `api/` is the public entry surface and maps internal errors to `dto::error::Error`.
//! - `workflow/` orchestrates bootstrap, seed claims and degraded reads.
//! - `policy/` owns deterministic decision rules (tier, display name, seed plan).
//! - `ops/` provides mechanical store and identity operations plus error classification.
//! - `storage/` owns the record field model, conditions and the in-memory reference store.
//! - `interface/` declares the external collaborators (store, identity, seed generator).
//!
//! The default flow is: api → workflow → policy → ops → storage.

pub mod api;
pub mod config;
pub mod domain;
pub mod dto;
pub mod interface;
pub mod log;
pub mod storage;

pub(crate) mod error;
pub(crate) mod ops;
pub(crate) mod policy;
pub(crate) mod workflow;

pub(crate) use error::{InternalError, InternalErrorClass, InternalErrorOrigin};

pub use {
    api::{BootstrapApi, ProfileReadApi},
    config::ConfigModel,
    domain::{
        identity::{Identity, IdentityAttributes, SessionClaims, SubjectId},
        profile::{Profile, Tier},
        seed::SeedState,
    },
};

///
/// Crate Version
///

pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
