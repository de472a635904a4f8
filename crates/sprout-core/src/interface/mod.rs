//! External collaborators consumed by this crate.
//!
//! Implementations live outside the crate (a remote record API, an auth
//! session, a content generator). `storage::memory` and the testkit crate
//! provide in-process implementations.

pub mod identity;
pub mod seed;
pub mod store;
