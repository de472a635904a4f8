//! Public API façade.
//!
//! Thin wrappers that resolve collaborators, call into `workflow` and map
//! internal errors into `dto::error::Error`. No orchestration or business
//! logic lives here.

pub mod bootstrap;
pub mod error;
pub mod read;

pub use bootstrap::BootstrapApi;
pub use read::ProfileReadApi;
