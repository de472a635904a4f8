//! Orchestration of bootstrap, seed claims and degraded reads.
//!
//! Workflows assemble inputs, ask policy for decisions and execute ops. They
//! decide which failures are swallowed (and logged) and which propagate.

pub mod bootstrap;
pub mod read;
pub mod seed;

///
/// Prelude
///

pub mod prelude {
    pub(crate) use crate::{InternalError, InternalErrorOrigin, log, log::Topic};
}
