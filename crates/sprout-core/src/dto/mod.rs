//! Public response and error envelopes.

pub mod bootstrap;
pub mod error;
pub mod page;
pub mod read;

///
/// Prelude
///

pub(crate) mod prelude {
    pub use serde::{Deserialize, Serialize};
}
