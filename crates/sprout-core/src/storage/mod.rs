//! Record field model, write conditions and the in-memory reference store.

pub mod condition;
pub mod memory;
pub mod record;
