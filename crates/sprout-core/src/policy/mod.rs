//! Deterministic decision rules. Nothing here performs I/O.

pub mod display_name;
pub mod seed;
pub mod tier;
