//! Domain types shared by every layer.

pub mod identity;
pub mod profile;
pub mod seed;
