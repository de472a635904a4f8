//! Mechanical, reusable side-effecting operations.

pub mod classify;
pub mod clock;
pub mod identity;
pub mod profile;
