//! Domain models for the Harvest Market backend
//!
//! Re-exports models from the shared crate

pub use shared::models::*;
