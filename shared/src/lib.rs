//! Shared types and models for the Harvest Market platform
//!
//! This crate contains the domain types shared between the backend and other
//! components of the system: product and seller models, geographic types,
//! distance math, and pure validation helpers.

pub mod geo;
pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
