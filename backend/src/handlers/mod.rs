//! HTTP handlers for the Harvest Market backend

pub mod health;
pub mod search;
pub mod sync;

pub use health::*;
pub use search::*;
pub use sync::*;
