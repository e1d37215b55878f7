//! Business logic engines for the Harvest Market backend

pub mod location_sync;
pub mod search;

pub use location_sync::LocationSyncEngine;
pub use search::GeoSearchEngine;
