//! Core module - configuration, input discovery, logging and the store

pub mod config;
pub mod datafiles;
pub mod logging;
pub mod store;

pub use config::Config;
pub use datafiles::DataFiles;
pub use store::{LoadSummary, ProductionStore, ReferenceCounts, StoreError};
