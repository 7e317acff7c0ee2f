//! secom-seed: SECOM manufacturing-quality database seeder
//!
//! Generates deterministic metadata for the 590 anonymous SECOM sensor
//! features and turns the raw measurement and label files into lots,
//! per-feature measurements and quality results.

pub mod catalog;
pub mod cli;
pub mod core;
pub mod entities;
pub mod pipeline;
