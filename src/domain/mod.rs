//! Domain layer for the masterclass pipeline
//!
//! Pure models (concept, personas, task steps, pipelines, results) and the
//! ports the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
