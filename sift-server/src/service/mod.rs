//! Service Module
//!
//! Business logic layer of the server. Services validate requests, plan the
//! worker stages and turn finished pipeline runs into responses.

pub mod analysis;
pub mod plan;

#[cfg(test)]
pub(crate) mod testing;

// Re-export for convenience
pub use analysis as analysis_service;
