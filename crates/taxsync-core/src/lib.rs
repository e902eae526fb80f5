//! Domain layer for TaxSync.
//!
//! Holds the session mirror, the records it mirrors, the seam to the remote
//! calculation service and the pure render projection. No network code lives
//! here.

pub mod config;
pub mod error;
pub mod model;
pub mod remote;
pub mod render;
pub mod session;
pub mod standard_deduction;

// Re-export common error type
pub use error::{Result, TaxError};
