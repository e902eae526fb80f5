//! Session synchronization.
//!
//! `TaxSessionController` is the only owner of the session mirror; every
//! change to it goes through a server write followed by a full refetch.

mod controller;
pub mod input;

pub use controller::TaxSessionController;
