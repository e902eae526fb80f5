//! Application layer for TaxSync.
//!
//! This crate owns the session controller, the declarative action table that
//! front ends drive it through, and the notification surface they display.

pub mod actions;
pub mod notification;
pub mod session;

pub use actions::{ACTION_TABLE, Action, ActionOutcome, Fields, dispatch};
pub use notification::{Notification, NotificationCenter, NotificationLevel};
pub use session::TaxSessionController;
