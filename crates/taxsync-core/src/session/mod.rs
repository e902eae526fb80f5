//! Session mirror and its synchronization bookkeeping.
//!
//! # Module Structure
//!
//! - `sync`: per-collection phase machine and monotonic tickets
//! - `mirror`: the owned mirror (`SessionMirror`) and its render snapshot

mod mirror;
mod sync;

pub use mirror::{Rows, SessionMirror, SessionSnapshot};
pub use sync::{SyncPhase, SyncTracker, Ticket};
