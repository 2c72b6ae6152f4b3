//! MTG tabletop engine
//!
//! Rules engine for two-player Magic: The Gathering matches played on a
//! virtual table: phases and turns, combat, a LIFO stack with priority,
//! zones and attachments, counters, and the wire actions that drive them.
//! Card text is never interpreted; players resolve effects by hand.

pub mod core;
pub mod error;
pub mod game;
pub mod history;
pub mod loader;
pub mod session;
pub mod zones;

pub use error::{MtgError, Result};
