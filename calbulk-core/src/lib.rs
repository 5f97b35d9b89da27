//! Core engine for calbulk.
//!
//! This crate holds everything that does not talk to the network directly:
//! - `Event` / `EventTime` and the calendar listing type
//! - the temporal resolver that merges edit drafts onto event times
//! - the event filter, the selection tracker and the session state
//! - the mutation dispatcher, written against the `CalendarService` trait

pub mod config;
pub mod date_range;
pub mod dispatch;
pub mod draft;
pub mod error;
pub mod event;
pub mod filter;
pub mod patch;
pub mod selection;
pub mod service;
pub mod session;
pub mod temporal;

// Re-export all event types at crate root for convenience
pub use event::*;
