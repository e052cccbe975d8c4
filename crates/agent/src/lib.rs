//! The DeskPilot dispatch loop.

pub mod dispatcher;

pub use dispatcher::{Dispatcher, RoundOutcome};
