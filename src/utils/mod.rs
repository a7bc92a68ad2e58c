//! Shared utilities
//!
//! Polling, logging, naming, and timing helpers.

pub mod logger;
pub mod names;
pub mod poll;
pub mod timer;

pub use poll::{poll_until, PollError};
