//! Entity storage for the academic task tracker.
//!
//! This crate provides the [`EntityStore`] abstraction over users, projects,
//! tasks and chat messages, an in-memory implementation, and a decorator that
//! bounds every store call with a timeout.

mod error;
mod memory;
mod timeout;
mod traits;

pub use error::*;
pub use memory::*;
pub use timeout::*;
pub use traits::*;
