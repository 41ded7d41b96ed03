//! Core entity definitions for the academic task tracker.
//!
//! Users, projects, tasks and chat messages, plus the status enum shared by
//! projects and tasks.

mod message;
mod project;
mod status;
mod task;
mod user;

pub use message::*;
pub use project::*;
pub use status::*;
pub use task::*;
pub use user::*;
