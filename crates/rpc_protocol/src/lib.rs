//! JSON-RPC protocol definitions for the academic task tracker.
//!
//! This crate defines the JSON-RPC 2.0 envelope, the method names (which
//! are the query and mutation field names clients already use), the
//! request and response payloads, and the live chat delivery payload.

mod envelope;
mod error;
mod methods;
mod requests;
mod responses;

pub use envelope::*;
pub use error::*;
pub use methods::*;
pub use requests::*;
pub use responses::*;
