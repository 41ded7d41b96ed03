//! Domain services used by the RPC handlers.

pub mod integrity;
pub mod presence;
