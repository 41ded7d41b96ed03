//! HTTP middleware.

pub mod auth;
