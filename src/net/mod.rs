//! Networking modules for the REST backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` attaches the bearer token and reacts to authorization failures,
//! `api` wraps the individual auth endpoints, and `types` defines the shared
//! wire schema.

pub mod api;
pub mod http;
pub mod types;
