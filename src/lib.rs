//! # silkmall-client
//!
//! Client-side session and authorization model for the SilkMall marketplace
//! (consumers, suppliers, administrators).
//!
//! This crate owns the persisted session record, the authorization facts
//! derived from it, the role-aware route guard consulted before every
//! navigation, and the bearer-token HTTP transport used to talk to the REST
//! backend. Browser bindings (`localStorage`, `sessionStorage`,
//! `window.location`) are available behind the `hydrate` feature; native
//! builds use file and in-memory backends.

pub mod clock;
pub mod config;
pub mod net;
pub mod router;
pub mod state;
pub mod storage;
