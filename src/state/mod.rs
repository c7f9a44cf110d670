//! Client-side session state.
//!
//! DESIGN
//! ======
//! `session` owns the persisted record and the only four operations allowed
//! to mutate it. `auth` holds the pure derivations (authenticated, effective
//! token, guest, role) that the route guard and HTTP transport re-read on
//! every check.

pub mod auth;
pub mod session;
