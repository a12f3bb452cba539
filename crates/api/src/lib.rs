//! Drowse API server library.
//!
//! Exposes the building blocks (config, state, error handling, routes,
//! asset bundling, payment provider client) so integration tests and
//! the binary entrypoint can both access them.

pub mod bundle;
pub mod config;
pub mod error;
pub mod handlers;
pub mod payments;
pub mod response;
pub mod routes;
pub mod state;
