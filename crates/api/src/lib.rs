//! Form catalog API server library.
//!
//! Publishes the quote form definitions and runs the same step validator
//! the client engine uses, so the site and back office agree on what a
//! complete application is. Exposes config, state, error handling, and
//! routes for the binary entrypoint and integration tests.

pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
