//! AdAPT HTTP API library.
//!
//! Exposes config, state, error handling and the router so integration
//! tests and the binary entrypoint build the same application.

pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;
