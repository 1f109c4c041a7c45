//! Washu sake catalog library.
//!
//! Exposes the catalog internals and HTTP routes for integration testing.
//! The main entry point for running the server is the `washu` binary.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use state::AppState;
