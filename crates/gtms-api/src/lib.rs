//! # gtms-api
//!
//! HTTP API layer for GTMS built on Axum.
//!
//! Provides the patient and operator endpoints, bearer token
//! verification, CORS and request logging middleware, DTOs, and the
//! mapping from [`gtms_core::AppError`] to `{message, code}` responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
pub mod token;

pub use app::{build_app, run_server};
pub use state::AppState;
