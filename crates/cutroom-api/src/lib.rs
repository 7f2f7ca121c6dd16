//! Axum HTTP API server for CutRoom.
//!
//! This crate provides:
//! - Creator/editor/admin signup and signin (JWT bearer auth)
//! - The invite ledger endpoints
//! - Draft submission and the review/publish endpoints
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod notify;
pub mod routes;
pub mod security;
pub mod services;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{InviteService, ReviewService};
pub use state::AppState;
