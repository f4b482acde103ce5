//! HTTP API layer for koinonia.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: POST-style RPC endpoints for users, reels, groups,
//!   meetings, follows and notifications
//! - **Extractors**: Authentication
//! - **Middleware**: Bearer-token authentication
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
