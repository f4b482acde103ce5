//! Core business logic for koinonia.

pub mod services;

pub use services::*;
