//! # Error Handling
//!
//! Error types for the load balancer cloner, defined with `thiserror`.

pub mod types;

pub use types::{CloneError, Result};
