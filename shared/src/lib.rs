//! Shared types for the CMS
//!
//! Common types used by the server and its API consumers: domain models,
//! request payloads, JSON:API documents and the unified error system.

pub mod client;
pub mod error;
pub mod jsonapi;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
