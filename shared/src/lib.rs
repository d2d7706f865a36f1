//! Shared types for seatdesk
//!
//! Error types, API payloads and database row models used by the server
//! and mirrored by the web client.

pub mod error;
pub mod models;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCode};
pub use serde::{Deserialize, Serialize};
