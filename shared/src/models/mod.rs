//! Data models
//!
//! Shared between seat-server and the web client (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL).

pub mod branch;
pub mod collection;
pub mod dashboard;
pub mod serde_helpers;
pub mod student;
pub mod user;

// Re-exports
pub use branch::*;
pub use collection::*;
pub use dashboard::*;
pub use serde_helpers::FormField;
pub use student::*;
pub use user::*;
