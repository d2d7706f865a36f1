//! Database access layer
//!
//! Free async functions over `&PgPool` (single statements) or
//! `&mut PgConnection` (steps of a caller-owned transaction).

pub mod assignments;
pub mod branches;
pub mod collections;
pub mod dashboard;
pub mod history;
pub mod students;
pub mod users;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;
