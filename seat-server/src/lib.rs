//! seat-server: seat and membership management for study halls
//!
//! # Structure
//!
//! - [`api`] - HTTP routes and handlers
//! - [`auth`] - JWT, per-request identity, capability gates
//! - [`db`] - PostgreSQL access
//! - [`billing`] / [`enrollment`] / [`calendar`] - pure domain rules
//! - [`config`] / [`state`] / [`error`] - service plumbing

pub mod api;
pub mod auth;
pub mod billing;
pub mod calendar;
pub mod config;
pub mod db;
pub mod enrollment;
pub mod error;
pub mod middleware;
pub mod state;
pub mod util;

pub use api::build_app;
pub use config::Config;
pub use state::AppState;

/// Security event log, written under the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
