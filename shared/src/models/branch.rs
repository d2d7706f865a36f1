//! Branch Model

use serde::{Deserialize, Serialize};

/// Branch entity (a physical study hall location)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Branch {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
}

/// Create branch payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchCreate {
    pub name: Option<String>,
    pub code: Option<String>,
}

/// Update branch payload; missing fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BranchUpdate {
    pub name: Option<String>,
    pub code: Option<String>,
}

/// `GET /branches` envelope
#[derive(Debug, Clone, Serialize)]
pub struct BranchList {
    pub branches: Vec<Branch>,
}
