//! Permission Model

use serde::{Deserialize, Serialize};

/// Permission entity: an atomic named capability such as `"edit items"`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
}

/// Wire attributes of a `permissions` resource
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PermissionAttributes {
    pub name: String,
}
