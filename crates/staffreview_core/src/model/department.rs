//! Department row model.

use serde::{Deserialize, Serialize};

/// Integer primary key of `departments`.
pub type DepartmentId = i64;

/// One row of the `departments` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub name: String,
    pub location: String,
}
