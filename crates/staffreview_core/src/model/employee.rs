//! Employee row model and the existence lookup used by review validation.
//!
//! # Responsibility
//! - Mirror the `employees` table shape.
//! - Expose "does this employee exist" as a trait so review validation can
//!   run against a live connection or an in-process stand-in.

use crate::db::DbResult;
use crate::model::department::DepartmentId;
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Integer primary key of `employees`.
pub type EmployeeId = i64;

/// One row of the `employees` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub name: String,
    pub job_title: String,
    /// Nullable in storage; employees may be unassigned.
    pub department_id: Option<DepartmentId>,
}

/// Answers whether an employee row exists at the moment of the call.
pub trait EmployeeDirectory {
    fn employee_exists(&self, id: EmployeeId) -> DbResult<bool>;
}

impl EmployeeDirectory for Connection {
    fn employee_exists(&self, id: EmployeeId) -> DbResult<bool> {
        let found = self
            .query_row("SELECT id FROM employees WHERE id = ?1;", [id], |row| {
                row.get::<_, EmployeeId>(0)
            })
            .optional()?;
        Ok(found.is_some())
    }
}
