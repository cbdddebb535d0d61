//! Department repository over the `departments` collaborator table.
//!
//! No field validation beyond what SQLite enforces.

use crate::model::department::{Department, DepartmentId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const DEPARTMENT_SELECT_SQL: &str = "SELECT id, name, location FROM departments";

pub trait DepartmentRepository {
    fn create(&self, name: &str, location: &str) -> RepoResult<Department>;
    fn find_by_id(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    fn get_all(&self) -> RepoResult<Vec<Department>>;
    /// Fails with a foreign-key error while employees still reference it.
    fn delete(&self, id: DepartmentId) -> RepoResult<()>;
}

pub struct SqliteDepartmentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDepartmentRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DepartmentRepository for SqliteDepartmentRepository<'_> {
    fn create(&self, name: &str, location: &str) -> RepoResult<Department> {
        self.conn.execute(
            "INSERT INTO departments (name, location) VALUES (?1, ?2);",
            params![name, location],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("event=department_insert module=repo status=ok department_id={id}");

        Ok(Department {
            id,
            name: name.to_string(),
            location: location.to_string(),
        })
    }

    fn find_by_id(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let department = self
            .conn
            .query_row(
                &format!("{DEPARTMENT_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_department_row,
            )
            .optional()?;
        Ok(department)
    }

    fn get_all(&self) -> RepoResult<Vec<Department>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DEPARTMENT_SELECT_SQL} ORDER BY id ASC;"))?;
        let departments = stmt
            .query_map([], parse_department_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(departments)
    }

    fn delete(&self, id: DepartmentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM departments WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "departments",
                id,
            });
        }

        info!("event=department_delete module=repo status=ok department_id={id}");
        Ok(())
    }
}

fn parse_department_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get("id")?,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        location: row.get::<_, Option<String>>("location")?.unwrap_or_default(),
    })
}
