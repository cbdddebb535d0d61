//! Employee repository over the `employees` collaborator table.
//!
//! # Responsibility
//! - Minimal CRUD so reviews have something to reference.
//! - Existence lookups for review validation.
//!
//! # Invariants
//! - Deleting an employee cascades to `reviews` inside SQLite. Review
//!   identity maps are not notified.

use crate::model::department::DepartmentId;
use crate::model::employee::{Employee, EmployeeDirectory, EmployeeId};
use crate::repo::{ensure_connection_ready, RepoError, RepoResult};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT id, name, job_title, department_id FROM employees";

pub trait EmployeeRepository {
    fn create(
        &self,
        name: &str,
        job_title: &str,
        department_id: Option<DepartmentId>,
    ) -> RepoResult<Employee>;
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn find_by_department_id(&self, department_id: DepartmentId) -> RepoResult<Vec<Employee>>;
    fn get_all(&self) -> RepoResult<Vec<Employee>>;
    fn delete(&self, id: EmployeeId) -> RepoResult<()>;
    fn exists(&self, id: EmployeeId) -> RepoResult<bool>;
}

pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    fn query_list(&self, sql: &str, bind: Option<DepartmentId>) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(sql)?;
        let employees = match bind {
            Some(value) => stmt
                .query_map([value], parse_employee_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map([], parse_employee_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };
        Ok(employees)
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create(
        &self,
        name: &str,
        job_title: &str,
        department_id: Option<DepartmentId>,
    ) -> RepoResult<Employee> {
        self.conn.execute(
            "INSERT INTO employees (name, job_title, department_id) VALUES (?1, ?2, ?3);",
            params![name, job_title, department_id],
        )?;
        let id = self.conn.last_insert_rowid();
        info!("event=employee_insert module=repo status=ok employee_id={id}");

        Ok(Employee {
            id,
            name: name.to_string(),
            job_title: job_title.to_string(),
            department_id,
        })
    }

    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let employee = self
            .conn
            .query_row(
                &format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                parse_employee_row,
            )
            .optional()?;
        Ok(employee)
    }

    fn find_by_department_id(&self, department_id: DepartmentId) -> RepoResult<Vec<Employee>> {
        self.query_list(
            &format!("{EMPLOYEE_SELECT_SQL} WHERE department_id = ?1 ORDER BY id ASC;"),
            Some(department_id),
        )
    }

    fn get_all(&self) -> RepoResult<Vec<Employee>> {
        self.query_list(&format!("{EMPLOYEE_SELECT_SQL} ORDER BY id ASC;"), None)
    }

    fn delete(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM employees WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: "employees",
                id,
            });
        }

        info!("event=employee_delete module=repo status=ok employee_id={id}");
        Ok(())
    }

    fn exists(&self, id: EmployeeId) -> RepoResult<bool> {
        Ok(self.conn.employee_exists(id)?)
    }
}

fn parse_employee_row(row: &Row<'_>) -> rusqlite::Result<Employee> {
    Ok(Employee {
        id: row.get("id")?,
        name: row.get::<_, Option<String>>("name")?.unwrap_or_default(),
        job_title: row.get::<_, Option<String>>("job_title")?.unwrap_or_default(),
        department_id: row.get("department_id")?,
    })
}
