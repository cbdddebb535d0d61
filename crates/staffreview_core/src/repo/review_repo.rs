//! Review repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Own the `reviews` table lifecycle (`create_table`/`drop_table`).
//! - Translate review mutations into single auto-committed statements.
//! - Hydrate rows through the identity map so one primary key maps to one
//!   live `SharedReview`.
//!
//! # Invariants
//! - Hydration validates a whole row before touching a cached review.
//! - `drop_table` empties the identity map.
//! - `delete` evicts the cache entry and resets the review's `id`.
//! - A review handle the caller is still borrowing yields
//!   `RepoError::ReviewBusy`; the repository never panics on contention.

use crate::model::employee::EmployeeId;
use crate::model::review::{Review, ReviewId, ReviewValidationError, SharedReview};
use crate::repo::identity_map::IdentityMap;
use crate::repo::{ensure_connection_ready, read_review, write_review, RepoError, RepoResult};
use log::{debug, info, warn};
use rusqlite::types::Value;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::cell::RefCell;
use std::rc::Rc;

const REVIEW_SELECT_SQL: &str = "SELECT
    id,
    year,
    summary,
    employee_id
FROM reviews";

/// Raw `reviews` row prior to validation.
///
/// `year` keeps the stored SQLite value so non-integer data is reported as a
/// validation failure rather than a decode failure.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub year: Value,
    pub summary: Option<String>,
    pub employee_id: Option<EmployeeId>,
}

impl ReviewRow {
    fn into_review(self, conn: &Connection) -> RepoResult<Review> {
        let year = match self.year {
            Value::Integer(year) => year,
            other => {
                return Err(ReviewValidationError::NonIntegerYear {
                    found: describe_value(&other),
                }
                .into())
            }
        };
        let employee_id = self.employee_id.ok_or_else(|| {
            RepoError::InvalidData(format!(
                "reviews.employee_id is NULL for review {}",
                self.id
            ))
        })?;
        let summary = self.summary.unwrap_or_default();

        Ok(Review::with_id(self.id, year, summary, employee_id, conn)?)
    }
}

/// Repository interface for review persistence and hydration.
pub trait ReviewRepository {
    fn create_table(&self) -> RepoResult<()>;
    fn drop_table(&self) -> RepoResult<()>;
    /// Validates a transient review against this repository's employees.
    fn new_review(&self, year: i64, summary: &str, employee_id: EmployeeId)
        -> RepoResult<Review>;
    /// Re-points `review` at another employee after an existence check.
    fn assign_employee(&self, review: &SharedReview, employee_id: EmployeeId) -> RepoResult<()>;
    fn save(&self, review: &SharedReview) -> RepoResult<()>;
    fn update(&self, review: &SharedReview) -> RepoResult<()>;
    fn delete(&self, review: &SharedReview) -> RepoResult<()>;
    fn create(&self, year: i64, summary: &str, employee_id: EmployeeId)
        -> RepoResult<SharedReview>;
    fn instance_from_db(&self, row: ReviewRow) -> RepoResult<SharedReview>;
    fn find_by_employee_id(&self, employee_id: EmployeeId) -> RepoResult<Vec<SharedReview>>;
    fn find_by_id(&self, review_id: ReviewId) -> RepoResult<Option<SharedReview>>;
    fn get_all(&self) -> RepoResult<Vec<SharedReview>>;
}

/// SQLite-backed review repository owning its identity map.
///
/// Not `Send`: cached reviews are `Rc<RefCell<_>>` handles.
pub struct SqliteReviewRepository<'conn> {
    conn: &'conn Connection,
    identity_map: RefCell<IdentityMap>,
}

impl<'conn> SqliteReviewRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self {
            conn,
            identity_map: RefCell::new(IdentityMap::new()),
        })
    }

    /// Returns the cached review for `id` without querying.
    pub fn cached(&self, id: ReviewId) -> Option<SharedReview> {
        self.identity_map.borrow().get(id)
    }

    pub fn cached_len(&self) -> usize {
        self.identity_map.borrow().len()
    }

    pub fn clear_cache(&self) {
        self.identity_map.borrow_mut().clear();
    }

    fn write_fields(&self, review: &Review, id: ReviewId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE reviews
             SET year = ?1, summary = ?2, employee_id = ?3
             WHERE id = ?4;",
            params![review.year(), review.summary(), review.employee_id(), id],
        )?;

        if changed == 0 {
            warn!("event=review_update module=repo status=noop review_id={id} rows=0");
        } else {
            info!(
                "event=review_update module=repo status=ok review_id={} year={} employee_id={}",
                id,
                review.year(),
                review.employee_id()
            );
        }
        Ok(())
    }

    fn hydrate_all(&self, rows: Vec<ReviewRow>) -> RepoResult<Vec<SharedReview>> {
        rows.into_iter()
            .map(|row| self.instance_from_db(row))
            .collect()
    }
}

impl ReviewRepository for SqliteReviewRepository<'_> {
    fn create_table(&self) -> RepoResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                year INT,
                summary TEXT,
                employee_id INTEGER,
                FOREIGN KEY (employee_id) REFERENCES employees(id) ON DELETE CASCADE
            );",
        )?;
        info!("event=review_table_create module=repo status=ok");
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS reviews;")?;
        self.clear_cache();
        info!("event=review_table_drop module=repo status=ok");
        Ok(())
    }

    fn new_review(
        &self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<Review> {
        Ok(Review::new(year, summary, employee_id, self.conn)?)
    }

    fn assign_employee(&self, review: &SharedReview, employee_id: EmployeeId) -> RepoResult<()> {
        write_review(review)?.set_employee_id(employee_id, self.conn)?;
        Ok(())
    }

    fn save(&self, review: &SharedReview) -> RepoResult<()> {
        let id = {
            let mut current = write_review(review)?;
            match current.id() {
                Some(id) => {
                    self.write_fields(&current, id)?;
                    id
                }
                None => {
                    self.conn.execute(
                        "INSERT INTO reviews (year, summary, employee_id)
                         VALUES (?1, ?2, ?3);",
                        params![current.year(), current.summary(), current.employee_id()],
                    )?;
                    let id = self.conn.last_insert_rowid();
                    current.assign_id(id);
                    info!(
                        "event=review_insert module=repo status=ok review_id={} year={} employee_id={}",
                        id,
                        current.year(),
                        current.employee_id()
                    );
                    id
                }
            }
        };

        self.identity_map.borrow_mut().insert(id, Rc::clone(review));
        Ok(())
    }

    fn update(&self, review: &SharedReview) -> RepoResult<()> {
        let current = read_review(review)?;
        let id = current
            .id()
            .ok_or(RepoError::NotPersisted { operation: "update" })?;
        self.write_fields(&current, id)
    }

    fn delete(&self, review: &SharedReview) -> RepoResult<()> {
        let mut current = write_review(review)?;
        let id = current
            .id()
            .ok_or(RepoError::NotPersisted { operation: "delete" })?;

        self.conn
            .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
        self.identity_map.borrow_mut().remove(id);
        current.clear_id();

        info!("event=review_delete module=repo status=ok review_id={id}");
        Ok(())
    }

    fn create(
        &self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<SharedReview> {
        let review = self.new_review(year, summary, employee_id)?.into_shared();
        self.save(&review)?;
        Ok(review)
    }

    fn instance_from_db(&self, row: ReviewRow) -> RepoResult<SharedReview> {
        let id = row.id;
        let hydrated = row.into_review(self.conn)?;

        let cached = self.identity_map.borrow().get(id);
        if let Some(cached) = cached {
            cached
                .try_borrow_mut()
                .map_err(|_| RepoError::ReviewBusy { id: Some(id) })?
                .absorb_fields(hydrated);
            return Ok(cached);
        }

        let review = hydrated.into_shared();
        self.identity_map.borrow_mut().insert(id, Rc::clone(&review));
        Ok(review)
    }

    fn find_by_employee_id(&self, employee_id: EmployeeId) -> RepoResult<Vec<SharedReview>> {
        let mut stmt = self.conn.prepare(&format!(
            "{REVIEW_SELECT_SQL}
             WHERE employee_id = ?1
             ORDER BY id ASC;"
        ))?;
        let rows = stmt
            .query_map([employee_id], parse_review_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "event=review_find_by_employee module=repo status=ok employee_id={} rows={}",
            employee_id,
            rows.len()
        );
        self.hydrate_all(rows)
    }

    fn find_by_id(&self, review_id: ReviewId) -> RepoResult<Option<SharedReview>> {
        let row = self
            .conn
            .query_row(
                &format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"),
                [review_id],
                parse_review_row,
            )
            .optional()?;

        debug!(
            "event=review_find_by_id module=repo status=ok review_id={} found={}",
            review_id,
            row.is_some()
        );
        row.map(|row| self.instance_from_db(row)).transpose()
    }

    fn get_all(&self) -> RepoResult<Vec<SharedReview>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{REVIEW_SELECT_SQL} ORDER BY id ASC;"))?;
        let rows = stmt
            .query_map([], parse_review_row)?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            "event=review_get_all module=repo status=ok rows={}",
            rows.len()
        );
        self.hydrate_all(rows)
    }
}

fn parse_review_row(row: &Row<'_>) -> rusqlite::Result<ReviewRow> {
    Ok(ReviewRow {
        id: row.get("id")?,
        year: row.get("year")?,
        summary: row.get("summary")?,
        employee_id: row.get("employee_id")?,
    })
}

fn describe_value(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(v) => v.to_string(),
        Value::Real(v) => v.to_string(),
        Value::Text(v) => format!("`{v}`"),
        Value::Blob(v) => format!("blob({} bytes)", v.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::describe_value;
    use rusqlite::types::Value;

    #[test]
    fn describe_value_names_non_integer_storage() {
        assert_eq!(describe_value(&Value::Null), "NULL");
        assert_eq!(describe_value(&Value::Real(2020.5)), "2020.5");
        assert_eq!(describe_value(&Value::Text("2020".into())), "`2020`");
        assert_eq!(describe_value(&Value::Blob(vec![1, 2])), "blob(2 bytes)");
    }
}
