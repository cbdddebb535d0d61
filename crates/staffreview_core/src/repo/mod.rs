//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repositories only accept connections opened through `db::open_db*`
//!   (migrations applied, `employees` present).
//! - Database failures surface unchanged inside `RepoError::Db`.

pub mod department_repo;
pub mod employee_repo;
pub mod identity_map;
pub mod review_repo;

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{table_exists, DbError};
use crate::model::review::{Review, ReviewError, ReviewId, ReviewValidationError, SharedReview};
use rusqlite::Connection;
use std::cell::{Ref, RefMut};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by review and collaborator repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ReviewValidationError),
    Db(DbError),
    /// `update`/`delete` called on a review without a primary key.
    NotPersisted {
        operation: &'static str,
    },
    NotFound {
        table: &'static str,
        id: i64,
    },
    /// The caller still holds a conflicting borrow of this review handle.
    /// `id` is `None` when the review is unsaved or cannot be read.
    ReviewBusy {
        id: Option<ReviewId>,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotPersisted { operation } => write!(
                f,
                "cannot {operation} a review that has not been saved to the database"
            ),
            Self::NotFound { table, id } => write!(f, "{table} row not found: {id}"),
            Self::ReviewBusy { id: Some(id) } => write!(
                f,
                "review {id} is borrowed by the caller; release it before calling the repository"
            ),
            Self::ReviewBusy { id: None } => write!(
                f,
                "review is borrowed by the caller; release it before calling the repository"
            ),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ReviewValidationError> for RepoError {
    fn from(value: ReviewValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<ReviewError> for RepoError {
    fn from(value: ReviewError) -> Self {
        match value {
            ReviewError::Validation(err) => Self::Validation(err),
            ReviewError::Db(err) => Self::Db(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Rejects connections that did not go through `open_db*`.
pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for table in ["departments", "employees"] {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }

    Ok(())
}

/// Shared borrow of a review handle that reports contention instead of panicking.
pub(crate) fn read_review(review: &SharedReview) -> RepoResult<Ref<'_, Review>> {
    review
        .try_borrow()
        .map_err(|_| RepoError::ReviewBusy { id: None })
}

/// Exclusive borrow of a review handle that reports contention instead of panicking.
pub(crate) fn write_review(review: &SharedReview) -> RepoResult<RefMut<'_, Review>> {
    review.try_borrow_mut().map_err(|_| RepoError::ReviewBusy {
        id: review.try_borrow().ok().and_then(|current| current.id()),
    })
}
