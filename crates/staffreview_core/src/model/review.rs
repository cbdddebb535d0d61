//! Review domain model.
//!
//! # Responsibility
//! - Hold one employee performance review.
//! - Validate `year`, `summary` and `employee_id` on every assignment.
//!
//! # Invariants
//! - `year >= MIN_REVIEW_YEAR`.
//! - `summary` is not empty. Whitespace-only text is accepted.
//! - `employee_id` referenced an existing employee when it was assigned.
//!   It is not re-checked afterwards.
//! - `id` is `None` until the first insert and again after delete. Only the
//!   repository assigns or clears it.

use crate::db::DbError;
use crate::model::employee::{EmployeeDirectory, EmployeeId};
use serde::Serialize;
use std::cell::RefCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

/// Integer primary key of `reviews`.
pub type ReviewId = i64;

/// Review handle shared between callers and the repository identity map.
pub type SharedReview = Rc<RefCell<Review>>;

/// Earliest accepted review year.
pub const MIN_REVIEW_YEAR: i64 = 2000;

/// Field-shape and reference failures raised at assignment time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewValidationError {
    YearOutOfRange { year: i64 },
    /// Only reachable when hydrating a row whose `year` is not an integer.
    NonIntegerYear { found: String },
    EmptySummary,
    UnknownEmployee(EmployeeId),
}

impl Display for ReviewValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearOutOfRange { year } => write!(
                f,
                "expected integer greater than or equal to {MIN_REVIEW_YEAR}, got {year}"
            ),
            Self::NonIntegerYear { found } => write!(
                f,
                "expected integer greater than or equal to {MIN_REVIEW_YEAR}, got {found}"
            ),
            Self::EmptySummary => write!(f, "summary must not be empty"),
            Self::UnknownEmployee(id) => write!(f, "employee with id {id} does not exist"),
        }
    }
}

impl Error for ReviewValidationError {}

pub type ReviewResult<T> = Result<T, ReviewError>;

/// Error for review operations that consult the employee lookup.
#[derive(Debug)]
pub enum ReviewError {
    Validation(ReviewValidationError),
    Db(DbError),
}

impl Display for ReviewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ReviewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ReviewValidationError> for ReviewError {
    fn from(value: ReviewValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for ReviewError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Checks the year bound.
pub fn validate_year(year: i64) -> Result<(), ReviewValidationError> {
    if year < MIN_REVIEW_YEAR {
        return Err(ReviewValidationError::YearOutOfRange { year });
    }
    Ok(())
}

/// Checks that the summary is not empty.
///
/// No minimum length beyond one character is enforced.
pub fn validate_summary(summary: &str) -> Result<(), ReviewValidationError> {
    if summary.is_empty() {
        return Err(ReviewValidationError::EmptySummary);
    }
    Ok(())
}

/// Checks that `employee_id` exists right now, querying `employees`.
pub fn check_employee<D>(employee_id: EmployeeId, employees: &D) -> ReviewResult<()>
where
    D: EmployeeDirectory + ?Sized,
{
    if !employees.employee_exists(employee_id)? {
        return Err(ReviewValidationError::UnknownEmployee(employee_id).into());
    }
    Ok(())
}

/// One employee performance review.
///
/// Not `Clone`: each persisted id has one live object, shared as a
/// [`SharedReview`].
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Review {
    id: Option<ReviewId>,
    year: i64,
    summary: String,
    employee_id: EmployeeId,
}

impl Review {
    /// Creates a transient (unsaved) review.
    ///
    /// # Side effects
    /// - Queries `employees` through `employees` to verify `employee_id`.
    ///
    /// # Errors
    /// - Validation errors in field order: `year`, `summary`, `employee_id`.
    /// - `ReviewError::Db` when the employee lookup fails.
    pub fn new<D>(
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
        employees: &D,
    ) -> ReviewResult<Self>
    where
        D: EmployeeDirectory + ?Sized,
    {
        Self::build(None, year, summary.into(), employee_id, employees)
    }

    /// Creates a review carrying a known primary key.
    ///
    /// Saving it issues an update against that key rather than an insert.
    pub fn with_id<D>(
        id: ReviewId,
        year: i64,
        summary: impl Into<String>,
        employee_id: EmployeeId,
        employees: &D,
    ) -> ReviewResult<Self>
    where
        D: EmployeeDirectory + ?Sized,
    {
        Self::build(Some(id), year, summary.into(), employee_id, employees)
    }

    fn build<D>(
        id: Option<ReviewId>,
        year: i64,
        summary: String,
        employee_id: EmployeeId,
        employees: &D,
    ) -> ReviewResult<Self>
    where
        D: EmployeeDirectory + ?Sized,
    {
        validate_year(year)?;
        validate_summary(&summary)?;
        check_employee(employee_id, employees)?;
        Ok(Self {
            id,
            year,
            summary,
            employee_id,
        })
    }

    pub fn id(&self) -> Option<ReviewId> {
        self.id
    }

    pub fn year(&self) -> i64 {
        self.year
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn employee_id(&self) -> EmployeeId {
        self.employee_id
    }

    /// Returns whether this review currently maps to a stored row.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Replaces `year`; the previous value is kept on error.
    pub fn set_year(&mut self, year: i64) -> Result<(), ReviewValidationError> {
        validate_year(year)?;
        self.year = year;
        Ok(())
    }

    /// Replaces `summary`; the previous value is kept on error.
    pub fn set_summary(&mut self, summary: impl Into<String>) -> Result<(), ReviewValidationError> {
        let summary = summary.into();
        validate_summary(&summary)?;
        self.summary = summary;
        Ok(())
    }

    /// Replaces `employee_id` after checking the employee exists.
    pub fn set_employee_id<D>(&mut self, employee_id: EmployeeId, employees: &D) -> ReviewResult<()>
    where
        D: EmployeeDirectory + ?Sized,
    {
        check_employee(employee_id, employees)?;
        self.employee_id = employee_id;
        Ok(())
    }

    /// Wraps this review into a handle the repository can cache.
    pub fn into_shared(self) -> SharedReview {
        Rc::new(RefCell::new(self))
    }

    pub(crate) fn assign_id(&mut self, id: ReviewId) {
        self.id = Some(id);
    }

    pub(crate) fn clear_id(&mut self) {
        self.id = None;
    }

    /// Copies the validated fields of `other`, keeping `self.id`.
    pub(crate) fn absorb_fields(&mut self, other: Review) {
        self.year = other.year;
        self.summary = other.summary;
        self.employee_id = other.employee_id;
    }
}

impl Display for Review {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "<Review {id}: ")?,
            None => write!(f, "<Review unsaved: ")?,
        }
        write!(
            f,
            "{}, {}, Employee: {}>",
            self.year, self.summary, self.employee_id
        )
    }
}
