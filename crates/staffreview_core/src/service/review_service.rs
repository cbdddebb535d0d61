//! Review use-case service.
//!
//! # Responsibility
//! - Provide id-addressed entry points (record, revise, remove) on top of the
//!   object-addressed repository API.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - `revise_review` validates every requested change before mutating the
//!   cached review.

use crate::model::employee::EmployeeId;
use crate::model::review::{validate_summary, validate_year, ReviewId, SharedReview};
use crate::repo::review_repo::ReviewRepository;
use crate::repo::{write_review, RepoError, RepoResult};

/// Partial update request for one review. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub year: Option<i64>,
    pub summary: Option<String>,
    pub employee_id: Option<EmployeeId>,
}

impl ReviewChanges {
    pub fn is_empty(&self) -> bool {
        self.year.is_none() && self.summary.is_none() && self.employee_id.is_none()
    }
}

/// Use-case service wrapper for review operations.
pub struct ReviewService<R: ReviewRepository> {
    repo: R,
}

impl<R: ReviewRepository> ReviewService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Ensures the `reviews` table exists.
    pub fn prepare_schema(&self) -> RepoResult<()> {
        self.repo.create_table()
    }

    /// Drops and recreates `reviews`, discarding every cached review.
    pub fn reset_schema(&self) -> RepoResult<()> {
        self.repo.drop_table()?;
        self.repo.create_table()
    }

    /// Creates and persists a review.
    pub fn record_review(
        &self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<SharedReview> {
        self.repo.create(year, summary, employee_id)
    }

    /// Gets one review by id.
    pub fn get_review(&self, id: ReviewId) -> RepoResult<Option<SharedReview>> {
        self.repo.find_by_id(id)
    }

    /// Lists all reviews, or only those of `employee_id` when given.
    pub fn list_reviews(&self, employee_id: Option<EmployeeId>) -> RepoResult<Vec<SharedReview>> {
        match employee_id {
            Some(employee_id) => self.repo.find_by_employee_id(employee_id),
            None => self.repo.get_all(),
        }
    }

    /// Applies `changes` to review `id` and saves it.
    ///
    /// # Errors
    /// - `RepoError::NotFound` when no row has that id.
    /// - Validation errors leave the cached review untouched.
    pub fn revise_review(&self, id: ReviewId, changes: &ReviewChanges) -> RepoResult<SharedReview> {
        let review = self.require(id)?;
        if changes.is_empty() {
            return Ok(review);
        }

        if let Some(year) = changes.year {
            validate_year(year)?;
        }
        if let Some(summary) = changes.summary.as_deref() {
            validate_summary(summary)?;
        }
        if let Some(employee_id) = changes.employee_id {
            self.repo.assign_employee(&review, employee_id)?;
        }

        {
            let mut current = write_review(&review)?;
            if let Some(year) = changes.year {
                current.set_year(year)?;
            }
            if let Some(summary) = changes.summary.clone() {
                current.set_summary(summary)?;
            }
        }

        self.repo.save(&review)?;
        Ok(review)
    }

    /// Deletes review `id`, returning the now-unsaved handle.
    pub fn remove_review(&self, id: ReviewId) -> RepoResult<SharedReview> {
        let review = self.require(id)?;
        self.repo.delete(&review)?;
        Ok(review)
    }

    fn require(&self, id: ReviewId) -> RepoResult<SharedReview> {
        self.repo
            .find_by_id(id)?
            .ok_or(RepoError::NotFound { table: "reviews", id })
    }
}
