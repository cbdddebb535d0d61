//! Core persistence for employee performance reviews.
//! Reviews are validated on assignment and mapped to the `reviews` table,
//! with an identity map keeping one live object per row.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::department::{Department, DepartmentId};
pub use model::employee::{Employee, EmployeeDirectory, EmployeeId};
pub use model::review::{
    Review, ReviewError, ReviewId, ReviewResult, ReviewValidationError, SharedReview,
    MIN_REVIEW_YEAR,
};
pub use repo::department_repo::{DepartmentRepository, SqliteDepartmentRepository};
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::identity_map::IdentityMap;
pub use repo::review_repo::{ReviewRepository, ReviewRow, SqliteReviewRepository};
pub use repo::{RepoError, RepoResult};
pub use service::review_service::{ReviewChanges, ReviewService};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
