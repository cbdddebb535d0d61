//! Domain records for performance reviews and their collaborators.
//!
//! # Responsibility
//! - Define the `Review` record and its field validation.
//! - Define the `Employee`/`Department` rows referenced by reviews.
//!
//! # Invariants
//! - A `Review` value is never observable in a half-valid state: every
//!   constructor and setter validates before mutating.

pub mod department;
pub mod employee;
pub mod review;
