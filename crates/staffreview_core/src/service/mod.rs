//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep the CLI decoupled from SQL details.

pub mod review_service;
