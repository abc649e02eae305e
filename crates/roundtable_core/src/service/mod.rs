//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Translate repository outcomes into `CoreError` kinds.
//! - Keep transport layers decoupled from storage details.

pub mod admin_service;
pub mod assignment_service;
pub mod elimination_service;
pub mod review_service;
pub mod schedule_service;
pub mod session_service;
