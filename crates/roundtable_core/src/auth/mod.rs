//! Reviewer credentials: signed tokens and their cookie shape.

pub mod cookie;
pub mod token;
