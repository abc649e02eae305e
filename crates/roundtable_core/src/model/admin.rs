//! Reviewer (admin) records and identity normalization.
//!
//! # Invariants
//! - `email` is stored trimmed and lowercase, and is unique.
//! - At most one session exists per `(admin, device_id)`.

use super::{non_blank, ValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub type AdminId = Uuid;

/// Reviewer account. Created on first login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub uuid: AdminId,
    pub name: String,
    pub email: String,
    /// Copied onto a slot when this admin claims it.
    pub meet_link: Option<String>,
    pub access: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Admin {
    /// Trimmed meeting link, or `None` when none was submitted.
    pub fn usable_meet_link(&self) -> Option<&str> {
        non_blank(self.meet_link.as_deref())
    }

    pub fn summary(&self) -> AdminSummary {
        AdminSummary {
            uuid: self.uuid,
            name: self.name.clone(),
        }
    }
}

/// Name-only projection used when a slot is populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub uuid: AdminId,
    pub name: String,
}

/// Stored long-lived credential bound to one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    pub admin_uuid: AdminId,
    pub device_id: String,
    pub token: String,
    /// Epoch ms.
    pub expires_at: i64,
    pub created_at: i64,
}

/// Pre-authenticated identity handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Provider display name, conventionally `"<Full Name> <REGNO>"`.
    pub name: String,
    pub email: String,
}

impl Identity {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Derives the `(display_name, email)` pair stored for a new admin.
    ///
    /// # Errors
    /// - `name` when the derived display name is blank.
    /// - `email` when it is blank or not shaped like an address.
    pub fn normalize(&self) -> Result<(String, String), ValidationError> {
        let email = non_blank(Some(self.email.as_str()))
            .ok_or_else(|| ValidationError::required("email"))?
            .to_ascii_lowercase();
        if !EMAIL_RE.is_match(&email) {
            return Err(ValidationError::new(
                "email",
                format!("`{email}` is not a valid email address"),
            ));
        }

        let full_name = non_blank(Some(self.name.as_str()))
            .ok_or_else(|| ValidationError::required("name"))?;
        let display_name = derive_display_name(full_name);
        if display_name.is_empty() {
            return Err(ValidationError::required("name"));
        }

        Ok((display_name, email))
    }
}

/// Trims a meeting link submitted by a reviewer. Blank links are rejected.
pub fn normalize_meet_link(raw: &str) -> Result<String, ValidationError> {
    non_blank(Some(raw))
        .map(str::to_string)
        .ok_or_else(|| ValidationError::required("meetLink"))
}

// Provider names carry a trailing registration token; single-token names are kept.
fn derive_display_name(full_name: &str) -> String {
    match full_name.rsplit_once(char::is_whitespace) {
        Some((head, _)) => head.trim().to_string(),
        None => full_name.to_string(),
    }
}
