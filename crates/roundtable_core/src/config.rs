//! Session credential configuration.
//!
//! # Invariants
//! - Access and refresh secrets are distinct, so a refresh credential never
//!   verifies as an access credential and vice versa.
//! - `production` alone decides whether transport cookies carry `Secure`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Lifetime of a short-lived access credential.
pub const ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);
/// Lifetime of a refresh credential and its stored session.
pub const REFRESH_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const MIN_SECRET_BYTES: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingSecret(&'static str),
    WeakSecret { name: &'static str, min_bytes: usize },
    SharedSecret,
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingSecret(name) => write!(f, "{name} must not be empty"),
            Self::WeakSecret { name, min_bytes } => {
                write!(f, "{name} must be at least {min_bytes} bytes")
            }
            Self::SharedSecret => write!(f, "access and refresh secrets must differ"),
        }
    }
}

impl Error for ConfigError {}

/// Signing secrets and deployment mode for the session manager.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub production: bool,
}

impl SessionConfig {
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        production: bool,
    ) -> Self {
        Self {
            access_secret: access_secret.into(),
            refresh_secret: refresh_secret.into(),
            production,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_secret("access_secret", &self.access_secret)?;
        check_secret("refresh_secret", &self.refresh_secret)?;
        if self.access_secret == self.refresh_secret {
            return Err(ConfigError::SharedSecret);
        }
        Ok(())
    }
}

// Secrets stay out of debug output.
impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("production", &self.production)
            .finish()
    }
}

fn check_secret(name: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingSecret(name));
    }
    if value.len() < MIN_SECRET_BYTES {
        return Err(ConfigError::WeakSecret {
            name,
            min_bytes: MIN_SECRET_BYTES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, SessionConfig};

    #[test]
    fn validate_accepts_distinct_long_secrets() {
        let config = SessionConfig::new("a".repeat(32), "b".repeat(32), false);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_blank_short_and_shared_secrets() {
        let blank = SessionConfig::new("   ", "b".repeat(32), false);
        assert_eq!(
            blank.validate(),
            Err(ConfigError::MissingSecret("access_secret"))
        );

        let short = SessionConfig::new("a".repeat(32), "short", false);
        assert!(matches!(
            short.validate(),
            Err(ConfigError::WeakSecret {
                name: "refresh_secret",
                ..
            })
        ));

        let shared = SessionConfig::new("s".repeat(32), "s".repeat(32), true);
        assert_eq!(shared.validate(), Err(ConfigError::SharedSecret));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let config = SessionConfig::new("a".repeat(32), "b".repeat(32), true);
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("aaaa"));
        assert!(rendered.contains("production: true"));
    }
}
