//! Transport shape of session credentials.
//!
//! Only describes the cookies; setting them on a response belongs to the
//! HTTP layer.

use crate::config::{SessionConfig, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
use crate::service::session_service::SessionTokens;
use std::time::Duration;

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialCookie {
    pub name: &'static str,
    pub value: String,
    pub max_age: Duration,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: &'static str,
}

impl CredentialCookie {
    /// Renders a `Set-Cookie` header value.
    pub fn header_value(&self) -> String {
        let mut header = format!(
            "{}={}; Max-Age={}; Path={}; SameSite={}",
            self.name,
            self.value,
            self.max_age.as_secs(),
            self.path,
            self.same_site.as_str()
        );
        if self.http_only {
            header.push_str("; HttpOnly");
        }
        if self.secure {
            header.push_str("; Secure");
        }
        header
    }
}

/// Builds credential cookies for one deployment mode.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    production: bool,
}

impl CookiePolicy {
    pub fn new(production: bool) -> Self {
        Self { production }
    }

    /// `Secure` follows `SessionConfig::production`.
    pub fn from_config(config: &SessionConfig) -> Self {
        Self::new(config.production)
    }

    pub fn access_cookie(&self, access_token: &str) -> CredentialCookie {
        self.cookie(ACCESS_COOKIE_NAME, access_token, ACCESS_TOKEN_TTL)
    }

    pub fn refresh_cookie(&self, refresh_token: &str) -> CredentialCookie {
        self.cookie(REFRESH_COOKIE_NAME, refresh_token, REFRESH_TOKEN_TTL)
    }

    /// Both cookies set after a login.
    pub fn session_cookies(&self, tokens: &SessionTokens) -> [CredentialCookie; 2] {
        [
            self.access_cookie(&tokens.access_token),
            self.refresh_cookie(&tokens.refresh_token),
        ]
    }

    /// Empty, immediately expiring replacements used on logout.
    pub fn cleared_cookies(&self) -> [CredentialCookie; 2] {
        [
            self.cookie(ACCESS_COOKIE_NAME, "", Duration::ZERO),
            self.cookie(REFRESH_COOKIE_NAME, "", Duration::ZERO),
        ]
    }

    fn cookie(&self, name: &'static str, value: &str, max_age: Duration) -> CredentialCookie {
        CredentialCookie {
            name,
            value: value.to_string(),
            max_age,
            http_only: true,
            secure: self.production,
            same_site: SameSite::None,
            path: "/",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CookiePolicy, SameSite};
    use crate::config::SessionConfig;
    use crate::service::session_service::SessionTokens;
    use std::time::Duration;

    fn tokens() -> SessionTokens {
        SessionTokens {
            access_token: "a.b.c".to_string(),
            refresh_token: "d.e.f".to_string(),
        }
    }

    #[test]
    fn session_cookies_carry_both_lifetimes() {
        let [access, refresh] = CookiePolicy::new(false).session_cookies(&tokens());
        assert_eq!(access.name, "accessToken");
        assert_eq!(access.max_age, Duration::from_secs(900));
        assert_eq!(refresh.name, "refreshToken");
        assert_eq!(refresh.max_age, Duration::from_secs(604_800));
        assert!(access.http_only && refresh.http_only);
        assert_eq!(access.same_site, SameSite::None);
        assert!(!access.secure);
    }

    #[test]
    fn production_sets_secure_flag() {
        let [access, _] = CookiePolicy::new(true).session_cookies(&tokens());
        assert!(access.secure);
        assert_eq!(
            access.header_value(),
            "accessToken=a.b.c; Max-Age=900; Path=/; SameSite=None; HttpOnly; Secure"
        );
    }

    #[test]
    fn policy_follows_configured_mode() {
        let production = SessionConfig::new("access-secret-0001", "refresh-secret-002", true);
        let [access, refresh] = CookiePolicy::from_config(&production).session_cookies(&tokens());
        assert!(access.secure && refresh.secure);

        let local = SessionConfig::new("access-secret-0001", "refresh-secret-002", false);
        let [access, _] = CookiePolicy::from_config(&local).session_cookies(&tokens());
        assert!(!access.secure);
    }

    #[test]
    fn cleared_cookies_expire_immediately() {
        for cookie in CookiePolicy::new(false).cleared_cookies() {
            assert!(cookie.value.is_empty());
            assert_eq!(cookie.max_age, Duration::ZERO);
        }
    }
}
