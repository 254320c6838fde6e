//! Bearer-token authentication for the ThousandEyes API.
//!
//! The token comes from an explicit argument or, failing that, from the
//! `TE_API_TOKEN` environment variable. The environment is read once, when the
//! [`Auth`] is built.

use crate::error::AuthError;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use std::fmt;

/// Environment variable holding the OAuth2 bearer token.
pub const TOKEN_ENV: &str = "TE_API_TOKEN";

const CONTENT_TYPE_HAL_JSON: &str = "application/hal+json";
const BEARER_PREFIX: &str = "Bearer ";

/// Source from which the token was obtained (for diagnostics).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    Argument,
    Environment,
}

/// Holds the bearer token and produces request headers.
#[derive(Clone)]
pub struct Auth {
    authorization: HeaderValue,
    source: TokenSource,
}

impl Auth {
    /// Build from an explicit token, falling back to `TE_API_TOKEN`.
    pub fn new(api_token: Option<String>) -> Result<Self, AuthError> {
        Self::from_sources(api_token, std::env::var(TOKEN_ENV).ok())
    }

    fn from_sources(explicit: Option<String>, env: Option<String>) -> Result<Self, AuthError> {
        let (token, source) = match explicit.filter(|t| !t.is_empty()) {
            Some(t) => (t, TokenSource::Argument),
            None => match env.filter(|t| !t.is_empty()) {
                Some(t) => (t, TokenSource::Environment),
                None => {
                    return Err(AuthError::new(format!(
                        "OAuth2 bearer token must be provided via api_token or {} environment variable",
                        TOKEN_ENV
                    )))
                }
            },
        };
        let mut authorization = HeaderValue::from_str(&format!("{}{}", BEARER_PREFIX, token))
            .map_err(|_| AuthError::new("bearer token contains characters not allowed in a header"))?;
        authorization.set_sensitive(true);
        Ok(Self {
            authorization,
            source,
        })
    }

    /// Where the token came from.
    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// Headers for every API request: content type and authorization.
    pub fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_HAL_JSON));
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("token", &"<redacted>")
            .field("source", &self.source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn argument_preferred_over_env() {
        let auth = Auth::from_sources(some("arg_token"), some("env_token")).unwrap();
        assert_eq!(auth.source(), TokenSource::Argument);
        assert_eq!(auth.get_headers()[AUTHORIZATION], "Bearer arg_token");
    }

    #[test]
    fn env_used_when_no_argument() {
        let auth = Auth::from_sources(None, some("env_token")).unwrap();
        assert_eq!(auth.source(), TokenSource::Environment);
        assert_eq!(auth.get_headers()[AUTHORIZATION], "Bearer env_token");
    }

    #[test]
    fn empty_argument_falls_back_to_env() {
        let auth = Auth::from_sources(some(""), some("env_token")).unwrap();
        assert_eq!(auth.source(), TokenSource::Environment);
    }

    #[test]
    fn token_required() {
        let err = Auth::from_sources(None, None).unwrap_err();
        assert!(err.message.contains(TOKEN_ENV));
        assert!(Auth::from_sources(some(""), some("")).is_err());
    }

    #[test]
    fn new_reads_token_env() {
        // The only test that touches TE_API_TOKEN.
        std::env::set_var(TOKEN_ENV, "from_env");
        let auth = Auth::new(None).unwrap();
        assert_eq!(auth.source(), TokenSource::Environment);
        assert_eq!(auth.get_headers()[AUTHORIZATION], "Bearer from_env");

        std::env::remove_var(TOKEN_ENV);
        let err = Auth::new(None).unwrap_err();
        assert!(err.message.contains("TE_API_TOKEN"));
    }

    #[test]
    fn token_must_fit_in_header() {
        assert!(Auth::from_sources(some("abc\ndef"), None).is_err());
    }

    #[test]
    fn headers_content_and_auth() {
        let auth = Auth::from_sources(some("abc"), None).unwrap();
        let headers = auth.get_headers();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[CONTENT_TYPE], "application/hal+json");
        assert_eq!(headers[AUTHORIZATION], "Bearer abc");
        assert!(headers[AUTHORIZATION].is_sensitive());
    }

    #[test]
    fn debug_hides_token() {
        let auth = Auth::from_sources(some("s3cret"), None).unwrap();
        let dbg = format!("{:?}", auth);
        assert!(!dbg.contains("s3cret"));
        assert!(dbg.contains("redacted"));
    }
}
