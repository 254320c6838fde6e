//! ThousandEyes API client library.
//!
//! Provides a blocking client for the ThousandEyes v7 REST API: test listing,
//! test creation, agent lookup, and result retrieval.

pub mod auth;
pub mod client;
pub mod error;
pub mod helpers;
pub mod models;

pub use auth::{Auth, TokenSource, TOKEN_ENV};
pub use client::Client;
pub use error::{ApiError, AuthError, Error, ValidationError};
pub use models::{TestResult, TestSummary, METRIC_KEYS};
pub use reqwest::Method;

use std::sync::Arc;

/// Library version for User-Agent and diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Entry point: an auth provider and an API client sharing it.
#[derive(Clone, Debug)]
pub struct ThousandEyes {
    auth: Arc<Auth>,
    api: Client,
}

impl ThousandEyes {
    /// Build from an explicit token, falling back to `TE_API_TOKEN`.
    pub fn new(api_token: Option<String>) -> Result<Self, Error> {
        let auth = Arc::new(Auth::new(api_token)?);
        let api = Client::new(Arc::clone(&auth))?;
        Ok(Self { auth, api })
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn api(&self) -> &Client {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shares_auth_with_client() {
        let te = ThousandEyes::new(Some("A".to_string())).unwrap();
        assert_eq!(te.auth().source(), TokenSource::Argument);
        assert_eq!(te.auth().get_headers()["authorization"], "Bearer A");
        assert_eq!(te.api().api_base(), "https://api.thousandeyes.com/v7");
    }
}
