//! Error types for the ThousandEyes API client.

use thiserror::Error;

/// Base error type for ThousandEyes operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Auth(#[from] AuthError),

    /// Invalid argument combination or request target.
    #[error("{0}")]
    Usage(String),

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Error parsing JSON (status {status}): {body:?}")]
    Parse { status: u16, body: String },

    // Any 400 lands here. The v7 API documents 429 for throttling.
    #[error("Rate limit exceeded (status {status}): {body:?}")]
    RateLimited { status: u16, body: String },

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Failed to encode request body: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid test result: {0}")]
    Validation(#[from] ValidationError),

    #[error("No agents found in your account.")]
    NoAgents,

    #[error("Failed to fetch agents: {0}")]
    AgentFetch(#[source] Box<Error>),
}

/// Raised when no usable bearer token is available.
#[derive(Error, Debug)]
#[error("{message}")]
pub struct AuthError {
    pub message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Raised when the API answers with a 4xx/5xx status (other than 400).
#[derive(Error, Debug)]
#[error("HTTP {status_code}: {body:?}")]
pub struct ApiError {
    pub status_code: u16,
    /// Raw response body.
    pub body: String,
    /// Parsed response body.
    pub response_data: serde_json::Value,
}

impl ApiError {
    pub fn new(
        status_code: u16,
        body: impl Into<String>,
        response_data: serde_json::Value,
    ) -> Self {
        Self {
            status_code,
            body: body.into(),
            response_data,
        }
    }
}

/// Reasons a raw results payload cannot be turned into a [`crate::TestResult`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Expected object, got {0}")]
    NotAnObject(&'static str),

    #[error("API response contains no test results")]
    NoResults,

    #[error("Latest result entry is malformed")]
    MalformedLatest,

    #[error("Missing or invalid 'test' section")]
    MissingTestSection,

    #[error("Missing 'testId' in test metadata")]
    MissingTestId,

    /// `testId` is present but not an integer, a float or an integer string.
    /// Booleans are rejected.
    #[error("Invalid 'testId': {0}")]
    InvalidTestId(String),

    #[error("Missing 'testName' in test metadata")]
    MissingTestName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_message_carries_status_and_body() {
        let e = Error::RateLimited {
            status: 400,
            body: "limit exceeded".to_string(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Rate limit exceeded (status 400)"));
        assert!(msg.contains("limit exceeded"));
    }

    #[test]
    fn agent_fetch_keeps_original_message() {
        let e = Error::AgentFetch(Box::new(Error::NoAgents));
        assert_eq!(
            e.to_string(),
            "Failed to fetch agents: No agents found in your account."
        );
        assert!(std::error::Error::source(&e).is_some());
    }
}
