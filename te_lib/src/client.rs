//! Blocking HTTP client for the ThousandEyes v7 REST API.

use crate::auth::Auth;
use crate::error::{ApiError, Error};
use crate::helpers::{as_int, as_text, json_kind};
use crate::models::{TestResult, TestSummary};
use reqwest::blocking::Client as HttpClient;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use url::Url;

const API_BASE: &str = "https://api.thousandeyes.com/v7";

/// ThousandEyes API client.
///
/// Every call is a fresh round-trip; nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct Client {
    auth: Arc<Auth>,
    api_base: String,
    http: HttpClient,
}

impl Client {
    /// Create a new client against the public v7 endpoint.
    pub fn new(auth: Arc<Auth>) -> Result<Self, Error> {
        Self::with_base_url(auth, API_BASE)
    }

    /// Create a client against another base URL (e.g. a local mock server).
    pub fn with_base_url(auth: Arc<Auth>, api_base: impl Into<String>) -> Result<Self, Error> {
        let user_agent = format!("te-client/{}", crate::VERSION);
        let http = HttpClient::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::Transport(e.to_string()))?;
        Ok(Self {
            auth,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Base URL that relative endpoints are joined to.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Send one request and return the parsed JSON body.
    ///
    /// `target` is an endpoint relative to the base URL or an absolute URL.
    /// POST sends `params` as a JSON body; other methods send them as query
    /// parameters.
    pub fn request(
        &self,
        method: Method,
        target: &str,
        params: Option<&Value>,
    ) -> Result<Value, Error> {
        let mut url = self.resolve_url(target)?;
        let is_post = method == Method::POST;
        if !is_post {
            if let Some(p) = params {
                append_query(&mut url, p)?;
            }
        }

        debug!(%method, %url, "sending request");
        let mut req = self
            .http
            .request(method.clone(), url.clone())
            .headers(self.auth.get_headers());
        if is_post {
            if let Some(p) = params {
                req = req.body(serde_json::to_vec(p)?);
            }
        }

        let res = req.send().map_err(|e| Error::Transport(e.to_string()))?;
        let status = res.status();
        let body = res.text().map_err(|e| Error::Transport(e.to_string()))?;
        debug!(%method, %url, status = status.as_u16(), "received response");

        let data: Value = match serde_json::from_str(&body) {
            Ok(d) => d,
            Err(_) => {
                warn!(status = status.as_u16(), "response body is not JSON");
                return Err(Error::Parse {
                    status: status.as_u16(),
                    body,
                });
            }
        };
        if status.as_u16() == 400 {
            warn!(%url, "rate limited");
            return Err(Error::RateLimited {
                status: status.as_u16(),
                body,
            });
        }
        if status.is_client_error() || status.is_server_error() {
            warn!(%url, status = status.as_u16(), "request failed");
            return Err(Error::Api(ApiError::new(status.as_u16(), body, data)));
        }
        Ok(data)
    }

    /// List all tests, keyed by test id.
    ///
    /// A non-string `testName` is kept in its JSON rendering; a missing one
    /// fails the listing.
    pub fn list_tests(&self) -> Result<BTreeMap<i64, TestSummary>, Error> {
        let res = self.request(Method::GET, "tests", None)?;
        let items = res
            .get("tests")
            .and_then(|t| t.as_array())
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut tests = BTreeMap::new();
        for item in items {
            let test_id = item.get("testId").and_then(as_int).ok_or_else(|| {
                Error::UnexpectedResponse(format!("test entry without integer 'testId': {}", item))
            })?;
            let test_name = item.get("testName").and_then(as_text).ok_or_else(|| {
                Error::UnexpectedResponse(format!("test {} has no 'testName'", test_id))
            })?;
            let links = item
                .get("_links")
                .and_then(|l| l.get("testResults"))
                .map(|l| match l {
                    Value::Array(a) => a.clone(),
                    Value::Null => vec![],
                    other => vec![other.clone()],
                })
                .unwrap_or_default();
            tests.insert(
                test_id,
                TestSummary {
                    test_name,
                    test_results_links: links,
                },
            );
        }
        Ok(tests)
    }

    /// Whether a test with the given name or id exists. Either match suffices.
    pub fn test_exists(&self, name: Option<&str>, test_id: Option<i64>) -> Result<bool, Error> {
        if name.is_none() && test_id.is_none() {
            return Err(Error::Usage("Either name or test_id must be provided.".to_string()));
        }
        let existing = self.list_tests()?;
        if let Some(id) = test_id {
            if existing.contains_key(&id) {
                return Ok(true);
            }
        }
        if let Some(name) = name {
            if existing.values().any(|t| t.test_name == name) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Create an HTTP server test. Returns the created test as sent back by the API.
    pub fn create_test<T: Serialize + ?Sized>(&self, config: &T) -> Result<Value, Error> {
        let body = serde_json::to_value(config)?;
        self.request(Method::POST, "tests/http-server", Some(&body))
    }

    /// Id of the first agent in the account.
    pub fn get_first_agent_id(&self) -> Result<i64, Error> {
        self.first_agent_id().map_err(|e| Error::AgentFetch(Box::new(e)))
    }

    fn first_agent_id(&self) -> Result<i64, Error> {
        let res = self.request(Method::GET, "agents", None)?;
        let agent = res
            .get("agents")
            .and_then(|a| a.as_array())
            .and_then(|a| a.first())
            .ok_or(Error::NoAgents)?;
        let raw_id = agent.get("agentId").unwrap_or(&Value::Null);
        let agent_id = as_int(raw_id).ok_or_else(|| {
            Error::UnexpectedResponse(format!("invalid 'agentId': {}", raw_id))
        })?;
        info!(
            agent_name = agent.get("agentName").and_then(|n| n.as_str()).unwrap_or("-"),
            agent_id, "using agent"
        );
        Ok(agent_id)
    }

    /// Follow a result link from [`Client::list_tests`] and parse the latest result.
    pub fn get_test_result(&self, link: &str) -> Result<TestResult, Error> {
        let res = self.request(Method::GET, link, None)?;
        Ok(TestResult::from_value(&res)?)
    }

    fn resolve_url(&self, target: &str) -> Result<Url, Error> {
        let raw = if target.starts_with("http") {
            target.to_string()
        } else {
            format!("{}/{}", self.api_base, target)
        };
        Url::parse(&raw).map_err(|e| Error::Usage(format!("invalid URL {:?}: {}", raw, e)))
    }
}

fn append_query(url: &mut Url, params: &Value) -> Result<(), Error> {
    let map = params.as_object().ok_or_else(|| {
        Error::Usage(format!(
            "query parameters must be an object, got {}",
            json_kind(params)
        ))
    })?;
    // Lists repeat the key once per element.
    let mut query: Vec<(&str, String)> = Vec::new();
    for (k, v) in map {
        match v {
            Value::Array(items) => {
                query.extend(items.iter().filter_map(as_text).map(|item| (k.as_str(), item)));
            }
            other => query.extend(as_text(other).map(|item| (k.as_str(), item))),
        }
    }
    if !query.is_empty() {
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
    }
    Ok(())
}
