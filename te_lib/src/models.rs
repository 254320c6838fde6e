//! Data models for ThousandEyes API responses.

use crate::error::ValidationError;
use crate::helpers::{as_int, as_text, is_truthy, json_kind, parse_time};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Metric keys picked out of the latest result entry.
pub const METRIC_KEYS: [&str; 3] = ["avgLatency", "jitter", "loss"];

/// One entry of the test listing, keyed by test id in [`crate::Client::list_tests`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub test_name: String,
    /// Raw `_links.testResults` entries.
    pub test_results_links: Vec<Value>,
}

impl TestSummary {
    /// URLs of the result links, whether sent as bare strings or `{"href": ...}` objects.
    pub fn result_urls(&self) -> Vec<&str> {
        self.test_results_links
            .iter()
            .filter_map(|link| match link {
                Value::String(s) => Some(s.as_str()),
                Value::Object(m) => m.get("href").and_then(|h| h.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Latest result of a test, validated from a results payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test_id: i64,
    pub test_name: String,
    pub status: Option<String>,
    pub timestamp: Option<String>,
    pub metrics: BTreeMap<String, Value>,
}

impl TestResult {
    /// Validate a raw payload and extract the latest result.
    ///
    /// Checks run in a fixed order so each failure is reported on its own:
    /// payload shape, results list, latest entry, `test` section, `testId`,
    /// then `testName`. Status, timestamp and metrics are optional.
    pub fn from_value(data: &Value) -> Result<Self, ValidationError> {
        let data = data
            .as_object()
            .ok_or_else(|| ValidationError::NotAnObject(json_kind(data)))?;
        let latest = latest_result(data)?;
        let test = test_section(data)?;
        let test_id = test_id(test)?;
        let test_name = test_name(test)?;

        let metrics = METRIC_KEYS
            .iter()
            .filter_map(|&k| latest.get(k).map(|v| (k.to_string(), v.clone())))
            .collect();

        Ok(Self {
            test_id,
            test_name,
            status: latest.get("status").and_then(as_text),
            timestamp: latest.get("date").and_then(as_text),
            metrics,
        })
    }

    /// Timestamp as UTC, if present and ISO 8601.
    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp.as_deref().and_then(|t| parse_time(t).ok())
    }
}

impl TryFrom<&Value> for TestResult {
    type Error = ValidationError;

    fn try_from(data: &Value) -> Result<Self, Self::Error> {
        Self::from_value(data)
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TestResult(test_id={}, name={:?}, status={:?}, at={:?}, metrics={})",
            self.test_id,
            self.test_name,
            self.status,
            self.timestamp,
            serde_json::to_string(&self.metrics).map_err(|_| fmt::Error)?
        )
    }
}

fn latest_result(data: &Map<String, Value>) -> Result<&Map<String, Value>, ValidationError> {
    let results = ["results", "testResults"]
        .iter()
        .filter_map(|k| data.get(*k))
        .find(|v| is_truthy(v))
        .and_then(|v| v.as_array())
        .filter(|a| !a.is_empty())
        .ok_or(ValidationError::NoResults)?;
    results[0]
        .as_object()
        .ok_or(ValidationError::MalformedLatest)
}

fn test_section(data: &Map<String, Value>) -> Result<&Map<String, Value>, ValidationError> {
    data.get("test")
        .and_then(|t| t.as_object())
        .ok_or(ValidationError::MissingTestSection)
}

fn test_id(test: &Map<String, Value>) -> Result<i64, ValidationError> {
    let raw = test
        .get("testId")
        .filter(|v| !v.is_null())
        .ok_or(ValidationError::MissingTestId)?;
    as_int(raw).ok_or_else(|| ValidationError::InvalidTestId(raw.to_string()))
}

fn test_name(test: &Map<String, Value>) -> Result<String, ValidationError> {
    test.get("testName")
        .and_then(|n| n.as_str())
        .filter(|n| !n.is_empty())
        .map(String::from)
        .ok_or(ValidationError::MissingTestName)
}
