//! HTTP feed source.
//!
//! Requests the first page of a feed with a caller-chosen page size and extracts
//! the total count and the record array using the feed's JSON pointers. Each call
//! is a single attempt: a failed or timed-out request is reported, never retried.

use super::provider::{FeedSource, Page, SyncError};
use crate::domain::{FeedSpec, Record};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, REFERER};
use serde_json::Value;
use std::time::Duration;

/// Transport settings for [`HttpFeedSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub referer: String,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36"
                .into(),
            accept: "application/json, text/javascript, */*; q=0.01".into(),
            referer: "https://cafef.vn/".into(),
        }
    }
}

/// Feed source backed by a blocking HTTP client.
pub struct HttpFeedSource {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl HttpFeedSource {
    pub fn new(options: &HttpOptions) -> Result<Self, SyncError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, header_value("accept", &options.accept)?);
        headers.insert(REFERER, header_value("referer", &options.referer)?);

        let client = reqwest::blocking::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .default_headers(headers)
            .build()
            .map_err(|e| SyncError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: options.timeout,
        })
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, SyncError> {
    HeaderValue::from_str(value)
        .map_err(|e| SyncError::Transport(format!("invalid {name} header: {e}")))
}

impl FeedSource for HttpFeedSource {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_page(
        &self,
        entity: &str,
        feed: &FeedSpec,
        page_size: usize,
    ) -> Result<Page, SyncError> {
        let page_size = page_size.to_string();
        let resp = self
            .client
            .get(&feed.url)
            .query(&[
                ("Symbol", entity),
                ("StartDate", ""),
                ("EndDate", ""),
                ("PageIndex", "1"),
                ("PageSize", page_size.as_str()),
            ])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    SyncError::Transport(format!(
                        "request for {entity}/{} timed out after {}s",
                        feed.name,
                        self.timeout.as_secs()
                    ))
                } else {
                    SyncError::Transport(e.to_string())
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SyncError::HttpStatus {
                status: status.as_u16(),
                url: feed.url.clone(),
            });
        }

        let body: Value = resp.json().map_err(|e| {
            if e.is_timeout() {
                SyncError::Transport(format!("reading response body timed out: {e}"))
            } else {
                SyncError::Schema(format!("response for {entity}/{} is not JSON: {e}", feed.name))
            }
        })?;

        parse_page(feed, &body)
    }
}

/// Extract the total count and records from a feed response.
pub fn parse_page(feed: &FeedSpec, body: &Value) -> Result<Page, SyncError> {
    let total = body.pointer(&feed.total_count_pointer).ok_or_else(|| {
        SyncError::Schema(format!("missing total count at {}", feed.total_count_pointer))
    })?;
    let total_count = match total {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
    .ok_or_else(|| SyncError::Schema(format!("total count is not a non-negative integer: {total}")))?;
    let total_count = usize::try_from(total_count)
        .map_err(|_| SyncError::Schema(format!("total count out of range: {total_count}")))?;

    let rows = match body.pointer(&feed.rows_pointer) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Record::from_value(item.clone()).ok_or_else(|| {
                    SyncError::Schema(format!("row {i} at {} is not an object", feed.rows_pointer))
                })
            })
            .collect::<Result<Vec<_>, _>>()?,
        Some(Value::Null) => Vec::new(),
        Some(other) => {
            return Err(SyncError::Schema(format!(
                "expected an array at {}, found {}",
                feed.rows_pointer,
                json_type(other)
            )))
        }
        None => {
            return Err(SyncError::Schema(format!(
                "missing rows at {}",
                feed.rows_pointer
            )))
        }
    };

    Ok(Page { total_count, rows })
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
