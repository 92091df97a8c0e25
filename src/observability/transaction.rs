//! Transactions: one named span of work per request.
//!
//! A [`Transaction`] is a scope guard borrowed from an
//! [`Application`](super::apm::Application). It is ended exactly once,
//! either by [`Transaction::end`] or when it is dropped (including during
//! unwinding), at which point a [`TransactionEvent`] is recorded.

use std::collections::BTreeMap;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use axum::http::{header, HeaderMap, Request, Response};
use serde::Serialize;

use super::apm::{ApmError, Application};
use super::tracing::{new_span_id, new_trace_id, TraceParent};

/// Maximum number of user attributes per transaction.
pub const MAX_USER_ATTRIBUTES: usize = 64;

/// Maximum attribute key length, in bytes.
pub const ATTRIBUTE_KEY_LIMIT: usize = 255;

/// String attribute values are truncated to this many bytes.
pub const ATTRIBUTE_VALUE_LIMIT: usize = 255;

/// A user or agent attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::String(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::String(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<u16> for AttributeValue {
    fn from(v: u16) -> Self {
        AttributeValue::Int(v.into())
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        AttributeValue::Float(v)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

/// Completed transaction as delivered to a reporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEvent {
    #[serde(rename = "type")]
    pub event_type: &'static str,
    pub name: String,
    pub app_name: String,
    /// Milliseconds since the Unix epoch at transaction start.
    pub timestamp: u64,
    /// Seconds.
    pub duration: f64,
    pub guid: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_span_id: Option<String>,
    pub sampled: bool,
    pub agent_attributes: BTreeMap<String, AttributeValue>,
    pub user_attributes: BTreeMap<String, AttributeValue>,
}

impl TransactionEvent {
    pub fn user_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.user_attributes.get(key)
    }

    pub fn agent_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.agent_attributes.get(key)
    }
}

#[derive(Debug)]
struct TransactionData {
    name: String,
    started: Instant,
    timestamp: u64,
    guid: String,
    trace_id: String,
    parent_span_id: Option<String>,
    sampled: bool,
    agent_attributes: BTreeMap<String, AttributeValue>,
    user_attributes: BTreeMap<String, AttributeValue>,
}

/// An in-flight transaction.
#[derive(Debug)]
#[must_use = "a transaction ends as soon as it is dropped"]
pub struct Transaction<'app> {
    app: &'app Application,
    data: Option<TransactionData>,
}

impl<'app> Transaction<'app> {
    pub(crate) fn start(app: &'app Application, name: &str) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            app,
            data: Some(TransactionData {
                name: name.to_string(),
                started: Instant::now(),
                timestamp,
                guid: new_span_id(),
                trace_id: new_trace_id(),
                parent_span_id: None,
                sampled: true,
                agent_attributes: BTreeMap::new(),
                user_attributes: BTreeMap::new(),
            }),
        }
    }

    /// Trace id this transaction belongs to.
    pub fn trace_id(&self) -> &str {
        self.data.as_ref().map(|d| d.trace_id.as_str()).unwrap_or("")
    }

    /// Attach a custom attribute.
    pub fn add_attribute(
        &mut self,
        key: &str,
        value: impl Into<AttributeValue>,
    ) -> Result<(), ApmError> {
        let Some(data) = self.data.as_mut() else {
            return Err(ApmError::TransactionEnded);
        };

        if key.len() > ATTRIBUTE_KEY_LIMIT {
            return Err(ApmError::AttributeKeyTooLong {
                key: truncate(key, 32).to_string(),
                len: key.len(),
            });
        }

        let value = match value.into() {
            AttributeValue::Float(f) if !f.is_finite() => {
                return Err(ApmError::InvalidAttributeValue {
                    key: key.to_string(),
                });
            }
            AttributeValue::String(s) => {
                AttributeValue::String(truncate(&s, ATTRIBUTE_VALUE_LIMIT).to_string())
            }
            other => other,
        };

        if !data.user_attributes.contains_key(key)
            && data.user_attributes.len() >= MAX_USER_ATTRIBUTES
        {
            return Err(ApmError::TooManyAttributes {
                limit: MAX_USER_ATTRIBUTES,
            });
        }

        data.user_attributes.insert(key.to_string(), value);
        Ok(())
    }

    /// Record the inbound request and join its trace, when allowed.
    pub fn set_web_request<B>(&mut self, request: &Request<B>) {
        let distributed_tracing = self.app.config().distributed_tracing;
        let Some(data) = self.data.as_mut() else {
            return;
        };

        let headers = request.headers();
        agent_attr(data, "request.method", request.method().as_str());
        agent_attr(data, "request.uri", request.uri().path());
        if let Some(host) = header_str(headers, header::HOST) {
            agent_attr(data, "request.headers.host", host);
        }
        if let Some(agent) = header_str(headers, header::USER_AGENT) {
            agent_attr(data, "request.headers.userAgent", agent);
        }
        if let Some(id) = header_str(headers, "x-request-id") {
            agent_attr(data, "request.headers.xRequestId", id);
        }

        if distributed_tracing {
            if let Some(parent) = TraceParent::from_headers(headers) {
                data.sampled = parent.sampled();
                data.trace_id = parent.trace_id;
                data.parent_span_id = Some(parent.parent_id);
            }
        }
    }

    /// Record the outbound response.
    pub fn set_web_response<B>(&mut self, response: &Response<B>) {
        let Some(data) = self.data.as_mut() else {
            return;
        };

        data.agent_attributes.insert(
            "http.statusCode".to_string(),
            response.status().as_u16().into(),
        );
        if let Some(ct) = header_str(response.headers(), header::CONTENT_TYPE) {
            agent_attr(data, "response.headers.contentType", ct);
        }
    }

    /// End the transaction now.
    pub fn end(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        let Some(data) = self.data.take() else {
            return;
        };

        let event = TransactionEvent {
            event_type: "Transaction",
            name: data.name,
            app_name: self.app.config().app_name.clone(),
            timestamp: data.timestamp,
            duration: data.started.elapsed().as_secs_f64(),
            guid: data.guid,
            trace_id: data.trace_id,
            parent_span_id: data.parent_span_id,
            sampled: data.sampled,
            agent_attributes: data.agent_attributes,
            user_attributes: data.user_attributes,
        };

        tracing::trace!(
            transaction = %event.name,
            trace_id = %event.trace_id,
            duration_secs = event.duration,
            "Transaction ended"
        );

        self.app.record(event);
    }
}

impl Drop for Transaction<'_> {
    fn drop(&mut self) {
        self.finish();
    }
}

fn agent_attr(data: &mut TransactionData, key: &str, value: &str) {
    data.agent_attributes.insert(
        key.to_string(),
        AttributeValue::String(truncate(value, ATTRIBUTE_VALUE_LIMIT).to_string()),
    );
}

fn header_str<K: header::AsHeaderName>(headers: &HeaderMap, key: K) -> Option<&str> {
    headers.get(key).and_then(|v| v.to_str().ok())
}

/// Longest prefix of `s` no longer than `limit` bytes, on a char boundary.
fn truncate(s: &str, limit: usize) -> &str {
    if s.len() <= limit {
        return s;
    }
    let mut end = limit;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
