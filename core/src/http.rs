//! Request descriptor types.
//!
//! # Design
//! These types describe an outbound request as plain data before it touches
//! the transport. `Body` carries its own content type per variant, so a raw
//! body can never be combined with parameter encoding; the invariant lives
//! in the type instead of a runtime check.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use crate::error::FetchError;
use crate::query::build_query;

/// HTTP method for a request. The helper only issues GET and POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// Per-call connect and read timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    /// Budget for DNS resolution and connection establishment.
    pub connect: Duration,
    /// Budget for receiving the response headers and body.
    pub read: Duration,
}

impl Timeouts {
    pub fn new(connect: Duration, read: Duration) -> Self {
        Self { connect, read }
    }
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            read: Duration::from_secs(30),
        }
    }
}

/// Request payload. Variants are mutually exclusive by construction.
#[derive(Debug, Clone)]
pub enum Body {
    /// Form parameters, percent-encoded via `query::build_query`.
    Form(BTreeMap<String, String>),
    /// JSON payload, sent with a `text/json` content type.
    Json(serde_json::Value),
    /// Raw bytes with a caller-specified content type.
    Raw {
        content_type: String,
        bytes: Vec<u8>,
    },
}

impl Body {
    /// Content type header value for this payload.
    pub fn content_type(&self) -> &str {
        match self {
            Body::Form(_) => "application/x-www-form-urlencoded",
            Body::Json(_) => "text/json",
            Body::Raw { content_type, .. } => content_type,
        }
    }

    /// Encode the payload to wire bytes.
    pub(crate) fn into_bytes(self) -> Result<Vec<u8>, FetchError> {
        match self {
            Body::Form(params) => Ok(build_query(&params).into_bytes()),
            Body::Json(value) => {
                serde_json::to_vec(&value).map_err(|e| FetchError::Serialization(e.to_string()))
            }
            Body::Raw { bytes, .. } => Ok(bytes),
        }
    }
}
