//! Stateless outbound HTTP operations.
//!
//! # Design
//! Every operation is a free function over plain inputs; there is no shared
//! agent and no singleton. Each call builds a single-use `ureq::Agent` carrying the
//! caller's timeouts, executes synchronously, and maps every failure to a
//! typed [`FetchError`]. Agents are built with status-as-error disabled so
//! non-2xx responses are interpreted here, not by the transport.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{classify, FetchError};
use crate::http::{Body, Method, Timeouts};
use crate::query::build_query;
use crate::response::{self, BodyStream};

/// Mirrors the header set legacy upstream portals expect.
const ACCEPT: &str = "text/xml,text/javascript,text/html,application/json";
const USER_AGENT: &str = "webfetch-core/0.1";

/// Issue a GET request and return the decoded response body.
///
/// `params` become the query string via `query::build_query`; an empty map
/// leaves the URL untouched.
pub fn get(
    url: &str,
    headers: &BTreeMap<String, String>,
    params: &BTreeMap<String, String>,
    timeouts: Timeouts,
) -> Result<String, FetchError> {
    let response = execute(
        Method::Get,
        &with_query(url, params),
        headers,
        None,
        timeouts,
        true,
    )?;
    read_text(response)
}

/// POST `params` as a form-encoded body and return the decoded response.
pub fn post_form(
    url: &str,
    headers: &BTreeMap<String, String>,
    params: &BTreeMap<String, String>,
    timeouts: Timeouts,
) -> Result<String, FetchError> {
    let response = execute(
        Method::Post,
        url,
        headers,
        Some(Body::Form(params.clone())),
        timeouts,
        true,
    )?;
    read_text(response)
}

/// POST `payload` serialized as JSON (`text/json` content type) and return
/// the decoded response.
pub fn post_json<T: Serialize>(
    url: &str,
    headers: &BTreeMap<String, String>,
    payload: &T,
    timeouts: Timeouts,
) -> Result<String, FetchError> {
    let value =
        serde_json::to_value(payload).map_err(|e| FetchError::Serialization(e.to_string()))?;
    let response = execute(
        Method::Post,
        url,
        headers,
        Some(Body::Json(value)),
        timeouts,
        true,
    )?;
    read_text(response)
}

/// POST raw `bytes` with the given content type and return the decoded
/// response. Parameter encoding is bypassed entirely.
pub fn post_raw(
    url: &str,
    content_type: &str,
    headers: &BTreeMap<String, String>,
    bytes: &[u8],
    timeouts: Timeouts,
) -> Result<String, FetchError> {
    let body = Body::Raw {
        content_type: content_type.to_string(),
        bytes: bytes.to_vec(),
    };
    let response = execute(Method::Post, url, headers, Some(body), timeouts, true)?;
    read_text(response)
}

/// Issue a GET request and return the `Set-Cookie` values of the immediate
/// response. Redirects are not followed: a login bounce carries its cookies
/// on the redirect itself.
pub fn get_cookies(
    url: &str,
    params: &BTreeMap<String, String>,
    timeouts: Timeouts,
) -> Result<Vec<String>, FetchError> {
    let response = execute(
        Method::Get,
        &with_query(url, params),
        &BTreeMap::new(),
        None,
        timeouts,
        false,
    )?;
    read_cookies(response)
}

/// POST a form and return the `Set-Cookie` values of the immediate response.
///
/// If the body carries the business error marker, the embedded message is
/// returned as [`FetchError::Application`] (CAPTCHA prompts excepted).
pub fn post_form_cookies(
    url: &str,
    headers: &BTreeMap<String, String>,
    params: &BTreeMap<String, String>,
    timeouts: Timeouts,
) -> Result<Vec<String>, FetchError> {
    let response = execute(
        Method::Post,
        url,
        headers,
        Some(Body::Form(params.clone())),
        timeouts,
        false,
    )?;
    read_cookies(response)
}

/// Issue a GET request and return the unconsumed response body as a stream.
///
/// The caller decodes the bytes; [`BodyStream::charset`] carries the
/// resolved response charset. Dropping the stream releases the connection.
pub fn get_stream(
    url: &str,
    params: &BTreeMap<String, String>,
    timeouts: Timeouts,
) -> Result<BodyStream, FetchError> {
    let response = execute(
        Method::Get,
        &with_query(url, params),
        &BTreeMap::new(),
        None,
        timeouts,
        true,
    )?;
    if !response.status().is_success() {
        return Err(status_error(response));
    }
    let content_type = header_string(response.headers(), "content-type");
    Ok(BodyStream::new(
        content_type,
        response.into_body().into_reader(),
    ))
}

fn execute(
    method: Method,
    url: &str,
    headers: &BTreeMap<String, String>,
    body: Option<Body>,
    timeouts: Timeouts,
    follow_redirects: bool,
) -> Result<ureq::http::Response<ureq::Body>, FetchError> {
    let agent = build_agent(timeouts, follow_redirects);
    let merged = merge_headers(headers);
    debug!("{method} {url}");

    let result = match (method, body) {
        (Method::Get, _) => {
            let mut request = agent.get(url);
            for (name, value) in &merged {
                request = request.header(name.as_str(), value.as_str());
            }
            request.call()
        }
        (Method::Post, Some(body)) => {
            let mut request = agent.post(url);
            for (name, value) in &merged {
                request = request.header(name.as_str(), value.as_str());
            }
            if !has_content_type(&merged) {
                request = request.content_type(body.content_type());
            }
            let bytes = body.into_bytes()?;
            request.send(&bytes[..])
        }
        (Method::Post, None) => {
            let mut request = agent.post(url);
            for (name, value) in &merged {
                request = request.header(name.as_str(), value.as_str());
            }
            request.send_empty()
        }
    };

    result.map_err(|err| {
        let err = classify(err);
        warn!("{method} {url} failed: {err}");
        err
    })
}

/// One agent per call: the helper holds no connection state between calls.
fn build_agent(timeouts: Timeouts, follow_redirects: bool) -> ureq::Agent {
    ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_connect(Some(timeouts.connect))
        .timeout_recv_response(Some(timeouts.read))
        .timeout_recv_body(Some(timeouts.read))
        .max_redirects(if follow_redirects { 10 } else { 0 })
        .max_redirects_will_error(false)
        .build()
        .new_agent()
}

/// Defaults first, caller headers on top. Entries with an empty name or
/// value are skipped, same rule as query parameters.
fn merge_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    merged.insert("Accept".to_string(), ACCEPT.to_string());
    merged.insert("User-Agent".to_string(), USER_AGENT.to_string());
    for (name, value) in headers {
        if name.is_empty() || value.is_empty() {
            continue;
        }
        merged.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        merged.insert(name.clone(), value.clone());
    }
    merged
}

fn has_content_type(headers: &BTreeMap<String, String>) -> bool {
    headers
        .keys()
        .any(|name| name.eq_ignore_ascii_case("content-type"))
}

fn with_query(url: &str, params: &BTreeMap<String, String>) -> String {
    let query = build_query(params);
    if query.is_empty() {
        url.to_string()
    } else if url.contains('?') {
        format!("{url}&{query}")
    } else {
        format!("{url}?{query}")
    }
}

fn read_text(mut response: ureq::http::Response<ureq::Body>) -> Result<String, FetchError> {
    if !response.status().is_success() {
        return Err(status_error(response));
    }
    response.body_mut().read_to_string().map_err(classify)
}

fn read_cookies(mut response: ureq::http::Response<ureq::Body>) -> Result<Vec<String>, FetchError> {
    let status = response.status();
    if !status.is_success() && !status.is_redirection() {
        return Err(status_error(response));
    }
    let cookies: Vec<String> = response
        .headers()
        .get_all("set-cookie")
        .iter()
        .filter_map(|value| value.to_str().ok().map(str::to_string))
        .collect();
    let body = response.body_mut().read_to_string().map_err(classify)?;
    if let Some(message) = response::extract_error_message(&body) {
        return Err(FetchError::Application(message));
    }
    Ok(cookies)
}

fn status_error(mut response: ureq::http::Response<ureq::Body>) -> FetchError {
    let status = response.status();
    let body = response.body_mut().read_to_string().unwrap_or_default();
    let body = if body.trim().is_empty() {
        status.to_string()
    } else {
        body
    };
    FetchError::Status {
        status: status.as_u16(),
        body,
    }
}

fn header_string(headers: &ureq::http::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn with_query_appends_question_mark() {
        let url = with_query("http://host/path", &params(&[("a", "1")]));
        assert_eq!(url, "http://host/path?a=1");
    }

    #[test]
    fn with_query_extends_existing_query() {
        let url = with_query("http://host/path?x=1", &params(&[("a", "1")]));
        assert_eq!(url, "http://host/path?x=1&a=1");
    }

    #[test]
    fn with_query_leaves_url_untouched_without_params() {
        let url = with_query("http://host/path", &BTreeMap::new());
        assert_eq!(url, "http://host/path");
    }

    #[test]
    fn merge_headers_applies_defaults() {
        let merged = merge_headers(&BTreeMap::new());
        assert_eq!(merged.get("Accept").map(String::as_str), Some(ACCEPT));
        assert_eq!(
            merged.get("User-Agent").map(String::as_str),
            Some(USER_AGENT)
        );
    }

    #[test]
    fn merge_headers_caller_overrides_default() {
        let merged = merge_headers(&params(&[("accept", "application/json")]));
        assert_eq!(
            merged.get("accept").map(String::as_str),
            Some("application/json")
        );
        assert!(merged.get("Accept").is_none());
    }

    #[test]
    fn merge_headers_skips_empty_entries() {
        let merged = merge_headers(&params(&[("Accept", ""), ("", "x"), ("X-Token", "t")]));
        assert_eq!(merged.get("Accept").map(String::as_str), Some(ACCEPT));
        assert_eq!(merged.get("X-Token").map(String::as_str), Some("t"));
        assert!(!merged.contains_key(""));
    }

    #[test]
    fn has_content_type_is_case_insensitive() {
        assert!(has_content_type(&params(&[("CONTENT-TYPE", "text/plain")])));
        assert!(!has_content_type(&params(&[("Accept", "text/plain")])));
    }
}
