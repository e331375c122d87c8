//! Synchronous HTTP request helpers.
//!
//! # Overview
//! Stateless GET/POST helpers over `ureq`: form-encoded, JSON, and raw
//! bodies, per-call connect/read timeouts, `Set-Cookie` capture with
//! business-error detection, streamed bodies, response charset resolution,
//! and client-IP resolution from reverse-proxy headers.
//!
//! # Design
//! - Operations are free functions, no singleton and no shared agent; each
//!   call builds and drops its own single-use `ureq::Agent`.
//! - Every failure returns a typed [`FetchError`]; nothing is logged and
//!   swallowed.
//! - `Body` variants carry their own content type, so raw bodies can never
//!   be combined with parameter encoding.
//! - The mock-server crate defines its fixtures independently; integration
//!   tests catch drift.

pub mod client;
pub mod error;
pub mod forwarded;
pub mod http;
pub mod query;
pub mod response;

pub use client::{get, get_cookies, get_stream, post_form, post_form_cookies, post_json, post_raw};
pub use error::FetchError;
pub use forwarded::client_ip;
pub use http::{Body, Method, Timeouts};
pub use query::{build_query, VIEWSTATE_PARAM};
pub use response::{resolve_charset, BodyStream, DEFAULT_CHARSET};
