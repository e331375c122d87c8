//! Upstream stub for exercising the HTTP helpers over real connections.
//!
//! Stateless router: echo endpoints for queries, forms, and bodies, a login
//! endpoint that issues cookies or an error-marker page, a GBK-encoded page,
//! a redirect, a slow endpoint, and a failing endpoint. Fixture strings
//! (the error marker, cookie values) are written out here independently of
//! the client crate so integration tests catch drift.

use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::RawQuery,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What `/echo` reports back about the request it received.
#[derive(Debug, Serialize, Deserialize)]
pub struct EchoedRequest {
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
    pub body: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub account: String,
    pub password: String,
    #[serde(default)]
    pub captcha: Option<String>,
}

/// "你好" in GBK.
pub const GBK_GREETING: &[u8] = &[0xC4, 0xE3, 0xBA, 0xC3];

pub const DOWNLOAD_PAYLOAD: &[u8] = b"\x00\x01binary payload\xfe\xff";

pub fn app() -> Router {
    Router::new()
        .route("/query", get(echo_query))
        .route("/form", post(echo_form))
        .route("/echo", post(echo))
        .route("/login", post(login).get(login_page))
        .route("/redirect", get(redirect))
        .route("/gbk", get(gbk))
        .route("/slow", get(slow))
        .route("/fail", get(fail))
        .route("/download", get(download))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo_query(RawQuery(query): RawQuery) -> String {
    query.unwrap_or_default()
}

async fn echo_form(Form(fields): Form<BTreeMap<String, String>>) -> Json<BTreeMap<String, String>> {
    Json(fields)
}

async fn echo(headers: HeaderMap, body: String) -> Json<EchoedRequest> {
    Json(EchoedRequest {
        content_type: header_string(&headers, header::CONTENT_TYPE),
        accept: header_string(&headers, header::ACCEPT),
        user_agent: header_string(&headers, header::USER_AGENT),
        body,
    })
}

async fn login(Form(input): Form<LoginInput>) -> Response {
    if input.password != "secret" {
        return Html(error_page("账号或密码错误")).into_response();
    }
    if input.captcha.as_deref() == Some("expired") {
        // session cookie is still issued alongside the captcha prompt
        return (
            AppendHeaders([(header::SET_COOKIE, "sid=pending; Path=/")]),
            Html(error_page("请输入验证码后重试")),
        )
            .into_response();
    }
    (
        AppendHeaders([
            (header::SET_COOKIE, "sid=abc123; Path=/; HttpOnly"),
            (header::SET_COOKIE, "token=tok-789; Path=/"),
        ]),
        Html("<html><body>welcome</body></html>".to_string()),
    )
        .into_response()
}

/// GET variant used by the cookie-over-GET path: same cookies, no form.
async fn login_page() -> impl IntoResponse {
    (
        AppendHeaders([
            (header::SET_COOKIE, "sid=abc123; Path=/; HttpOnly"),
            (header::SET_COOKIE, "token=tok-789; Path=/"),
        ]),
        Html("<html><body>welcome</body></html>".to_string()),
    )
}

async fn redirect() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        AppendHeaders([
            (header::LOCATION, "/query"),
            (header::SET_COOKIE, "hop=first; Path=/"),
        ]),
    )
}

async fn gbk() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html; charset=GBK")],
        GBK_GREETING,
    )
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(2)).await;
    "late"
}

async fn fail() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}

async fn download() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        DOWNLOAD_PAYLOAD,
    )
}

fn error_page(message: &str) -> String {
    format!(
        "<html><body><h5 id=\"errorMes\" style=\"color: #ff6600; display: none; font-size: 11px;\">{message}</h5></body></html>"
    )
}

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
