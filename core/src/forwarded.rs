//! Client-IP resolution from reverse-proxy headers.

use tracing::debug;
use ureq::http::HeaderMap;

const FORWARDED_FOR: &str = "x-forwarded-for";
const REAL_IP: &str = "x-real-ip";

/// Resolve the originating client address of an inbound request.
///
/// Checks `X-Forwarded-For` (each proxy hop appends, so the first
/// comma-separated entry is the client), then `X-Real-IP`, then falls back
/// to `remote_addr`. Header values that are empty or the literal `unknown`
/// are skipped. The IPv6 loopback normalizes to `127.0.0.1`.
pub fn client_ip(headers: &HeaderMap, remote_addr: &str) -> String {
    if let Some(value) = usable_header(headers, FORWARDED_FOR) {
        let first = value.split(',').next().unwrap_or(value).trim();
        debug!("client ip from X-Forwarded-For: {first}");
        return normalize_loopback(first).to_string();
    }
    if let Some(value) = usable_header(headers, REAL_IP) {
        debug!("client ip from X-Real-IP: {value}");
        return normalize_loopback(value).to_string();
    }
    debug!("client ip from remote address: {remote_addr}");
    normalize_loopback(remote_addr).to_string()
}

fn usable_header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("unknown") {
        return None;
    }
    Some(value)
}

fn normalize_loopback(ip: &str) -> &str {
    if ip == "::1" || ip == "0:0:0:0:0:0:0:1" {
        "127.0.0.1"
    } else {
        ip
    }
}
