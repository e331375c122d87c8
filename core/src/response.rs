//! Response charset resolution, business-error detection, and streamed
//! bodies.
//!
//! # Design
//! Some upstream portals report failures inside an otherwise-200 HTML page,
//! marked by a fixed `<h5>` snippet. The cookie operations scan for that
//! marker and surface the embedded message as `FetchError::Application`;
//! a CAPTCHA prompt is the one message that is not an error from the
//! caller's point of view and is ignored.

use std::fmt;
use std::io::{self, Read};

/// Charset assumed when a response declares none.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// HTML snippet that precedes an application-level error message.
pub(crate) const ERROR_MARKER: &str =
    "<h5 id=\"errorMes\" style=\"color: #ff6600; display: none; font-size: 11px;\">";

/// Messages containing this are CAPTCHA prompts, not failures.
const CAPTCHA_HINT: &str = "验证码";

/// Parse the `charset=` parameter out of a content-type header value.
///
/// Falls back to [`DEFAULT_CHARSET`] when the header is absent, has no
/// charset parameter, or the parameter is malformed. The first `charset`
/// parameter wins.
pub fn resolve_charset(content_type: Option<&str>) -> String {
    let Some(ctype) = content_type else {
        return DEFAULT_CHARSET.to_string();
    };
    for param in ctype.split(';') {
        let param = param.trim();
        if param.starts_with("charset") {
            let mut parts = param.splitn(2, '=');
            parts.next();
            if let Some(value) = parts.next() {
                let value = value.trim();
                if !value.is_empty() {
                    return value.to_string();
                }
            }
            break;
        }
    }
    DEFAULT_CHARSET.to_string()
}

/// Extract the business error message embedded after [`ERROR_MARKER`].
///
/// Returns `None` when the marker is absent, unterminated, empty, or a
/// CAPTCHA prompt.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    let start = body.find(ERROR_MARKER)? + ERROR_MARKER.len();
    let rest = &body[start..];
    let end = rest.find("</h5>")?;
    let message = rest[..end].trim();
    if message.is_empty() || message.contains(CAPTCHA_HINT) {
        return None;
    }
    Some(message.to_string())
}

/// An unconsumed response body.
///
/// Returned by `client::get_stream`. Implements [`Read`] over the raw bytes;
/// the response content type and resolved charset ride along so callers can
/// decode the stream themselves. Dropping the value releases the underlying
/// connection.
pub struct BodyStream {
    content_type: Option<String>,
    charset: String,
    reader: ureq::BodyReader<'static>,
}

impl BodyStream {
    pub(crate) fn new(content_type: Option<String>, reader: ureq::BodyReader<'static>) -> Self {
        let charset = resolve_charset(content_type.as_deref());
        Self {
            content_type,
            charset,
            reader,
        }
    }

    /// The response `Content-Type` header value, if any.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// The charset resolved from the content type, [`DEFAULT_CHARSET`] when
    /// undeclared.
    pub fn charset(&self) -> &str {
        &self.charset
    }
}

impl Read for BodyStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}

impl fmt::Debug for BodyStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyStream")
            .field("content_type", &self.content_type)
            .field("charset", &self.charset)
            .finish_non_exhaustive()
    }
}
