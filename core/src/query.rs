//! Query-string and form-body encoding.

use std::collections::BTreeMap;

/// Parameter name historically exempt from percent-encoding: legacy ASP.NET
/// endpoints reject an encoded view-state value.
pub const VIEWSTATE_PARAM: &str = "__VIEWSTATE";

/// Encode `params` as `key=value&...`.
///
/// Parameters with an empty name or empty value are dropped. Values are
/// percent-encoded (UTF-8), except for [`VIEWSTATE_PARAM`], whose value is
/// emitted as-is. Returns an empty string when no usable parameters remain.
pub fn build_query(params: &BTreeMap<String, String>) -> String {
    let mut query = String::new();
    for (name, value) in params {
        if name.is_empty() || value.is_empty() {
            continue;
        }
        if !query.is_empty() {
            query.push('&');
        }
        query.push_str(name);
        query.push('=');
        if name == VIEWSTATE_PARAM {
            query.push_str(value);
        } else {
            query.push_str(&urlencoding::encode(value));
        }
    }
    query
}
