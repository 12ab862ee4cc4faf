//! Lenient parsing of query strings and JSON request fields.
//!
//! Numbers are read the way the dashboard frontend sends them: as JSON
//! numbers or numeric strings, taking the leading integer part
//! (`"12abc"` is 12, `"1.9"` is 1).

use serde_json::Value;

/// Default `limit` for list endpoints.
pub const DEFAULT_LIMIT: i64 = 50;

/// Largest `limit` accepted by list endpoints.
pub const MAX_LIMIT: i64 = 100;

/// First value of `name` in a raw query string.
pub fn query_param<'a>(query: Option<&'a str>, name: &str) -> Option<&'a str> {
    query?.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}

/// Leading integer of a string, after optional whitespace and sign.
///
/// Returns `None` when no digit follows. Saturates instead of overflowing.
pub fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    let mut seen = false;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        seen = true;
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
    }
    seen.then_some(if negative { -value } else { value })
}

/// Integer from a JSON number or numeric string.
pub fn json_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => parse_int_prefix(&n.to_string()),
        Value::String(s) => parse_int_prefix(s),
        _ => None,
    }
}

/// `limit` query parameter: unparsable or zero means [`DEFAULT_LIMIT`],
/// then clamped to `1..=MAX_LIMIT`.
pub fn limit_param(query: Option<&str>) -> usize {
    let limit = query_param(query, "limit")
        .and_then(parse_int_prefix)
        .filter(|n| *n != 0)
        .unwrap_or(DEFAULT_LIMIT)
        .clamp(1, MAX_LIMIT);
    // 1..=100 범위
    limit as usize
}

/// Field of a JSON object body. Non-object bodies have no fields.
pub fn field<'a>(body: &'a Value, name: &str) -> Option<&'a Value> {
    body.as_object()?.get(name)
}
