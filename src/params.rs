// Header and cookie handling for probes
// Malformed entries are dropped, never reported as errors

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, COOKIE, USER_AGENT};
use tracing::debug;

/// `Name: Value` -> (name, value), both trimmed. `None` without a colon.
pub fn parse_header(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once(':')?;
    Some((name.trim().to_string(), value.trim().to_string()))
}

/// `name=value` -> (name, value), untrimmed. `None` without an equals sign.
pub fn parse_cookie(raw: &str) -> Option<(String, String)> {
    let (name, value) = raw.split_once('=')?;
    Some((name.to_string(), value.to_string()))
}

pub fn parse_headers<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<(String, String)> {
    raw.into_iter()
        .filter_map(|h| {
            let parsed = parse_header(h);
            if parsed.is_none() {
                debug!(header = h, "dropping header without ':' separator");
            }
            parsed
        })
        .collect()
}

pub fn parse_cookies<'a>(raw: impl IntoIterator<Item = &'a str>) -> Vec<(String, String)> {
    raw.into_iter()
        .filter_map(|c| {
            let parsed = parse_cookie(c);
            if parsed.is_none() {
                debug!(cookie = c, "dropping cookie without '=' separator");
            }
            parsed
        })
        .collect()
}

/// Builds the header set for one probe.
///
/// Custom headers go in first, in order and with duplicates kept. The
/// configured User-Agent then replaces any custom `User-Agent`. Cookies are
/// joined into a single `Cookie` header, appended to every custom `Cookie`
/// value in order.
/// Names or values that are not valid HTTP are skipped.
pub fn build_header_map(
    headers: &[(String, String)],
    cookies: &[(String, String)],
    user_agent: &str,
) -> HeaderMap {
    let mut map = HeaderMap::new();

    for (name, value) in headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                map.append(name, value);
            }
            _ => debug!(header = %name, "dropping header with invalid name or value"),
        }
    }

    match HeaderValue::from_str(user_agent) {
        Ok(value) => {
            map.insert(USER_AGENT, value);
        }
        Err(_) => debug!(user_agent, "user agent is not a valid header value"),
    }

    if !cookies.is_empty() {
        let jar = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        let mut parts: Vec<String> = map
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect();
        parts.push(jar);
        let combined = parts.join("; ");
        match HeaderValue::from_str(&combined) {
            Ok(value) => {
                map.insert(COOKIE, value);
            }
            Err(_) => debug!("dropping cookies that do not form a valid header value"),
        }
    }

    map
}
