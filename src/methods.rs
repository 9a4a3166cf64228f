// Static method tables
// The default probe list and the methods considered risky when a server allows them

use lazy_static::lazy_static;
use std::collections::HashSet;

/// Methods probed when no methods file is given, in probe order
pub const DEFAULT_METHODS: &[&str] = &[
    "GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS", "PATCH",
    "TRACE", "CONNECT", "PROPFIND", "PROPPATCH", "MKCOL", "COPY",
    "MOVE", "LOCK", "UNLOCK", "PURGE", "LINK", "UNLINK",
];

/// Methods that are never reported as verb tampering
pub const SAFE_METHODS: &[&str] = &["GET", "HEAD", "OPTIONS"];

lazy_static! {
    pub static ref DANGEROUS_METHODS: HashSet<&'static str> = [
        "PUT", "DELETE", "TRACE", "PROPFIND", "PROPPATCH",
        "MKCOL", "COPY", "MOVE", "LOCK", "UNLOCK",
    ]
    .into_iter()
    .collect();
}

pub fn default_methods() -> Vec<String> {
    DEFAULT_METHODS.iter().map(|m| m.to_string()).collect()
}
