// Verdict engine for verbscan
// Decides whether an allowed method is dangerous or exposes a vulnerability

use std::collections::HashSet;

use crate::methods::{DANGEROUS_METHODS, SAFE_METHODS};
use crate::models::ProbeOutcome;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// Depends on the method name only, never on the response
    pub is_dangerous_method: bool,
    pub is_vulnerable: bool,
    pub description: Option<String>,
}

pub const CROSS_SITE_TRACING: &str =
    "TRACE method enabled and echoing request headers (potential Cross-Site Tracing vulnerability)";

pub fn dangerous_method_allowed(method: &str) -> String {
    format!("Potentially dangerous method {} is allowed", method)
}

pub fn verb_tampering(method: &str) -> String {
    format!("Potential HTTP verb tampering vulnerability with method {}", method)
}

/// Classifies probe outcomes against a fixed method table.
///
/// Rules run in a fixed order and each one that matches overwrites the
/// description left by the previous one:
/// 1. dangerous method answered with a 2xx/3xx status
/// 2. TRACE answered 200 with the sent User-Agent echoed in the body
/// 3. any method other than GET/HEAD/OPTIONS answered 200 or 204
///
/// So a TRACE that echoes the User-Agent with a 200 ends up described as
/// verb tampering, not cross-site tracing.
#[derive(Debug, Clone)]
pub struct Classifier {
    dangerous: HashSet<String>,
    safe: HashSet<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            DANGEROUS_METHODS.iter().copied(),
            SAFE_METHODS.iter().copied(),
        )
    }
}

impl Classifier {
    pub fn new<'a>(
        dangerous: impl IntoIterator<Item = &'a str>,
        safe: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            dangerous: dangerous.into_iter().map(str::to_string).collect(),
            safe: safe.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn is_dangerous(&self, method: &str) -> bool {
        self.dangerous.contains(method)
    }

    /// `sent_user_agent` is the User-Agent the probe actually sent.
    pub fn classify(&self, method: &str, outcome: &ProbeOutcome, sent_user_agent: &str) -> Verdict {
        let mut verdict = Verdict {
            is_dangerous_method: self.is_dangerous(method),
            ..Verdict::default()
        };

        if outcome.is_transport_failure() {
            return verdict;
        }
        let status = outcome.status_code;

        if verdict.is_dangerous_method && (200..400).contains(&status) {
            verdict.is_vulnerable = true;
            verdict.description = Some(dangerous_method_allowed(method));
        }

        if method == "TRACE" && status == 200 && body_contains(&outcome.body, sent_user_agent) {
            verdict.is_vulnerable = true;
            verdict.description = Some(CROSS_SITE_TRACING.to_string());
        }

        if !self.safe.contains(method) && matches!(status, 200 | 204) {
            verdict.is_vulnerable = true;
            verdict.description = Some(verb_tampering(method));
        }

        verdict
    }
}

fn body_contains(body: &[u8], needle: &str) -> bool {
    String::from_utf8_lossy(body).contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::methods::DEFAULT_METHODS;

    const UA: &str = "verbscan-test/1.0";

    fn outcome(method: &str, status_code: u16, body: &str) -> ProbeOutcome {
        ProbeOutcome {
            method: method.to_string(),
            status_code,
            status_text: format!("{}", status_code),
            elapsed_ms: 5,
            body_bytes: body.len(),
            transport_error: None,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn dangerous_methods_allowed_are_vulnerable() {
        let classifier = Classifier::default();
        for method in DANGEROUS_METHODS.iter() {
            for status in [200u16, 201, 204, 301, 302, 399] {
                let verdict = classifier.classify(method, &outcome(method, status, ""), UA);
                assert!(verdict.is_dangerous_method);
                assert!(verdict.is_vulnerable, "{} {} should be vulnerable", method, status);
            }
        }
    }

    #[test]
    fn dangerous_method_description_when_only_rule_a_fires() {
        let classifier = Classifier::default();
        let verdict = classifier.classify("DELETE", &outcome("DELETE", 302, ""), UA);
        assert_eq!(verdict.description.as_deref(), Some("Potentially dangerous method DELETE is allowed"));
    }

    #[test]
    fn rejected_dangerous_method_is_not_vulnerable() {
        let classifier = Classifier::default();
        for status in [400u16, 403, 405, 500, 501] {
            let verdict = classifier.classify("PUT", &outcome("PUT", status, ""), UA);
            assert!(verdict.is_dangerous_method);
            assert!(!verdict.is_vulnerable);
            assert_eq!(verdict.description, None);
        }
    }

    #[test]
    fn verb_tampering_overrides_every_earlier_rule() {
        let classifier = Classifier::default();
        for method in DEFAULT_METHODS.iter().filter(|m| !SAFE_METHODS.contains(*m)) {
            for status in [200u16, 204] {
                let verdict = classifier.classify(method, &outcome(method, status, UA), UA);
                assert!(verdict.is_vulnerable);
                assert_eq!(verdict.description, Some(verb_tampering(method)));
            }
        }
    }

    #[test]
    fn safe_methods_are_never_tampering() {
        let classifier = Classifier::default();
        for method in SAFE_METHODS {
            let verdict = classifier.classify(method, &outcome(method, 200, ""), UA);
            assert!(!verdict.is_vulnerable);
            assert!(!verdict.is_dangerous_method);
        }
    }

    #[test]
    fn trace_echo_on_200_is_reported_as_tampering() {
        let classifier = Classifier::default();
        let body = format!("TRACE / HTTP/1.1\r\nUser-Agent: {}\r\n", UA);
        let verdict = classifier.classify("TRACE", &outcome("TRACE", 200, &body), UA);
        assert!(verdict.is_vulnerable);
        assert_eq!(verdict.description, Some(verb_tampering("TRACE")));
    }

    #[test]
    fn trace_echo_description_survives_without_tampering_rule() {
        // With TRACE treated as safe the tampering rule cannot fire,
        // leaving the cross-site tracing description in place.
        let classifier = Classifier::new(["TRACE"], ["GET", "HEAD", "OPTIONS", "TRACE"]);
        let body = format!("User-Agent: {}", UA);
        let verdict = classifier.classify("TRACE", &outcome("TRACE", 200, &body), UA);
        assert_eq!(verdict.description.as_deref(), Some(CROSS_SITE_TRACING));
    }

    #[test]
    fn trace_without_echo_keeps_dangerous_description() {
        let classifier = Classifier::new(["TRACE"], ["GET", "HEAD", "OPTIONS", "TRACE"]);
        let verdict = classifier.classify("TRACE", &outcome("TRACE", 200, "nothing here"), UA);
        assert_eq!(verdict.description, Some(dangerous_method_allowed("TRACE")));
    }

    #[test]
    fn transport_failures_are_never_vulnerable() {
        let classifier = Classifier::default();
        let failed = ProbeOutcome::transport_failure("PUT", "timed out", 10_000);
        let verdict = classifier.classify("PUT", &failed, UA);
        assert!(verdict.is_dangerous_method);
        assert!(!verdict.is_vulnerable);
        assert_eq!(verdict.description, None);
    }

    #[test]
    fn classification_is_idempotent() {
        let classifier = Classifier::default();
        let probe = outcome("TRACE", 200, UA);
        let first = classifier.classify("TRACE", &probe, UA);
        let second = classifier.classify("TRACE", &probe, UA);
        assert_eq!(first, second);
    }

    #[test]
    fn method_names_are_case_sensitive() {
        let classifier = Classifier::default();
        assert!(!classifier.is_dangerous("put"));
        assert!(classifier.is_dangerous("PUT"));
    }
}
