//! Deliverability header construction

use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};

use crate::domain::dispatch::{config::DispatchConfig, request::SendRequest};

/// An insertion-ordered header name to value mapping.
///
/// Always contains a `Message-ID`, exactly one `List-Unsubscribe` value and
/// a `Return-Path` equal to the bare sender address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderSet(Vec<(String, String)>);

impl HeaderSet {
    /// Set a header, replacing an existing value in place
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();

        match self.0.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    /// Get a header value by name
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// The headers in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// The `Message-ID` value
    pub fn message_id(&self) -> &str {
        self.get("Message-ID").unwrap_or_default()
    }
}

/// Build the deliverability and compliance header set for a request.
///
/// Deterministic given the request and `now`, except the generated message
/// id token when the caller supplied none. Custom headers are merged last
/// and may override any fixed header, but `Message-ID` and `Return-Path`
/// are force-set afterwards and cannot be spoofed.
pub fn build(config: &DispatchConfig, request: &SendRequest, now: DateTime<Utc>) -> HeaderSet {
    let timestamp = now.timestamp_millis();

    let message_id = request
        .message_id
        .clone()
        .unwrap_or_else(|| generate_message_id(&config.sender, &config.fallback_domain, timestamp));

    let mut headers = HeaderSet::default();

    headers.set("X-Entity-Ref-ID", timestamp.to_string());
    headers.set("Feedback-ID", format!("campaign-{timestamp}"));
    headers.set("List-Unsubscribe-Post", "List-Unsubscribe=One-Click");
    headers.set(
        "X-Report-Abuse",
        format!("Please report abuse to {}", config.abuse_contact),
    );
    headers.set("X-Auto-Response-Suppress", "OOF, AutoReply, AutoForward");
    headers.set("Precedence", "bulk");
    headers.set("X-Priority", "3");
    headers.set("X-Mailer", config.mailer_ident.clone());

    let unsubscribe = match &request.unsubscribe_url {
        Some(url) => format!("<{url}>, <mailto:{}>", config.unsubscribe_address),
        None => format!("<mailto:{}>", config.unsubscribe_address),
    };
    headers.set("List-Unsubscribe", unsubscribe);

    for (name, value) in &request.headers {
        headers.set(name, value.clone());
    }

    // Identity headers win over any custom override
    headers.set("Message-ID", message_id);
    headers.set("Return-Path", config.sender.clone());

    headers
}

/// `<millisecond-timestamp.random-token@sending-domain>`, where the sending
/// domain falls back to the configured domain when the sender address has
/// no `@`.
fn generate_message_id(sender: &str, fallback_domain: &str, timestamp: i64) -> String {
    let domain = sender
        .split_once('@')
        .map(|(_, domain)| domain)
        .unwrap_or(fallback_domain);

    let token: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(13)
        .map(|c| (c as char).to_ascii_lowercase())
        .collect();

    format!("<{timestamp}.{token}@{domain}>")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use lazy_static::lazy_static;
    use regex::Regex;

    use super::*;

    lazy_static! {
        static ref MESSAGE_ID_REGEX: Regex =
            Regex::new(r"^<\d+\.[a-z0-9]+@example\.com>$").unwrap();
    }

    fn request() -> SendRequest {
        SendRequest {
            to: vec!["email@example.com".to_string()],
            subject: "Hello".to_string(),
            text: Some("Hi".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_fixed_headers_are_present() {
        let headers = build(&DispatchConfig::default(), &request(), Utc::now());

        assert_eq!(
            headers.get("List-Unsubscribe-Post"),
            Some("List-Unsubscribe=One-Click")
        );
        assert_eq!(headers.get("Precedence"), Some("bulk"));
        assert_eq!(headers.get("X-Priority"), Some("3"));
        assert_eq!(headers.get("X-Mailer"), Some("BulkDispatch/1.0"));
        assert_eq!(
            headers.get("X-Auto-Response-Suppress"),
            Some("OOF, AutoReply, AutoForward")
        );
        assert_eq!(
            headers.get("X-Report-Abuse"),
            Some("Please report abuse to abuse@example.com")
        );
        assert!(headers.get("X-Entity-Ref-ID").is_some());
        assert!(headers.get("Feedback-ID").is_some());
    }

    #[test]
    fn test_list_unsubscribe_without_url() {
        let headers = build(&DispatchConfig::default(), &request(), Utc::now());

        assert_eq!(
            headers.get("List-Unsubscribe"),
            Some("<mailto:unsubscribe@example.com>")
        );
    }

    #[test]
    fn test_list_unsubscribe_with_url() {
        let mut request = request();
        request.unsubscribe_url = Some("https://x/unsub".to_string());

        let headers = build(&DispatchConfig::default(), &request, Utc::now());

        assert_eq!(
            headers.get("List-Unsubscribe"),
            Some("<https://x/unsub>, <mailto:unsubscribe@example.com>")
        );
    }

    #[test]
    fn test_caller_message_id_is_used_verbatim() {
        let mut request = request();
        request.message_id = Some("<fixed@example.com>".to_string());

        let headers = build(&DispatchConfig::default(), &request, Utc::now());

        assert_eq!(headers.message_id(), "<fixed@example.com>");
    }

    #[test]
    fn test_generated_message_id_shape() {
        let headers = build(&DispatchConfig::default(), &request(), Utc::now());

        assert!(
            MESSAGE_ID_REGEX.is_match(headers.message_id()),
            "unexpected message id: {}",
            headers.message_id()
        );
    }

    #[test]
    fn test_generated_message_id_uses_fallback_domain() {
        let config = DispatchConfig {
            sender: "no-at-sign".to_string(),
            fallback_domain: "fallback.org".to_string(),
            ..Default::default()
        };

        let headers = build(&config, &request(), Utc::now());

        assert!(headers.message_id().ends_with("@fallback.org>"));
    }

    #[test]
    fn test_custom_headers_override_fixed_ones() {
        let mut request = request();
        request.headers = BTreeMap::from([("X-Mailer".to_string(), "Custom/2.0".to_string())]);

        let headers = build(&DispatchConfig::default(), &request, Utc::now());

        assert_eq!(headers.get("X-Mailer"), Some("Custom/2.0"));
    }

    #[test]
    fn test_identity_headers_cannot_be_spoofed() {
        let mut request = request();
        request.message_id = Some("<fixed@example.com>".to_string());
        request.headers = BTreeMap::from([
            ("Message-ID".to_string(), "<spoofed>".to_string()),
            ("Return-Path".to_string(), "spoofed@evil.com".to_string()),
        ]);

        let headers = build(&DispatchConfig::default(), &request, Utc::now());

        assert_eq!(headers.message_id(), "<fixed@example.com>");
        assert_eq!(headers.get("Return-Path"), Some("sender@example.com"));
    }

    #[test]
    fn test_return_path_is_bare_sender_regardless_of_reply_to() {
        let mut request = request();
        request.reply_to = Some("reply@example.com".to_string());

        let headers = build(&DispatchConfig::default(), &request, Utc::now());

        assert_eq!(headers.get("Return-Path"), Some("sender@example.com"));
    }

    #[test]
    fn test_header_construction_is_idempotent_with_fixed_message_id() {
        let mut request = request();
        request.message_id = Some("<fixed@example.com>".to_string());
        let now = Utc::now();

        let first = build(&DispatchConfig::default(), &request, now);
        let second = build(&DispatchConfig::default(), &request, now);

        assert_eq!(first, second);
    }

    #[test]
    fn test_exactly_one_list_unsubscribe_value() {
        let mut request = request();
        request.headers = BTreeMap::from([(
            "List-Unsubscribe".to_string(),
            "<https://override>".to_string(),
        )]);

        let headers = build(&DispatchConfig::default(), &request, Utc::now());

        let count = headers
            .iter()
            .filter(|(name, _)| *name == "List-Unsubscribe")
            .count();

        assert_eq!(count, 1);
    }
}
