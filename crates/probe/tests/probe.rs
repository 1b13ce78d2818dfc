//! Tests for probe dispatch and outcome mapping.

use keyrack_probe::{ProbeOutcome, ProbeRequest, Prober, Transport, TransportError};
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// Transport that records calls and replies with a fixed result.
#[derive(Default)]
struct MockTransport {
    calls: AtomicUsize,
    last_request: Mutex<Option<ProbeRequest>>,
    status: u16,
    unreachable: bool,
}

impl MockTransport {
    fn with_status(status: u16) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    fn down() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_request(&self) -> ProbeRequest {
        self.last_request
            .lock()
            .unwrap()
            .clone()
            .expect("a request was sent")
    }
}

impl Transport for MockTransport {
    async fn post(&self, request: ProbeRequest) -> Result<u16, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        if self.unreachable {
            return Err(TransportError::Unreachable("connection refused".into()));
        }
        Ok(self.status)
    }
}

fn header<'a>(request: &'a ProbeRequest, name: &str) -> Option<&'a str> {
    request
        .headers
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| v.as_str())
}

#[tokio::test]
async fn unknown_family_is_unsupported_without_network() {
    let transport = MockTransport::with_status(200);
    let prober = Prober::with_transport(&transport);
    let outcome = prober.probe("sk-whatever", "unknown-model-family").await;
    assert_eq!(outcome, ProbeOutcome::Unsupported);
    assert_eq!(transport.calls(), 0);
}

#[tokio::test]
async fn success_status_succeeds() {
    let transport = MockTransport::with_status(200);
    let prober = Prober::with_transport(&transport);
    let outcome = prober.probe("sk-abc", "gpt-4o").await;
    assert_eq!(outcome, ProbeOutcome::Succeeded);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let transport = MockTransport::with_status(401);
    let prober = Prober::with_transport(&transport);
    assert_eq!(prober.probe("bad", "gpt-4o").await, ProbeOutcome::Rejected);

    let transport = MockTransport::with_status(500);
    let prober = Prober::with_transport(&transport);
    assert_eq!(prober.probe("sk-abc", "gpt-4o").await, ProbeOutcome::Rejected);
}

#[tokio::test]
async fn transport_failure_is_unreachable() {
    let transport = MockTransport::down();
    let prober = Prober::with_transport(&transport);
    assert_eq!(
        prober.probe("sk-abc", "gemini-1.5-pro").await,
        ProbeOutcome::Unreachable
    );
}

#[tokio::test]
async fn gemini_probe_uses_goog_header_and_model_path() {
    let transport = MockTransport::with_status(200);
    let prober = Prober::with_transport(&transport);
    prober.probe("g-secret", "gemini-1.5-pro").await;

    let request = transport.last_request();
    assert!(request.url.contains("generativelanguage.googleapis.com"));
    assert!(request.url.contains("gemini-1.5-pro:generateContent"));
    assert_eq!(header(&request, "x-goog-api-key"), Some("g-secret"));
    assert!(header(&request, "authorization").is_none());
    assert!(request.body["contents"][0]["parts"][0]["text"].is_string());
}

#[tokio::test]
async fn openai_probe_uses_bearer_auth() {
    let transport = MockTransport::with_status(200);
    let prober = Prober::with_transport(&transport);
    prober.probe("sk-abc", "gpt-4o").await;

    let request = transport.last_request();
    assert_eq!(request.url, "https://api.openai.com/v1/responses");
    assert_eq!(header(&request, "authorization"), Some("Bearer sk-abc"));
    assert_eq!(request.body["model"], "gpt-4o");
}

#[tokio::test]
async fn claude_probe_sends_version_header() {
    let transport = MockTransport::with_status(200);
    let prober = Prober::with_transport(&transport);
    prober.probe("sk-ant", "claude-sonnet-4-0").await;

    let request = transport.last_request();
    assert_eq!(request.url, "https://api.anthropic.com/v1/messages");
    assert_eq!(header(&request, "x-api-key"), Some("sk-ant"));
    assert_eq!(header(&request, "anthropic-version"), Some("2023-06-01"));
    assert_eq!(request.body["max_tokens"], 1);
}
