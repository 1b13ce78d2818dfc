//! Tests for the workflow controller state machine.

use keyrack_registry::{Draft, Registry, RegistryError, SessionState, View, Workflow};
use probe::{ProbeRequest, Prober, Transport, TransportError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use store::{CredentialEntry, SqliteStore};

/// Transport replying with a fixed status and counting calls.
#[derive(Clone)]
struct FixedTransport {
    status: u16,
    calls: Arc<AtomicUsize>,
}

impl FixedTransport {
    fn ok() -> Self {
        Self {
            status: 200,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: 401,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Transport for FixedTransport {
    async fn post(&self, _request: ProbeRequest) -> Result<u16, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.status)
    }
}

/// View recording every rendered snapshot.
#[derive(Clone, Default)]
struct RecordingView {
    snapshots: Arc<Mutex<Vec<Vec<CredentialEntry>>>>,
}

impl RecordingView {
    fn render_count(&self) -> usize {
        self.snapshots.lock().unwrap().len()
    }

    fn last(&self) -> Vec<CredentialEntry> {
        self.snapshots.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl View for RecordingView {
    fn render(&mut self, entries: &[CredentialEntry]) {
        self.snapshots.lock().unwrap().push(entries.to_vec());
    }
}

fn workflow(
    transport: FixedTransport,
) -> (
    Workflow<SqliteStore, FixedTransport, RecordingView>,
    RecordingView,
) {
    let view = RecordingView::default();
    let flow = Workflow::new(
        Registry::new(SqliteStore::in_memory()),
        Prober::with_transport(transport),
        view.clone(),
    );
    (flow, view)
}

fn fill(flow: &mut Workflow<SqliteStore, FixedTransport, RecordingView>) {
    flow.edit_draft(|d| {
        *d = Draft {
            name: "k1".into(),
            secret: "sk-aaaaaaaaaa".into(),
            model: "gpt-4".into(),
        };
    });
}

#[tokio::test]
async fn add_without_test_stays_inactive() {
    let (mut flow, view) = workflow(FixedTransport::ok());
    flow.open_add();
    fill(&mut flow);
    let id = flow.submit().await.unwrap();
    assert!(id.is_some());
    assert_eq!(*flow.state(), SessionState::Idle);

    let entries = view.last();
    assert_eq!(entries.len(), 1);
    assert!(!entries[0].active);
}

#[tokio::test]
async fn successful_test_then_add_activates() {
    let (mut flow, view) = workflow(FixedTransport::ok());
    flow.open_add();
    fill(&mut flow);
    let outcome = flow.test().await.unwrap();
    assert!(outcome.is_success());
    flow.submit().await.unwrap();

    let entries = view.last();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].active);
}

#[tokio::test]
async fn editing_fields_after_test_invalidates_flag() {
    let (mut flow, view) = workflow(FixedTransport::ok());
    flow.open_add();
    fill(&mut flow);
    flow.test().await.unwrap();
    // The secret changed after the successful test: the new entry must not
    // be activated.
    flow.edit_draft(|d| d.secret = "sk-bbbbbbbbbb".into());
    flow.submit().await.unwrap();

    assert!(!view.last()[0].active);
}

#[tokio::test]
async fn rejected_test_clears_flag() {
    let (mut flow, view) = workflow(FixedTransport::unauthorized());
    flow.open_add();
    fill(&mut flow);
    let outcome = flow.test().await.unwrap();
    assert!(!outcome.is_success());
    flow.submit().await.unwrap();

    assert!(!view.last()[0].active);
}

#[tokio::test]
async fn test_requires_secret_and_model() {
    let transport = FixedTransport::ok();
    let (mut flow, _view) = workflow(transport.clone());
    flow.open_add();
    flow.edit_draft(|d| d.name = "only-name".into());

    let err = flow.test().await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
    assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn submit_with_empty_fields_keeps_form_open() {
    let (mut flow, _view) = workflow(FixedTransport::ok());
    flow.open_add();
    flow.edit_draft(|d| d.name = "unfinished".into());

    let err = flow.submit().await.unwrap_err();
    assert!(matches!(err, RegistryError::Validation(_)));
    assert!(matches!(flow.state(), SessionState::Composing { .. }));
    assert!(flow.registry().list_entries().await.unwrap().is_empty());
}

#[tokio::test]
async fn edit_updates_entry_and_can_activate() {
    let (mut flow, view) = workflow(FixedTransport::ok());
    let id = flow
        .registry()
        .add_entry("k1", "sk-aaaaaaaaaa", "gpt-4", false)
        .await
        .unwrap();

    flow.open_edit(id).await.unwrap();
    flow.edit_draft(|d| d.secret = "sk-bbbbbbbbbb".into());
    flow.test().await.unwrap();
    flow.submit().await.unwrap();

    let entries = view.last();
    assert_eq!(entries[0].secret, "sk-bbbbbbbbbb");
    assert!(entries[0].active);
}

#[tokio::test]
async fn open_edit_missing_id_fails() {
    let (mut flow, _view) = workflow(FixedTransport::ok());
    let err = flow.open_edit(42).await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(42)));
    assert_eq!(*flow.state(), SessionState::Idle);
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let (mut flow, view) = workflow(FixedTransport::ok());
    let id = flow
        .registry()
        .add_entry("k1", "sk-aaaaaaaaaa", "gpt-4", false)
        .await
        .unwrap();

    // Cancelling leaves the entry in place and the store untouched.
    flow.request_delete(id);
    assert!(matches!(flow.state(), SessionState::ConfirmingDelete { .. }));
    flow.cancel();
    assert_eq!(flow.registry().list_entries().await.unwrap().len(), 1);

    // Confirming removes it and re-renders.
    flow.request_delete(id);
    flow.confirm_delete().await.unwrap();
    assert_eq!(*flow.state(), SessionState::Idle);
    assert!(view.last().is_empty());
}

#[tokio::test]
async fn every_mutation_rerenders_full_snapshot() {
    let (mut flow, view) = workflow(FixedTransport::ok());

    flow.open_add();
    fill(&mut flow);
    flow.submit().await.unwrap();
    assert_eq!(view.render_count(), 1);

    let id = view.last()[0].id.unwrap();
    flow.set_active(id).await.unwrap();
    assert_eq!(view.render_count(), 2);

    flow.request_delete(id);
    flow.confirm_delete().await.unwrap();
    assert_eq!(view.render_count(), 3);
    assert!(view.last().is_empty());
}
