//! Workflow controller: one interactive session over the registry.
//!
//! Translates user intents (add, edit, delete, test) into registry calls,
//! chains probe results into activation decisions, and re-renders the full
//! store snapshot after every mutation. All methods take `&mut self`, so no
//! two mutating operations can overlap by construction.

use crate::{Registry, RegistryError};
use probe::{ProbeOutcome, Prober, Transport};
use store::{CredentialEntry, Store};

/// Render seam for the presentation layer.
///
/// The controller never mutates a cached view incrementally; it always
/// hands the renderer a fresh full snapshot.
pub trait View {
    fn render(&mut self, entries: &[CredentialEntry]);
}

/// In-progress form fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub name: String,
    pub secret: String,
    pub model: String,
}

/// Controller session state. One in-progress action at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing in progress.
    Idle,
    /// Add form open. `tested` holds the exact field values of the last
    /// successful probe; any divergence from `draft` invalidates it.
    Composing { draft: Draft, tested: Option<Draft> },
    /// A probe for the draft fields is in flight.
    Testing { draft: Draft },
    /// Edit form open for an existing entry. Same `tested` rule as
    /// `Composing`.
    Editing {
        id: i64,
        draft: Draft,
        tested: Option<Draft>,
    },
    /// Delete requested, awaiting confirm or cancel.
    ConfirmingDelete { id: i64 },
}

/// Orchestrates one interactive session.
pub struct Workflow<S: Store, T: Transport, V: View> {
    registry: Registry<S>,
    prober: Prober<T>,
    view: V,
    state: SessionState,
}

impl<S: Store, T: Transport, V: View> Workflow<S, T, V> {
    pub fn new(registry: Registry<S>, prober: Prober<T>, view: V) -> Self {
        Self {
            registry,
            prober,
            view,
            state: SessionState::Idle,
        }
    }

    /// Current session state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The underlying registry, for read paths and bulk operations.
    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    /// Open the add form with empty fields.
    pub fn open_add(&mut self) {
        self.state = SessionState::Composing {
            draft: Draft::default(),
            tested: None,
        };
    }

    /// Open the edit form for `id`, pre-filled with its current fields.
    pub async fn open_edit(&mut self, id: i64) -> Result<(), RegistryError> {
        let entry = self.registry.get_entry(id).await?;
        self.state = SessionState::Editing {
            id,
            draft: Draft {
                name: entry.name.to_string(),
                secret: entry.secret,
                model: entry.model.to_string(),
            },
            tested: None,
        };
        Ok(())
    }

    /// Mutate the open draft. No-op outside `Composing`/`Editing`.
    ///
    /// Edits never clear the tested flag directly; `submit` compares the
    /// tested fields against the final draft, so only an exact match
    /// counts.
    pub fn edit_draft(&mut self, f: impl FnOnce(&mut Draft)) {
        match &mut self.state {
            SessionState::Composing { draft, .. } | SessionState::Editing { draft, .. } => {
                f(draft)
            }
            _ => {}
        }
    }

    /// Probe the current draft fields without persisting anything.
    ///
    /// On success the exact field values are remembered so a following
    /// `submit` can activate the entry; any other outcome clears that
    /// memory.
    pub async fn test(&mut self) -> Result<ProbeOutcome, RegistryError> {
        let previous = self.state.clone();
        let draft = match &previous {
            SessionState::Composing { draft, .. } | SessionState::Editing { draft, .. } => {
                draft.clone()
            }
            _ => return Err(RegistryError::Validation("no form is open")),
        };
        if draft.secret.trim().is_empty() || draft.model.trim().is_empty() {
            return Err(RegistryError::Validation(
                "secret and model are required to test",
            ));
        }

        self.state = SessionState::Testing {
            draft: draft.clone(),
        };
        let outcome = self.prober.probe(&draft.secret, &draft.model).await;

        let tested = outcome.is_success().then(|| draft.clone());
        self.state = match previous {
            SessionState::Editing { id, draft, .. } => SessionState::Editing { id, draft, tested },
            _ => SessionState::Composing { draft, tested },
        };
        Ok(outcome)
    }

    /// Submit the open form: add in `Composing`, update in `Editing`.
    ///
    /// Activation is requested only when the last successful test matches
    /// the submitted fields exactly. On error the form stays open with its
    /// draft intact and the store unchanged. Returns the new id for adds.
    pub async fn submit(&mut self) -> Result<Option<i64>, RegistryError> {
        match self.state.clone() {
            SessionState::Composing { draft, tested } => {
                let mark_active = tested.as_ref() == Some(&draft);
                let id = self
                    .registry
                    .add_entry(&draft.name, &draft.secret, &draft.model, mark_active)
                    .await?;
                self.state = SessionState::Idle;
                self.refresh().await?;
                Ok(Some(id))
            }
            SessionState::Editing { id, draft, tested } => {
                let mark_active = tested.as_ref() == Some(&draft);
                self.registry
                    .update_entry(id, &draft.name, &draft.secret, &draft.model, mark_active)
                    .await?;
                self.state = SessionState::Idle;
                self.refresh().await?;
                Ok(None)
            }
            _ => Err(RegistryError::Validation("no form is open")),
        }
    }

    /// Begin a gated delete for `id`.
    pub fn request_delete(&mut self, id: i64) {
        self.state = SessionState::ConfirmingDelete { id };
    }

    /// Confirm the pending delete. No-op when no delete is pending.
    pub async fn confirm_delete(&mut self) -> Result<(), RegistryError> {
        if let SessionState::ConfirmingDelete { id } = self.state {
            self.registry.delete_entry(id).await?;
            self.state = SessionState::Idle;
            self.refresh().await?;
        }
        Ok(())
    }

    /// Abandon the in-progress action and return to idle. No store effect.
    pub fn cancel(&mut self) {
        self.state = SessionState::Idle;
    }

    /// Activate an existing entry directly from the table.
    pub async fn set_active(&mut self, id: i64) -> Result<(), RegistryError> {
        self.registry.activate(id).await?;
        self.refresh().await
    }

    /// Re-fetch the full snapshot and render it.
    pub async fn refresh(&mut self) -> Result<(), RegistryError> {
        let entries = self.registry.list_entries().await?;
        self.view.render(&entries);
        Ok(())
    }
}
