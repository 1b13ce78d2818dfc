//! Credential registry: CRUD over the persistent store, the
//! single-active-entry invariant, and the workflow controller that turns
//! user intents into registry calls.

mod error;
mod service;
mod workflow;

pub use error::RegistryError;
pub use service::Registry;
pub use workflow::{Draft, SessionState, View, Workflow};
