//! Live validation probes for keyrack credentials.
//!
//! A probe issues the cheapest possible provider request that yields a
//! definitive answer about whether a secret is currently usable for a given
//! model. Probes never persist anything and never mutate registry state.

mod catalog;
mod family;
mod transport;

pub use catalog::{CatalogError, ModelCatalog};
pub use family::{AuthStyle, ProviderFamily};
pub use transport::{HttpTransport, PROBE_TIMEOUT, ProbeRequest, Transport, TransportError};

/// Outcome of probing a secret+model pair against its provider.
///
/// All four cases are ordinary values reported to the user, never fatal
/// errors. A single attempt is authoritative; there are no retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The provider answered with a success status.
    Succeeded,
    /// The provider answered with a non-success status. No distinction is
    /// made between a bad key and a bad model.
    Rejected,
    /// The request could not complete at all (network failure or timeout).
    Unreachable,
    /// No endpoint is configured for this model family; no request was made.
    Unsupported,
}

impl ProbeOutcome {
    /// Whether the probe proved the credential usable.
    pub fn is_success(self) -> bool {
        self == Self::Succeeded
    }
}

/// Issues validation probes through a [`Transport`].
pub struct Prober<T: Transport> {
    transport: T,
}

impl Prober<HttpTransport> {
    /// Prober over the real HTTP transport.
    pub fn new() -> Self {
        Self {
            transport: HttpTransport::new(),
        }
    }
}

impl Default for Prober<HttpTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> Prober<T> {
    /// Prober over a custom transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Probe whether `secret` is currently usable for `model`.
    ///
    /// Dispatches by model-family prefix; unknown families short-circuit to
    /// [`ProbeOutcome::Unsupported`] without touching the network.
    pub async fn probe(&self, secret: &str, model: &str) -> ProbeOutcome {
        let Some(family) = ProviderFamily::for_model(model) else {
            tracing::debug!(model, "no provider family configured, skipping probe");
            return ProbeOutcome::Unsupported;
        };
        tracing::debug!(family = family.name, model, "dispatching probe");
        match self.transport.post(family.request(secret, model)).await {
            Ok(status) if (200..300).contains(&status) => ProbeOutcome::Succeeded,
            Ok(status) => {
                tracing::warn!(status, "probe rejected by provider");
                ProbeOutcome::Rejected
            }
            Err(e) => {
                tracing::warn!("probe unreachable: {e}");
                ProbeOutcome::Unreachable
            }
        }
    }
}
