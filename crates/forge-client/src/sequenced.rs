use crate::client::ForgeClient;
use crate::endpoint::Endpoint;
use crate::error::ClientError;
use crate::wire::{ApiResponse, GenerationRequest};
use crate::Result;
use forge_core::sequence::{RequestSequencer, Sequenced};
use serde::de::DeserializeOwned;
use tracing::warn;

/// [`ForgeClient`] wrapper that drops responses superseded by a newer
/// request for the same project and endpoint.
#[derive(Debug, Clone)]
pub struct SequencedClient {
    client: ForgeClient,
    sequencer: RequestSequencer,
}

impl SequencedClient {
    pub fn new(client: ForgeClient) -> Self {
        Self::with_sequencer(client, RequestSequencer::new())
    }

    pub fn with_sequencer(client: ForgeClient, sequencer: RequestSequencer) -> Self {
        Self { client, sequencer }
    }

    pub fn inner(&self) -> &ForgeClient {
        &self.client
    }

    pub fn sequencer(&self) -> &RequestSequencer {
        &self.sequencer
    }

    /// Last-issued-wins: concurrent calls are allowed, only the newest
    /// one's response comes back as `Fresh`. A superseded call reports
    /// `Stale` whether it succeeded or failed.
    pub async fn call<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: &GenerationRequest,
    ) -> Result<Sequenced<ApiResponse<T>>> {
        let ticket = self.sequencer.issue(endpoint.slot(&request.project_id));
        match self.client.call(endpoint, request).await {
            Ok(resp) => Ok(self.sequencer.accept(&ticket, resp)),
            Err(e) if !self.sequencer.is_current(&ticket) => {
                warn!(slot = %ticket.slot(), error = %e, "discarding stale failure");
                Ok(Sequenced::Stale)
            }
            Err(e) => Err(e),
        }
    }

    /// Like [`call`](Self::call) but refuses to start while a request for
    /// the same slot is still pending.
    pub async fn call_exclusive<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        request: &GenerationRequest,
    ) -> Result<Sequenced<ApiResponse<T>>> {
        let slot = endpoint.slot(&request.project_id);
        let _guard = self
            .sequencer
            .try_begin(slot.clone())
            .ok_or(ClientError::InFlight(slot))?;
        self.call(endpoint, request).await
    }
}
