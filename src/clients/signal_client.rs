use crate::model::{CartSignal, PartitionHandle};
use crate::runtime::{call, zome, CallTarget, RuntimeClient, RuntimeError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sends [`CartSignal`]s to the participants of a joined cart partition.
#[derive(Clone)]
pub struct SignalClient {
    runtime: Arc<dyn RuntimeClient>,
    zome: String,
}

impl SignalClient {
    pub fn new(runtime: Arc<dyn RuntimeClient>, zome: impl Into<String>) -> Self {
        Self {
            runtime,
            zome: zome.into(),
        }
    }

    #[instrument(skip(self, signal), fields(partition = %partition))]
    pub async fn send(&self, partition: &PartitionHandle, signal: &CartSignal) -> Result<(), RuntimeError> {
        debug!(?signal, "Sending signal");
        call(
            self.runtime.as_ref(),
            CallTarget::Partition(partition.clone()),
            &self.zome,
            zome::SEND_REMOTE_SIGNAL,
            signal,
        )
        .await
    }
}
