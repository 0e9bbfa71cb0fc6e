use crate::components::feed::FeedSource;
use crate::components::mailjet::DeliveryGateway;
use crate::config::Config;
use crate::error::RelayResult;
use super::actor::{FeedRelayActor, FeedRelayActorHandle};
use super::models::PassReport;
use super::pipeline::Addressing;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle for interacting with the feed relay actor
#[derive(Clone)]
pub struct FeedRelayHandle {
    actor_handle: FeedRelayActorHandle,
    _actor_task: Arc<JoinHandle<()>>,
}

impl FeedRelayHandle {
    /// Create a new FeedRelayHandle and spawn the actor
    pub fn new(config: &Config) -> RelayResult<Self> {
        let (actor, handle) = FeedRelayActor::new(config)?;
        Ok(Self::spawn(actor, handle))
    }

    /// Spawn an actor over the given collaborators
    pub fn with_collaborators(
        addressing: Addressing,
        feed: Arc<dyn FeedSource>,
        gateway: Arc<dyn DeliveryGateway>,
    ) -> Self {
        let (actor, handle) = FeedRelayActor::with_collaborators(addressing, feed, gateway);
        Self::spawn(actor, handle)
    }

    fn spawn(mut actor: FeedRelayActor, handle: FeedRelayActorHandle) -> Self {
        // Spawn a task to run the actor
        let actor_task = tokio::spawn(async move {
            actor.run().await;
        });

        Self {
            actor_handle: handle,
            _actor_task: Arc::new(actor_task),
        }
    }

    /// Process one feed snapshot
    pub async fn run_pass(&self) -> RelayResult<PassReport> {
        self.actor_handle.run_pass().await
    }

    /// Report of the most recent successful pass
    pub async fn last_report(&self) -> RelayResult<Option<PassReport>> {
        self.actor_handle.last_report().await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> RelayResult<()> {
        self.actor_handle.shutdown().await
    }
}
