mod actor;
pub mod encoder;
mod handle;
pub mod models;
pub mod notifications;
pub mod pipeline;
pub mod sanitizer;
mod scheduler;

pub use handle::FeedRelayHandle;
pub use models::{Identity, NotificationPayload, PassReport, SendRequest};
pub use scheduler::start_scheduler;

use crate::config::Config;
use crate::error::RelayResult;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::info;

/// Feed relay component: polls the feed and mails out invitations
#[derive(Default)]
pub struct FeedRelay {
    handle: RwLock<Option<FeedRelayHandle>>,
    scheduler: RwLock<Option<JoinHandle<()>>>,
}

impl FeedRelay {
    /// Create a new feed relay component
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the handle if it exists
    pub async fn get_handle(&self) -> Option<FeedRelayHandle> {
        let handle_lock = self.handle.read().await;
        handle_lock.clone()
    }
}

#[async_trait]
impl super::ServiceComponent for FeedRelay {
    fn name(&self) -> &'static str {
        "feed_relay"
    }

    async fn init(&self, config: Arc<Config>) -> RelayResult<()> {
        // Create a new handle if one doesn't exist
        let handle = {
            let mut handle_lock = self.handle.write().await;
            match handle_lock.as_ref() {
                Some(handle) => handle.clone(),
                None => {
                    let handle = FeedRelayHandle::new(&config)?;
                    *handle_lock = Some(handle.clone());
                    handle
                }
            }
        };

        let interval = config.poll_interval_secs;
        info!("Polling {} every {} seconds", config.feed_url, interval);
        *self.scheduler.write().await = Some(start_scheduler(handle, interval));

        Ok(())
    }

    async fn shutdown(&self) -> RelayResult<()> {
        if let Some(task) = self.scheduler.write().await.take() {
            task.abort();
        }

        // Shutdown the handle if it exists
        let handle_lock = self.handle.read().await;
        if let Some(handle) = &*handle_lock {
            handle.shutdown().await?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}
