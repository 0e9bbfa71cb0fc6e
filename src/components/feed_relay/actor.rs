use crate::components::feed::{FeedSource, HttpFeedSource};
use crate::components::mailjet::{DeliveryGateway, MailjetGateway};
use crate::config::Config;
use crate::error::{component_error, RelayResult};
use super::models::PassReport;
use super::pipeline::{run_pass, Addressing};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// The feed relay actor that processes messages
pub struct FeedRelayActor {
    addressing: Addressing,
    feed: Arc<dyn FeedSource>,
    gateway: Arc<dyn DeliveryGateway>,
    command_rx: mpsc::Receiver<FeedRelayCommand>,
    last_report: Option<PassReport>,
}

/// Commands that can be sent to the feed relay actor
pub enum FeedRelayCommand {
    RunPass(mpsc::Sender<RelayResult<PassReport>>),
    LastReport(mpsc::Sender<Option<PassReport>>),
    Shutdown,
}

/// Handle for communicating with the feed relay actor
#[derive(Clone)]
pub struct FeedRelayActorHandle {
    command_tx: mpsc::Sender<FeedRelayCommand>,
}

impl FeedRelayActorHandle {
    /// Process one feed snapshot
    pub async fn run_pass(&self) -> RelayResult<PassReport> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedRelayCommand::RunPass(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))?
    }

    /// Report of the most recent successful pass, if any
    pub async fn last_report(&self) -> RelayResult<Option<PassReport>> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(FeedRelayCommand::LastReport(response_tx))
            .await
            .map_err(|e| component_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| component_error("Response channel closed"))
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> RelayResult<()> {
        let _ = self.command_tx.send(FeedRelayCommand::Shutdown).await;
        Ok(())
    }
}

impl FeedRelayActor {
    /// Create an actor talking to the configured feed and Mailjet
    pub fn new(config: &Config) -> RelayResult<(Self, FeedRelayActorHandle)> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()
            .map_err(|e| component_error(&format!("Failed to build HTTP client: {}", e)))?;

        let feed = HttpFeedSource::new(client.clone(), &config.feed_url)?;
        let gateway = MailjetGateway::new(
            client,
            config.mailjet_api_url.clone(),
            config.mailjet_api_key.clone(),
            config.mailjet_secret_key.clone(),
        );

        Ok(Self::with_collaborators(
            Addressing::from_config(config),
            Arc::new(feed),
            Arc::new(gateway),
        ))
    }

    /// Create an actor over arbitrary feed and delivery collaborators
    pub fn with_collaborators(
        addressing: Addressing,
        feed: Arc<dyn FeedSource>,
        gateway: Arc<dyn DeliveryGateway>,
    ) -> (Self, FeedRelayActorHandle) {
        let (command_tx, command_rx) = mpsc::channel(32);

        let actor = Self {
            addressing,
            feed,
            gateway,
            command_rx,
            last_report: None,
        };

        let handle = FeedRelayActorHandle { command_tx };

        (actor, handle)
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Feed relay actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                FeedRelayCommand::RunPass(response_tx) => {
                    let result =
                        run_pass(self.feed.as_ref(), self.gateway.as_ref(), &self.addressing).await;

                    if let Ok(report) = &result {
                        self.last_report = Some(*report);
                    }

                    let _ = response_tx.send(result).await;
                }
                FeedRelayCommand::LastReport(response_tx) => {
                    let _ = response_tx.send(self.last_report).await;
                }
                FeedRelayCommand::Shutdown => {
                    info!("Feed relay actor shutting down");
                    break;
                }
            }
        }

        info!("Feed relay actor shut down");
    }
}
