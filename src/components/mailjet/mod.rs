use crate::components::feed_relay::models::{DeliveryReceipt, SendRequest};
use crate::error::{delivery_error, RelayResult};
use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info};

/// Accepts finished send requests for delivery
#[async_trait]
pub trait DeliveryGateway: Send + Sync {
    /// Deliver one send request; no retries are attempted
    async fn deliver(&self, request: &SendRequest) -> RelayResult<DeliveryReceipt>;
}

/// Mailjet Send API v3.1 client
#[derive(Clone)]
pub struct MailjetGateway {
    client: Client,
    api_url: String,
    api_key: String,
    secret_key: String,
}

impl MailjetGateway {
    pub fn new(
        client: Client,
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            api_key: api_key.into(),
            secret_key: secret_key.into(),
        }
    }
}

#[async_trait]
impl DeliveryGateway for MailjetGateway {
    async fn deliver(&self, request: &SendRequest) -> RelayResult<DeliveryReceipt> {
        debug!(
            messages = request.messages.len(),
            url = %self.api_url,
            "Posting send request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .basic_auth(&self.api_key, Some(&self.secret_key))
            .json(request)
            .send()
            .await
            .map_err(|e| delivery_error(&format!("Failed to send message: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read response".to_string());

        if !status.is_success() {
            return Err(delivery_error(&format!(
                "Failed to send message: HTTP {} - {}",
                status, body
            )));
        }

        info!(status = status.as_u16(), "Message accepted by Mailjet");
        debug!(response = %body, "Mailjet response");

        Ok(DeliveryReceipt {
            status: status.as_u16(),
            body,
        })
    }
}
