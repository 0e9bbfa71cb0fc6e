use crate::error::{config_error, fetch_error, RelayResult};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info};
use url::Url;

/// Media type requested from the feed
pub const CALENDAR_MEDIA_TYPE: &str = "text/calendar";

/// Source of raw calendar feed text
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the whole feed document as text
    async fn fetch(&self) -> RelayResult<String>;
}

/// Feed served over HTTP(S)
#[derive(Clone)]
pub struct HttpFeedSource {
    client: Client,
    url: Url,
}

impl HttpFeedSource {
    /// Create a feed source; `webcal://` URLs are fetched over https
    pub fn new(client: Client, url: &str) -> RelayResult<Self> {
        Ok(Self {
            client,
            url: normalize_feed_url(url)?,
        })
    }
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    async fn fetch(&self) -> RelayResult<String> {
        debug!(url = %self.url, "Fetching calendar feed");

        let response = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, CALENDAR_MEDIA_TYPE)
            .send()
            .await
            .map_err(|e| fetch_error(&format!("Failed to fetch feed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(fetch_error(&format!(
                "Failed to fetch feed: HTTP {} - {}",
                status, error_body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| fetch_error(&format!("Failed to read feed body: {}", e)))?;

        info!(bytes = body.len(), "Fetched calendar feed");
        Ok(body)
    }
}

/// Validate a feed URL, mapping `webcal`/`webcals` to `https`
pub fn normalize_feed_url(raw: &str) -> RelayResult<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| config_error(&format!("Invalid feed URL '{}': {}", raw, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        "webcal" | "webcals" => {
            let rest = &url.as_str()[url.scheme().len()..];
            Url::parse(&format!("https{}", rest))
                .map_err(|e| config_error(&format!("Invalid feed URL '{}': {}", raw, e)))
        }
        other => Err(config_error(&format!(
            "Unsupported feed URL scheme '{}'",
            other
        ))),
    }
}
