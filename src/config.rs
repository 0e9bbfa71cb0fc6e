use crate::components::feed::normalize_feed_url;
use crate::components::feed_relay::models::{Identity, MessageTemplate};
use crate::error::{config_error, env_error, RelayResult};
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default sender display name
pub const DEFAULT_SENDER_NAME: &str = "Inboxics";

/// Default Mailjet send endpoint
pub const DEFAULT_MAILJET_API_URL: &str = "https://api.mailjet.com/v3.1/send";

/// Optional template overlay file
pub const TEMPLATE_FILE: &str = "config/inboxics.toml";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure for the relay
#[derive(Clone)]
pub struct Config {
    /// Calendar feed to poll (already normalised to http/https)
    pub feed_url: String,
    /// Mailjet API key (basic auth user)
    pub mailjet_api_key: String,
    /// Mailjet secret key (basic auth password)
    pub mailjet_secret_key: String,
    /// Mailjet send endpoint
    pub mailjet_api_url: String,
    /// Who the invitations come from
    pub sender: Identity,
    /// Who receives the invitations
    pub recipient: Identity,
    /// Seconds between passes; 0 runs a single pass
    pub poll_interval_secs: u64,
    /// Timeout for feed and delivery requests
    pub http_timeout_secs: u64,
    /// Subject, body and attachment naming
    pub template: MessageTemplate,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("feed_url", &self.feed_url)
            .field("mailjet_api_key", &"<redacted>")
            .field("mailjet_secret_key", &"<redacted>")
            .field("mailjet_api_url", &self.mailjet_api_url)
            .field("sender", &self.sender)
            .field("recipient", &self.recipient)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("template", &self.template)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment and the optional template file
    pub fn load() -> RelayResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Self::from_lookup(|key| env::var(key).ok())?;

        if Path::new(TEMPLATE_FILE).exists() {
            let content = fs::read_to_string(TEMPLATE_FILE)?;
            config.template = MessageTemplate::from_toml(&content)?;
        }

        Ok(config)
    }

    /// Build configuration from any key lookup (the process environment in production)
    pub fn from_lookup<F>(lookup: F) -> RelayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> RelayResult<String> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| env_error(key))
        };

        let feed_url = normalize_feed_url(&required("FEED_URL")?)?.to_string();
        let mailjet_api_key = required("MAILJET_API_KEY")?;
        let mailjet_secret_key = required("MAILJET_SECRET_KEY")?;
        let sender_email = required("MAILJET_SENDER")?;
        let recipient_email = required("RECIPIENT_EMAIL")?;

        let sender_name =
            lookup("SENDER_NAME").unwrap_or_else(|| DEFAULT_SENDER_NAME.to_string());
        let recipient_name = lookup("RECIPIENT_NAME")
            .unwrap_or_else(|| default_display_name(&recipient_email));

        let mailjet_api_url =
            lookup("MAILJET_API_URL").unwrap_or_else(|| DEFAULT_MAILJET_API_URL.to_string());

        let poll_interval_secs = parse_seconds(&lookup, "POLL_INTERVAL_SECS", 0)?;
        let http_timeout_secs =
            parse_seconds(&lookup, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;
        if http_timeout_secs == 0 {
            return Err(config_error("HTTP_TIMEOUT_SECS must be greater than zero"));
        }

        Ok(Config {
            feed_url,
            mailjet_api_key,
            mailjet_secret_key,
            mailjet_api_url,
            sender: Identity::new(sender_email, sender_name),
            recipient: Identity::new(recipient_email, recipient_name),
            poll_interval_secs,
            http_timeout_secs,
            template: MessageTemplate::default(),
        })
    }

    /// Whether the relay polls periodically or runs once
    pub fn is_periodic(&self) -> bool {
        self.poll_interval_secs > 0
    }
}

fn parse_seconds<F>(lookup: &F, key: &str, default: u64) -> RelayResult<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| config_error(&format!("Invalid {} format: {}", key, raw))),
        None => Ok(default),
    }
}

/// Use the local part of an email address as a display name
fn default_display_name(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
