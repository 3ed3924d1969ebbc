use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tickwatch_core::notify::error::NotifyError;
use tickwatch_core::notify::port::Notifier;

/// # Summary
/// A notifier posting messages to a Slack channel through the Web API.
///
/// # Invariants
/// * `token` is a bot token allowed to call `chat.postMessage`.
/// * The bot is a member of `channel`.
pub struct SlackNotifier {
    /// Bot token (xoxb-...).
    token: String,
    /// Target channel ID.
    channel: String,
    /// API root, `https://slack.com/api` outside tests.
    api_url: String,
    /// The HTTP client used for requests.
    client: reqwest::Client,
}

/// # Summary
/// Payload of `chat.postMessage`.
#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

/// # Summary
/// Slack answers HTTP 200 for most failures and reports them in the body.
#[derive(Deserialize)]
struct SlackResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

impl SlackNotifier {
    /// # Summary
    /// Creates a new `SlackNotifier`.
    ///
    /// # Arguments
    /// * `token` - Slack bot token.
    /// * `channel` - target channel ID.
    /// * `api_url` - Web API root.
    ///
    /// # Returns
    /// * `NotifyError::Config` when token or channel is empty, or the HTTP client cannot be built.
    pub fn new(token: String, channel: String, api_url: &str) -> Result<Self, NotifyError> {
        if token.trim().is_empty() {
            return Err(NotifyError::Config("Slack token is empty".into()));
        }
        if channel.trim().is_empty() {
            return Err(NotifyError::Config("Slack channel is empty".into()));
        }
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            token,
            channel,
            api_url: api_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        "slack"
    }

    /// # Summary
    /// Posts `content` to the configured channel.
    ///
    /// # Logic
    /// 1. POST `{api}/chat.postMessage` with bearer auth and a JSON body.
    /// 2. Non-success HTTP status is a platform error.
    /// 3. `ok: false` in the body is a platform error carrying Slack's error code.
    ///
    /// # Arguments
    /// * `_subject` - unused, Slack messages carry no title.
    /// * `content` - message text (Slack mrkdwn).
    async fn notify(&self, _subject: &str, content: &str) -> Result<(), NotifyError> {
        let url = format!("{}/chat.postMessage", self.api_url);
        let payload = PostMessage {
            channel: &self.channel,
            text: content,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(NotifyError::Platform(format!(
                "Slack API HTTP {}: {}",
                status, error_text
            )));
        }

        let body: SlackResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Platform(format!("unreadable Slack response: {}", e)))?;

        if !body.ok {
            return Err(NotifyError::Platform(format!(
                "Slack API error: {}",
                body.error.unwrap_or_else(|| "unknown".to_string())
            )));
        }

        Ok(())
    }
}
