use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{HandoffNotice, NotificationError, Notifier};

pub const DEFAULT_SLACK_API_URL: &str = "https://slack.com/api/chat.postMessage";

const BOT_USERNAME: &str = "Baton Hand-off Bot";
const BOT_ICON: &str = ":baton:";

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
    username: &'a str,
    icon_emoji: &'a str,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Posts hand-off notices to a Slack channel with `chat.postMessage`.
#[derive(Debug, Clone)]
pub struct SlackNotifier {
    client: reqwest::Client,
    token: String,
    channel: String,
    api_url: String,
}

impl SlackNotifier {
    pub fn new(token: impl Into<String>, channel: impl Into<String>) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            channel: channel.into(),
            api_url: DEFAULT_SLACK_API_URL.to_string(),
        })
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

/// Render the Slack message text for a hand-off.
pub fn format_handoff_message(notice: &HandoffNotice) -> String {
    format!(
        ":white_check_mark: *Task Completed - Handoff Ready*\n\
         \n\
         *Project:* {project}\n\
         *Completed by:* {from} ({from_role})\n\
         *Handoff Link:* {link}\n\
         \n\
         :arrow_right: *Next in line:* {to} ({to_role})\n\
         *Status:* Pending handoff to {to}\n\
         \n\
         Please review the handoff link and proceed with your tasks.",
        project = notice.project_name,
        from = notice.completed_by.name,
        from_role = notice.completed_by.role,
        link = notice.link,
        to = notice.recipient.name,
        to_role = notice.recipient.role,
    )
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotificationError> {
        let text = format_handoff_message(notice);
        let payload = PostMessage {
            channel: &self.channel,
            text: &text,
            username: BOT_USERNAME,
            icon_emoji: BOT_ICON,
        };

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.token)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        let body: PostMessageResponse = response.json().await?;
        if !body.ok {
            let reason = body.error.unwrap_or_else(|| "unknown error".to_string());
            warn!(channel = %self.channel, error = %reason, "Slack API rejected message");
            return Err(NotificationError::Rejected { reason });
        }

        debug!(
            channel = %self.channel,
            project_id = %notice.project_id,
            recipient = %notice.recipient.name,
            "Slack hand-off notification sent"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
