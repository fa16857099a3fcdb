// Notification gateway - fire-and-forget side channel for hand-offs
//
// A notifier failing never undoes or blocks a hand-off; the coordinator logs
// the error and moves on.

pub mod log;
pub mod recording;
pub mod slack;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::config::NotificationsConfig;
use crate::pod::{Member, Project};

#[cfg(any(test, feature = "testing"))]
use mockall::automock;

pub use self::log::LogNotifier;
pub use recording::RecordingNotifier;
pub use slack::SlackNotifier;

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Notification rejected: {reason}")]
    Rejected { reason: String },

    #[error("Notifier not configured: {reason}")]
    NotConfigured { reason: String },
}

/// Who is named in a notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoticeMember {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl From<&Member> for NoticeMember {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            name: member.name.clone(),
            role: member.role.clone(),
        }
    }
}

/// Everything a recipient needs to pick up the baton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandoffNotice {
    pub project_id: String,
    pub project_name: String,
    pub completed_by: NoticeMember,
    pub recipient: NoticeMember,
    pub link: String,
}

impl HandoffNotice {
    pub fn new(project: &Project, completed_by: &Member, recipient: &Member) -> Self {
        Self {
            project_id: project.id.clone(),
            project_name: project.name.clone(),
            completed_by: completed_by.into(),
            recipient: recipient.into(),
            link: completed_by.handoff_link.clone(),
        }
    }
}

#[cfg_attr(any(test, feature = "testing"), automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotificationError>;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Pick the notifier configured for this process.
pub fn build_notifier(config: &NotificationsConfig) -> Result<Arc<dyn Notifier>, NotificationError> {
    if !config.slack_enabled {
        return Ok(Arc::new(LogNotifier));
    }

    let token = config
        .slack_bot_token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| NotificationError::NotConfigured {
            reason: "Slack is enabled but no bot token is set (SLACK_BOT_TOKEN)".to_string(),
        })?;
    let channel = config
        .slack_channel
        .clone()
        .unwrap_or_else(|| "#general".to_string());

    let notifier = SlackNotifier::new(token, channel)?.with_api_url(&config.slack_api_url);
    info!(channel = %notifier.channel(), "Slack hand-off notifications enabled");
    Ok(Arc::new(notifier))
}
