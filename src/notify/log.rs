use async_trait::async_trait;
use tracing::info;

use super::{HandoffNotice, NotificationError, Notifier};

/// Writes hand-off notices to the log and nowhere else.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotificationError> {
        info!(
            project_id = %notice.project_id,
            from_member = %notice.completed_by.name,
            to_member = %notice.recipient.name,
            link = %notice.link,
            "Hand-off ready for next member"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
