use std::sync::Mutex;

use async_trait::async_trait;

use super::{HandoffNotice, NotificationError, Notifier};

/// Keeps every notice in memory. Can be told to fail every call.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<HandoffNotice>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records nothing and returns an error from every call.
    pub fn failing() -> Self {
        Self {
            notices: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn notices(&self) -> Vec<HandoffNotice> {
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &HandoffNotice) -> Result<(), NotificationError> {
        if self.fail {
            return Err(NotificationError::Rejected {
                reason: "recording notifier set to fail".to_string(),
            });
        }
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notice.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
