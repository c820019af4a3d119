/// User-facing notices (toasts and the rate-limit shake)

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
    /// Visual shake on the action that hit the limit
    Shake,
}

pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn rate_limited(&self);
}

/// Routes notices to the `log` facade
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn success(&self, message: &str) {
        log::info!("{}", message);
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
    }

    fn rate_limited(&self) {
        log::warn!("export limit reached");
    }
}

/// Keeps notices in memory for tests
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().map(|n| n.clone()).unwrap_or_default()
    }

    fn push(&self, n: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(n);
        }
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.push(Notice::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(Notice::Error(message.to_string()));
    }

    fn rate_limited(&self) {
        self.push(Notice::Shake);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_notifier_keeps_order() {
        let n = RecordingNotifier::new();
        n.rate_limited();
        n.error("limit");
        n.success("ok");
        assert_eq!(
            n.notices(),
            vec![
                Notice::Shake,
                Notice::Error("limit".into()),
                Notice::Success("ok".into())
            ]
        );
    }
}
