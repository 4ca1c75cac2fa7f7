//! User-visible notices (toasts)
//!
//! Failures that the user should hear about are pushed onto an unbounded
//! channel; whatever front end is attached drains it.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient message shown to the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Sending half of the notice channel
#[derive(Debug, Clone)]
pub struct NoticeSender {
    tx: UnboundedSender<Notice>,
}

impl NoticeSender {
    /// Push a notice. A detached receiver only means nobody is listening.
    pub fn send(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            debug!("Notice dropped, no receiver attached");
        }
    }
}

/// Receiving half of the notice channel
pub type NoticeReceiver = UnboundedReceiver<Notice>;

/// Create a connected notice sender and receiver
pub fn channel() -> (NoticeSender, NoticeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (NoticeSender { tx }, rx)
}
