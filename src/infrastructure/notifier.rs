//! Notification ports
//!
//! Lists report failures and exhaustion through a [`Notifier`] handed to them by the
//! caller, instead of reaching for a global toast handler.

use tokio::sync::mpsc;

use crate::domain::notice::Notice;

/// Receives notices raised by a list
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notice: Notice) {
        if notice.is_error() {
            tracing::error!("{notice}");
        } else {
            tracing::info!("{notice}");
        }
    }
}

/// Discards notices
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Forwards notices over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if let Err(e) = self.tx.send(notice) {
            log::warn!("Notice dropped, receiver closed: {}", e.0);
        }
    }
}
