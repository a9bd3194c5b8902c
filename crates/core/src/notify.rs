//! Process-wide "data changed" signal
//!
//! Every successful document write fires one zero-payload signal. Views
//! subscribe when they mount and reload both documents whenever it fires.

use tokio::sync::broadcast;
use tracing::trace;

/// Slow views that fall further behind than this just reload once
const CHANNEL_CAPACITY: usize = 32;

/// The signal itself; carries nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataChanged;

/// Broadcast handle shared by every writer and view
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<DataChanged>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Subscribe to future change signals
    pub fn subscribe(&self) -> broadcast::Receiver<DataChanged> {
        self.tx.subscribe()
    }

    /// Fire the signal; having no subscribers is fine
    pub fn notify(&self) {
        let receivers = self.tx.send(DataChanged).unwrap_or(0);
        trace!(receivers, "Data changed");
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn test_every_subscriber_sees_signal() {
        let notifier = ChangeNotifier::new();
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();

        notifier.notify();

        assert_eq!(a.try_recv(), Ok(DataChanged));
        assert_eq!(b.try_recv(), Ok(DataChanged));
        assert_eq!(a.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_notify_without_subscribers() {
        let notifier = ChangeNotifier::new();
        notifier.notify();
        let mut rx = notifier.subscribe();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[test]
    fn test_late_subscriber_misses_earlier_signals() {
        let notifier = ChangeNotifier::new();
        notifier.notify();
        let mut rx = notifier.subscribe();
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));
    }
}
