//! Fan-out of dashboard notices to front-ends
//!
//! Notices carry no snapshot: a receiver reads the current state from the
//! sync layer after being woken.

use crate::models::BoardId;
use tokio::sync::broadcast;

/// Notices buffered per receiver before a slow one starts lagging
pub const DEFAULT_CAPACITY: usize = 256;

/// Notices emitted by the sync layer after a state change
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Tracked boards changed (add, remove, clear, replace)
    SelectionChanged,
    /// Fresh board summaries were applied
    BoardsUpdated { from_cache: bool },
    /// Activity timeline was replaced or extended
    ActivitiesUpdated,
    /// Navigation, filter or toggle changed
    ViewChanged,
    /// Backend cache cleared for one board or everything
    CacheCleared(Option<BoardId>),
    CacheInfoUpdated,
    /// A fetch failed; carries the message shown to the user
    FetchFailed(String),
    /// A completion arrived for a selection that is no longer current
    CompletionDiscarded { request_id: u64 },
}

/// Broadcast channel for [`DashboardEvent`]s. Clones share one channel.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DashboardEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Send to every current receiver and return how many there were.
    /// With no receivers the notice is dropped.
    pub fn publish(&self, event: DashboardEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Receiver for notices published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::default_capacity()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::{RecvError, TryRecvError};

    #[test]
    fn test_publish_reports_receivers() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(DashboardEvent::ActivitiesUpdated), 0);

        let _first = bus.subscribe();
        let _second = bus.clone().subscribe();
        assert_eq!(bus.subscriber_count(), 2);
        assert_eq!(bus.publish(DashboardEvent::CacheInfoUpdated), 2);
    }

    #[tokio::test]
    async fn test_late_receiver_sees_only_new_notices() {
        let bus = EventBus::default();
        let mut early = bus.subscribe();
        bus.publish(DashboardEvent::SelectionChanged);

        let mut late = bus.subscribe();
        bus.publish(DashboardEvent::CacheCleared(Some(BoardId::from("b1"))));

        assert_eq!(early.recv().await.unwrap(), DashboardEvent::SelectionChanged);
        assert_eq!(
            late.recv().await.unwrap(),
            DashboardEvent::CacheCleared(Some(BoardId::from("b1")))
        );
        assert_eq!(late.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn test_slow_receiver_lags_then_catches_up() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for request_id in 1..=3 {
            bus.publish(DashboardEvent::CompletionDiscarded { request_id });
        }

        assert_eq!(rx.recv().await, Err(RecvError::Lagged(1)));
        assert_eq!(
            rx.recv().await.unwrap(),
            DashboardEvent::CompletionDiscarded { request_id: 2 }
        );
    }
}
