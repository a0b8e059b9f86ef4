//! Change notifications from the workout context.
//!
//! [`ContextEvents`] fans out [`ContextEvent`]s to any number of listeners
//! (screens re-rendering, widgets refreshing) from the single
//! [`crate::context::WorkoutContext`] that owns the state.
//!
//! # Example
//!
//! ```rust
//! use gymbuddy_core::events::{ContextEvent, ContextEvents};
//!
//! let events = ContextEvents::new();
//! let mut rx = events.subscribe();
//!
//! events.emit(ContextEvent::ScheduleUpdated);
//!
//! // In async context:
//! // let event = rx.recv().await.unwrap();
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Default channel capacity.
/// Subscribers that fall further behind than this miss events (lag).
const DEFAULT_CAPACITY: usize = 64;

/// Something that changed in the context's in-memory state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContextEvent {
    /// Workouts and schedule were (re)loaded from storage.
    #[serde(rename_all = "camelCase")]
    Loaded { workout_count: usize },

    /// A session was persisted and appended.
    #[serde(rename_all = "camelCase")]
    WorkoutAdded { workout_id: String },

    ScheduleUpdated,

    Disposed,
}

/// Broadcast channel for [`ContextEvent`]s.
pub struct ContextEvents {
    sender: broadcast::Sender<ContextEvent>,
}

impl ContextEvents {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send an event to all current subscribers.
    ///
    /// Returns how many subscribers received it; 0 when nobody listens.
    pub fn emit(&self, event: ContextEvent) -> usize {
        log::debug!("Context event: {:?}", event);
        self.sender.send(event).unwrap_or(0)
    }

    /// Receive all future events. Past events are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<ContextEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ContextEvents {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    mod context_event {
        use super::*;

        #[test]
        fn serializes_with_type_tag() {
            let json = serde_json::to_value(ContextEvent::WorkoutAdded {
                workout_id: "w-1".to_string(),
            })
            .unwrap();

            assert_eq!(json["type"], "workoutAdded");
            assert_eq!(json["workoutId"], "w-1");
        }

        #[test]
        fn unit_variants_carry_only_the_tag() {
            let json = serde_json::to_value(ContextEvent::Disposed).unwrap();
            assert_eq!(json, serde_json::json!({"type": "disposed"}));
        }
    }

    mod bus {
        use super::*;

        #[test]
        fn subscribe_and_drop_track_count() {
            let events = ContextEvents::default();
            assert_eq!(events.subscriber_count(), 0);

            let rx = events.subscribe();
            let _rx2 = events.subscribe();
            assert_eq!(events.subscriber_count(), 2);

            drop(rx);
            assert_eq!(events.subscriber_count(), 1);
        }

        #[test]
        fn emit_without_subscribers_returns_zero() {
            let events = ContextEvents::new();
            assert_eq!(events.emit(ContextEvent::ScheduleUpdated), 0);
        }

        #[tokio::test]
        async fn every_subscriber_receives_events_in_order() {
            let events = ContextEvents::new();
            let mut rx1 = events.subscribe();
            let mut rx2 = events.subscribe();

            events.emit(ContextEvent::Loaded { workout_count: 2 });
            events.emit(ContextEvent::ScheduleUpdated);

            for rx in [&mut rx1, &mut rx2] {
                assert_eq!(
                    rx.recv().await.unwrap(),
                    ContextEvent::Loaded { workout_count: 2 }
                );
                assert_eq!(rx.recv().await.unwrap(), ContextEvent::ScheduleUpdated);
            }
        }

        #[tokio::test]
        async fn late_subscriber_misses_old_events() {
            let events = ContextEvents::new();
            let _early = events.subscribe();

            events.emit(ContextEvent::ScheduleUpdated);
            let mut late = events.subscribe();
            events.emit(ContextEvent::Disposed);

            assert_eq!(late.recv().await.unwrap(), ContextEvent::Disposed);
        }

        #[tokio::test]
        async fn slow_subscriber_lags() {
            let events = ContextEvents::with_capacity(2);
            let mut rx = events.subscribe();

            for _ in 0..3 {
                events.emit(ContextEvent::ScheduleUpdated);
            }

            assert!(matches!(
                rx.recv().await,
                Err(broadcast::error::RecvError::Lagged(1))
            ));
        }
    }
}
