//! Event types for the scene manager event system
//!
//! Provides the shared `SceneEvent` enum and the `EventBus` the store emits
//! into. Hosts (UI panels, the CLI, watch loops) subscribe and refresh their
//! own presentation; the store never calls into host types directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Scene manager event types
///
/// Events carry project paths so subscribers can refresh only what changed.
/// Serialized with a `type` tag for hosts that forward them over a wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SceneEvent {
    /// A record was saved with a caller-supplied type
    ///
    /// Triggers:
    /// - UI: rebuild the scene tree (type grouping may have changed)
    RecordChanged {
        scene: PathBuf,
        scene_type: String,
        timestamp: DateTime<Utc>,
    },

    /// A record entered edit mode
    EditStarted {
        scene: PathBuf,
        timestamp: DateTime<Utc>,
    },

    /// A record was created or regenerated from defaults
    ///
    /// Triggers:
    /// - Host: refresh its asset index so the new side-car file is known
    RecordCreated {
        scene: PathBuf,
        record: PathBuf,
        timestamp: DateTime<Utc>,
    },

    /// A record followed its scene to a new location
    RecordRelocated {
        from: PathBuf,
        to: PathBuf,
        timestamp: DateTime<Utc>,
    },

    /// A record was explicitly deleted
    RecordDeleted {
        record: PathBuf,
        timestamp: DateTime<Utc>,
    },

    /// Orphaned records were removed by reconciliation
    RecordsPurged {
        records: Vec<PathBuf>,
        timestamp: DateTime<Utc>,
    },

    /// A scene and its record were created
    SceneCreated {
        scene: PathBuf,
        scene_type: String,
        timestamp: DateTime<Utc>,
    },

    /// A scene and its side-car files were deleted
    SceneDeleted {
        scene: PathBuf,
        timestamp: DateTime<Utc>,
    },

    /// The type registry was modified
    TypesChanged {
        types: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

impl SceneEvent {
    /// Short variant name, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            SceneEvent::RecordChanged { .. } => "RecordChanged",
            SceneEvent::EditStarted { .. } => "EditStarted",
            SceneEvent::RecordCreated { .. } => "RecordCreated",
            SceneEvent::RecordRelocated { .. } => "RecordRelocated",
            SceneEvent::RecordDeleted { .. } => "RecordDeleted",
            SceneEvent::RecordsPurged { .. } => "RecordsPurged",
            SceneEvent::SceneCreated { .. } => "SceneCreated",
            SceneEvent::SceneDeleted { .. } => "SceneDeleted",
            SceneEvent::TypesChanged { .. } => "TypesChanged",
        }
    }

    /// When the event was emitted
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SceneEvent::RecordChanged { timestamp, .. }
            | SceneEvent::EditStarted { timestamp, .. }
            | SceneEvent::RecordCreated { timestamp, .. }
            | SceneEvent::RecordRelocated { timestamp, .. }
            | SceneEvent::RecordDeleted { timestamp, .. }
            | SceneEvent::RecordsPurged { timestamp, .. }
            | SceneEvent::SceneCreated { timestamp, .. }
            | SceneEvent::SceneDeleted { timestamp, .. }
            | SceneEvent::TypesChanged { timestamp, .. } => *timestamp,
        }
    }
}

/// Central event distribution for the scene manager
///
/// Backed by a `tokio::sync::broadcast` channel. The store is synchronous,
/// so subscribers typically drain with `try_recv()` on their own loop; async
/// hosts can `recv().await` instead.
///
/// # Examples
///
/// ```
/// use smgr_common::events::{EventBus, SceneEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(SceneEvent::TypesChanged {
///     types: vec!["Level".to_string()],
///     timestamp: chrono::Utc::now(),
/// });
///
/// assert_eq!(rx.try_recv().unwrap().kind(), "TypesChanged");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SceneEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// Slow subscribers lose the oldest events once `capacity` is exceeded.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<SceneEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SceneEvent,
    ) -> Result<usize, broadcast::error::SendError<SceneEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: SceneEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    fn types_changed() -> SceneEvent {
        SceneEvent::TypesChanged {
            types: vec!["Level".to_string(), "UI".to_string()],
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(10);
        assert!(bus.emit(types_changed()).is_err());
        // Lossy variant must not panic
        bus.emit_lossy(types_changed());
    }

    #[test]
    fn test_all_subscribers_receive() {
        let bus = EventBus::new(10);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.emit(types_changed()).unwrap(), 2);
        assert_eq!(rx1.try_recv().unwrap().kind(), "TypesChanged");
        assert_eq!(rx2.try_recv().unwrap().kind(), "TypesChanged");
        assert!(matches!(rx1.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new(10);
        let _keepalive = bus.subscribe();
        bus.emit_lossy(types_changed());

        let mut late = bus.subscribe();
        assert!(matches!(late.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = SceneEvent::RecordChanged {
            scene: PathBuf::from("Assets/Main.unity"),
            scene_type: "UI".to_string(),
            timestamp: Utc::now(),
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""type":"RecordChanged""#));
        assert!(json.contains(r#""scene_type":"UI""#));

        let back: SceneEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let bus = EventBus::new(0);
        let mut rx = bus.subscribe();
        bus.emit_lossy(types_changed());
        assert!(rx.try_recv().is_ok());
    }
}
