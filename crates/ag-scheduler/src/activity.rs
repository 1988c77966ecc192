//! The activity-log boundary.
//!
//! The scheduler reports progress as structured [`ActivityEvent`] values
//! through an [`ActivityLog`] sink. Consumers (console, TUI, tests) format
//! independently; the scheduler never formats text, and internal error
//! types never cross this boundary unformatted — failures arrive as a
//! message string plus elapsed duration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use ag_core::EntityKey;
use ag_diff::DetectedChange;

/// What a regeneration pass covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegenScope {
    /// Every entity of every project.
    Full,
    /// Only the listed entities (sorted by key).
    Incremental {
        /// The affected entity keys.
        entities: Vec<EntityKey>,
    },
}

impl RegenScope {
    /// Returns `true` for the full scope.
    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        matches!(self, Self::Full)
    }
}

/// One structured progress event from the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum ActivityEvent {
    /// A regeneration pass started.
    RegenStarted {
        /// What the pass covers.
        scope: RegenScope,
    },

    /// The change detector compared the new snapshot against the baseline.
    ChangesDetected {
        /// The detected changes, in detector order.
        changes: Vec<DetectedChange>,
    },

    /// One entity was regenerated in isolation.
    EntityRegenerated {
        /// The regenerated entity.
        key: EntityKey,
    },

    /// A regeneration pass completed successfully.
    RegenCompleted {
        /// What the pass covered.
        scope: RegenScope,
        /// Wall-clock duration of the pass.
        elapsed: Duration,
        /// Number of entities regenerated.
        regenerated: usize,
    },

    /// A regeneration pass failed.
    RegenFailed {
        /// Formatted failure message.
        message: String,
        /// Wall-clock duration until the failure.
        elapsed: Duration,
    },
}

/// A sink for scheduler progress events.
///
/// Called from the drain task and from blocking generation workers, so
/// implementations must be `Send + Sync` and must not block for long.
pub trait ActivityLog: Send + Sync + 'static {
    /// Records one event.
    fn record(&self, event: ActivityEvent);
}

/// A sink that discards every event. Default for tests and headless runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLog;

impl ActivityLog for NullLog {
    #[inline]
    fn record(&self, _event: ActivityEvent) {}
}

/// A sink that forwards events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLog;

impl ActivityLog for TracingLog {
    fn record(&self, event: ActivityEvent) {
        match event {
            ActivityEvent::RegenStarted { scope } => {
                tracing::info!(full = scope.is_full(), "Regeneration started");
            }
            ActivityEvent::ChangesDetected { changes } => {
                tracing::info!(count = changes.len(), "Changes detected");
                for change in &changes {
                    tracing::debug!(
                        change_type = change.change_type.as_str(),
                        category = change.category.as_str(),
                        entity = %change.entity_name,
                        description = %change.description,
                        "Change"
                    );
                }
            }
            ActivityEvent::EntityRegenerated { key } => {
                tracing::info!(entity = %key, "Entity regenerated");
            }
            ActivityEvent::RegenCompleted {
                scope,
                elapsed,
                regenerated,
            } => {
                tracing::info!(
                    full = scope.is_full(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    regenerated,
                    "Regeneration completed"
                );
            }
            ActivityEvent::RegenFailed { message, elapsed } => {
                tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    message = %message,
                    "Regeneration failed"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_is_full() {
        assert!(RegenScope::Full.is_full());
        assert!(!RegenScope::Incremental {
            entities: vec![EntityKey::aggregate("Order")]
        }
        .is_full());
    }

    #[test]
    fn test_event_serialization() {
        let event = ActivityEvent::RegenCompleted {
            scope: RegenScope::Incremental {
                entities: vec![EntityKey::aggregate("Order")],
            },
            elapsed: Duration::from_millis(120),
            regenerated: 1,
        };

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("regen_completed"));
        let parsed: ActivityEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }

    #[test]
    fn test_null_log_ignores_events() {
        // Compiles and does nothing; the sink trait is object safe
        let log: Box<dyn ActivityLog> = Box::new(NullLog);
        log.record(ActivityEvent::RegenStarted {
            scope: RegenScope::Full,
        });
    }
}
