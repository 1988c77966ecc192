//! Snapshot change detection.
//!
//! This crate provides [`detect`], a pure function that compares two entity
//! model snapshots and produces a flat list of [`DetectedChange`] records for
//! human-readable reporting. It never mutates its inputs and its output order
//! is deterministic: entity kinds in declaration order, entities sorted by
//! identifier name.
//!
//! # Modes
//!
//! - `previous = None`: summary mode. Exactly one [`ChangeType::Added`]
//!   record per entity in `current`, with no nested member diffing.
//! - `previous = Some(_)`: key-diff per entity kind by identifier name.
//!   Entities present on both sides get a nested member diff (events,
//!   properties, commands, constructors, handlers, attributes, flags).
//!
//! # Examples
//!
//! ```
//! use ag_core::{Aggregate, Project, Snapshot};
//! use ag_diff::{ChangeType, detect};
//!
//! let old = Snapshot::from_projects([Project::new("Shop")]);
//! let new = Snapshot::from_projects([
//!     Project::new("Shop").with_aggregate(Aggregate::new("Order")),
//! ]);
//!
//! let changes = detect(Some(&old), &new);
//! assert_eq!(changes.len(), 1);
//! assert_eq!(changes[0].change_type, ChangeType::Added);
//! assert_eq!(changes[0].entity_name, "Order");
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod entity;
mod member;

use std::fmt;

use ag_core::{EntityKind, Snapshot};
use serde::{Deserialize, Serialize};

/// Whether something appeared, disappeared, or changed shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// Present in the current snapshot only.
    Added,
    /// Present in the previous snapshot only.
    Removed,
    /// Present in both snapshots with differing detail.
    Modified,
}

impl ChangeType {
    /// Canonical lowercase label.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Modified => "modified",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of an entity a change applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ChangeCategory {
    /// The entity itself appeared or disappeared.
    Entity,
    /// A declared domain event.
    Event,
    /// A declared property.
    Property,
    /// A declared command.
    Command,
    /// A declared constructor signature.
    Constructor,
    /// The post-fold handler.
    PostFold,
    /// A declared stream action.
    StreamAction,
    /// A single-valued attribute (stream type, blob settings, ...).
    Attribute,
    /// A boolean declaration flag.
    Flag,
    /// Routed-projection routing (router or destination type).
    Routing,
}

impl ChangeCategory {
    /// Canonical label.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Event => "event",
            Self::Property => "property",
            Self::Command => "command",
            Self::Constructor => "constructor",
            Self::PostFold => "post-fold",
            Self::StreamAction => "stream action",
            Self::Attribute => "attribute",
            Self::Flag => "flag",
            Self::Routing => "routing",
        }
    }
}

impl fmt::Display for ChangeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One detected difference between two snapshots.
///
/// Produced only by [`detect`] and never retained beyond a single report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectedChange {
    /// Whether the subject was added, removed, or modified.
    pub change_type: ChangeType,

    /// The part of the entity the change applies to.
    pub category: ChangeCategory,

    /// The kind of the owning entity.
    pub entity_kind: EntityKind,

    /// The identifier name of the owning entity.
    pub entity_name: String,

    /// Human-readable description of the change.
    pub description: String,

    /// Optional supplementary detail (old/new values, counts).
    pub details: Option<String>,
}

impl DetectedChange {
    /// Creates a change record without details.
    #[must_use]
    pub fn new(
        change_type: ChangeType,
        category: ChangeCategory,
        entity_kind: EntityKind,
        entity_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            change_type,
            category,
            entity_kind,
            entity_name: entity_name.into(),
            description: description.into(),
            details: None,
        }
    }

    /// Returns a copy carrying the given detail string.
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Compares two snapshots and returns the differences.
///
/// Pure and deterministic: the same inputs always produce the same records
/// in the same order. With `previous = None` this degenerates to a summary
/// of `current` (one `Added` record per entity).
#[must_use]
pub fn detect(previous: Option<&Snapshot>, current: &Snapshot) -> Vec<DetectedChange> {
    // Summary mode is the same key-diff against an empty snapshot: every
    // entity is new and nothing matches, so no nested diffing happens.
    let empty = Snapshot::new();
    let previous = previous.unwrap_or(&empty);

    let mut changes = Vec::new();
    entity::diff_aggregates(previous, current, &mut changes);
    entity::diff_projections(previous, current, &mut changes);
    entity::diff_inherited_aggregates(previous, current, &mut changes);
    entity::diff_version_tokens(previous, current, &mut changes);
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::{
        Aggregate, ConstructorDecl, EventDecl, InheritedAggregate, Project, Projection, Snapshot,
        VersionToken,
    };

    fn shop(project: Project) -> Snapshot {
        Snapshot::from_projects([project])
    }

    #[test]
    fn test_self_diff_is_empty() {
        let snapshot = shop(
            Project::new("Shop")
                .with_aggregate(
                    Aggregate::new("Order")
                        .with_event(EventDecl::new("OrderPlaced", "Apply", 1, false))
                        .with_event(EventDecl::new("OrderShipped", "Apply", 2, true)),
                )
                .with_projection(Projection::new("OrderSummary"))
                .with_inherited(InheritedAggregate::new("ArchivedOrder", "Order"))
                .with_version_token(VersionToken::new("OrderV2", "Order")),
        );

        assert!(detect(Some(&snapshot), &snapshot).is_empty());
    }

    #[test]
    fn test_self_diff_empty_snapshot() {
        let snapshot = Snapshot::new();
        assert!(detect(Some(&snapshot), &snapshot).is_empty());
    }

    #[test]
    fn test_summary_mode_one_added_per_entity() {
        let snapshot = shop(
            Project::new("Shop")
                .with_aggregate(
                    Aggregate::new("Order")
                        .with_event(EventDecl::new("OrderPlaced", "Apply", 1, false)),
                )
                .with_projection(Projection::new("OrderSummary"))
                .with_inherited(InheritedAggregate::new("ArchivedOrder", "Order"))
                .with_version_token(VersionToken::new("OrderV2", "Order")),
        );

        let changes = detect(None, &snapshot);

        // One record per entity, no nested diffing of the event.
        assert_eq!(changes.len(), 4);
        assert!(changes.iter().all(|c| c.change_type == ChangeType::Added));
        assert!(changes.iter().all(|c| c.category == ChangeCategory::Entity));
    }

    #[test]
    fn test_added_event_example() {
        // Previous "Order" has 2 events, current has 3 (new: OrderShipped).
        let old = shop(Project::new("Shop").with_aggregate(
            Aggregate::new("Order")
                .with_event(EventDecl::new("OrderPlaced", "Apply", 1, false))
                .with_event(EventDecl::new("OrderPaid", "Apply", 1, false)),
        ));
        let new = shop(Project::new("Shop").with_aggregate(
            Aggregate::new("Order")
                .with_event(EventDecl::new("OrderPlaced", "Apply", 1, false))
                .with_event(EventDecl::new("OrderPaid", "Apply", 1, false))
                .with_event(EventDecl::new("OrderShipped", "Apply", 2, false)),
        ));

        let changes = detect(Some(&old), &new);

        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.change_type, ChangeType::Added);
        assert_eq!(change.category, ChangeCategory::Event);
        assert_eq!(change.entity_name, "Order");
        assert!(change.description.contains("OrderShipped"));
    }

    #[test]
    fn test_added_constructor_signature_example() {
        // {(string)} -> {(string), (string,int)}
        let old = shop(Project::new("Shop").with_aggregate({
            let mut agg = Aggregate::new("Order");
            agg.constructors.push(ConstructorDecl::new(["string"]));
            agg
        }));
        let new = shop(Project::new("Shop").with_aggregate({
            let mut agg = Aggregate::new("Order");
            agg.constructors.push(ConstructorDecl::new(["string"]));
            agg.constructors.push(ConstructorDecl::new(["string", "int"]));
            agg
        }));

        let changes = detect(Some(&old), &new);

        assert_eq!(changes.len(), 1);
        let change = &changes[0];
        assert_eq!(change.change_type, ChangeType::Added);
        assert_eq!(change.category, ChangeCategory::Constructor);
        assert_eq!(change.entity_name, "Order");
        assert_eq!(change.details.as_deref(), Some("2 parameters"));
    }

    #[test]
    fn test_entity_added_and_removed() {
        let old = shop(
            Project::new("Shop")
                .with_aggregate(Aggregate::new("Invoice"))
                .with_aggregate(Aggregate::new("Order")),
        );
        let new = shop(
            Project::new("Shop")
                .with_aggregate(Aggregate::new("Order"))
                .with_aggregate(Aggregate::new("Shipment")),
        );

        let changes = detect(Some(&old), &new);

        assert_eq!(changes.len(), 2);
        // Sorted by entity name: Invoice (removed) before Shipment (added).
        assert_eq!(changes[0].entity_name, "Invoice");
        assert_eq!(changes[0].change_type, ChangeType::Removed);
        assert_eq!(changes[1].entity_name, "Shipment");
        assert_eq!(changes[1].change_type, ChangeType::Added);
    }

    #[test]
    fn test_output_is_deterministic() {
        let old = shop(Project::new("Shop").with_aggregate(Aggregate::new("Order")));
        let new = shop(
            Project::new("Shop")
                .with_aggregate(Aggregate::new("Zebra"))
                .with_aggregate(Aggregate::new("Alpha"))
                .with_projection(Projection::new("Middle")),
        );

        let first = detect(Some(&old), &new);
        let second = detect(Some(&old), &new);
        assert_eq!(first, second);

        // Aggregates (name-sorted) come before projections.
        let names: Vec<&str> = first.iter().map(|c| c.entity_name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Order", "Zebra", "Middle"]);
    }

    #[test]
    fn test_change_serialization() {
        let change = DetectedChange::new(
            ChangeType::Modified,
            ChangeCategory::Event,
            EntityKind::Aggregate,
            "Order",
            "event OrderShipped parameter count changed",
        )
        .with_details("1 -> 2");

        let json = serde_json::to_string(&change).unwrap();
        let parsed: DetectedChange = serde_json::from_str(&json).unwrap();
        assert_eq!(change, parsed);
    }
}
