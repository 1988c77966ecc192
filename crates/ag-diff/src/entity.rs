//! Per-kind entity diffing: key-diff by identifier name, nested member
//! diff for entities present on both sides.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use ag_core::{Aggregate, EntityKind, InheritedAggregate, Projection, Snapshot, VersionToken};

use crate::member;
use crate::{ChangeCategory, ChangeType, DetectedChange};

/// Lowercase label used in entity-level descriptions.
const fn kind_label(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Aggregate => "aggregate",
        EntityKind::Projection => "projection",
        EntityKind::InheritedAggregate => "inherited aggregate",
        EntityKind::VersionToken => "version token",
    }
}

/// Key-diffs one entity kind across two flattened name maps.
///
/// Iterates the union of identifier names in sorted order, emitting one
/// `Added`/`Removed` record per one-sided entity and delegating matched
/// pairs to `on_match`.
fn diff_kind<'a, T>(
    kind: EntityKind,
    prev: &BTreeMap<&'a str, &'a T>,
    curr: &BTreeMap<&'a str, &'a T>,
    out: &mut Vec<DetectedChange>,
    mut on_match: impl FnMut(&str, &T, &T, &mut Vec<DetectedChange>),
) {
    let names: BTreeSet<&str> = prev.keys().chain(curr.keys()).copied().collect();

    for name in names {
        match (prev.get(name), curr.get(name)) {
            (None, Some(_)) => out.push(DetectedChange::new(
                ChangeType::Added,
                ChangeCategory::Entity,
                kind,
                name,
                format!("{} added", kind_label(kind)),
            )),
            (Some(_), None) => out.push(DetectedChange::new(
                ChangeType::Removed,
                ChangeCategory::Entity,
                kind,
                name,
                format!("{} removed", kind_label(kind)),
            )),
            (Some(p), Some(c)) => on_match(name, p, c, out),
            (None, None) => {}
        }
    }
}

pub(crate) fn diff_aggregates(prev: &Snapshot, curr: &Snapshot, out: &mut Vec<DetectedChange>) {
    diff_kind(
        EntityKind::Aggregate,
        &prev.aggregates(),
        &curr.aggregates(),
        out,
        match_aggregates,
    );
}

pub(crate) fn diff_projections(prev: &Snapshot, curr: &Snapshot, out: &mut Vec<DetectedChange>) {
    diff_kind(
        EntityKind::Projection,
        &prev.projections(),
        &curr.projections(),
        out,
        match_projections,
    );
}

pub(crate) fn diff_inherited_aggregates(
    prev: &Snapshot,
    curr: &Snapshot,
    out: &mut Vec<DetectedChange>,
) {
    diff_kind(
        EntityKind::InheritedAggregate,
        &prev.inherited_aggregates(),
        &curr.inherited_aggregates(),
        out,
        match_inherited,
    );
}

pub(crate) fn diff_version_tokens(prev: &Snapshot, curr: &Snapshot, out: &mut Vec<DetectedChange>) {
    diff_kind(
        EntityKind::VersionToken,
        &prev.version_tokens(),
        &curr.version_tokens(),
        out,
        match_version_tokens,
    );
}

fn match_aggregates(name: &str, prev: &Aggregate, curr: &Aggregate, out: &mut Vec<DetectedChange>) {
    let kind = EntityKind::Aggregate;

    member::diff_events(kind, name, &prev.events, &curr.events, out);
    member::diff_properties(kind, name, &prev.properties, &curr.properties, out);
    member::diff_commands(kind, name, &prev.commands, &curr.commands, out);
    member::diff_constructors(kind, name, &prev.constructors, &curr.constructors, out);
    member::diff_post_fold(kind, name, prev.post_fold.as_ref(), curr.post_fold.as_ref(), out);
    member::diff_stream_actions(kind, name, &prev.stream_actions, &curr.stream_actions, out);
    member::diff_stream_type(kind, name, prev.stream_type.as_ref(), curr.stream_type.as_ref(), out);
    member::diff_blob_settings(
        kind,
        name,
        prev.blob_settings.as_ref(),
        curr.blob_settings.as_ref(),
        out,
    );

    member::diff_flag(
        kind,
        name,
        "partial class",
        prev.flags.partial_class,
        curr.flags.partial_class,
        out,
    );
    member::diff_flag(
        kind,
        name,
        "custom factory partial",
        prev.flags.custom_factory_partial,
        curr.flags.custom_factory_partial,
        out,
    );
    member::diff_flag(
        kind,
        name,
        "custom repository partial",
        prev.flags.custom_repository_partial,
        curr.flags.custom_repository_partial,
        out,
    );
    member::diff_flag(
        kind,
        name,
        "external checkpoint",
        prev.flags.external_checkpoint,
        curr.flags.external_checkpoint,
        out,
    );
    member::diff_flag(
        kind,
        name,
        "post-fold-all handler",
        prev.flags.has_post_fold_all,
        curr.flags.has_post_fold_all,
        out,
    );
}

fn match_projections(
    name: &str,
    prev: &Projection,
    curr: &Projection,
    out: &mut Vec<DetectedChange>,
) {
    let kind = EntityKind::Projection;

    member::diff_events(kind, name, &prev.events, &curr.events, out);
    member::diff_properties(kind, name, &prev.properties, &curr.properties, out);
    member::diff_post_fold(kind, name, prev.post_fold.as_ref(), curr.post_fold.as_ref(), out);
    member::diff_stream_actions(kind, name, &prev.stream_actions, &curr.stream_actions, out);
    member::diff_blob_settings(
        kind,
        name,
        prev.blob_settings.as_ref(),
        curr.blob_settings.as_ref(),
        out,
    );

    member::diff_routing_field(
        kind,
        name,
        "router type",
        prev.router_type.as_deref(),
        curr.router_type.as_deref(),
        out,
    );
    member::diff_routing_field(
        kind,
        name,
        "destination type",
        prev.destination_type.as_deref(),
        curr.destination_type.as_deref(),
        out,
    );

    member::diff_flag(
        kind,
        name,
        "partial class",
        prev.flags.partial_class,
        curr.flags.partial_class,
        out,
    );
    member::diff_flag(
        kind,
        name,
        "external checkpoint",
        prev.flags.external_checkpoint,
        curr.flags.external_checkpoint,
        out,
    );
}

fn match_inherited(
    name: &str,
    prev: &InheritedAggregate,
    curr: &InheritedAggregate,
    out: &mut Vec<DetectedChange>,
) {
    let kind = EntityKind::InheritedAggregate;

    if prev.base != curr.base {
        out.push(
            DetectedChange::new(
                ChangeType::Modified,
                ChangeCategory::Attribute,
                kind,
                name,
                "base aggregate changed",
            )
            .with_details(format!("{} -> {}", prev.base, curr.base)),
        );
    }

    member::diff_events(kind, name, &prev.events, &curr.events, out);
    member::diff_properties(kind, name, &prev.properties, &curr.properties, out);
    member::diff_flag(
        kind,
        name,
        "partial class",
        prev.partial_class,
        curr.partial_class,
        out,
    );
}

fn match_version_tokens(
    name: &str,
    prev: &VersionToken,
    curr: &VersionToken,
    out: &mut Vec<DetectedChange>,
) {
    if prev.inner_type != curr.inner_type {
        out.push(
            DetectedChange::new(
                ChangeType::Modified,
                ChangeCategory::Attribute,
                EntityKind::VersionToken,
                name,
                "wrapped type changed",
            )
            .with_details(format!("{} -> {}", prev.inner_type, curr.inner_type)),
        );
    }
}
