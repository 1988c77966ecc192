//! Member-level diffing for entities present in both snapshots.
//!
//! Named members (events, properties, commands, stream actions) key-diff by
//! name; constructors key-diff by parameter signature; single-valued
//! attributes and flags compare directly. Each function appends zero or more
//! records and never looks at members of other entities.

use std::collections::{BTreeMap, BTreeSet};

use ag_core::{
    BlobSettings, CommandDecl, ConstructorDecl, EntityKind, EventDecl, PostFoldHandler,
    PropertyDecl, StreamAction, StreamTypeAttr,
};

use crate::{ChangeCategory, ChangeType, DetectedChange};

fn by_name<'a, T>(
    items: &'a [T],
    name_of: impl Fn(&'a T) -> &'a str,
) -> BTreeMap<&'a str, &'a T> {
    items.iter().map(|item| (name_of(item), item)).collect()
}

/// Runs a key-diff over two name maps, emitting `Added`/`Removed` records
/// for one-sided members and delegating matched pairs.
fn diff_named<'a, T>(
    kind: EntityKind,
    entity: &str,
    category: ChangeCategory,
    label: &str,
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
                category,
                kind,
                entity,
                format!("{label} {name} added"),
            )),
            (Some(_), None) => out.push(DetectedChange::new(
                ChangeType::Removed,
                category,
                kind,
                entity,
                format!("{label} {name} removed"),
            )),
            (Some(p), Some(c)) => on_match(name, p, c, out),
            (None, None) => {}
        }
    }
}

fn modified(
    category: ChangeCategory,
    kind: EntityKind,
    entity: &str,
    description: String,
    details: String,
) -> DetectedChange {
    DetectedChange::new(ChangeType::Modified, category, kind, entity, description)
        .with_details(details)
}

pub(crate) fn diff_events(
    kind: EntityKind,
    entity: &str,
    prev: &[EventDecl],
    curr: &[EventDecl],
    out: &mut Vec<DetectedChange>,
) {
    let prev = by_name(prev, |e| e.name.as_str());
    let curr = by_name(curr, |e| e.name.as_str());

    diff_named(
        kind,
        entity,
        ChangeCategory::Event,
        "event",
        &prev,
        &curr,
        out,
        |name, p: &EventDecl, c: &EventDecl, out| {
            if p.activation != c.activation {
                out.push(modified(
                    ChangeCategory::Event,
                    kind,
                    entity,
                    format!("event {name} activation changed"),
                    format!("{} -> {}", p.activation, c.activation),
                ));
            }
            if p.parameter_count != c.parameter_count {
                out.push(modified(
                    ChangeCategory::Event,
                    kind,
                    entity,
                    format!("event {name} parameter count changed"),
                    format!("{} -> {}", p.parameter_count, c.parameter_count),
                ));
            }
            if p.requires_await != c.requires_await {
                let description = if c.requires_await {
                    format!("event {name} now requires await")
                } else {
                    format!("event {name} no longer requires await")
                };
                out.push(DetectedChange::new(
                    ChangeType::Modified,
                    ChangeCategory::Event,
                    kind,
                    entity,
                    description,
                ));
            }
        },
    );
}

pub(crate) fn diff_properties(
    kind: EntityKind,
    entity: &str,
    prev: &[PropertyDecl],
    curr: &[PropertyDecl],
    out: &mut Vec<DetectedChange>,
) {
    let prev = by_name(prev, |p| p.name.as_str());
    let curr = by_name(curr, |p| p.name.as_str());

    diff_named(
        kind,
        entity,
        ChangeCategory::Property,
        "property",
        &prev,
        &curr,
        out,
        |name, p: &PropertyDecl, c: &PropertyDecl, out| {
            if p.type_name != c.type_name || p.nullable != c.nullable {
                out.push(modified(
                    ChangeCategory::Property,
                    kind,
                    entity,
                    format!("property {name} type changed"),
                    format!("{} -> {}", render_type(p), render_type(c)),
                ));
            }
            if p.generic_args != c.generic_args {
                out.push(modified(
                    ChangeCategory::Property,
                    kind,
                    entity,
                    format!("property {name} generic arguments changed"),
                    format!(
                        "<{}> -> <{}>",
                        p.generic_args.join(", "),
                        c.generic_args.join(", ")
                    ),
                ));
            }
        },
    );
}

fn render_type(property: &PropertyDecl) -> String {
    if property.nullable {
        format!("{}?", property.type_name)
    } else {
        property.type_name.clone()
    }
}

pub(crate) fn diff_commands(
    kind: EntityKind,
    entity: &str,
    prev: &[CommandDecl],
    curr: &[CommandDecl],
    out: &mut Vec<DetectedChange>,
) {
    let prev = by_name(prev, |c| c.name.as_str());
    let curr = by_name(curr, |c| c.name.as_str());

    diff_named(
        kind,
        entity,
        ChangeCategory::Command,
        "command",
        &prev,
        &curr,
        out,
        |name, p: &CommandDecl, c: &CommandDecl, out| {
            if p.parameter_count != c.parameter_count {
                out.push(modified(
                    ChangeCategory::Command,
                    kind,
                    entity,
                    format!("command {name} parameter count changed"),
                    format!("{} -> {}", p.parameter_count, c.parameter_count),
                ));
            }
            if p.return_type != c.return_type {
                out.push(modified(
                    ChangeCategory::Command,
                    kind,
                    entity,
                    format!("command {name} return type changed"),
                    format!("{} -> {}", p.return_type, c.return_type),
                ));
            }
            if p.is_async != c.is_async {
                let description = if c.is_async {
                    format!("command {name} is now asynchronous")
                } else {
                    format!("command {name} is no longer asynchronous")
                };
                out.push(DetectedChange::new(
                    ChangeType::Modified,
                    ChangeCategory::Command,
                    kind,
                    entity,
                    description,
                ));
            }

            let prev_events: BTreeSet<&str> =
                p.produced_events.iter().map(String::as_str).collect();
            let curr_events: BTreeSet<&str> =
                c.produced_events.iter().map(String::as_str).collect();

            for event in curr_events.difference(&prev_events) {
                out.push(DetectedChange::new(
                    ChangeType::Added,
                    ChangeCategory::Command,
                    kind,
                    entity,
                    format!("command {name} produces {event}"),
                ));
            }
            for event in prev_events.difference(&curr_events) {
                out.push(DetectedChange::new(
                    ChangeType::Removed,
                    ChangeCategory::Command,
                    kind,
                    entity,
                    format!("command {name} no longer produces {event}"),
                ));
            }
        },
    );
}

pub(crate) fn diff_constructors(
    kind: EntityKind,
    entity: &str,
    prev: &[ConstructorDecl],
    curr: &[ConstructorDecl],
    out: &mut Vec<DetectedChange>,
) {
    // Constructors carry no name; the parameter-type signature is the key.
    let prev: BTreeMap<String, usize> = prev
        .iter()
        .map(|c| (c.signature(), c.parameter_count()))
        .collect();
    let curr: BTreeMap<String, usize> = curr
        .iter()
        .map(|c| (c.signature(), c.parameter_count()))
        .collect();

    for (signature, count) in &curr {
        if !prev.contains_key(signature) {
            out.push(
                DetectedChange::new(
                    ChangeType::Added,
                    ChangeCategory::Constructor,
                    kind,
                    entity,
                    format!("constructor ({signature}) added"),
                )
                .with_details(parameter_detail(*count)),
            );
        }
    }
    for (signature, count) in &prev {
        if !curr.contains_key(signature) {
            out.push(
                DetectedChange::new(
                    ChangeType::Removed,
                    ChangeCategory::Constructor,
                    kind,
                    entity,
                    format!("constructor ({signature}) removed"),
                )
                .with_details(parameter_detail(*count)),
            );
        }
    }
}

fn parameter_detail(count: usize) -> String {
    if count == 1 {
        "1 parameter".to_owned()
    } else {
        format!("{count} parameters")
    }
}

pub(crate) fn diff_post_fold(
    kind: EntityKind,
    entity: &str,
    prev: Option<&PostFoldHandler>,
    curr: Option<&PostFoldHandler>,
    out: &mut Vec<DetectedChange>,
) {
    match (prev, curr) {
        (None, Some(c)) => out.push(
            DetectedChange::new(
                ChangeType::Added,
                ChangeCategory::PostFold,
                kind,
                entity,
                "post-fold handler added",
            )
            .with_details(parameter_detail(c.parameter_count)),
        ),
        (Some(_), None) => out.push(DetectedChange::new(
            ChangeType::Removed,
            ChangeCategory::PostFold,
            kind,
            entity,
            "post-fold handler removed",
        )),
        (Some(p), Some(c)) if p.parameter_count != c.parameter_count => out.push(modified(
            ChangeCategory::PostFold,
            kind,
            entity,
            "post-fold handler parameter count changed".to_owned(),
            format!("{} -> {}", p.parameter_count, c.parameter_count),
        )),
        _ => {}
    }
}

pub(crate) fn diff_stream_actions(
    kind: EntityKind,
    entity: &str,
    prev: &[StreamAction],
    curr: &[StreamAction],
    out: &mut Vec<DetectedChange>,
) {
    let prev = by_name(prev, |a| a.type_name.as_str());
    let curr = by_name(curr, |a| a.type_name.as_str());

    diff_named(
        kind,
        entity,
        ChangeCategory::StreamAction,
        "stream action",
        &prev,
        &curr,
        out,
        |name, p: &StreamAction, c: &StreamAction, out| {
            let prev_ifaces: BTreeSet<&str> = p.interfaces.iter().map(String::as_str).collect();
            let curr_ifaces: BTreeSet<&str> = c.interfaces.iter().map(String::as_str).collect();
            if prev_ifaces != curr_ifaces {
                out.push(modified(
                    ChangeCategory::StreamAction,
                    kind,
                    entity,
                    format!("stream action {name} interfaces changed"),
                    format!("{} -> {}", p.interfaces.join(", "), c.interfaces.join(", ")),
                ));
            }
            if p.registration != c.registration {
                out.push(modified(
                    ChangeCategory::StreamAction,
                    kind,
                    entity,
                    format!("stream action {name} registration changed"),
                    format!("{} -> {}", p.registration, c.registration),
                ));
            }
        },
    );
}

pub(crate) fn diff_stream_type(
    kind: EntityKind,
    entity: &str,
    prev: Option<&StreamTypeAttr>,
    curr: Option<&StreamTypeAttr>,
    out: &mut Vec<DetectedChange>,
) {
    match (prev, curr) {
        (None, Some(c)) => out.push(
            DetectedChange::new(
                ChangeType::Added,
                ChangeCategory::Attribute,
                kind,
                entity,
                "stream type attribute added",
            )
            .with_details(c.type_name.clone()),
        ),
        (Some(p), None) => out.push(
            DetectedChange::new(
                ChangeType::Removed,
                ChangeCategory::Attribute,
                kind,
                entity,
                "stream type attribute removed",
            )
            .with_details(p.type_name.clone()),
        ),
        (Some(p), Some(c)) if p.type_name != c.type_name => out.push(modified(
            ChangeCategory::Attribute,
            kind,
            entity,
            "stream type changed".to_owned(),
            format!("{} -> {}", p.type_name, c.type_name),
        )),
        _ => {}
    }
}

pub(crate) fn diff_blob_settings(
    kind: EntityKind,
    entity: &str,
    prev: Option<&BlobSettings>,
    curr: Option<&BlobSettings>,
    out: &mut Vec<DetectedChange>,
) {
    match (prev, curr) {
        (None, Some(c)) => out.push(
            DetectedChange::new(
                ChangeType::Added,
                ChangeCategory::Attribute,
                kind,
                entity,
                "blob settings added",
            )
            .with_details(format!("{} ({})", c.container, c.content_type)),
        ),
        (Some(_), None) => out.push(DetectedChange::new(
            ChangeType::Removed,
            ChangeCategory::Attribute,
            kind,
            entity,
            "blob settings removed",
        )),
        (Some(p), Some(c)) => {
            if p.container != c.container {
                out.push(modified(
                    ChangeCategory::Attribute,
                    kind,
                    entity,
                    "blob container changed".to_owned(),
                    format!("{} -> {}", p.container, c.container),
                ));
            }
            if p.content_type != c.content_type {
                out.push(modified(
                    ChangeCategory::Attribute,
                    kind,
                    entity,
                    "blob content type changed".to_owned(),
                    format!("{} -> {}", p.content_type, c.content_type),
                ));
            }
        }
        (None, None) => {}
    }
}

pub(crate) fn diff_flag(
    kind: EntityKind,
    entity: &str,
    label: &str,
    prev: bool,
    curr: bool,
    out: &mut Vec<DetectedChange>,
) {
    if prev == curr {
        return;
    }
    let description = if curr {
        format!("{label} enabled")
    } else {
        format!("{label} disabled")
    };
    out.push(DetectedChange::new(
        ChangeType::Modified,
        ChangeCategory::Flag,
        kind,
        entity,
        description,
    ));
}

pub(crate) fn diff_routing_field(
    kind: EntityKind,
    entity: &str,
    label: &str,
    prev: Option<&str>,
    curr: Option<&str>,
    out: &mut Vec<DetectedChange>,
) {
    match (prev, curr) {
        (None, Some(c)) => out.push(
            DetectedChange::new(
                ChangeType::Added,
                ChangeCategory::Routing,
                kind,
                entity,
                format!("{label} set"),
            )
            .with_details(c.to_owned()),
        ),
        (Some(p), None) => out.push(
            DetectedChange::new(
                ChangeType::Removed,
                ChangeCategory::Routing,
                kind,
                entity,
                format!("{label} cleared"),
            )
            .with_details(p.to_owned()),
        ),
        (Some(p), Some(c)) if p != c => out.push(modified(
            ChangeCategory::Routing,
            kind,
            entity,
            format!("{label} changed"),
            format!("{p} -> {c}"),
        )),
        _ => {}
    }
}
