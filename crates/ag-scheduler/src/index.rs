//! File-to-entity reverse index.
//!
//! Maps every file path declared by any entity in a snapshot to the set of
//! entity keys declared there, so a changed-file path can be resolved to
//! the entities needing regeneration. Rebuilt wholesale on every successful
//! analysis, because declarations move between files.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use ag_core::{fx_hash_map, EntityKey, FxHashMap, FxHashSet, Snapshot};

/// Reverse index from normalized absolute file paths to entity keys.
///
/// # Resolution
///
/// [`resolve`](Self::resolve) tries an exact match first and falls back to
/// a fuzzy suffix match: any indexed path where one path string is a suffix
/// of the other contributes its entities. The fallback absorbs slash and
/// relative-path mismatches between watcher events and declared locations,
/// but it can over-match unrelated files with identical names in different
/// directories. That is a known limitation of the heuristic, kept on
/// purpose; do not tighten it silently.
///
/// # Examples
///
/// ```
/// use ag_core::{Aggregate, Project, Snapshot};
/// use ag_scheduler::FileEntityIndex;
/// use camino::Utf8Path;
///
/// let snapshot = Snapshot::from_projects([Project::new("Shop")
///     .with_aggregate(Aggregate::new("Order").with_file("Domain/Order.cs"))]);
/// let index = FileEntityIndex::build(&snapshot, Utf8Path::new("/src/Shop"));
///
/// let keys = index.resolve(Utf8Path::new("/src/Shop/Domain/Order.cs"));
/// assert_eq!(keys.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileEntityIndex {
    by_path: FxHashMap<Utf8PathBuf, FxHashSet<EntityKey>>,
}

impl FileEntityIndex {
    /// Builds the index for a snapshot.
    ///
    /// Every declared file location of every entity is normalized against
    /// `base` and the entity's key added to that path's set. Locations
    /// declared with backslash separators or `.`/`..` components resolve to
    /// the same index entry as their clean forward-slash form.
    #[must_use]
    pub fn build(snapshot: &Snapshot, base: &Utf8Path) -> Self {
        let mut by_path: FxHashMap<Utf8PathBuf, FxHashSet<EntityKey>> = fx_hash_map();

        let mut add = |files: &[Utf8PathBuf], key: EntityKey| {
            for file in files {
                let normalized = normalize(base, file);
                by_path.entry(normalized).or_default().insert(key.clone());
            }
        };

        for project in &snapshot.projects {
            for aggregate in &project.aggregates {
                add(&aggregate.files, aggregate.key());
            }
            for projection in &project.projections {
                add(&projection.files, projection.key());
            }
            for inherited in &project.inherited_aggregates {
                add(&inherited.files, inherited.key());
            }
            for token in &project.version_tokens {
                add(&token.files, token.key());
            }
        }

        Self { by_path }
    }

    /// Resolves a changed-file path to the set of affected entity keys.
    ///
    /// Exact match first; on a miss, the fuzzy suffix fallback unions the
    /// entity sets of every indexed path where one string is a suffix of
    /// the other. Returns an empty set for paths the index knows nothing
    /// about (the caller treats that as "regenerate everything").
    #[must_use]
    pub fn resolve(&self, changed: &Utf8Path) -> FxHashSet<EntityKey> {
        let probe = normalize(Utf8Path::new(""), changed);

        if let Some(keys) = self.by_path.get(&probe) {
            return keys.clone();
        }

        let probe_str = probe.as_str();
        let mut keys: FxHashSet<EntityKey> = FxHashSet::default();
        for (path, entities) in &self.by_path {
            let path_str = path.as_str();
            if path_str.ends_with(probe_str) || probe_str.ends_with(path_str) {
                keys.extend(entities.iter().cloned());
            }
        }
        keys
    }

    /// Returns the number of indexed file paths.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    /// Returns `true` if the index is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }
}

/// Normalizes a declared location against a base directory.
///
/// Backslashes are treated as separators, relative paths are joined onto
/// `base`, and `.`/`..` components are resolved lexically (no filesystem
/// access; declared locations may not exist yet).
fn normalize(base: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    let forward = path.as_str().replace('\\', "/");
    let forward = Utf8Path::new(&forward);

    let joined = if forward.is_absolute() {
        forward.to_owned()
    } else {
        base.join(forward)
    };

    let mut resolved = Utf8PathBuf::new();
    for component in joined.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                resolved.pop();
            }
            other => resolved.push(other.as_str()),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;
    use ag_core::{Aggregate, Project, Projection, VersionToken};

    fn sample_index() -> FileEntityIndex {
        let snapshot = Snapshot::from_projects([Project::new("Shop")
            .with_aggregate(
                Aggregate::new("Order")
                    .with_file("Domain/Order.cs")
                    .with_file("Domain/Order.Commands.cs"),
            )
            .with_aggregate(Aggregate::new("Invoice").with_file("Domain/Invoice.cs"))
            .with_projection(Projection::new("OrderSummary").with_file("Domain/Order.cs"))
            .with_version_token(VersionToken::new("OrderV2", "Order").with_file("Domain/Order.cs"))]);
        FileEntityIndex::build(&snapshot, Utf8Path::new("/src/Shop"))
    }

    #[test]
    fn test_build_unions_entities_per_path() {
        let index = sample_index();
        let keys = index.resolve(Utf8Path::new("/src/Shop/Domain/Order.cs"));

        // Order.cs declares the aggregate, a projection, and a token
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&EntityKey::aggregate("Order")));
        assert!(keys.contains(&EntityKey::projection("OrderSummary")));
        assert!(keys.contains(&EntityKey::version_token("OrderV2")));
    }

    #[test]
    fn test_exact_match_secondary_file() {
        let index = sample_index();
        let keys = index.resolve(Utf8Path::new("/src/Shop/Domain/Order.Commands.cs"));
        assert_eq!(keys.len(), 1);
        assert!(keys.contains(&EntityKey::aggregate("Order")));
    }

    #[test]
    fn test_unknown_path_resolves_empty() {
        let index = sample_index();
        let keys = index.resolve(Utf8Path::new("/src/Shop/Domain/Shipment.cs"));
        assert!(keys.is_empty());
    }

    #[test]
    fn test_backslash_locations_normalize() {
        let snapshot = Snapshot::from_projects([Project::new("Shop").with_aggregate(
            Aggregate::new("Order").with_file(r"Domain\Orders\Order.cs"),
        )]);
        let index = FileEntityIndex::build(&snapshot, Utf8Path::new("/src/Shop"));

        let keys = index.resolve(Utf8Path::new("/src/Shop/Domain/Orders/Order.cs"));
        assert!(keys.contains(&EntityKey::aggregate("Order")));
    }

    #[test]
    fn test_dot_components_resolve() {
        let snapshot = Snapshot::from_projects([Project::new("Shop").with_aggregate(
            Aggregate::new("Order").with_file("./Domain/../Domain/Order.cs"),
        )]);
        let index = FileEntityIndex::build(&snapshot, Utf8Path::new("/src/Shop"));

        let keys = index.resolve(Utf8Path::new("/src/Shop/Domain/Order.cs"));
        assert!(keys.contains(&EntityKey::aggregate("Order")));
    }

    #[test]
    fn test_fuzzy_suffix_match_relative_probe() {
        let index = sample_index();
        // Watcher delivered a relative path; suffix fallback still resolves it
        let keys = index.resolve(Utf8Path::new("Domain/Invoice.cs"));
        assert!(keys.contains(&EntityKey::aggregate("Invoice")));
    }

    #[test]
    fn test_fuzzy_suffix_match_longer_probe() {
        let snapshot = Snapshot::from_projects([Project::new("Shop").with_aggregate(
            Aggregate::new("Order").with_file("Order.cs"),
        )]);
        let index = FileEntityIndex::build(&snapshot, Utf8Path::new("Shop"));

        // Indexed "Shop/Order.cs" is a suffix of the longer probe
        let keys = index.resolve(Utf8Path::new("/mnt/work/Shop/Order.cs"));
        assert!(keys.contains(&EntityKey::aggregate("Order")));
    }

    #[test]
    fn test_fuzzy_match_can_over_match_same_names() {
        // Two unrelated files named Order.cs in different directories: a
        // bare-filename probe matches both. Known limitation, kept as-is.
        let snapshot = Snapshot::from_projects([Project::new("Shop")
            .with_aggregate(Aggregate::new("Order").with_file("Sales/Order.cs"))
            .with_aggregate(Aggregate::new("PurchaseOrder").with_file("Buying/Order.cs"))]);
        let index = FileEntityIndex::build(&snapshot, Utf8Path::new("/src"));

        let keys = index.resolve(Utf8Path::new("Order.cs"));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_len_counts_paths_not_entities() {
        let index = sample_index();
        // Order.cs, Order.Commands.cs, Invoice.cs
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
    }
}
