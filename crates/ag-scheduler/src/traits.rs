//! Collaborator traits for analysis and generation.
//!
//! The scheduler orchestrates two external collaborators it never
//! implements itself: an [`Analyzer`] producing entity model snapshots from
//! source, and one [`Generator`] per artifact kind writing generated code.
//! Both are synchronous and invoked via `spawn_blocking`; they are expected
//! to do real file I/O.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use ag_core::{EntityKind, FxHashMap, GeneratorConfig, Project, Snapshot};

use crate::error::{AnalyzeError, GenerateError};

/// The result of one analysis pass.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// The freshly built entity model snapshot.
    pub snapshot: Snapshot,

    /// The resolved solution directory generated output is relative to.
    pub solution_dir: Utf8PathBuf,
}

/// Builds an entity model snapshot from the source tree.
///
/// Implementations parse whatever the watched solution contains; the
/// scheduler only cares that a failed analysis returns `Err` and a
/// successful one returns a complete snapshot. The same analyzer is used
/// for full and incremental passes — even an incremental pass re-analyzes,
/// because the model must be current before any entity is regenerated.
pub trait Analyzer: Send + Sync + 'static {
    /// Analyzes the solution under `project_path`.
    ///
    /// # Errors
    ///
    /// Fails with [`AnalyzeError`] on unreadable or malformed source. The
    /// caller invalidates its cached model on failure but keeps the diff
    /// baseline.
    fn analyze(&self, project_path: &Utf8Path) -> Result<Analysis, AnalyzeError>;
}

/// Writes generated code for one project model.
///
/// Generators must be idempotent: regenerating an unchanged model must not
/// rewrite identical output (skip-unchanged is the implementation's
/// responsibility, not the scheduler's).
pub trait Generator: Send + Sync + 'static {
    /// Generates output for the given (possibly reduced) project model.
    ///
    /// # Errors
    ///
    /// Fails with [`GenerateError`] when output cannot be produced; the
    /// scheduler aborts the remainder of the current batch.
    fn generate(
        &self,
        project: &Project,
        config: &GeneratorConfig,
        solution_dir: &Utf8Path,
    ) -> Result<(), GenerateError>;
}

/// The artifact kinds a full regeneration produces, in invocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeneratorKind {
    /// Aggregate fold/apply plumbing.
    Aggregates,
    /// Projection fold plumbing.
    Projections,
    /// Inherited-aggregate plumbing.
    InheritedAggregates,
    /// Shared extension/registration wiring.
    Extensions,
    /// Version-token wrapper types.
    TokenWrappers,
    /// Version-token JSON converters.
    TokenConverters,
}

impl GeneratorKind {
    /// Full-regeneration invocation order. Fixed: extensions must land
    /// after the entity artifacts they register, converters last.
    pub const ORDER: [Self; 6] = [
        Self::Aggregates,
        Self::Projections,
        Self::InheritedAggregates,
        Self::Extensions,
        Self::TokenWrappers,
        Self::TokenConverters,
    ];

    /// The generator kind responsible for one entity kind.
    #[must_use]
    pub const fn for_entity(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Aggregate => Self::Aggregates,
            EntityKind::Projection => Self::Projections,
            EntityKind::InheritedAggregate => Self::InheritedAggregates,
            EntityKind::VersionToken => Self::TokenWrappers,
        }
    }

    /// Canonical label.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggregates => "aggregates",
            Self::Projections => "projections",
            Self::InheritedAggregates => "inherited-aggregates",
            Self::Extensions => "extensions",
            Self::TokenWrappers => "token-wrappers",
            Self::TokenConverters => "token-converters",
        }
    }
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The set of generators a scheduler drives, one per artifact kind.
///
/// Kinds with no registered generator are skipped silently; a partial set
/// is valid (and is how tests observe which kinds would run).
#[derive(Default, Clone)]
pub struct GeneratorSet {
    generators: FxHashMap<GeneratorKind, Arc<dyn Generator>>,
}

impl GeneratorSet {
    /// Creates an empty generator set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy with the given generator registered for `kind`.
    #[must_use]
    pub fn with(mut self, kind: GeneratorKind, generator: Arc<dyn Generator>) -> Self {
        self.generators.insert(kind, generator);
        self
    }

    /// Returns the generator for `kind`, if registered.
    #[must_use]
    pub fn get(&self, kind: GeneratorKind) -> Option<&Arc<dyn Generator>> {
        self.generators.get(&kind)
    }

    /// Returns the number of registered generators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.generators.len()
    }

    /// Returns `true` if no generators are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generators.is_empty()
    }
}

impl std::fmt::Debug for GeneratorSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<&str> = self.generators.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("GeneratorSet").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopGenerator;

    impl Generator for NoopGenerator {
        fn generate(
            &self,
            _project: &Project,
            _config: &GeneratorConfig,
            _solution_dir: &Utf8Path,
        ) -> Result<(), GenerateError> {
            Ok(())
        }
    }

    #[test]
    fn test_generator_order_covers_all_kinds() {
        assert_eq!(GeneratorKind::ORDER.len(), 6);
        assert_eq!(GeneratorKind::ORDER[0], GeneratorKind::Aggregates);
        assert_eq!(GeneratorKind::ORDER[5], GeneratorKind::TokenConverters);
    }

    #[test]
    fn test_generator_kind_for_entity() {
        assert_eq!(
            GeneratorKind::for_entity(EntityKind::Aggregate),
            GeneratorKind::Aggregates
        );
        assert_eq!(
            GeneratorKind::for_entity(EntityKind::VersionToken),
            GeneratorKind::TokenWrappers
        );
    }

    #[test]
    fn test_generator_set_registration() {
        let set = GeneratorSet::new().with(GeneratorKind::Aggregates, Arc::new(NoopGenerator));

        assert_eq!(set.len(), 1);
        assert!(set.get(GeneratorKind::Aggregates).is_some());
        assert!(set.get(GeneratorKind::Extensions).is_none());
    }
}
