//! The snapshot root and project records.
//!
//! A [`Snapshot`] is the immutable result of one analysis pass over the
//! watched solution. Every re-analysis produces a brand-new snapshot; the
//! scheduler swaps whole snapshots, it never patches one in place.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::entity::{Aggregate, InheritedAggregate, Projection, VersionToken};
use crate::types::key::{EntityKey, EntityKind};

/// One analyzed project within the solution.
///
/// Owns the declared entities of every kind plus project-level metadata.
/// [`Project::isolated`] builds the reduced single-entity value used for
/// incremental regeneration.
///
/// # Examples
///
/// ```
/// use ag_core::{Aggregate, EntityKey, Project};
///
/// let project = Project::new("Shop.Domain")
///     .with_aggregate(Aggregate::new("Order"))
///     .with_aggregate(Aggregate::new("Invoice"));
///
/// let reduced = project.isolated(&EntityKey::aggregate("Order")).unwrap();
/// assert_eq!(reduced.aggregates.len(), 1);
/// assert_eq!(reduced.name, "Shop.Domain");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project name.
    pub name: String,

    /// Root namespace generated code is emitted into.
    pub namespace: String,

    /// Declared aggregates.
    pub aggregates: Vec<Aggregate>,

    /// Declared projections.
    pub projections: Vec<Projection>,

    /// Declared inherited aggregates.
    pub inherited_aggregates: Vec<InheritedAggregate>,

    /// Declared version tokens.
    pub version_tokens: Vec<VersionToken>,
}

impl Project {
    /// Creates an empty project with the given name.
    ///
    /// The namespace defaults to the project name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            namespace: name.clone(),
            name,
            ..Self::default()
        }
    }

    /// Returns a copy with the given aggregate appended.
    #[must_use]
    pub fn with_aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregates.push(aggregate);
        self
    }

    /// Returns a copy with the given projection appended.
    #[must_use]
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    /// Returns a copy with the given inherited aggregate appended.
    #[must_use]
    pub fn with_inherited(mut self, inherited: InheritedAggregate) -> Self {
        self.inherited_aggregates.push(inherited);
        self
    }

    /// Returns a copy with the given version token appended.
    #[must_use]
    pub fn with_version_token(mut self, token: VersionToken) -> Self {
        self.version_tokens.push(token);
        self
    }

    /// Returns `true` if this project declares the keyed entity.
    #[must_use]
    pub fn contains(&self, key: &EntityKey) -> bool {
        match key.kind {
            EntityKind::Aggregate => self.aggregates.iter().any(|a| a.name == key.name),
            EntityKind::Projection => self.projections.iter().any(|p| p.name == key.name),
            EntityKind::InheritedAggregate => {
                self.inherited_aggregates.iter().any(|i| i.name == key.name)
            }
            EntityKind::VersionToken => self.version_tokens.iter().any(|t| t.name == key.name),
        }
    }

    /// Builds a reduced project containing only the keyed entity.
    ///
    /// The target entity is the sole member of its kind's collection, all
    /// other collections are emptied, and project metadata is preserved
    /// unchanged. The result flows through the same generators used for
    /// full runs, so there is no duplicated emission logic for incremental
    /// passes.
    ///
    /// Returns `None` if the project does not declare the keyed entity.
    #[must_use]
    pub fn isolated(&self, key: &EntityKey) -> Option<Self> {
        let mut reduced = Self {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            aggregates: Vec::new(),
            projections: Vec::new(),
            inherited_aggregates: Vec::new(),
            version_tokens: Vec::new(),
        };

        match key.kind {
            EntityKind::Aggregate => {
                let entity = self.aggregates.iter().find(|a| a.name == key.name)?;
                reduced.aggregates.push(entity.clone());
            }
            EntityKind::Projection => {
                let entity = self.projections.iter().find(|p| p.name == key.name)?;
                reduced.projections.push(entity.clone());
            }
            EntityKind::InheritedAggregate => {
                let entity = self
                    .inherited_aggregates
                    .iter()
                    .find(|i| i.name == key.name)?;
                reduced.inherited_aggregates.push(entity.clone());
            }
            EntityKind::VersionToken => {
                let entity = self.version_tokens.iter().find(|t| t.name == key.name)?;
                reduced.version_tokens.push(entity.clone());
            }
        }

        Some(reduced)
    }

    /// Iterates the keys of every entity declared in this project.
    pub fn entity_keys(&self) -> impl Iterator<Item = EntityKey> + '_ {
        let aggregates = self.aggregates.iter().map(Aggregate::key);
        let projections = self.projections.iter().map(Projection::key);
        let inherited = self.inherited_aggregates.iter().map(InheritedAggregate::key);
        let tokens = self.version_tokens.iter().map(VersionToken::key);
        aggregates.chain(projections).chain(inherited).chain(tokens)
    }
}

/// Immutable snapshot of the analyzed solution.
///
/// The root of the entity model: owns every analyzed [`Project`]. The
/// flattening accessors return `BTreeMap` views keyed by identifier name so
/// callers iterating them observe a deterministic, sorted order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The analyzed projects.
    pub projects: Vec<Project>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a snapshot from a list of projects.
    #[must_use]
    pub fn from_projects(projects: impl IntoIterator<Item = Project>) -> Self {
        Self {
            projects: projects.into_iter().collect(),
        }
    }

    /// Returns the project declaring the keyed entity, if any.
    #[must_use]
    pub fn project_of(&self, key: &EntityKey) -> Option<&Project> {
        self.projects.iter().find(|p| p.contains(key))
    }

    /// All entity keys in the snapshot, sorted.
    #[must_use]
    pub fn entity_keys(&self) -> Vec<EntityKey> {
        let mut keys: Vec<EntityKey> =
            self.projects.iter().flat_map(Project::entity_keys).collect();
        keys.sort();
        keys
    }

    /// Aggregates flattened across projects, keyed by identifier name.
    #[must_use]
    pub fn aggregates(&self) -> BTreeMap<&str, &Aggregate> {
        self.projects
            .iter()
            .flat_map(|p| p.aggregates.iter())
            .map(|a| (a.name.as_str(), a))
            .collect()
    }

    /// Projections flattened across projects, keyed by identifier name.
    #[must_use]
    pub fn projections(&self) -> BTreeMap<&str, &Projection> {
        self.projects
            .iter()
            .flat_map(|p| p.projections.iter())
            .map(|p| (p.name.as_str(), p))
            .collect()
    }

    /// Inherited aggregates flattened across projects, keyed by identifier
    /// name.
    #[must_use]
    pub fn inherited_aggregates(&self) -> BTreeMap<&str, &InheritedAggregate> {
        self.projects
            .iter()
            .flat_map(|p| p.inherited_aggregates.iter())
            .map(|i| (i.name.as_str(), i))
            .collect()
    }

    /// Version tokens flattened across projects, keyed by identifier name.
    #[must_use]
    pub fn version_tokens(&self) -> BTreeMap<&str, &VersionToken> {
        self.projects
            .iter()
            .flat_map(|p| p.version_tokens.iter())
            .map(|t| (t.name.as_str(), t))
            .collect()
    }
}
