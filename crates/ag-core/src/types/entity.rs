//! Declared entity records: aggregates, projections, inherited aggregates,
//! and version tokens.
//!
//! Every entity carries its identifier name, the relative file locations it
//! was declared in (partial entities may span several files), and
//! kind-specific detail. Entities are plain data; the analyzer produces
//! them, the detector and generators only read them.

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::types::detail::{
    BlobSettings, CommandDecl, ConstructorDecl, EventDecl, PostFoldHandler, PropertyDecl,
    StreamAction, StreamTypeAttr,
};
use crate::types::key::{EntityKey, EntityKind};

/// File locations an entity was declared in, relative to the solution dir.
pub type FileLocations = SmallVec<[Utf8PathBuf; 2]>;

/// Boolean declaration flags on an aggregate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateFlags {
    /// Whether the aggregate class is declared `partial`.
    ///
    /// Incremental regeneration of a non-partial aggregate is skipped.
    pub partial_class: bool,

    /// Whether a custom partial factory declaration exists.
    pub custom_factory_partial: bool,

    /// Whether a custom partial repository declaration exists.
    pub custom_repository_partial: bool,

    /// Whether the aggregate checkpoints its fold state externally.
    pub external_checkpoint: bool,

    /// Whether a post-fold-all handler is declared.
    pub has_post_fold_all: bool,
}

/// A domain aggregate whose state is folded from an event stream.
///
/// # Examples
///
/// ```
/// use ag_core::Aggregate;
///
/// let agg = Aggregate::new("Order").with_file("Domain/Order.cs");
/// assert_eq!(agg.key().to_string(), "Aggregate:Order");
/// assert_eq!(agg.files.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Identifier name, unique among aggregates in a project.
    pub name: String,

    /// Relative paths of the files declaring this aggregate.
    pub files: FileLocations,

    /// Declared domain events.
    pub events: Vec<EventDecl>,

    /// Declared properties.
    pub properties: Vec<PropertyDecl>,

    /// Declared commands.
    pub commands: Vec<CommandDecl>,

    /// Declared constructors.
    pub constructors: Vec<ConstructorDecl>,

    /// Post-fold handler, if declared.
    pub post_fold: Option<PostFoldHandler>,

    /// Declared stream actions.
    pub stream_actions: Vec<StreamAction>,

    /// Stream-type attribute, if declared.
    pub stream_type: Option<StreamTypeAttr>,

    /// Blob-settings attribute, if declared.
    pub blob_settings: Option<BlobSettings>,

    /// Boolean declaration flags.
    pub flags: AggregateFlags,
}

impl Aggregate {
    /// Creates an empty aggregate with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with the given declaring file appended.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// Returns a copy with the given event appended.
    #[must_use]
    pub fn with_event(mut self, event: EventDecl) -> Self {
        self.events.push(event);
        self
    }

    /// Returns a copy marked as a partial class.
    #[must_use]
    pub fn partial(mut self) -> Self {
        self.flags.partial_class = true;
        self
    }

    /// The join key for this aggregate.
    #[inline]
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(EntityKind::Aggregate, self.name.as_str())
    }
}

/// Boolean declaration flags on a projection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionFlags {
    /// Whether the projection class is declared `partial`.
    pub partial_class: bool,

    /// Whether the projection checkpoints its fold state externally.
    pub external_checkpoint: bool,
}

/// A read-model folded from events across one or more aggregates.
///
/// Routed projections additionally carry a router type and a destination
/// type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// Identifier name, unique among projections in a project.
    pub name: String,

    /// Relative paths of the files declaring this projection.
    pub files: FileLocations,

    /// Declared domain events this projection folds.
    pub events: Vec<EventDecl>,

    /// Declared properties.
    pub properties: Vec<PropertyDecl>,

    /// Post-fold handler, if declared.
    pub post_fold: Option<PostFoldHandler>,

    /// Declared stream actions.
    pub stream_actions: Vec<StreamAction>,

    /// Router type for routed projections.
    pub router_type: Option<String>,

    /// Destination type for routed projections.
    pub destination_type: Option<String>,

    /// Blob-settings attribute, if declared.
    pub blob_settings: Option<BlobSettings>,

    /// Boolean declaration flags.
    pub flags: ProjectionFlags,
}

impl Projection {
    /// Creates an empty projection with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with the given declaring file appended.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// The join key for this projection.
    #[inline]
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(EntityKind::Projection, self.name.as_str())
    }
}

/// An aggregate deriving its behavior from a base aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritedAggregate {
    /// Identifier name, unique among inherited aggregates in a project.
    pub name: String,

    /// Relative paths of the files declaring this entity.
    pub files: FileLocations,

    /// Name of the base aggregate.
    pub base: String,

    /// Events declared on top of the base aggregate.
    pub events: Vec<EventDecl>,

    /// Properties declared on top of the base aggregate.
    pub properties: Vec<PropertyDecl>,

    /// Whether the class is declared `partial`.
    pub partial_class: bool,
}

impl InheritedAggregate {
    /// Creates an empty inherited aggregate with the given name and base.
    #[must_use]
    pub fn new(name: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            base: base.into(),
            ..Self::default()
        }
    }

    /// Returns a copy with the given declaring file appended.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// The join key for this entity.
    #[inline]
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(EntityKind::InheritedAggregate, self.name.as_str())
    }
}

/// A wrapper token carrying a schema version for serialized payloads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionToken {
    /// Identifier name, unique among version tokens in a project.
    pub name: String,

    /// Relative paths of the files declaring this token.
    pub files: FileLocations,

    /// The wrapped inner type name.
    pub inner_type: String,
}

impl VersionToken {
    /// Creates a version token with the given name and inner type.
    #[must_use]
    pub fn new(name: impl Into<String>, inner_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner_type: inner_type.into(),
            files: FileLocations::new(),
        }
    }

    /// Returns a copy with the given declaring file appended.
    #[must_use]
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.files.push(path.into());
        self
    }

    /// The join key for this token.
    #[inline]
    #[must_use]
    pub fn key(&self) -> EntityKey {
        EntityKey::new(EntityKind::VersionToken, self.name.as_str())
    }
}
