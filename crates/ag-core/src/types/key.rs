//! Entity kinds and the `"{Kind}:{Name}"` join key.
//!
//! [`EntityKey`] is the identity used by the file index and the change
//! detector to join entities across snapshots. Keys are unique per kind
//! within a snapshot.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of a declared domain entity.
///
/// # Examples
///
/// ```
/// use ag_core::EntityKind;
///
/// assert_eq!(EntityKind::Aggregate.as_str(), "Aggregate");
/// assert_eq!(EntityKind::VersionToken.as_str(), "VersionToken");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Domain entity whose state is folded from an event stream.
    Aggregate,

    /// Read-model folded from events across one or more aggregates.
    Projection,

    /// Aggregate deriving its behavior from a base aggregate.
    InheritedAggregate,

    /// Wrapper token carrying a schema version for serialized payloads.
    VersionToken,
}

impl EntityKind {
    /// All kinds, in the order generators run over them.
    pub const ALL: [Self; 4] = [
        Self::Aggregate,
        Self::Projection,
        Self::InheritedAggregate,
        Self::VersionToken,
    ];

    /// Returns the canonical name used in [`EntityKey`] rendering.
    ///
    /// # Examples
    ///
    /// ```
    /// use ag_core::EntityKind;
    ///
    /// assert_eq!(EntityKind::InheritedAggregate.as_str(), "InheritedAggregate");
    /// ```
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggregate => "Aggregate",
            Self::Projection => "Projection",
            Self::InheritedAggregate => "InheritedAggregate",
            Self::VersionToken => "VersionToken",
        }
    }

    /// Returns `true` if changes to this kind affect the shared
    /// extension/registration artifact.
    ///
    /// Adding or removing aggregates and projections changes registration
    /// wiring; inherited aggregates and version tokens do not.
    #[inline]
    #[must_use]
    pub const fn affects_extensions(self) -> bool {
        matches!(self, Self::Aggregate | Self::Projection)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Join key identifying one entity within a snapshot: kind plus identifier
/// name.
///
/// Rendered as `"{Kind}:{Name}"`. Keys order by kind first, then name, so
/// sorted iteration over a key set is deterministic.
///
/// # Examples
///
/// ```
/// use ag_core::{EntityKey, EntityKind};
///
/// let key = EntityKey::new(EntityKind::Aggregate, "Order");
/// assert_eq!(key.to_string(), "Aggregate:Order");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityKey {
    /// The entity kind.
    pub kind: EntityKind,
    /// The identifier name, unique within its kind per snapshot.
    pub name: String,
}

impl EntityKey {
    /// Creates a new key from a kind and identifier name.
    #[inline]
    #[must_use]
    pub fn new(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }

    /// Creates an aggregate key.
    #[inline]
    #[must_use]
    pub fn aggregate(name: impl Into<String>) -> Self {
        Self::new(EntityKind::Aggregate, name)
    }

    /// Creates a projection key.
    #[inline]
    #[must_use]
    pub fn projection(name: impl Into<String>) -> Self {
        Self::new(EntityKind::Projection, name)
    }

    /// Creates an inherited-aggregate key.
    #[inline]
    #[must_use]
    pub fn inherited(name: impl Into<String>) -> Self {
        Self::new(EntityKind::InheritedAggregate, name)
    }

    /// Creates a version-token key.
    #[inline]
    #[must_use]
    pub fn version_token(name: impl Into<String>) -> Self {
        Self::new(EntityKind::VersionToken, name)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}
