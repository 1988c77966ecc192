//! Core types, errors, and utilities for the aggregen code generator.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - The immutable entity model ([`Snapshot`], [`Project`], entity records)
//! - [`EntityKey`] / [`EntityKind`] join keys used for indexing and diffing
//! - Configuration structures for watching and generation
//! - Error types for consistent error handling
//! - Type aliases for `FxHashMap`/`FxHashSet` (faster than std)

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use config::{Config, GeneratorConfig, SourceConfig, WatchConfig};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, fx_hash_map, fx_hash_set};
pub use types::detail::{
    BlobSettings, CommandDecl, ConstructorDecl, EventDecl, PostFoldHandler, PropertyDecl,
    StreamAction, StreamTypeAttr,
};
pub use types::entity::{
    Aggregate, AggregateFlags, FileLocations, InheritedAggregate, Projection, ProjectionFlags,
    VersionToken,
};
pub use types::key::{EntityKey, EntityKind};
pub use types::model::{Project, Snapshot};
