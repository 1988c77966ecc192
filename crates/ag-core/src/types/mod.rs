//! Entity model types.
//!
//! The model is a hierarchy of plain immutable records:
//!
//! - [`model::Snapshot`] owns [`model::Project`]s
//! - a project owns its declared entities ([`entity::Aggregate`],
//!   [`entity::Projection`], [`entity::InheritedAggregate`],
//!   [`entity::VersionToken`])
//! - entities own their kind-specific detail ([`detail`])
//!
//! Every re-analysis produces a brand-new [`model::Snapshot`]; nothing in
//! this module mutates in place.

pub mod detail;
pub mod entity;
pub mod key;
pub mod model;
