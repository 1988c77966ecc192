//! Kind-specific entity detail records.
//!
//! These are the members the change detector diffs pairwise: events,
//! properties, commands, constructors, post-fold handlers, stream actions,
//! and single-valued attributes. All of them are plain serde-derived data.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// A declared domain event folded into an entity's state.
///
/// # Examples
///
/// ```
/// use ag_core::EventDecl;
///
/// let event = EventDecl::new("OrderShipped", "Apply", 2, false);
/// assert_eq!(event.name, "OrderShipped");
/// assert_eq!(event.parameter_count, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDecl {
    /// The event type name (join key within one entity).
    pub name: String,

    /// How the event handler is activated (fold method name or activation
    /// attribute).
    pub activation: String,

    /// Number of parameters the handler declares.
    pub parameter_count: usize,

    /// Whether applying the event requires awaiting.
    pub requires_await: bool,
}

impl EventDecl {
    /// Creates a new event declaration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        activation: impl Into<String>,
        parameter_count: usize,
        requires_await: bool,
    ) -> Self {
        Self {
            name: name.into(),
            activation: activation.into(),
            parameter_count,
            requires_await,
        }
    }
}

/// A declared property on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDecl {
    /// The property name (join key within one entity).
    pub name: String,

    /// The declared type name.
    pub type_name: String,

    /// Whether the property is nullable.
    pub nullable: bool,

    /// Generic type arguments, in declaration order.
    pub generic_args: Vec<String>,
}

impl PropertyDecl {
    /// Creates a new non-generic property declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable,
            generic_args: Vec::new(),
        }
    }

    /// Returns a copy with the given generic type arguments.
    #[must_use]
    pub fn with_generics(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.generic_args = args.into_iter().collect();
        self
    }
}

/// A declared command handled by an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDecl {
    /// The command name (join key within one entity).
    pub name: String,

    /// Number of parameters the handler declares.
    pub parameter_count: usize,

    /// The declared return type name.
    pub return_type: String,

    /// Whether the handler is asynchronous.
    pub is_async: bool,

    /// Names of the event types the command can produce.
    pub produced_events: SmallVec<[String; 4]>,
}

impl CommandDecl {
    /// Creates a new command declaration.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        parameter_count: usize,
        return_type: impl Into<String>,
        is_async: bool,
    ) -> Self {
        Self {
            name: name.into(),
            parameter_count,
            return_type: return_type.into(),
            is_async,
            produced_events: SmallVec::new(),
        }
    }

    /// Returns a copy with the given produced event names.
    #[must_use]
    pub fn with_produced_events<I, S>(mut self, events: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.produced_events = events.into_iter().map(Into::into).collect();
        self
    }
}

/// A declared constructor, identified by its parameter-type signature only.
///
/// Constructors have no names; two constructors with identical signatures
/// are indistinguishable to the detector.
///
/// # Examples
///
/// ```
/// use ag_core::ConstructorDecl;
///
/// let ctor = ConstructorDecl::new(["string", "int"]);
/// assert_eq!(ctor.signature(), "string,int");
/// assert_eq!(ctor.parameter_count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorDecl {
    /// Parameter type names, in declaration order.
    pub parameter_types: Vec<String>,
}

impl ConstructorDecl {
    /// Creates a new constructor declaration from parameter type names.
    #[must_use]
    pub fn new<I, S>(parameter_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parameter_types: parameter_types.into_iter().map(Into::into).collect(),
        }
    }

    /// The comparison signature: parameter types joined with `,`.
    #[must_use]
    pub fn signature(&self) -> String {
        self.parameter_types.join(",")
    }

    /// Number of declared parameters.
    #[inline]
    #[must_use]
    pub fn parameter_count(&self) -> usize {
        self.parameter_types.len()
    }
}

/// A post-fold handler running after every event application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostFoldHandler {
    /// Number of parameters the handler declares.
    pub parameter_count: usize,
}

impl PostFoldHandler {
    /// Creates a new post-fold handler record.
    #[inline]
    #[must_use]
    pub const fn new(parameter_count: usize) -> Self {
        Self { parameter_count }
    }
}

/// A declared stream action attached to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamAction {
    /// The declared action type name (join key within one entity).
    pub type_name: String,

    /// Interface names the action type implements.
    pub interfaces: Vec<String>,

    /// How the action is registered (singleton, scoped, ...).
    pub registration: String,
}

impl StreamAction {
    /// Creates a new stream action record.
    #[must_use]
    pub fn new(type_name: impl Into<String>, registration: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            interfaces: Vec::new(),
            registration: registration.into(),
        }
    }

    /// Returns a copy with the given implemented interfaces.
    #[must_use]
    pub fn with_interfaces<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces = interfaces.into_iter().map(Into::into).collect();
        self
    }
}

/// The single-valued stream-type attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamTypeAttr {
    /// The declared stream type name.
    pub type_name: String,
}

impl StreamTypeAttr {
    /// Creates a new stream-type attribute.
    #[inline]
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
        }
    }
}

/// The single-valued blob-settings attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobSettings {
    /// Target blob container name.
    pub container: String,

    /// Content type written alongside the payload.
    pub content_type: String,
}

impl BlobSettings {
    /// Creates a new blob-settings attribute.
    #[must_use]
    pub fn new(container: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            content_type: content_type.into(),
        }
    }
}
