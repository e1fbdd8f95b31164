//! Readable and writable slots of a shape.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::{ShapeId, Value};
use crate::error::Result;

/// Reads a member out of an instance. `Ok(None)` is an absent value.
pub type Reader = Arc<dyn Fn(&dyn Any) -> Result<Option<Value>> + Send + Sync>;

/// Writes a member into an instance. Writing `None` into a non-optional
/// member leaves it untouched.
pub type Writer = Arc<dyn Fn(&mut dyn Any, Option<Value>) -> Result<()> + Send + Sync>;

/// How a member is declared on its shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// A plain data field.
    Field,
    /// An accessor-backed property.
    Property,
}

/// A named, typed slot on a shape.
#[derive(Clone)]
pub struct MemberDescriptor {
    name: Arc<str>,
    value_type: ShapeId,
    kind: MemberKind,
    optional_type: Option<ShapeId>,
    markers: SmallVec<[Arc<str>; 2]>,
    reader: Option<Reader>,
    writer: Option<Writer>,
}

impl MemberDescriptor {
    pub(crate) fn new(
        name: Arc<str>,
        value_type: ShapeId,
        kind: MemberKind,
        optional_type: Option<ShapeId>,
        reader: Option<Reader>,
        writer: Option<Writer>,
    ) -> Self {
        Self {
            name,
            value_type,
            kind,
            optional_type,
            markers: SmallVec::new(),
            reader,
            writer,
        }
    }

    pub(crate) fn add_marker(&mut self, marker: Arc<str>) {
        if !self.has_marker(&marker) {
            self.markers.push(marker);
        }
    }

    /// The member name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// The declared value type (the inner type for optional members).
    #[must_use]
    pub const fn value_type(&self) -> ShapeId {
        self.value_type
    }

    /// Field or property.
    #[must_use]
    pub const fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Whether the member may hold an absent value.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional_type.is_some()
    }

    /// The declared `Option<V>` type of an optional member.
    ///
    /// Its writer accepts a boxed `Option<V>` as well as a `V`.
    #[must_use]
    pub const fn optional_type(&self) -> Option<ShapeId> {
        self.optional_type
    }

    /// Whether the member carries the declarative `marker`.
    #[must_use]
    pub fn has_marker(&self, marker: &str) -> bool {
        self.markers.iter().any(|candidate| &**candidate == marker)
    }

    /// All declarative markers on the member.
    pub fn markers(&self) -> impl Iterator<Item = &str> {
        self.markers.iter().map(|marker| &**marker)
    }

    /// Whether the member can be read.
    #[must_use]
    pub const fn is_readable(&self) -> bool {
        self.reader.is_some()
    }

    /// Whether the member can be written.
    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.writer.is_some()
    }

    /// The reader, if the member is readable.
    #[must_use]
    pub const fn reader(&self) -> Option<&Reader> {
        self.reader.as_ref()
    }

    /// The writer, if the member is writable.
    #[must_use]
    pub const fn writer(&self) -> Option<&Writer> {
        self.writer.as_ref()
    }
}

impl fmt::Debug for MemberDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MemberDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("kind", &self.kind)
            .field("optional", &self.is_optional())
            .field("markers", &self.markers)
            .field("readable", &self.is_readable())
            .field("writable", &self.is_writable())
            .finish()
    }
}
