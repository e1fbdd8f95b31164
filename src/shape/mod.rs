//! Member descriptor abstraction over data shapes.
//!
//! A [`Shape`] is the runtime description of a Rust type as far as mapping is
//! concerned: its readable/writable members, its constructors and whether it
//! is a value type that can be default-initialized. Shapes are produced by
//! `#[derive(Reflect)]`, or by hand through [`ShapeBuilder`], and collected
//! in a [`ShapeRegistry`].
//!
//! # Example
//!
//! ```
//! use automap::shape::{MemberKind, Shape};
//!
//! #[derive(Clone, Default)]
//! struct Point { x: i32, y: i32 }
//!
//! let shape = Shape::builder::<Point>()
//!     .property("x", |point: &Point| point.x, |point: &mut Point, x| point.x = x)
//!     .field("y", |point: &Point| point.y, |point: &mut Point, y| point.y = y)
//!     .value_type()
//!     .build();
//!
//! assert!(shape.is_value_type());
//! assert_eq!(shape.members().len(), 2);
//! assert_eq!(shape.members()[1].kind(), MemberKind::Field);
//! ```

mod builder;
mod constructor;
mod member;
mod registry;

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

pub use builder::ShapeBuilder;
pub use constructor::{ConstructFn, ConstructorArgs, ConstructorDescriptor, ParameterDescriptor};
pub use member::{MemberDescriptor, MemberKind, Reader, Writer};
pub use registry::{Introspect, ShapeRegistry};

/// A dynamically typed value moving between getters and setters.
pub type Value = Box<dyn Any + Send>;

/// Produces a fresh value on every call (initializers, parameter defaults).
pub type Factory = Arc<dyn Fn() -> Value + Send + Sync>;

/// Identity of a Rust type.
///
/// Equality and hashing only consider the [`TypeId`]; the type name is kept
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct ShapeId {
    type_id: TypeId,
    name: &'static str,
}

impl ShapeId {
    /// Returns the identity of `T`.
    #[must_use]
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying [`TypeId`].
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The full type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Whether `instance` is an instance of this shape.
    #[must_use]
    pub fn is_instance(&self, instance: &dyn Any) -> bool {
        instance.type_id() == self.type_id
    }
}

impl PartialEq for ShapeId {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ShapeId {}

impl Hash for ShapeId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl fmt::Debug for ShapeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name)
    }
}

impl fmt::Display for ShapeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name)
    }
}

/// Runtime description of a type's members and constructors.
pub struct Shape {
    id: ShapeId,
    initializer: Option<Factory>,
    members: Vec<MemberDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
}

impl Shape {
    /// Starts describing `S`.
    #[must_use]
    pub fn builder<S: Any + Send>() -> ShapeBuilder<S> {
        ShapeBuilder::new()
    }

    pub(crate) fn from_parts(
        id: ShapeId,
        initializer: Option<Factory>,
        members: Vec<MemberDescriptor>,
        constructors: Vec<ConstructorDescriptor>,
    ) -> Self {
        Self {
            id,
            initializer,
            members,
            constructors,
        }
    }

    /// Identity of the described type.
    #[must_use]
    pub const fn id(&self) -> ShapeId {
        self.id
    }

    /// Whether the shape is a value type, i.e. always default-initializable.
    #[must_use]
    pub const fn is_value_type(&self) -> bool {
        self.initializer.is_some()
    }

    /// The value-type initializer, if any.
    #[must_use]
    pub const fn initializer(&self) -> Option<&Factory> {
        self.initializer.as_ref()
    }

    /// All members in declaration order.
    #[must_use]
    pub fn members(&self) -> &[MemberDescriptor] {
        &self.members
    }

    /// All constructors in declaration order.
    #[must_use]
    pub fn constructors(&self) -> &[ConstructorDescriptor] {
        &self.constructors
    }

    /// Members whose name is exactly `name`.
    pub fn members_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MemberDescriptor> + 'a {
        self.members.iter().filter(move |member| member.name() == name)
    }

    /// Members whose name equals `name` ignoring ASCII case.
    pub fn members_named_ignore_case<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a MemberDescriptor> + 'a {
        self.members
            .iter()
            .filter(move |member| member.name().eq_ignore_ascii_case(name))
    }

    /// The first constructor taking no arguments.
    #[must_use]
    pub fn zero_arg_constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructors
            .iter()
            .find(|constructor| constructor.arity() == 0)
    }

    /// The constructor with the most parameters; the first one wins on ties.
    #[must_use]
    pub fn best_constructor(&self) -> Option<&ConstructorDescriptor> {
        self.constructors.iter().fold(None, |best, candidate| match best {
            Some(best) if best.arity() >= candidate.arity() => Some(best),
            _ => Some(candidate),
        })
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Shape")
            .field("id", &self.id)
            .field("value_type", &self.is_value_type())
            .field("members", &self.members)
            .field("constructors", &self.constructors)
            .finish()
    }
}

/// Types that can describe their own shape.
///
/// Usually derived with `#[derive(Reflect)]`.
pub trait Reflect: Any + Send + Sized {
    /// Builds the shape of `Self`.
    fn shape() -> Shape;

    /// Registers the shapes of nested member types.
    ///
    /// The default registers nothing.
    fn register_nested(_registry: &ShapeRegistry) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Clone, Default)]
    struct Pair {
        left: i32,
        right: String,
    }

    fn pair_shape() -> Shape {
        Shape::builder::<Pair>()
            .property("Left", |pair: &Pair| pair.left, |pair: &mut Pair, left| {
                pair.left = left;
            })
            .field(
                "right",
                |pair: &Pair| pair.right.clone(),
                |pair: &mut Pair, right| pair.right = right,
            )
            .constructor(
                vec![ParameterDescriptor::zeroed::<i32>("left")],
                |arguments: &mut ConstructorArgs| {
                    Ok(Pair {
                        left: arguments.take(0)?,
                        right: String::new(),
                    })
                },
            )
            .constructor(
                vec![
                    ParameterDescriptor::zeroed::<i32>("left"),
                    ParameterDescriptor::zeroed::<String>("right"),
                ],
                |arguments: &mut ConstructorArgs| {
                    Ok(Pair {
                        left: arguments.take(0)?,
                        right: arguments.take(1)?,
                    })
                },
            )
            .constructor(
                vec![
                    ParameterDescriptor::zeroed::<String>("right"),
                    ParameterDescriptor::zeroed::<i32>("left"),
                ],
                |arguments: &mut ConstructorArgs| {
                    Ok(Pair {
                        right: arguments.take(0)?,
                        left: arguments.take(1)?,
                    })
                },
            )
            .build()
    }

    #[rstest]
    fn shape_id_equality_ignores_name() {
        assert_eq!(ShapeId::of::<i32>(), ShapeId::of::<i32>());
        assert_ne!(ShapeId::of::<i32>(), ShapeId::of::<i64>());
        assert_eq!(ShapeId::of::<i32>().to_string(), "i32");
    }

    #[rstest]
    fn shape_id_recognizes_instances() {
        let value: Value = Box::new(5_i32);

        assert!(ShapeId::of::<i32>().is_instance(&*value));
        assert!(!ShapeId::of::<u32>().is_instance(&*value));
    }

    #[rstest]
    fn best_constructor_prefers_first_of_greatest_arity() {
        let shape = pair_shape();
        let best = shape.best_constructor().map(|constructor| {
            constructor
                .parameters()
                .iter()
                .map(|parameter| parameter.name().to_string())
                .collect::<Vec<_>>()
        });

        assert_eq!(best, Some(vec!["left".to_string(), "right".to_string()]));
        assert!(shape.zero_arg_constructor().is_none());
        assert!(!shape.is_value_type());
    }

    #[rstest]
    #[case("Left", 1, 1)]
    #[case("left", 0, 1)]
    #[case("RIGHT", 0, 1)]
    #[case("missing", 0, 0)]
    fn member_lookup_by_name(
        #[case] name: &str,
        #[case] exact: usize,
        #[case] ignoring_case: usize,
    ) {
        let shape = pair_shape();

        assert_eq!(shape.members_named(name).count(), exact);
        assert_eq!(shape.members_named_ignore_case(name).count(), ignoring_case);
    }
}
