//! The introspection capability the resolver consumes.

use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{Reflect, Shape, ShapeId};

/// Looks shapes up by identity.
///
/// This is the only view of the host type system the resolver needs.
pub trait Introspect: Send + Sync {
    /// The shape registered for `id`, if any.
    fn shape_of(&self, id: ShapeId) -> Option<Arc<Shape>>;

    /// Whether `id` is known.
    fn contains(&self, id: ShapeId) -> bool {
        self.shape_of(id).is_some()
    }
}

/// Thread-safe table of known shapes.
///
/// # Example
///
/// ```
/// use automap::shape::{Reflect, Shape, ShapeId, ShapeRegistry, Introspect};
///
/// #[derive(Clone, Default)]
/// struct Tag { label: String }
///
/// impl Reflect for Tag {
///     fn shape() -> Shape {
///         Shape::builder::<Tag>()
///             .property("label", |tag: &Tag| tag.label.clone(), |tag: &mut Tag, label| tag.label = label)
///             .value_type()
///             .build()
///     }
/// }
///
/// let registry = ShapeRegistry::new();
/// registry.register::<Tag>();
/// assert!(registry.contains(ShapeId::of::<Tag>()));
/// ```
#[derive(Default)]
pub struct ShapeRegistry {
    shapes: RwLock<FxHashMap<ShapeId, Arc<Shape>>>,
}

impl ShapeRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` and the nested shapes it declares.
    ///
    /// Registering an already known type returns the existing shape.
    pub fn register<T: Reflect>(&self) -> Arc<Shape> {
        let id = ShapeId::of::<T>();
        if let Some(shape) = self.shapes.read().get(&id) {
            return Arc::clone(shape);
        }
        let (shape, inserted) = {
            let mut shapes = self.shapes.write();
            match shapes.get(&id) {
                Some(shape) => (Arc::clone(shape), false),
                None => {
                    let shape = Arc::new(T::shape());
                    shapes.insert(id, Arc::clone(&shape));
                    (shape, true)
                }
            }
        };
        if inserted {
            tracing::trace!(shape = %id, "registered shape");
            T::register_nested(self);
        }
        shape
    }

    /// Inserts a hand-built shape, replacing any previous one with the same id.
    pub fn insert(&self, shape: Shape) -> Arc<Shape> {
        let shape = Arc::new(shape);
        self.shapes.write().insert(shape.id(), Arc::clone(&shape));
        shape
    }

    /// Number of registered shapes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.read().len()
    }

    /// Whether nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.read().is_empty()
    }
}

impl Introspect for ShapeRegistry {
    fn shape_of(&self, id: ShapeId) -> Option<Arc<Shape>> {
        self.shapes.read().get(&id).cloned()
    }
}

impl std::fmt::Debug for ShapeRegistry {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ShapeRegistry")
            .field("shapes", &self.shapes.read().keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[derive(Clone, Default)]
    struct Leaf {
        weight: u32,
    }

    #[derive(Clone, Default)]
    struct Branch {
        leaf: Option<Leaf>,
    }

    impl Reflect for Leaf {
        fn shape() -> Shape {
            Shape::builder::<Self>()
                .property("weight", |leaf: &Self| leaf.weight, |leaf: &mut Self, weight| {
                    leaf.weight = weight;
                })
                .value_type()
                .build()
        }
    }

    impl Reflect for Branch {
        fn shape() -> Shape {
            Shape::builder::<Self>()
                .optional_property(
                    "leaf",
                    |branch: &Self| branch.leaf.clone(),
                    |branch: &mut Self, leaf| branch.leaf = leaf,
                )
                .value_type()
                .build()
        }

        fn register_nested(registry: &ShapeRegistry) {
            registry.register::<Leaf>();
            registry.register::<Self>();
        }
    }

    #[rstest]
    fn register_pulls_in_nested_shapes() {
        let registry = ShapeRegistry::new();

        registry.register::<Branch>();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains(ShapeId::of::<Leaf>()));
    }

    #[rstest]
    fn register_is_idempotent() {
        let registry = ShapeRegistry::new();

        let first = registry.register::<Leaf>();
        let second = registry.register::<Leaf>();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[rstest]
    fn unknown_shapes_are_absent() {
        let registry = ShapeRegistry::new();

        assert!(registry.shape_of(ShapeId::of::<Leaf>()).is_none());
        assert!(registry.is_empty());
    }

    #[rstest]
    fn insert_replaces_existing_shape() {
        let registry = ShapeRegistry::new();
        registry.register::<Leaf>();

        let replacement = registry.insert(Shape::builder::<Leaf>().value_type().build());

        assert!(replacement.members().is_empty());
        assert_eq!(
            registry
                .shape_of(ShapeId::of::<Leaf>())
                .map(|shape| shape.members().len()),
            Some(0)
        );
    }
}
