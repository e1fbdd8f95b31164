//! Constructor descriptors and positional argument lists.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use super::{Factory, ShapeId, Value};
use crate::error::{MapError, Result};

/// Builds an instance from positional arguments.
pub type ConstructFn = Arc<dyn Fn(&mut ConstructorArgs) -> Result<Value> + Send + Sync>;

/// One constructor parameter.
#[derive(Clone)]
pub struct ParameterDescriptor {
    name: Arc<str>,
    value_type: ShapeId,
    optional: bool,
    default: Option<Factory>,
}

impl ParameterDescriptor {
    /// A parameter of type `V` without a declared default.
    #[must_use]
    pub fn new<V: Any + Send>(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            value_type: ShapeId::of::<V>(),
            optional: false,
            default: None,
        }
    }

    /// A parameter of type `Option<V>`; absent when unmatched.
    #[must_use]
    pub fn optional<V: Any + Send>(name: impl Into<Arc<str>>) -> Self {
        Self {
            optional: true,
            ..Self::new::<V>(name)
        }
    }

    /// A parameter whose default is `V::default()`.
    #[must_use]
    pub fn zeroed<V: Any + Send + Default>(name: impl Into<Arc<str>>) -> Self {
        Self::defaulted(name, V::default)
    }

    /// A parameter with an explicit default.
    #[must_use]
    pub fn defaulted<V, F>(name: impl Into<Arc<str>>, default: F) -> Self
    where
        V: Any + Send,
        F: Fn() -> V + Send + Sync + 'static,
    {
        Self {
            default: Some(Arc::new(move || Box::new(default()) as Value)),
            ..Self::new::<V>(name)
        }
    }

    /// The parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn shared_name(&self) -> Arc<str> {
        Arc::clone(&self.name)
    }

    /// The declared value type.
    #[must_use]
    pub const fn value_type(&self) -> ShapeId {
        self.value_type
    }

    /// Whether the parameter accepts an absent value.
    #[must_use]
    pub const fn is_optional(&self) -> bool {
        self.optional
    }

    /// The declared default, if any.
    #[must_use]
    pub const fn default_value(&self) -> Option<&Factory> {
        self.default.as_ref()
    }
}

impl fmt::Debug for ParameterDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ParameterDescriptor")
            .field("name", &self.name)
            .field("value_type", &self.value_type)
            .field("optional", &self.optional)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

/// A constructor: ordered parameters and the function invoking it.
#[derive(Clone)]
pub struct ConstructorDescriptor {
    shape: ShapeId,
    parameters: Vec<ParameterDescriptor>,
    construct: ConstructFn,
}

impl ConstructorDescriptor {
    pub(crate) fn new(
        shape: ShapeId,
        parameters: Vec<ParameterDescriptor>,
        construct: ConstructFn,
    ) -> Self {
        Self {
            shape,
            parameters,
            construct,
        }
    }

    /// Number of parameters.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    /// The parameters in positional order.
    #[must_use]
    pub fn parameters(&self) -> &[ParameterDescriptor] {
        &self.parameters
    }

    /// The shape this constructor builds.
    #[must_use]
    pub const fn shape(&self) -> ShapeId {
        self.shape
    }

    /// The raw construct function.
    #[must_use]
    pub const fn construct_fn(&self) -> &ConstructFn {
        &self.construct
    }

    /// Invokes the constructor with positional `values`.
    ///
    /// # Errors
    ///
    /// Propagates whatever the construct function reports, typically
    /// [`MapError::MissingArgument`] or [`MapError::ValueMismatch`].
    pub fn invoke(&self, values: SmallVec<[Option<Value>; 4]>) -> Result<Value> {
        let mut arguments = ConstructorArgs::new(self.shape.name(), values);
        (self.construct)(&mut arguments)
    }
}

impl fmt::Debug for ConstructorDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ConstructorDescriptor")
            .field("shape", &self.shape)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// Positional arguments handed to a construct function.
///
/// Each argument can be taken once.
pub struct ConstructorArgs {
    shape: &'static str,
    values: SmallVec<[Option<Value>; 4]>,
}

impl ConstructorArgs {
    /// Wraps positional values for the shape named `shape`.
    #[must_use]
    pub const fn new(shape: &'static str, values: SmallVec<[Option<Value>; 4]>) -> Self {
        Self { shape, values }
    }

    /// Number of positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no positions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Takes the argument at `index`, failing when it is absent.
    ///
    /// # Errors
    ///
    /// [`MapError::MissingArgument`] when absent, [`MapError::ValueMismatch`]
    /// when the value is not a `V`.
    pub fn take<V: Any>(&mut self, index: usize) -> Result<V> {
        self.take_optional(index)?
            .ok_or(MapError::MissingArgument {
                shape: self.shape,
                index,
            })
    }

    /// Takes the argument at `index`, allowing it to be absent.
    ///
    /// # Errors
    ///
    /// [`MapError::ValueMismatch`] when the value is not a `V`.
    pub fn take_optional<V: Any>(&mut self, index: usize) -> Result<Option<V>> {
        let Some(value) = self.values.get_mut(index).and_then(Option::take) else {
            return Ok(None);
        };
        value
            .downcast::<V>()
            .map(|value| Some(*value))
            .map_err(|_| MapError::value_mismatch::<V>(&format!("argument {index}")))
    }
}
