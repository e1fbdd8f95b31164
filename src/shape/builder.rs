//! Typed construction of [`Shape`] descriptions.

use std::any::Any;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{
    ConstructFn, ConstructorArgs, ConstructorDescriptor, Factory, MemberDescriptor, MemberKind,
    ParameterDescriptor, Reader, Shape, ShapeId, Value, Writer,
};
use crate::error::{MapError, Result};

/// Builder for the shape of `S`.
///
/// Accessors are given as typed closures; the builder erases them into
/// [`Reader`]/[`Writer`] capabilities that downcast on use.
pub struct ShapeBuilder<S> {
    initializer: Option<Factory>,
    members: Vec<MemberDescriptor>,
    constructors: Vec<ConstructorDescriptor>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: Any + Send> Default for ShapeBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Any + Send> ShapeBuilder<S> {
    /// An empty description of `S`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initializer: None,
            members: Vec::new(),
            constructors: Vec::new(),
            _marker: PhantomData,
        }
    }

    /// Adds a readable and writable property.
    #[must_use]
    pub fn property<V, G, W>(self, name: impl Into<Arc<str>>, get: G, set: W) -> Self
    where
        V: Any + Send,
        G: Fn(&S) -> V + Send + Sync + 'static,
        W: Fn(&mut S, V) + Send + Sync + 'static,
    {
        let name = name.into();
        let writer = writer::<S, V, W>(Arc::clone(&name), set);
        self.member::<V>(MemberKind::Property, name, false, Some(reader(get)), Some(writer))
    }

    /// Adds a property of type `Option<V>`.
    #[must_use]
    pub fn optional_property<V, G, W>(self, name: impl Into<Arc<str>>, get: G, set: W) -> Self
    where
        V: Any + Send,
        G: Fn(&S) -> Option<V> + Send + Sync + 'static,
        W: Fn(&mut S, Option<V>) + Send + Sync + 'static,
    {
        let name = name.into();
        let writer = optional_writer::<S, V, W>(Arc::clone(&name), set);
        self.member::<V>(
            MemberKind::Property,
            name,
            true,
            Some(optional_reader(get)),
            Some(writer),
        )
    }

    /// Adds a property that can only be read.
    #[must_use]
    pub fn read_only_property<V, G>(self, name: impl Into<Arc<str>>, get: G) -> Self
    where
        V: Any + Send,
        G: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.member::<V>(MemberKind::Property, name.into(), false, Some(reader(get)), None)
    }

    /// Adds a readable and writable field.
    #[must_use]
    pub fn field<V, G, W>(self, name: impl Into<Arc<str>>, get: G, set: W) -> Self
    where
        V: Any + Send,
        G: Fn(&S) -> V + Send + Sync + 'static,
        W: Fn(&mut S, V) + Send + Sync + 'static,
    {
        let name = name.into();
        let writer = writer::<S, V, W>(Arc::clone(&name), set);
        self.member::<V>(MemberKind::Field, name, false, Some(reader(get)), Some(writer))
    }

    /// Adds a field of type `Option<V>`.
    #[must_use]
    pub fn optional_field<V, G, W>(self, name: impl Into<Arc<str>>, get: G, set: W) -> Self
    where
        V: Any + Send,
        G: Fn(&S) -> Option<V> + Send + Sync + 'static,
        W: Fn(&mut S, Option<V>) + Send + Sync + 'static,
    {
        let name = name.into();
        let writer = optional_writer::<S, V, W>(Arc::clone(&name), set);
        self.member::<V>(
            MemberKind::Field,
            name,
            true,
            Some(optional_reader(get)),
            Some(writer),
        )
    }

    /// Adds a field that can only be read.
    #[must_use]
    pub fn read_only_field<V, G>(self, name: impl Into<Arc<str>>, get: G) -> Self
    where
        V: Any + Send,
        G: Fn(&S) -> V + Send + Sync + 'static,
    {
        self.member::<V>(MemberKind::Field, name.into(), false, Some(reader(get)), None)
    }

    /// Attaches a declarative marker to the most recently added member.
    #[must_use]
    pub fn marked(mut self, marker: impl Into<Arc<str>>) -> Self {
        if let Some(member) = self.members.last_mut() {
            member.add_marker(marker.into());
        }
        self
    }

    /// Adds a constructor taking `parameters` positionally.
    #[must_use]
    pub fn constructor<F>(mut self, parameters: Vec<ParameterDescriptor>, construct: F) -> Self
    where
        F: Fn(&mut ConstructorArgs) -> Result<S> + Send + Sync + 'static,
    {
        let construct: ConstructFn =
            Arc::new(move |arguments: &mut ConstructorArgs| -> Result<Value> {
                construct(arguments).map(|instance| Box::new(instance) as Value)
            });
        self.constructors
            .push(ConstructorDescriptor::new(ShapeId::of::<S>(), parameters, construct));
        self
    }

    /// Adds a zero-argument constructor.
    #[must_use]
    pub fn default_constructor<F>(self, construct: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        self.constructor(Vec::new(), move |_| Ok(construct()))
    }

    /// Marks the shape as a value type, initialized through `Default`.
    #[must_use]
    pub fn value_type(mut self) -> Self
    where
        S: Default,
    {
        self.initializer = Some(Arc::new(|| Box::new(S::default()) as Value));
        self
    }

    /// Finishes the description.
    #[must_use]
    pub fn build(self) -> Shape {
        Shape::from_parts(
            ShapeId::of::<S>(),
            self.initializer,
            self.members,
            self.constructors,
        )
    }

    fn member<V: Any + Send>(
        mut self,
        kind: MemberKind,
        name: Arc<str>,
        optional: bool,
        reader: Option<Reader>,
        writer: Option<Writer>,
    ) -> Self {
        self.members.push(MemberDescriptor::new(
            name,
            ShapeId::of::<V>(),
            kind,
            optional.then(ShapeId::of::<Option<V>>),
            reader,
            writer,
        ));
        self
    }
}

fn reader<S, V, G>(get: G) -> Reader
where
    S: Any,
    V: Any + Send,
    G: Fn(&S) -> V + Send + Sync + 'static,
{
    Arc::new(move |instance: &dyn Any| -> Result<Option<Value>> {
        let instance = instance
            .downcast_ref::<S>()
            .ok_or_else(MapError::instance_mismatch::<S>)?;
        Ok(Some(Box::new(get(instance)) as Value))
    })
}

fn optional_reader<S, V, G>(get: G) -> Reader
where
    S: Any,
    V: Any + Send,
    G: Fn(&S) -> Option<V> + Send + Sync + 'static,
{
    Arc::new(move |instance: &dyn Any| -> Result<Option<Value>> {
        let instance = instance
            .downcast_ref::<S>()
            .ok_or_else(MapError::instance_mismatch::<S>)?;
        Ok(get(instance).map(|value| Box::new(value) as Value))
    })
}

fn writer<S, V, W>(name: Arc<str>, set: W) -> Writer
where
    S: Any,
    V: Any + Send,
    W: Fn(&mut S, V) + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut dyn Any, value: Option<Value>| -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };
        let instance = instance
            .downcast_mut::<S>()
            .ok_or_else(MapError::instance_mismatch::<S>)?;
        let value = value
            .downcast::<V>()
            .map_err(|_| MapError::value_mismatch::<V>(&name))?;
        set(instance, *value);
        Ok(())
    })
}

fn optional_writer<S, V, W>(name: Arc<str>, set: W) -> Writer
where
    S: Any,
    V: Any + Send,
    W: Fn(&mut S, Option<V>) + Send + Sync + 'static,
{
    Arc::new(move |instance: &mut dyn Any, value: Option<Value>| -> Result<()> {
        let instance = instance
            .downcast_mut::<S>()
            .ok_or_else(MapError::instance_mismatch::<S>)?;
        let value = match value.map(Value::downcast::<V>) {
            None => None,
            Some(Ok(value)) => Some(*value),
            Some(Err(value)) => *value
                .downcast::<Option<V>>()
                .map_err(|_| MapError::value_mismatch::<V>(&name))?,
        };
        set(instance, value);
        Ok(())
    })
}
