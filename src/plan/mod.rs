//! Mapping plans: resolved bindings plus a construction strategy.
//!
//! A [`MappingPlan`] is owned by exactly one [`Mapper`](crate::Mapper). It
//! is rebuilt wholesale when the mapper's policy changes and amended one
//! binding at a time by explicit overrides.

mod resolver;

use std::any::Any;
use std::fmt;
use std::sync::Arc;

pub(crate) use resolver::Resolver;

use crate::error::{MapError, Result};
use crate::mapper::Mapper;
use crate::shape::{
    ConstructorDescriptor, Factory, MemberDescriptor, MemberKind, ParameterDescriptor, Reader,
    ShapeId, Value, Writer,
};

/// Supplies a computed value, ignoring the source instance.
pub type Supplier = Arc<dyn Fn() -> Result<Value> + Send + Sync>;

/// Where a binding's value comes from.
#[derive(Clone)]
pub enum Getter {
    /// Reads a source member.
    Member {
        /// Source member name.
        name: Arc<str>,
        /// Declared value type of the member.
        value_type: ShapeId,
        /// The member reader.
        reader: Reader,
    },
    /// Yields a constructor parameter's default, or an absent value.
    ParameterDefault {
        /// Parameter name.
        name: Arc<str>,
        /// Declared parameter type.
        value_type: ShapeId,
        /// The declared default, captured at resolution time.
        default: Option<Factory>,
    },
    /// Invokes a user supplier on every application.
    Computed {
        /// Type of the supplied values.
        value_type: ShapeId,
        /// The supplier.
        supplier: Supplier,
    },
}

impl Getter {
    /// Getter over a readable source member.
    #[must_use]
    pub fn member(member: &MemberDescriptor) -> Option<Self> {
        member.reader().map(|reader| Self::Member {
            name: member.shared_name(),
            value_type: member.value_type(),
            reader: Arc::clone(reader),
        })
    }

    /// Getter yielding a parameter's default.
    #[must_use]
    pub fn parameter_default(parameter: &ParameterDescriptor) -> Self {
        Self::ParameterDefault {
            name: parameter.shared_name(),
            value_type: parameter.value_type(),
            default: parameter.default_value().cloned(),
        }
    }

    /// The static type of the values this getter yields.
    #[must_use]
    pub const fn value_type(&self) -> ShapeId {
        match self {
            Self::Member { value_type, .. }
            | Self::ParameterDefault { value_type, .. }
            | Self::Computed { value_type, .. } => *value_type,
        }
    }

    /// Reads the value for `source`.
    ///
    /// # Errors
    ///
    /// Propagates reader and supplier failures.
    pub fn read(&self, source: &dyn Any) -> Result<Option<Value>> {
        match self {
            Self::Member { reader, .. } => reader(source),
            Self::ParameterDefault { default, .. } => Ok(default.as_ref().map(|default| default())),
            Self::Computed { supplier, .. } => supplier().map(Some),
        }
    }
}

impl fmt::Debug for Getter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member {
                name, value_type, ..
            } => formatter
                .debug_struct("Member")
                .field("name", name)
                .field("value_type", value_type)
                .finish_non_exhaustive(),
            Self::ParameterDefault {
                name,
                value_type,
                default,
            } => formatter
                .debug_struct("ParameterDefault")
                .field("name", name)
                .field("value_type", value_type)
                .field("has_default", &default.is_some())
                .finish(),
            Self::Computed { value_type, .. } => formatter
                .debug_struct("Computed")
                .field("value_type", value_type)
                .finish_non_exhaustive(),
        }
    }
}

/// Where a binding's value goes.
#[derive(Clone)]
pub enum Setter {
    /// Writes a destination member after construction.
    Member {
        /// Destination member name.
        name: Arc<str>,
        /// Destination member kind.
        kind: MemberKind,
        /// Declared value type of the member.
        value_type: ShapeId,
        /// The `Option<V>` type an optional member also accepts.
        optional_type: Option<ShapeId>,
        /// The member writer.
        writer: Writer,
    },
    /// Accumulates a positional constructor argument.
    Argument {
        /// Parameter position.
        index: usize,
        /// Parameter name.
        name: Arc<str>,
        /// Declared parameter type.
        value_type: ShapeId,
    },
}

impl Setter {
    /// Setter over a writable destination member.
    #[must_use]
    pub fn member(member: &MemberDescriptor) -> Option<Self> {
        member.writer().map(|writer| Self::Member {
            name: member.shared_name(),
            kind: member.kind(),
            value_type: member.value_type(),
            optional_type: member.optional_type(),
            writer: Arc::clone(writer),
        })
    }

    /// Setter for the constructor parameter at `index`.
    #[must_use]
    pub fn argument(index: usize, parameter: &ParameterDescriptor) -> Self {
        Self::Argument {
            index,
            name: parameter.shared_name(),
            value_type: parameter.value_type(),
        }
    }

    /// The static type this setter accepts.
    #[must_use]
    pub const fn value_type(&self) -> ShapeId {
        match self {
            Self::Member { value_type, .. } | Self::Argument { value_type, .. } => *value_type,
        }
    }

    /// Whether values of `value_type` can be written without conversion.
    ///
    /// Optional members take their own `Option<V>` as well as `V`.
    #[must_use]
    pub fn accepts(&self, value_type: ShapeId) -> bool {
        value_type == self.value_type()
            || matches!(
                self,
                Self::Member {
                    optional_type: Some(optional_type),
                    ..
                } if *optional_type == value_type
            )
    }

    /// Name of the destination member or parameter.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Member { name, .. } | Self::Argument { name, .. } => name,
        }
    }

    /// Whether both setters write the same destination slot.
    #[must_use]
    pub fn same_slot(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::Member { name, kind, .. },
                Self::Member {
                    name: other_name,
                    kind: other_kind,
                    ..
                },
            ) => name == other_name && kind == other_kind,
            (Self::Argument { index, .. }, Self::Argument { index: other, .. }) => index == other,
            _ => false,
        }
    }
}

impl fmt::Debug for Setter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Member {
                name,
                kind,
                value_type,
                ..
            } => formatter
                .debug_struct("Member")
                .field("name", name)
                .field("kind", kind)
                .field("value_type", value_type)
                .finish_non_exhaustive(),
            Self::Argument {
                index,
                name,
                value_type,
            } => formatter
                .debug_struct("Argument")
                .field("index", index)
                .field("name", name)
                .field("value_type", value_type)
                .finish(),
        }
    }
}

/// One resolved (getter, setter) correspondence.
///
/// When the getter's type differs from the setter's, a converter mapper
/// turns the value into the setter's type.
#[derive(Clone)]
pub struct Binding {
    getter: Getter,
    setter: Setter,
    converter: Option<Arc<Mapper>>,
    fallback: Option<Factory>,
}

impl Binding {
    /// A binding whose types line up.
    #[must_use]
    pub const fn direct(getter: Getter, setter: Setter) -> Self {
        Self {
            getter,
            setter,
            converter: None,
            fallback: None,
        }
    }

    /// A binding routed through `converter`.
    #[must_use]
    pub const fn converted(getter: Getter, setter: Setter, converter: Arc<Mapper>) -> Self {
        Self {
            getter,
            setter,
            converter: Some(converter),
            fallback: None,
        }
    }

    /// Substitutes the parameter's declared default for an absent value.
    ///
    /// Optional parameters keep receiving the absence.
    #[must_use]
    pub fn or_parameter_default(mut self, parameter: &ParameterDescriptor) -> Self {
        if !parameter.is_optional() {
            self.fallback = parameter.default_value().cloned();
        }
        self
    }

    /// The value source.
    #[must_use]
    pub const fn getter(&self) -> &Getter {
        &self.getter
    }

    /// The value destination.
    #[must_use]
    pub const fn setter(&self) -> &Setter {
        &self.setter
    }

    /// The nested mapper, if the binding converts.
    #[must_use]
    pub const fn converter(&self) -> Option<&Arc<Mapper>> {
        self.converter.as_ref()
    }

    /// Produces the value used when the fetched one is absent.
    #[must_use]
    pub const fn fallback(&self) -> Option<&Factory> {
        self.fallback.as_ref()
    }

    /// Reads and, if needed, converts the value for `source`.
    ///
    /// # Errors
    ///
    /// Propagates getter and nested mapping failures.
    pub fn fetch(&self, source: &dyn Any) -> Result<Option<Value>> {
        let value = self.getter.read(source)?;
        let value = match &self.converter {
            Some(converter) => converter.convert(value)?,
            None => value,
        };
        Ok(value.or_else(|| self.fallback.as_ref().map(|fallback| fallback())))
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Binding")
            .field("getter", &self.getter)
            .field("setter", &self.setter)
            .field(
                "converter",
                &self
                    .converter
                    .as_ref()
                    .map(|converter| (converter.source(), converter.target())),
            )
            .field("has_fallback", &self.fallback.is_some())
            .finish()
    }
}

/// How destination instances are created.
#[derive(Clone, Debug)]
pub enum Construction {
    /// Value-type initializer or zero-argument constructor, followed by
    /// member writes.
    Default(ConstructorDescriptor),
    /// The constructor with the most parameters, fed positionally.
    BestConstructor(ConstructorDescriptor),
}

impl Construction {
    /// The constructor invoked by this strategy.
    #[must_use]
    pub const fn constructor(&self) -> &ConstructorDescriptor {
        match self {
            Self::Default(constructor) | Self::BestConstructor(constructor) => constructor,
        }
    }
}

/// Slot of a plan touched by an explicit override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanChange {
    /// The constructor argument at this position.
    Argument(usize),
    /// The member binding at this position.
    Member(usize),
}

/// The resolved transformation for one (source, destination) pair.
#[derive(Clone, Debug)]
pub struct MappingPlan {
    source: ShapeId,
    target: ShapeId,
    construction: Construction,
    arguments: Vec<Binding>,
    bindings: Vec<Binding>,
}

impl MappingPlan {
    pub(crate) const fn new(source: ShapeId, target: ShapeId, construction: Construction) -> Self {
        Self {
            source,
            target,
            construction,
            arguments: Vec::new(),
            bindings: Vec::new(),
        }
    }

    /// Source shape.
    #[must_use]
    pub const fn source(&self) -> ShapeId {
        self.source
    }

    /// Destination shape.
    #[must_use]
    pub const fn target(&self) -> ShapeId {
        self.target
    }

    /// The construction strategy.
    #[must_use]
    pub const fn construction(&self) -> &Construction {
        &self.construction
    }

    /// Constructor-argument bindings, by position.
    #[must_use]
    pub fn arguments(&self) -> &[Binding] {
        &self.arguments
    }

    /// Member bindings, in application order.
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Adds or replaces the binding for the slot `binding` writes.
    pub(crate) fn upsert(&mut self, binding: Binding) -> PlanChange {
        if let Setter::Argument { index, .. } = binding.setter {
            match self.arguments.get_mut(index) {
                Some(slot) => *slot = binding,
                None => self.arguments.push(binding),
            }
            return PlanChange::Argument(index);
        }
        match self
            .bindings
            .iter()
            .position(|existing| existing.setter.same_slot(&binding.setter))
        {
            Some(position) => {
                self.bindings[position] = binding;
                PlanChange::Member(position)
            }
            None => {
                self.bindings.push(binding);
                PlanChange::Member(self.bindings.len() - 1)
            }
        }
    }

    /// Checks the structural invariants executors rely on.
    ///
    /// # Errors
    ///
    /// [`MapError::Synthesis`] naming the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        let arity = self.construction.constructor().arity();
        if self.arguments.len() != arity {
            return Err(self.invalid(format!(
                "{} argument bindings for a constructor of arity {arity}",
                self.arguments.len()
            )));
        }
        for (position, binding) in self.arguments.iter().enumerate() {
            match binding.setter {
                Setter::Argument { index, .. } if index == position => {}
                _ => {
                    return Err(self.invalid(format!(
                        "argument binding {position} does not target parameter {position}"
                    )));
                }
            }
            self.check_types(binding)?;
        }
        for binding in &self.bindings {
            if matches!(binding.setter, Setter::Argument { .. }) {
                return Err(self.invalid(format!(
                    "argument `{}` bound after construction",
                    binding.setter.name()
                )));
            }
            self.check_types(binding)?;
        }
        Ok(())
    }

    fn check_types(&self, binding: &Binding) -> Result<()> {
        let getter = binding.getter.value_type();
        let setter = binding.setter.value_type();
        let consistent = match &binding.converter {
            Some(converter) => converter.source() == getter && converter.target() == setter,
            None => binding.setter.accepts(getter),
        };
        if consistent {
            Ok(())
        } else {
            Err(self.invalid(format!(
                "`{}` cannot receive a `{getter}`",
                binding.setter.name()
            )))
        }
    }

    fn invalid(&self, reason: String) -> MapError {
        MapError::Synthesis {
            from: self.source,
            to: self.target,
            reason,
        }
    }
}
