//! Builds and amends [`MappingPlan`]s from a pair of shapes.

use std::sync::Arc;

use super::{Binding, Construction, Getter, MappingPlan, PlanChange, Setter, Supplier};
use crate::cache::Engine;
use crate::error::{MapError, Result};
use crate::policy::Policy;
use crate::shape::{ConstructorArgs, ConstructorDescriptor, Shape, ShapeId, Value};

/// Resolution context for one (source, destination) pair.
pub(crate) struct Resolver<'a> {
    engine: &'a Arc<Engine>,
    source: &'a Shape,
    target: &'a Shape,
}

impl<'a> Resolver<'a> {
    pub(crate) const fn new(engine: &'a Arc<Engine>, source: &'a Shape, target: &'a Shape) -> Self {
        Self {
            engine,
            source,
            target,
        }
    }

    /// Picks how destination instances are created.
    pub(crate) fn construction(&self) -> Result<Construction> {
        if let Some(initializer) = self.target.initializer() {
            let initializer = Arc::clone(initializer);
            let construct = Arc::new(move |_: &mut ConstructorArgs| -> Result<Value> {
                Ok(initializer())
            });
            return Ok(Construction::Default(ConstructorDescriptor::new(
                self.target.id(),
                Vec::new(),
                construct,
            )));
        }
        if let Some(constructor) = self.target.zero_arg_constructor() {
            return Ok(Construction::Default(constructor.clone()));
        }
        self.target
            .best_constructor()
            .map(|constructor| Construction::BestConstructor(constructor.clone()))
            .ok_or(MapError::UnsupportedTargetShape {
                shape: self.target.id(),
                reason: "no default initializer and no constructor",
            })
    }

    /// Auto-wires a fresh plan under `policy`.
    pub(crate) fn resolve(&self, policy: &Policy) -> Result<MappingPlan> {
        let construction = self.construction()?;
        let mut plan = MappingPlan::new(self.source.id(), self.target.id(), construction);
        match plan.construction().clone() {
            Construction::Default(_) => self.wire_members(policy, &mut plan),
            Construction::BestConstructor(constructor) => {
                self.wire_arguments(policy, &constructor, &mut plan);
            }
        }
        tracing::debug!(
            source = %plan.source(),
            target = %plan.target(),
            arguments = plan.arguments().len(),
            bindings = plan.bindings().len(),
            "resolved mapping plan"
        );
        Ok(plan)
    }

    fn wire_members(&self, policy: &Policy, plan: &mut MappingPlan) {
        for member in self.source.members() {
            if !policy.admits(member) {
                continue;
            }
            let Some(getter) = Getter::member(member) else {
                continue;
            };
            // A destination of the same kind wins over an earlier one of the other kind.
            let Some(setter) = self
                .target
                .members_named(member.name())
                .filter(|destination| destination.kind() == member.kind())
                .chain(self.target.members_named(member.name()))
                .find(|destination| destination.is_writable())
                .and_then(Setter::member)
            else {
                continue;
            };
            match self.bind(getter, setter, true) {
                Some(binding) => {
                    plan.upsert(binding);
                }
                None => tracing::debug!(
                    member = member.name(),
                    source = %self.source.id(),
                    target = %self.target.id(),
                    "skipped member without a usable conversion"
                ),
            }
        }
    }

    fn wire_arguments(
        &self,
        policy: &Policy,
        constructor: &ConstructorDescriptor,
        plan: &mut MappingPlan,
    ) {
        for (index, parameter) in constructor.parameters().iter().enumerate() {
            // The last matching member wins.
            let getter = self
                .source
                .members_named_ignore_case(parameter.name())
                .filter(|member| policy.admits(member))
                .filter(|member| member.value_type() == parameter.value_type())
                .filter_map(Getter::member)
                .last()
                .unwrap_or_else(|| {
                    if !parameter.is_optional() && parameter.default_value().is_none() {
                        tracing::debug!(
                            parameter = parameter.name(),
                            source = %self.source.id(),
                            target = %self.target.id(),
                            "constructor parameter has no source member and no default"
                        );
                    }
                    Getter::parameter_default(parameter)
                });
            let binding = Binding::direct(getter, Setter::argument(index, parameter))
                .or_parameter_default(parameter);
            plan.upsert(binding);
        }
    }

    /// Binds source members named `from` onto the destination slot `to`,
    /// regardless of policy. The first source member that can be bound wins.
    pub(crate) fn match_members(
        &self,
        plan: &mut MappingPlan,
        from: &str,
        to: &str,
    ) -> Option<PlanChange> {
        let binding = self
            .source
            .members_named(from)
            .filter_map(Getter::member)
            .find_map(|getter| self.bind_named(plan, getter, to, true))?;
        Some(plan.upsert(binding))
    }

    /// Feeds the destination slot `to` from `supplier`.
    pub(crate) fn supply(
        &self,
        plan: &mut MappingPlan,
        to: &str,
        value_type: ShapeId,
        supplier: Supplier,
    ) -> Option<PlanChange> {
        let getter = Getter::Computed {
            value_type,
            supplier,
        };
        let binding = self.bind_named(plan, getter, to, false)?;
        Some(plan.upsert(binding))
    }

    fn bind_named(
        &self,
        plan: &MappingPlan,
        getter: Getter,
        to: &str,
        convert: bool,
    ) -> Option<Binding> {
        if let Some(destination) = self
            .target
            .members_named(to)
            .find(|destination| destination.is_writable())
        {
            return self.bind(getter, Setter::member(destination)?, convert);
        }
        let Construction::BestConstructor(constructor) = plan.construction() else {
            return None;
        };
        let (index, parameter) = constructor
            .parameters()
            .iter()
            .enumerate()
            .find(|(_, parameter)| parameter.name().eq_ignore_ascii_case(to))?;
        self.bind(getter, Setter::argument(index, parameter), convert)
            .map(|binding| binding.or_parameter_default(parameter))
    }

    fn bind(&self, getter: Getter, setter: Setter, convert: bool) -> Option<Binding> {
        if setter.accepts(getter.value_type()) {
            return Some(Binding::direct(getter, setter));
        }
        if !convert {
            return None;
        }
        let converter = self
            .engine
            .sub_mapper(getter.value_type(), setter.value_type())?;
        Some(Binding::converted(getter, setter, converter))
    }
}
