use std::any::Any;
use std::sync::Arc;

use smallvec::SmallVec;

use super::Executor;
use crate::error::{MapError, Result};
use crate::plan::{Binding, Getter, MappingPlan, PlanChange, Setter};
use crate::shape::{ConstructorArgs, Value};

type Fetch = Box<dyn Fn(&dyn Any) -> Result<Option<Value>> + Send + Sync>;
type Instantiate = Box<dyn Fn(&dyn Any) -> Result<Value> + Send + Sync>;
type Step = Box<dyn Fn(&dyn Any, &mut dyn Any) -> Result<()> + Send + Sync>;

/// A plan lowered into closures: one that builds the destination, then one
/// step per member binding.
struct Routine {
    instantiate: Instantiate,
    steps: Vec<Step>,
}

/// Lowers plans once and replays the result.
///
/// Amendments re-lower only the slot that changed.
#[derive(Default)]
pub(crate) struct Compiler {
    routine: Option<Routine>,
}

impl Executor for Compiler {
    fn prepare(&mut self, plan: &MappingPlan) -> Result<()> {
        plan.validate()?;
        let instantiate = lower_instantiate(plan);
        let steps = plan
            .bindings()
            .iter()
            .map(|binding| lower_step(plan, binding))
            .collect::<Result<Vec<_>>>()?;
        self.routine = Some(Routine { instantiate, steps });
        tracing::trace!(
            source = %plan.source(),
            target = %plan.target(),
            steps = plan.bindings().len(),
            "lowered mapping routine"
        );
        Ok(())
    }

    fn amend(&mut self, plan: &MappingPlan, change: PlanChange) -> Result<()> {
        plan.validate()?;
        let Some(routine) = self.routine.as_mut() else {
            return self.prepare(plan);
        };
        match change {
            PlanChange::Argument(_) => routine.instantiate = lower_instantiate(plan),
            PlanChange::Member(position) => {
                let binding = plan.bindings().get(position).ok_or_else(|| MapError::Synthesis {
                    from: plan.source(),
                    to: plan.target(),
                    reason: format!("no member binding at position {position}"),
                })?;
                let step = lower_step(plan, binding)?;
                match routine.steps.get_mut(position) {
                    Some(slot) => *slot = step,
                    None => routine.steps.push(step),
                }
            }
        }
        Ok(())
    }

    fn apply(&self, plan: &MappingPlan, source: &dyn Any) -> Result<Value> {
        let routine = self.routine.as_ref().ok_or(MapError::Unresolved {
            from: plan.source(),
            to: plan.target(),
        })?;
        let mut target = (routine.instantiate)(source)?;
        for step in &routine.steps {
            step(source, &mut *target)?;
        }
        Ok(target)
    }
}

fn lower_instantiate(plan: &MappingPlan) -> Instantiate {
    let constructor = plan.construction().constructor();
    let construct = Arc::clone(constructor.construct_fn());
    let shape = constructor.shape().name();
    if plan.arguments().is_empty() {
        return Box::new(move |_: &dyn Any| -> Result<Value> {
            construct(&mut ConstructorArgs::new(shape, SmallVec::new()))
        });
    }
    let fetches: Vec<Fetch> = plan.arguments().iter().map(lower_fetch).collect();
    Box::new(move |source: &dyn Any| -> Result<Value> {
        let values = fetches
            .iter()
            .map(|fetch| fetch(source))
            .collect::<Result<SmallVec<[Option<Value>; 4]>>>()?;
        construct(&mut ConstructorArgs::new(shape, values))
    })
}

fn lower_step(plan: &MappingPlan, binding: &Binding) -> Result<Step> {
    let Setter::Member { writer, .. } = binding.setter() else {
        return Err(MapError::Synthesis {
            from: plan.source(),
            to: plan.target(),
            reason: format!("argument `{}` bound after construction", binding.setter().name()),
        });
    };
    let writer = Arc::clone(writer);
    let fetch = lower_fetch(binding);
    Ok(Box::new(
        move |source: &dyn Any, target: &mut dyn Any| -> Result<()> {
            writer(target, fetch(source)?)
        },
    ))
}

fn lower_fetch(binding: &Binding) -> Fetch {
    let read = lower_read(binding.getter());
    let fetch: Fetch = match binding.converter() {
        None => read,
        Some(converter) => {
            let converter = Arc::clone(converter);
            Box::new(move |source: &dyn Any| -> Result<Option<Value>> {
                converter.convert(read(source)?)
            })
        }
    };
    match binding.fallback() {
        None => fetch,
        Some(fallback) => {
            let fallback = Arc::clone(fallback);
            Box::new(move |source: &dyn Any| -> Result<Option<Value>> {
                Ok(fetch(source)?.or_else(|| Some(fallback())))
            })
        }
    }
}

fn lower_read(getter: &Getter) -> Fetch {
    match getter {
        Getter::Member { reader, .. } => {
            let reader = Arc::clone(reader);
            Box::new(move |source: &dyn Any| -> Result<Option<Value>> { reader(source) })
        }
        Getter::ParameterDefault { default: None, .. } => {
            Box::new(|_: &dyn Any| -> Result<Option<Value>> { Ok(None) })
        }
        Getter::ParameterDefault {
            default: Some(default),
            ..
        } => {
            let default = Arc::clone(default);
            Box::new(move |_: &dyn Any| -> Result<Option<Value>> { Ok(Some(default())) })
        }
        Getter::Computed { supplier, .. } => {
            let supplier = Arc::clone(supplier);
            Box::new(move |_: &dyn Any| -> Result<Option<Value>> { supplier().map(Some) })
        }
    }
}
