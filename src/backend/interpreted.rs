use std::any::Any;

use smallvec::SmallVec;

use super::Executor;
use crate::error::Result;
use crate::plan::{MappingPlan, PlanChange, Setter};
use crate::shape::Value;

/// Walks the plan on every application.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Interpreter;

impl Executor for Interpreter {
    fn prepare(&mut self, plan: &MappingPlan) -> Result<()> {
        plan.validate()
    }

    fn amend(&mut self, plan: &MappingPlan, _change: PlanChange) -> Result<()> {
        plan.validate()
    }

    fn apply(&self, plan: &MappingPlan, source: &dyn Any) -> Result<Value> {
        let values = plan
            .arguments()
            .iter()
            .map(|binding| binding.fetch(source))
            .collect::<Result<SmallVec<[Option<Value>; 4]>>>()?;
        let mut target = plan.construction().constructor().invoke(values)?;
        for binding in plan.bindings() {
            if let Setter::Member { writer, .. } = binding.setter() {
                writer(&mut *target, binding.fetch(source)?)?;
            }
        }
        Ok(target)
    }
}
