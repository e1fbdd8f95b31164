//! Execution strategies for mapping plans.
//!
//! Both backends implement the same contract: given a validated plan and a
//! source instance, produce a fully populated destination instance. They
//! differ only in how much work is repeated per application.

mod compiled;
mod interpreted;

use std::any::Any;

pub(crate) use compiled::Compiler;
pub(crate) use interpreted::Interpreter;

use crate::config::Backend;
use crate::error::Result;
use crate::plan::{MappingPlan, PlanChange};
use crate::shape::Value;

/// Executes mapping plans.
pub(crate) trait Executor: Send + Sync {
    /// Prepares for a freshly resolved plan.
    fn prepare(&mut self, plan: &MappingPlan) -> Result<()>;

    /// Catches up with a single slot change of an already prepared plan.
    fn amend(&mut self, plan: &MappingPlan, change: PlanChange) -> Result<()>;

    /// Maps one source instance.
    fn apply(&self, plan: &MappingPlan, source: &dyn Any) -> Result<Value>;
}

impl Backend {
    pub(crate) fn executor(self) -> Box<dyn Executor> {
        match self {
            Self::Interpreted => Box::new(Interpreter),
            Self::Compiled => Box::<Compiler>::default(),
        }
    }
}
