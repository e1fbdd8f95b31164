//! Mappers: the per-pair unit of configuration and execution.
//!
//! A [`Mapper`] is the untyped core, shared through the engine's cache and
//! referenced by nested bindings. [`TypedMapper`] wraps it with the source
//! and destination types fixed at compile time.

mod lazy;
mod typed;

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;

pub use lazy::MapLazy;
pub use typed::TypedMapper;

use crate::backend::Executor;
use crate::cache::Engine;
use crate::config::Backend;
use crate::error::{BoxError, MapError, Result};
use crate::plan::{MappingPlan, PlanChange, Resolver, Supplier};
use crate::policy::Policy;
use crate::shape::{Shape, ShapeId, Value};

/// Everything a mapper needs to run, swapped atomically on rebinding.
pub(crate) struct MapperState {
    policy: Policy,
    plan: MappingPlan,
    executor: Box<dyn Executor>,
}

impl MapperState {
    pub(crate) fn resolve(
        engine: &Arc<Engine>,
        source: &Shape,
        target: &Shape,
        policy: Policy,
        backend: Backend,
    ) -> Result<Self> {
        let plan = Resolver::new(engine, source, target).resolve(&policy)?;
        let mut executor = backend.executor();
        executor.prepare(&plan)?;
        Ok(Self {
            policy,
            plan,
            executor,
        })
    }
}

/// Maps instances of one shape onto freshly built instances of another.
///
/// Mappers are obtained from an [`AutoMapper`](crate::AutoMapper) and are
/// unique per (source, destination) pair within it. Customizations made
/// through one handle are visible through every other handle of the same
/// pair, including nested bindings of other mappers.
pub struct Mapper {
    engine: Weak<Engine>,
    backend: Backend,
    source: Arc<Shape>,
    target: Arc<Shape>,
    state: RwLock<Option<MapperState>>,
}

impl Mapper {
    pub(crate) fn new(
        engine: Weak<Engine>,
        backend: Backend,
        source: Arc<Shape>,
        target: Arc<Shape>,
    ) -> Self {
        Self {
            engine,
            backend,
            source,
            target,
            state: RwLock::new(None),
        }
    }

    pub(crate) const fn state(&self) -> &RwLock<Option<MapperState>> {
        &self.state
    }

    /// Source shape.
    #[must_use]
    pub fn source(&self) -> ShapeId {
        self.source.id()
    }

    /// Destination shape.
    #[must_use]
    pub fn target(&self) -> ShapeId {
        self.target.id()
    }

    /// The execution backend.
    #[must_use]
    pub const fn backend(&self) -> Backend {
        self.backend
    }

    /// The policy the current plan was resolved under.
    #[must_use]
    pub fn policy(&self) -> Option<Policy> {
        self.state
            .read_recursive()
            .as_ref()
            .map(|state| state.policy.clone())
    }

    /// A snapshot of the current plan.
    #[must_use]
    pub fn plan(&self) -> Option<MappingPlan> {
        self.state
            .read_recursive()
            .as_ref()
            .map(|state| state.plan.clone())
    }

    /// Re-resolves the plan under `policy`.
    ///
    /// Binding the policy already in effect is a no-op; any other policy
    /// discards every earlier customization.
    ///
    /// # Errors
    ///
    /// [`MapError::EngineDropped`] once the owning engine is gone, or any
    /// resolution error.
    pub fn bind(&self, policy: Policy) -> Result<&Self> {
        let engine = self.engine()?;
        let mut state = self.state.write();
        if state
            .as_ref()
            .is_some_and(|current| current.policy == policy)
        {
            return Ok(self);
        }
        tracing::debug!(
            source = %self.source(),
            target = %self.target(),
            ?policy,
            "rebinding mapper"
        );
        *state = Some(MapperState::resolve(
            &engine,
            &self.source,
            &self.target,
            policy,
            self.backend,
        )?);
        Ok(self)
    }

    /// Binds source members named `from` onto the destination member or
    /// constructor parameter `to`, bypassing the policy.
    ///
    /// Nothing changes when no pair can be bound.
    ///
    /// # Errors
    ///
    /// [`MapError::EngineDropped`] once the owning engine is gone, or a
    /// backend error while updating the routine.
    pub fn match_members(&self, from: &str, to: &str) -> Result<&Self> {
        self.amend(|resolver, plan| {
            let change = resolver.match_members(plan, from, to);
            if change.is_none() {
                tracing::debug!(
                    from,
                    to,
                    source = %self.source(),
                    target = %self.target(),
                    "no member pair matched"
                );
            }
            change
        })
    }

    /// Feeds the destination member or parameter `to` from `supplier`,
    /// invoked on every application.
    ///
    /// Nothing changes unless `to` exists and has type `R`. An optional
    /// member of type `Option<V>` also takes `R = Option<V>`; a supplied
    /// `None` clears it.
    ///
    /// # Errors
    ///
    /// As for [`Mapper::match_members`].
    pub fn for_member<R, F>(&self, to: &str, supplier: F) -> Result<&Self>
    where
        R: Any + Send,
        F: Fn() -> R + Send + Sync + 'static,
    {
        let supplier: Supplier =
            Arc::new(move || -> Result<Value> { Ok(Box::new(supplier()) as Value) });
        self.supply(to, ShapeId::of::<R>(), supplier)
    }

    /// Like [`Mapper::for_member`] for a supplier that can fail.
    ///
    /// A supplier failure aborts the application as [`MapError::Supplier`].
    ///
    /// # Errors
    ///
    /// As for [`Mapper::match_members`].
    pub fn try_for_member<R, E, F>(&self, to: &str, supplier: F) -> Result<&Self>
    where
        R: Any + Send,
        E: Into<BoxError>,
        F: Fn() -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        let member = to.to_string();
        let supplier: Supplier = Arc::new(move || -> Result<Value> {
            supplier()
                .map(|value| Box::new(value) as Value)
                .map_err(|source| MapError::Supplier {
                    member: member.clone(),
                    source: source.into(),
                })
        });
        self.supply(to, ShapeId::of::<R>(), supplier)
    }

    fn supply(&self, to: &str, value_type: ShapeId, supplier: Supplier) -> Result<&Self> {
        self.amend(|resolver, plan| {
            let change = resolver.supply(plan, to, value_type, supplier);
            if change.is_none() {
                tracing::debug!(
                    to,
                    value_type = %value_type,
                    target = %self.target(),
                    "no assignable destination for computed value"
                );
            }
            change
        })
    }

    fn amend<F>(&self, edit: F) -> Result<&Self>
    where
        F: FnOnce(&Resolver<'_>, &mut MappingPlan) -> Option<PlanChange>,
    {
        let engine = self.engine()?;
        let mut guard = self.state.write();
        let state = guard.as_mut().ok_or_else(|| self.unresolved())?;
        let resolver = Resolver::new(&engine, &self.source, &self.target);
        let mut plan = state.plan.clone();
        if let Some(change) = edit(&resolver, &mut plan) {
            state.executor.amend(&plan, change)?;
            state.plan = plan;
        }
        Ok(self)
    }

    /// Maps `source`; an absent source yields an absent result.
    ///
    /// # Errors
    ///
    /// [`MapError::InstanceMismatch`] when `source` is not of the source
    /// shape, or any failure raised while mapping.
    pub fn map(&self, source: Option<&dyn Any>) -> Result<Option<Value>> {
        source.map(|source| self.map_instance(source)).transpose()
    }

    /// Maps a present source instance.
    ///
    /// # Errors
    ///
    /// As for [`Mapper::map`].
    pub fn map_instance(&self, source: &dyn Any) -> Result<Value> {
        if !self.source.id().is_instance(source) {
            return Err(MapError::InstanceMismatch {
                expected: self.source.id().name(),
            });
        }
        let guard = self.state.read_recursive();
        let state = guard.as_ref().ok_or_else(|| self.unresolved())?;
        state.executor.apply(&state.plan, source)
    }

    /// Maps every element, preserving order and absent entries.
    ///
    /// # Errors
    ///
    /// The first failure encountered.
    pub fn map_all(&self, sources: &[Option<&dyn Any>]) -> Result<Vec<Option<Value>>> {
        sources.iter().map(|source| self.map(*source)).collect()
    }

    pub(crate) fn convert(&self, value: Option<Value>) -> Result<Option<Value>> {
        value.map(|value| self.map_instance(&*value)).transpose()
    }

    fn engine(&self) -> Result<Arc<Engine>> {
        self.engine.upgrade().ok_or(MapError::EngineDropped)
    }

    fn unresolved(&self) -> MapError {
        MapError::Unresolved {
            from: self.source(),
            to: self.target(),
        }
    }
}

impl fmt::Debug for Mapper {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Mapper")
            .field("source", &self.source())
            .field("target", &self.target())
            .field("backend", &self.backend)
            .field("policy", &self.policy())
            .finish_non_exhaustive()
    }
}
