//! The mapper cache and the [`AutoMapper`] composition root.
//!
//! An engine owns the shape registry, the configuration and one mapper per
//! (source, destination) pair. Nested bindings obtain their converters from
//! the same cache, so a self-referential pair binds to its own mapper.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use static_assertions::assert_impl_all;

use crate::config::MapperConfig;
use crate::error::{MapError, Result};
use crate::mapper::{Mapper, MapperState, TypedMapper};
use crate::shape::{Introspect, Reflect, Shape, ShapeId, ShapeRegistry};

type MapperKey = (ShapeId, ShapeId);

pub(crate) struct Engine {
    config: MapperConfig,
    registry: ShapeRegistry,
    mappers: Mutex<FxHashMap<MapperKey, Arc<Mapper>>>,
}

impl Engine {
    /// Returns the cached mapper for the pair, resolving it on first use.
    ///
    /// A new mapper is published while its state is still write-locked:
    /// concurrent callers of the same pair receive that mapper and block on
    /// first use until resolution finishes, and nested lookups of the pair
    /// being resolved get the same, not yet resolved, instance.
    pub(crate) fn build(self: &Arc<Self>, from: ShapeId, to: ShapeId) -> Result<Arc<Mapper>> {
        let source = self
            .registry
            .shape_of(from)
            .ok_or(MapError::UnknownShape(from))?;
        let target = self
            .registry
            .shape_of(to)
            .ok_or(MapError::UnknownShape(to))?;

        let mut mappers = self.mappers.lock();
        if let Some(mapper) = mappers.get(&(from, to)) {
            tracing::trace!(source = %from, target = %to, "mapper cache hit");
            return Ok(Arc::clone(mapper));
        }
        let mapper = Arc::new(Mapper::new(
            Arc::downgrade(self),
            self.config.backend,
            Arc::clone(&source),
            Arc::clone(&target),
        ));
        let mut state = mapper.state().write();
        mappers.insert((from, to), Arc::clone(&mapper));
        drop(mappers);

        let resolved = MapperState::resolve(
            self,
            &source,
            &target,
            self.config.default_members.policy(),
            self.config.backend,
        );
        match resolved {
            Ok(resolved) => {
                *state = Some(resolved);
                drop(state);
                tracing::debug!(source = %from, target = %to, "built mapper");
                Ok(mapper)
            }
            Err(error) => {
                drop(state);
                let mut mappers = self.mappers.lock();
                if mappers
                    .get(&(from, to))
                    .is_some_and(|cached| Arc::ptr_eq(cached, &mapper))
                {
                    mappers.remove(&(from, to));
                }
                tracing::debug!(source = %from, target = %to, %error, "mapper resolution failed");
                Err(error)
            }
        }
    }

    /// Mapper used to convert nested values, if the pair can be mapped.
    pub(crate) fn sub_mapper(self: &Arc<Self>, from: ShapeId, to: ShapeId) -> Option<Arc<Mapper>> {
        match self.build(from, to) {
            Ok(mapper) => Some(mapper),
            Err(error) => {
                tracing::debug!(source = %from, target = %to, %error, "no nested mapper");
                None
            }
        }
    }
}

/// Entry point: registers shapes and hands out cached mappers.
///
/// Cloning an `AutoMapper` yields another handle to the same engine.
///
/// # Example
///
/// ```
/// use automap::{AutoMapper, Backend, MapperConfig};
///
/// let engine = AutoMapper::with_config(MapperConfig::default().with_backend(Backend::Interpreted));
/// assert!(engine.is_empty());
/// ```
#[derive(Clone)]
pub struct AutoMapper {
    engine: Arc<Engine>,
}

assert_impl_all!(AutoMapper: Send, Sync);
assert_impl_all!(Mapper: Send, Sync);

impl AutoMapper {
    /// An engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    /// An engine with `config`.
    #[must_use]
    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            engine: Arc::new(Engine {
                config,
                registry: ShapeRegistry::new(),
                mappers: Mutex::new(FxHashMap::default()),
            }),
        }
    }

    /// The engine configuration.
    #[must_use]
    pub fn config(&self) -> MapperConfig {
        self.engine.config
    }

    /// The shape registry mappers are resolved against.
    #[must_use]
    pub fn registry(&self) -> &ShapeRegistry {
        &self.engine.registry
    }

    /// Registers `T` (and its nested shapes).
    pub fn register<T: Reflect>(&self) -> Arc<Shape> {
        self.engine.registry.register::<T>()
    }

    /// The mapper from `S` to `D`, registering both shapes first.
    ///
    /// Repeated calls for the same pair return the same mapper.
    ///
    /// # Errors
    ///
    /// [`MapError::UnsupportedTargetShape`] when `D` cannot be constructed,
    /// or a backend error while preparing the plan.
    pub fn build<S: Reflect, D: Reflect>(&self) -> Result<TypedMapper<S, D>> {
        self.register::<S>();
        self.register::<D>();
        self.engine
            .build(ShapeId::of::<S>(), ShapeId::of::<D>())
            .map(TypedMapper::new)
    }

    /// The mapper between two already registered shapes.
    ///
    /// # Errors
    ///
    /// [`MapError::UnknownShape`] for unregistered shapes, otherwise as for
    /// [`AutoMapper::build`].
    pub fn build_dyn(&self, from: ShapeId, to: ShapeId) -> Result<Arc<Mapper>> {
        self.engine.build(from, to)
    }

    /// Forgets every cached mapper. Handles already given out keep working.
    pub fn clear(&self) {
        let mut mappers = self.engine.mappers.lock();
        tracing::info!(evicted = mappers.len(), "cleared mapper cache");
        mappers.clear();
    }

    /// Number of cached mappers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.engine.mappers.lock().len()
    }

    /// Whether no mapper is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.engine.mappers.lock().is_empty()
    }
}

impl Default for AutoMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AutoMapper {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("AutoMapper")
            .field("config", &self.engine.config)
            .field("registry", &self.engine.registry)
            .field("mappers", &self.len())
            .finish()
    }
}
