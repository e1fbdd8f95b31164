use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::{MapLazy, Mapper};
use crate::error::{BoxError, MapError, Result};
use crate::policy::Policy;
use crate::shape::Reflect;

/// A [`Mapper`] with its source and destination types fixed.
///
/// # Example
///
/// ```
/// use automap::AutoMapper;
/// use automap::shape::{Reflect, Shape};
///
/// #[derive(Clone, Default)]
/// struct Draft { title: String }
///
/// #[derive(Clone, Default, Debug, PartialEq)]
/// struct Post { title: String }
///
/// impl Reflect for Draft {
///     fn shape() -> Shape {
///         Shape::builder::<Self>()
///             .property("title", |draft: &Self| draft.title.clone(), |draft: &mut Self, title| draft.title = title)
///             .value_type()
///             .build()
///     }
/// }
///
/// impl Reflect for Post {
///     fn shape() -> Shape {
///         Shape::builder::<Self>()
///             .property("title", |post: &Self| post.title.clone(), |post: &mut Self, title| post.title = title)
///             .value_type()
///             .build()
///     }
/// }
///
/// let engine = AutoMapper::new();
/// let mapper = engine.build::<Draft, Post>().unwrap();
/// let post = mapper.map(&Draft { title: "hello".into() }).unwrap();
/// assert_eq!(post, Post { title: "hello".into() });
/// ```
pub struct TypedMapper<S, D> {
    mapper: Arc<Mapper>,
    _marker: PhantomData<fn(&S) -> D>,
}

impl<S, D> Clone for TypedMapper<S, D> {
    fn clone(&self) -> Self {
        Self {
            mapper: Arc::clone(&self.mapper),
            _marker: PhantomData,
        }
    }
}

impl<S, D> fmt::Debug for TypedMapper<S, D> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_tuple("TypedMapper")
            .field(&self.mapper)
            .finish()
    }
}

impl<S: Reflect, D: Reflect> TypedMapper<S, D> {
    pub(crate) const fn new(mapper: Arc<Mapper>) -> Self {
        Self {
            mapper,
            _marker: PhantomData,
        }
    }

    /// The shared untyped mapper.
    #[must_use]
    pub const fn untyped(&self) -> &Arc<Mapper> {
        &self.mapper
    }

    /// Whether both handles refer to the same cached mapper.
    #[must_use]
    pub fn same_mapper(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.mapper, &other.mapper)
    }

    /// See [`Mapper::bind`].
    ///
    /// # Errors
    ///
    /// As for [`Mapper::bind`].
    pub fn bind(&self, policy: Policy) -> Result<&Self> {
        self.mapper.bind(policy)?;
        Ok(self)
    }

    /// See [`Mapper::match_members`].
    ///
    /// # Errors
    ///
    /// As for [`Mapper::match_members`].
    pub fn match_members(&self, from: &str, to: &str) -> Result<&Self> {
        self.mapper.match_members(from, to)?;
        Ok(self)
    }

    /// See [`Mapper::for_member`].
    ///
    /// # Errors
    ///
    /// As for [`Mapper::for_member`].
    pub fn for_member<R, F>(&self, to: &str, supplier: F) -> Result<&Self>
    where
        R: Any + Send,
        F: Fn() -> R + Send + Sync + 'static,
    {
        self.mapper.for_member(to, supplier)?;
        Ok(self)
    }

    /// See [`Mapper::try_for_member`].
    ///
    /// # Errors
    ///
    /// As for [`Mapper::try_for_member`].
    pub fn try_for_member<R, E, F>(&self, to: &str, supplier: F) -> Result<&Self>
    where
        R: Any + Send,
        E: Into<BoxError>,
        F: Fn() -> std::result::Result<R, E> + Send + Sync + 'static,
    {
        self.mapper.try_for_member(to, supplier)?;
        Ok(self)
    }

    /// Maps one instance.
    ///
    /// # Errors
    ///
    /// Any failure raised while mapping.
    pub fn map(&self, source: &S) -> Result<D> {
        map_typed(&self.mapper, source)
    }

    /// Maps an optional instance; absence maps to absence.
    ///
    /// # Errors
    ///
    /// As for [`TypedMapper::map`].
    pub fn map_option(&self, source: Option<&S>) -> Result<Option<D>> {
        source.map(|source| self.map(source)).transpose()
    }

    /// Maps every element in order.
    ///
    /// # Errors
    ///
    /// The first failure encountered.
    pub fn map_slice(&self, sources: &[S]) -> Result<Vec<D>> {
        sources.iter().map(|source| self.map(source)).collect()
    }

    /// Maps an array with absent entries; the result has the same length
    /// and keeps absences where they were.
    ///
    /// # Errors
    ///
    /// The first failure encountered.
    pub fn map_array(&self, sources: &[Option<S>]) -> Result<Vec<Option<D>>> {
        sources
            .iter()
            .map(|source| self.map_option(source.as_ref()))
            .collect()
    }

    /// Maps every element and appends the results to a fresh, empty `C`.
    ///
    /// # Errors
    ///
    /// The first failure encountered; elements mapped before it are lost
    /// together with the collection.
    pub fn map_into<C, I>(&self, sources: I) -> Result<C>
    where
        C: Default + Extend<D>,
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        let mut collection = C::default();
        for source in sources {
            collection.extend(std::iter::once(self.map(source.borrow())?));
        }
        Ok(collection)
    }

    /// Maps elements on demand.
    ///
    /// Nothing is read from `sources` until the iterator is advanced, and
    /// iterating twice (through a cloned iterator) maps twice.
    #[must_use]
    pub fn map_lazy<I>(&self, sources: I) -> MapLazy<I::IntoIter, S, D>
    where
        I: IntoIterator,
        I::Item: Borrow<S>,
    {
        MapLazy::new(Arc::clone(&self.mapper), sources.into_iter())
    }
}

pub(super) fn map_typed<S: Any, D: Any>(mapper: &Mapper, source: &S) -> Result<D> {
    mapper
        .map_instance(source)?
        .downcast::<D>()
        .map(|target| *target)
        .map_err(|_| MapError::instance_mismatch::<D>())
}
