use std::any::Any;
use std::borrow::Borrow;
use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::sync::Arc;

use super::Mapper;
use super::typed::map_typed;
use crate::error::Result;

/// Deferred mapping over a source iterator.
///
/// Each call to `next` pulls one source element and maps it.
pub struct MapLazy<I, S, D> {
    mapper: Arc<Mapper>,
    sources: I,
    _marker: PhantomData<fn(&S) -> D>,
}

impl<I, S, D> MapLazy<I, S, D> {
    pub(crate) const fn new(mapper: Arc<Mapper>, sources: I) -> Self {
        Self {
            mapper,
            sources,
            _marker: PhantomData,
        }
    }
}

impl<I: Clone, S, D> Clone for MapLazy<I, S, D> {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.mapper), self.sources.clone())
    }
}

impl<I, S, D> fmt::Debug for MapLazy<I, S, D> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MapLazy")
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}

impl<I, S, D> Iterator for MapLazy<I, S, D>
where
    I: Iterator,
    I::Item: Borrow<S>,
    S: Any,
    D: Any,
{
    type Item = Result<D>;

    fn next(&mut self) -> Option<Self::Item> {
        let source = self.sources.next()?;
        Some(map_typed(&self.mapper, source.borrow()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.sources.size_hint()
    }
}

impl<I, S, D> ExactSizeIterator for MapLazy<I, S, D>
where
    I: ExactSizeIterator,
    I::Item: Borrow<S>,
    S: Any,
    D: Any,
{
}

impl<I, S, D> FusedIterator for MapLazy<I, S, D>
where
    I: FusedIterator,
    I::Item: Borrow<S>,
    S: Any,
    D: Any,
{
}
