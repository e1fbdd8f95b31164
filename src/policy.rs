//! Which source members take part in auto-wiring.
//!
//! A [`Policy`] selects member kinds (fields, properties or both) and may
//! restrict participation further with a [`MemberFilter`]. Policies are
//! compared by identity: two separately built policies with the same
//! settings are different policies, and re-binding a mapper to an equal but
//! distinct policy rebuilds its plan.
//!
//! # Example
//!
//! ```
//! use automap::Policy;
//!
//! let properties = Policy::properties();
//! assert_eq!(properties, Policy::properties());
//! assert_ne!(Policy::new(true, false), Policy::new(true, false));
//! ```

use std::fmt;
use std::sync::{Arc, LazyLock};

use rustc_hash::FxHashSet;

use crate::shape::{MemberDescriptor, MemberKind};

/// Predicate over member descriptors.
pub type MemberPredicate = Arc<dyn Fn(&MemberDescriptor) -> bool + Send + Sync>;

/// Restricts auto-wiring to a subset of members.
#[derive(Clone)]
pub enum MemberFilter {
    /// Members carrying the named declarative marker.
    Marker(Arc<str>),
    /// Members whose name is in the set.
    Names(FxHashSet<String>),
    /// Members accepted by the predicate.
    Predicate(MemberPredicate),
}

impl MemberFilter {
    /// Filter on the declarative `marker`.
    #[must_use]
    pub fn marker(marker: impl Into<Arc<str>>) -> Self {
        Self::Marker(marker.into())
    }

    /// Filter on an explicit set of member names.
    #[must_use]
    pub fn names<I, N>(names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<String>,
    {
        Self::Names(names.into_iter().map(Into::into).collect())
    }

    /// Filter with an arbitrary predicate.
    #[must_use]
    pub fn predicate<F>(predicate: F) -> Self
    where
        F: Fn(&MemberDescriptor) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(Arc::new(predicate))
    }

    /// Whether `member` passes the filter.
    #[must_use]
    pub fn accepts(&self, member: &MemberDescriptor) -> bool {
        match self {
            Self::Marker(marker) => member.has_marker(marker),
            Self::Names(names) => names.contains(member.name()),
            Self::Predicate(predicate) => predicate(member),
        }
    }
}

impl fmt::Debug for MemberFilter {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Marker(marker) => formatter.debug_tuple("Marker").field(marker).finish(),
            Self::Names(names) => formatter.debug_tuple("Names").field(names).finish(),
            Self::Predicate(_) => formatter.write_str("Predicate(..)"),
        }
    }
}

#[derive(Debug)]
struct PolicyInner {
    properties: bool,
    fields: bool,
    filter: Option<MemberFilter>,
}

/// Member selection used when a mapper auto-wires its plan.
#[derive(Clone)]
pub struct Policy(Arc<PolicyInner>);

static PROPERTIES: LazyLock<Policy> = LazyLock::new(|| Policy::new(true, false));
static FIELDS: LazyLock<Policy> = LazyLock::new(|| Policy::new(false, true));
static ALL: LazyLock<Policy> = LazyLock::new(|| Policy::new(true, true));

impl Policy {
    /// A fresh policy selecting the given member kinds.
    #[must_use]
    pub fn new(properties: bool, fields: bool) -> Self {
        Self(Arc::new(PolicyInner {
            properties,
            fields,
            filter: None,
        }))
    }

    /// The shared properties-only policy, used by default.
    #[must_use]
    pub fn properties() -> Self {
        PROPERTIES.clone()
    }

    /// The shared fields-only policy.
    #[must_use]
    pub fn fields() -> Self {
        FIELDS.clone()
    }

    /// The shared policy selecting both kinds.
    #[must_use]
    pub fn all() -> Self {
        ALL.clone()
    }

    /// A fresh policy selecting both kinds, restricted to members marked
    /// with `marker`.
    #[must_use]
    pub fn marked(marker: impl Into<Arc<str>>) -> Self {
        Self::new(true, true).with_filter(MemberFilter::marker(marker))
    }

    /// A fresh policy with the same kinds and `filter` in place.
    #[must_use]
    pub fn with_filter(&self, filter: MemberFilter) -> Self {
        Self(Arc::new(PolicyInner {
            properties: self.0.properties,
            fields: self.0.fields,
            filter: Some(filter),
        }))
    }

    /// Whether properties participate.
    #[must_use]
    pub fn maps_properties(&self) -> bool {
        self.0.properties
    }

    /// Whether fields participate.
    #[must_use]
    pub fn maps_fields(&self) -> bool {
        self.0.fields
    }

    /// The member filter, if any.
    #[must_use]
    pub fn filter(&self) -> Option<&MemberFilter> {
        self.0.filter.as_ref()
    }

    /// Whether `member` takes part in auto-wiring under this policy.
    #[must_use]
    pub fn admits(&self, member: &MemberDescriptor) -> bool {
        let kind_selected = match member.kind() {
            MemberKind::Property => self.0.properties,
            MemberKind::Field => self.0.fields,
        };
        kind_selected
            && self
                .0
                .filter
                .as_ref()
                .is_none_or(|filter| filter.accepts(member))
    }
}

impl PartialEq for Policy {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Policy {}

impl fmt::Debug for Policy {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Policy")
            .field("properties", &self.0.properties)
            .field("fields", &self.0.fields)
            .field("filter", &self.0.filter)
            .finish()
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::properties()
    }
}
