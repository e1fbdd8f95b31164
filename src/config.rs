//! Engine configuration.
//!
//! With the `serde` feature, [`MapperConfig`] can be loaded from whatever
//! configuration format the host application already uses.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::policy::Policy;

/// Execution strategy for mappers built by an engine.
///
/// Both strategies produce identical results; they only differ in
/// throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Backend {
    /// Walks the plan's bindings on every application.
    Interpreted,
    /// Lowers the plan once into a closure chain and reuses it.
    #[default]
    Compiled,
}

/// Member kinds selected by the policy freshly built mappers start with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MemberSelection {
    /// Properties only.
    #[default]
    Properties,
    /// Fields only.
    Fields,
    /// Fields and properties.
    All,
}

impl MemberSelection {
    /// The shared policy for this selection.
    #[must_use]
    pub fn policy(self) -> Policy {
        match self {
            Self::Properties => Policy::properties(),
            Self::Fields => Policy::fields(),
            Self::All => Policy::all(),
        }
    }
}

/// Settings for an [`AutoMapper`](crate::AutoMapper).
///
/// # Example
///
/// ```
/// use automap::{Backend, MapperConfig};
///
/// let config = MapperConfig::default().with_backend(Backend::Interpreted);
/// assert_eq!(config.backend, Backend::Interpreted);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MapperConfig {
    /// Execution backend for every mapper the engine builds.
    pub backend: Backend,
    /// Member kinds a new mapper auto-wires before any `bind`.
    pub default_members: MemberSelection,
}

impl MapperConfig {
    /// Replaces the backend.
    #[must_use]
    pub const fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    /// Replaces the default member selection.
    #[must_use]
    pub const fn with_default_members(mut self, default_members: MemberSelection) -> Self {
        self.default_members = default_members;
        self
    }
}
