//! Error types for mapper resolution and application.
//!
//! Resolution-time structural problems (an unsupported destination shape, a
//! routine that cannot be synthesized) surface when a mapper is built or
//! customized. Per-member mismatches never show up here: the resolver skips
//! them. Apply-time errors (a failing computed supplier, an instance of the
//! wrong type) propagate unchanged to the caller.

use thiserror::Error;

use crate::shape::ShapeId;

/// Boxed error produced by user-supplied computed values.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors raised while building or applying a mapper.
///
/// # Examples
///
/// ```rust
/// use automap::{MapError, ShapeId};
///
/// let error = MapError::UnknownShape(ShapeId::of::<u8>());
/// assert_eq!(error.to_string(), "shape `u8` is not registered");
/// ```
#[derive(Debug, Error)]
pub enum MapError {
    /// The destination has neither a default initializer nor a constructor
    /// with at least one parameter.
    #[error("unsupported target shape `{shape}`: {reason}")]
    UnsupportedTargetShape {
        /// The destination shape.
        shape: ShapeId,
        /// Why no construction strategy applies.
        reason: &'static str,
    },

    /// A shape was requested that nobody registered.
    #[error("shape `{0}` is not registered")]
    UnknownShape(ShapeId),

    /// The instance handed to a mapper or accessor is not of the expected type.
    #[error("expected an instance of `{expected}`")]
    InstanceMismatch {
        /// Type name of the expected instance.
        expected: &'static str,
    },

    /// A value written to a member or argument is not of its declared type.
    #[error("value for `{member}` is not a `{expected}`")]
    ValueMismatch {
        /// Member or parameter name.
        member: String,
        /// Type name of the declared value type.
        expected: &'static str,
    },

    /// A constructor argument was absent and the parameter has no default.
    #[error("constructor argument {index} of `{shape}` is missing")]
    MissingArgument {
        /// Type name of the constructed shape.
        shape: &'static str,
        /// Position of the missing argument.
        index: usize,
    },

    /// A computed-value supplier failed.
    #[error("computed value for `{member}` failed: {source}")]
    Supplier {
        /// Destination member the supplier feeds.
        member: String,
        /// The supplier's own error.
        #[source]
        source: BoxError,
    },

    /// The compiled backend could not lower a plan.
    #[error("cannot synthesize mapping routine for `{from}` -> `{to}`: {reason}")]
    Synthesis {
        /// Source shape of the plan.
        from: ShapeId,
        /// Destination shape of the plan.
        to: ShapeId,
        /// What made the plan unlowerable.
        reason: String,
    },

    /// The `AutoMapper` owning a mapper has been dropped.
    #[error("the owning AutoMapper has been dropped")]
    EngineDropped,

    /// A mapper was used before its plan was resolved.
    #[error("mapper `{from}` -> `{to}` has no resolved plan")]
    Unresolved {
        /// Source shape of the mapper.
        from: ShapeId,
        /// Destination shape of the mapper.
        to: ShapeId,
    },
}

impl MapError {
    /// Builds an [`MapError::InstanceMismatch`] naming `T`.
    #[must_use]
    pub fn instance_mismatch<T: ?Sized>() -> Self {
        Self::InstanceMismatch {
            expected: std::any::type_name::<T>(),
        }
    }

    /// Builds a [`MapError::ValueMismatch`] for `member` expecting `T`.
    #[must_use]
    pub fn value_mismatch<T: ?Sized>(member: &str) -> Self {
        Self::ValueMismatch {
            member: member.to_string(),
            expected: std::any::type_name::<T>(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn unsupported_target_shape_names_the_shape() {
        let error = MapError::UnsupportedTargetShape {
            shape: ShapeId::of::<String>(),
            reason: "no constructors",
        };

        assert_eq!(
            error.to_string(),
            "unsupported target shape `alloc::string::String`: no constructors"
        );
    }

    #[rstest]
    fn value_mismatch_helper_uses_type_name() {
        let error = MapError::value_mismatch::<i32>("nr");

        assert_eq!(error.to_string(), "value for `nr` is not a `i32`");
    }

    #[rstest]
    fn supplier_error_exposes_source() {
        let error = MapError::Supplier {
            member: "name".to_string(),
            source: "boom".into(),
        };

        let source = std::error::Error::source(&error).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("boom"));
    }
}
