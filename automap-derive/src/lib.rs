//! Derive macro for automap shape descriptions.
//!
//! `#[derive(Reflect)]` implements `automap::shape::Reflect` for structs with
//! named fields (and unit structs), describing every field as a member and,
//! on request, the ways the struct can be constructed.
//!
//! # Example
//!
//! ```rust,ignore
//! use automap::prelude::*;
//!
//! #[derive(Clone, Default, Reflect)]
//! #[shape(value)]
//! struct Student {
//!     name: String,
//!     #[shape(field, marker = "to_map")]
//!     age: u32,
//!     #[shape(nested)]
//!     school: Option<School>,
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod reflect;

use proc_macro::TokenStream;

/// Derive macro generating a `Reflect` implementation.
///
/// Every field type must implement `Clone`; readers clone the field value.
/// `Option<T>` fields become optional members of value type `T`.
///
/// # Container attributes
///
/// - `#[shape(value)]`: value type, initialized through `Default`
/// - `#[shape(default)]`: zero-argument constructor through `Default`
/// - `#[shape(construct)]`: constructor taking every non-skipped field in
///   declaration order
///
/// Without any of them the shape has no way to be constructed and can only
/// be used as a mapping source.
///
/// # Field attributes
///
/// - `field`: describe as a field instead of a property
/// - `rename = "name"`: member and parameter name
/// - `marker = "name"`: declarative marker, repeatable
/// - `skip`: not described; filled with `Default` by `construct`
/// - `nested`: register the member's type together with this one
/// - `read_only`: no writer
/// - `default = "expr"`: constructor-parameter default
/// - `no_default`: the constructor parameter has no default; an unmatched
///   argument fails the mapping
///
/// Constructor parameters of non-`Option` fields default to
/// `Default::default()` unless `default` or `no_default` is given.
///
/// # Generated Code
///
/// ```rust,ignore
/// impl automap::shape::Reflect for Student {
///     fn shape() -> automap::shape::Shape {
///         automap::shape::Shape::builder::<Self>()
///             .property("name", |instance: &Self| instance.name.clone(), |instance: &mut Self, value| instance.name = value)
///             // ...
///             .value_type()
///             .build()
///     }
///
///     fn register_nested(registry: &automap::shape::ShapeRegistry) {
///         registry.register::<School>();
///     }
/// }
/// ```
#[proc_macro_derive(Reflect, attributes(shape))]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    reflect::derive_reflect_impl(input)
}
