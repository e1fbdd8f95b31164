//! # automap
//!
//! Runtime object-to-object mapping driven by shape descriptions.
//!
//! ## Overview
//!
//! A type describes its members and constructors through [`Reflect`], either
//! by hand with [`Shape::builder`] or with `#[derive(Reflect)]`. An
//! [`AutoMapper`] resolves, for each (source, destination) pair, a plan that
//! binds source members to destination members or constructor parameters,
//! and caches one [`Mapper`] per pair.
//!
//! - **Auto-wiring**: members with equal names are bound; differing types
//!   are converted through nested mappers from the same cache
//! - **Construction**: value types and zero-argument constructors are
//!   populated member by member; otherwise the widest constructor is fed
//!   from case-insensitively matching members
//! - **Customization**: [`Policy`] selection, explicit member matches and
//!   computed values
//! - **Backends**: an interpreter and a closure compiler with identical
//!   results
//!
//! ## Feature Flags
//!
//! - `derive`: `#[derive(Reflect)]` (enabled by default)
//! - `serde`: `Serialize`/`Deserialize` for [`MapperConfig`]
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use automap::prelude::*;
//!
//! #[derive(Clone, Default, Reflect)]
//! struct Student {
//!     name: String,
//!     age: u32,
//! }
//!
//! #[derive(Clone, Debug, Default, PartialEq, Reflect)]
//! #[shape(value)]
//! struct Person {
//!     name: String,
//!     age: u32,
//! }
//!
//! let engine = AutoMapper::new();
//! let mapper = engine.build::<Student, Person>().unwrap();
//! let person = mapper.map(&Student { name: "Ada".into(), age: 36 }).unwrap();
//! assert_eq!(person, Person { name: "Ada".into(), age: 36 });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

extern crate self as automap;

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use automap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::cache::AutoMapper;
    pub use crate::config::{Backend, MapperConfig, MemberSelection};
    pub use crate::error::{MapError, Result};
    pub use crate::mapper::{MapLazy, Mapper, TypedMapper};
    pub use crate::policy::{MemberFilter, Policy};
    pub use crate::shape::{Reflect, Shape, ShapeId};

    #[cfg(feature = "derive")]
    pub use automap_derive::Reflect;
}

mod backend;
mod cache;
pub mod config;
pub mod error;
pub mod mapper;
pub mod plan;
pub mod policy;
pub mod shape;

pub use cache::AutoMapper;
pub use config::{Backend, MapperConfig, MemberSelection};
pub use error::{MapError, Result};
pub use mapper::{MapLazy, Mapper, TypedMapper};
pub use policy::{MemberFilter, Policy};
pub use shape::{Reflect, Shape, ShapeId};

#[cfg(feature = "derive")]
pub use automap_derive::Reflect;
