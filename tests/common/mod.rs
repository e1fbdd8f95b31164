//! Shapes shared by the integration tests.

#![allow(dead_code)]

use automap::prelude::*;
use automap::shape::ParameterDescriptor;

// =============================================================================
// Derived shapes
// =============================================================================

#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[shape(value)]
pub struct School {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[shape(value)]
pub struct Organization {
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[shape(value)]
pub struct Student {
    pub nr: u32,
    pub name: String,
    #[shape(marker = "to_map")]
    pub age: u32,
    #[shape(field)]
    pub nickname: String,
    #[shape(nested)]
    pub school: Option<School>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[shape(value)]
pub struct Person {
    pub id: u32,
    pub name: String,
    pub age: u32,
    #[shape(field)]
    pub nickname: String,
    pub title: String,
    #[shape(nested)]
    pub school: Option<Organization>,
}

/// Built only through its member-wise constructor.
#[derive(Clone, Debug, PartialEq, Eq, Reflect)]
#[shape(construct)]
pub struct Postman {
    pub name: String,
    #[shape(default = "7")]
    pub route: u32,
    pub school: Option<School>,
}

/// Source whose members may be absent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[shape(value)]
pub struct Applicant {
    pub name: Option<String>,
    pub route: Option<u32>,
}

/// Zero-argument constructor, not a value type.
#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[shape(default)]
pub struct Registration {
    pub nr: u32,
    pub name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
#[shape(value)]
pub struct Nobody;

/// Describes members but no way to build an instance.
#[derive(Clone, Debug, Default, PartialEq, Eq, Reflect)]
pub struct Sealed {
    pub name: String,
}

// =============================================================================
// Hand-written shapes
// =============================================================================

/// Construction-only shape with upper-case parameter names.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Teacher {
    pub nr: u32,
    pub name: String,
    pub rank: u8,
}

impl Reflect for Teacher {
    fn shape() -> Shape {
        Shape::builder::<Self>()
            .read_only_property("Nr", |teacher: &Self| teacher.nr)
            .read_only_property("Name", |teacher: &Self| teacher.name.clone())
            .read_only_property("Rank", |teacher: &Self| teacher.rank)
            .constructor(vec![ParameterDescriptor::new::<u32>("Nr")], |arguments| {
                Ok(Self {
                    nr: arguments.take(0)?,
                    name: String::new(),
                    rank: 0,
                })
            })
            .constructor(
                vec![
                    ParameterDescriptor::new::<u32>("NR"),
                    ParameterDescriptor::zeroed::<String>("NAME"),
                    ParameterDescriptor::defaulted("rank", || 3_u8),
                ],
                |arguments| {
                    Ok(Self {
                        nr: arguments.take(0)?,
                        name: arguments.take(1)?,
                        rank: arguments.take(2)?,
                    })
                },
            )
            .build()
    }
}

/// A field and a property share the name `name` but not their storage.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Doctor {
    pub registered_name: String,
    pub display_name: String,
    pub ward: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Patient {
    pub registered_name: String,
    pub display_name: String,
    pub ward: u32,
}

macro_rules! split_name_shape {
    ($shape:ty) => {
        impl Reflect for $shape {
            fn shape() -> Shape {
                Shape::builder::<Self>()
                    .field(
                        "name",
                        |value: &Self| value.registered_name.clone(),
                        |value: &mut Self, name| value.registered_name = name,
                    )
                    .property(
                        "name",
                        |value: &Self| value.display_name.clone(),
                        |value: &mut Self, name| value.display_name = name,
                    )
                    .field("ward", |value: &Self| value.ward, |value: &mut Self, ward| {
                        value.ward = ward;
                    })
                    .value_type()
                    .build()
            }
        }
    };
}

split_name_shape!(Doctor);
split_name_shape!(Patient);

// =============================================================================
// Helpers
// =============================================================================

pub fn engine(backend: Backend) -> AutoMapper {
    AutoMapper::with_config(MapperConfig::default().with_backend(backend))
}

pub fn student(nr: u32, name: &str, age: u32) -> Student {
    Student {
        nr,
        name: name.to_string(),
        age,
        nickname: format!("{name}-nick"),
        school: Some(School {
            name: "Northfield".to_string(),
        }),
    }
}
