//! Destination construction: value types, zero-argument constructors and
//! best-fit constructors.

mod common;

use automap::prelude::*;
use automap::plan::Construction;
use common::{
    Applicant, Nobody, Organization, Person, Postman, Registration, School, Sealed, Student,
    Teacher, engine, student,
};
use rstest::rstest;

// =============================================================================
// Best-fit constructor
// =============================================================================

#[rstest]
fn widest_constructor_is_fed_by_case_insensitive_names(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Student, Teacher>().unwrap();

    let teacher = mapper.map(&student(12, "Ada", 36)).unwrap();

    assert_eq!(
        teacher,
        Teacher {
            nr: 12,
            name: "Ada".to_string(),
            rank: 3,
        }
    );
    let plan = mapper.untyped().plan().unwrap();
    assert!(matches!(plan.construction(), Construction::BestConstructor(c) if c.arity() == 3));
    assert!(plan.bindings().is_empty());
}

#[rstest]
fn unmatched_parameter_without_default_fails_at_apply(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Organization, Teacher>().unwrap();

    let result = mapper.map(&Organization {
        name: "Guild".to_string(),
    });

    assert!(matches!(result, Err(MapError::MissingArgument { index: 0, .. })));
}

#[rstest]
fn absent_optional_source_falls_back_to_parameter_default(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Applicant, Postman>().unwrap();

    let postman = mapper.map(&Applicant::default()).unwrap();

    assert_eq!(postman.name, "");
    assert_eq!(postman.route, 7);
    assert_eq!(postman.school, None);
}

#[rstest]
fn present_optional_source_feeds_the_parameter(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Applicant, Postman>().unwrap();

    let postman = mapper
        .map(&Applicant {
            name: Some("Pat".to_string()),
            route: Some(3),
        })
        .unwrap();

    assert_eq!(postman.name, "Pat");
    assert_eq!(postman.route, 3);
}

#[derive(Clone, Debug, Default)]
struct Roster {
    lower: u32,
    upper: u32,
}

impl Reflect for Roster {
    fn shape() -> Shape {
        Shape::builder::<Self>()
            .read_only_property("nr", |roster: &Self| roster.lower)
            .read_only_property("NR", |roster: &Self| roster.upper)
            .value_type()
            .build()
    }
}

#[rstest]
fn last_case_insensitive_match_feeds_the_parameter(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Roster, Teacher>().unwrap();

    let teacher = mapper.map(&Roster { lower: 1, upper: 2 }).unwrap();

    assert_eq!(teacher.nr, 2);
}

#[rstest]
fn match_rebinds_a_constructor_parameter(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Student, Teacher>().unwrap();

    mapper.match_members("age", "nr").unwrap();
    let teacher = mapper.map(&student(12, "Ada", 36)).unwrap();

    assert_eq!(teacher.nr, 36);
    assert_eq!(teacher.name, "Ada");
}

#[rstest]
fn computed_value_feeds_a_constructor_parameter(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Organization, Teacher>().unwrap();

    mapper.for_member("Nr", || 99_u32).unwrap();
    mapper.for_member("rank", || 1_u8).unwrap();
    let teacher = mapper
        .map(&Organization {
            name: "Guild".to_string(),
        })
        .unwrap();

    assert_eq!(
        teacher,
        Teacher {
            nr: 99,
            name: "Guild".to_string(),
            rank: 1,
        }
    );
}

#[rstest]
fn match_without_a_conversion_leaves_the_parameter_alone() {
    let engine = engine(Backend::Compiled);
    let mapper = engine.build::<Student, Teacher>().unwrap();

    mapper.match_members("school", "name").unwrap();

    assert_eq!(mapper.map(&student(1, "Ada", 36)).unwrap().name, "Ada");
}

#[rstest]
fn derived_member_wise_constructor_uses_declared_defaults(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Student, Postman>().unwrap();

    let postman = mapper.map(&student(1, "Ada", 36)).unwrap();

    assert_eq!(
        postman,
        Postman {
            name: "Ada".to_string(),
            route: 7,
            school: Some(School {
                name: "Northfield".to_string(),
            }),
        }
    );
}

#[rstest]
fn optional_parameter_without_match_is_absent() {
    let engine = engine(Backend::Compiled);
    let mapper = engine.build::<Organization, Postman>().unwrap();

    let postman = mapper
        .map(&Organization {
            name: "Guild".to_string(),
        })
        .unwrap();

    assert_eq!(postman.name, "Guild");
    assert_eq!(postman.school, None);
}

// =============================================================================
// Default construction
// =============================================================================

#[rstest]
fn zero_argument_constructor_is_followed_by_member_writes(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Student, Registration>().unwrap();

    let registration = mapper.map(&student(8, "Ada", 36)).unwrap();

    assert_eq!(
        registration,
        Registration {
            nr: 8,
            name: "Ada".to_string(),
        }
    );
    let plan = mapper.untyped().plan().unwrap();
    assert!(matches!(plan.construction(), Construction::Default(_)));
    assert!(plan.arguments().is_empty());
}

#[rstest]
fn unit_value_type_is_constructible() {
    let engine = engine(Backend::Compiled);

    let nobody = engine.build::<Person, Nobody>().unwrap().map(&Person::default());

    assert_eq!(nobody.unwrap(), Nobody);
}

#[rstest]
fn shape_without_constructors_is_unsupported() {
    let engine = engine(Backend::Compiled);

    let result = engine.build::<Student, Sealed>();

    assert!(matches!(
        result,
        Err(MapError::UnsupportedTargetShape { shape, .. }) if shape == ShapeId::of::<Sealed>()
    ));
    assert!(engine.is_empty());
}

#[rstest]
fn unsupported_nested_destination_skips_the_member() {
    #[derive(Clone, Debug, Default, Reflect)]
    #[shape(value)]
    struct Holder {
        #[shape(nested)]
        school: Option<School>,
    }

    #[derive(Clone, Debug, Default, Reflect)]
    #[shape(value)]
    struct SealedHolder {
        #[shape(nested)]
        school: Option<Sealed>,
    }

    let engine = engine(Backend::Compiled);
    let mapper = engine.build::<Holder, SealedHolder>().unwrap();

    let holder = mapper
        .map(&Holder {
            school: Some(School::default()),
        })
        .unwrap();

    assert!(holder.school.is_none());
    assert!(mapper.untyped().plan().unwrap().bindings().is_empty());
}
