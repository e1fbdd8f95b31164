//! Property-based checks that both backends produce identical results.

mod common;

use automap::prelude::*;
use common::{Person, Postman, School, Student, Teacher, engine};
use proptest::prelude::*;

fn arbitrary_student() -> impl Strategy<Value = Student> {
    (
        any::<u32>(),
        "[a-zA-Z]{0,12}",
        0_u32..120,
        "[a-z]{0,8}",
        proptest::option::of("[A-Z][a-z]{0,10}"),
    )
        .prop_map(|(nr, name, age, nickname, school)| Student {
            nr,
            name,
            age,
            nickname,
            school: school.map(|name| School { name }),
        })
}

fn both<S: Reflect, D: Reflect>(
    customize: impl Fn(&TypedMapper<S, D>),
) -> (TypedMapper<S, D>, TypedMapper<S, D>) {
    let interpreted_engine = engine(Backend::Interpreted);
    let compiled_engine = engine(Backend::Compiled);
    let interpreted = interpreted_engine.build::<S, D>().unwrap();
    let compiled = compiled_engine.build::<S, D>().unwrap();
    customize(&interpreted);
    customize(&compiled);
    (interpreted, compiled)
}

proptest! {
    /// Default auto-wiring agrees across backends.
    #[test]
    fn prop_default_plans_agree(student in arbitrary_student()) {
        let (interpreted, compiled) = both::<Student, Person>(|_| {});

        prop_assert_eq!(interpreted.map(&student).unwrap(), compiled.map(&student).unwrap());
    }

    /// Overrides and policy changes agree across backends.
    #[test]
    fn prop_customized_plans_agree(student in arbitrary_student(), all in any::<bool>()) {
        let (interpreted, compiled) = both::<Student, Person>(|mapper| {
            if all {
                mapper.bind(Policy::all()).unwrap();
            }
            mapper
                .match_members("nr", "id")
                .unwrap()
                .for_member("title", || "Prof.".to_string())
                .unwrap();
        });

        let expected = interpreted.map(&student).unwrap();
        prop_assert_eq!(&expected, &compiled.map(&student).unwrap());
        prop_assert_eq!(expected.id, student.nr);
        prop_assert_eq!(expected.title.as_str(), "Prof.");
    }

    /// Constructor-based destinations agree across backends.
    #[test]
    fn prop_constructor_plans_agree(student in arbitrary_student()) {
        let (interpreted, compiled) = both::<Student, Teacher>(|_| {});
        let (interpreted_postman, compiled_postman) = both::<Student, Postman>(|_| {});

        prop_assert_eq!(interpreted.map(&student).unwrap(), compiled.map(&student).unwrap());
        prop_assert_eq!(
            interpreted_postman.map(&student).unwrap(),
            compiled_postman.map(&student).unwrap()
        );
    }

    /// Array mapping agrees across backends, absences included.
    #[test]
    fn prop_array_mapping_agrees(
        students in prop::collection::vec(proptest::option::of(arbitrary_student()), 0..8)
    ) {
        let (interpreted, compiled) = both::<Student, Person>(|_| {});

        let expected = interpreted.map_array(&students).unwrap();
        prop_assert_eq!(expected.len(), students.len());
        prop_assert_eq!(expected, compiled.map_array(&students).unwrap());
    }
}
