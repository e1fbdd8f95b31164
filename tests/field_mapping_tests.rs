//! Policies selecting fields, properties or both.

mod common;

use automap::prelude::*;
use common::{Doctor, Patient, Person, Student, engine, student};
use rstest::rstest;

fn doctor() -> Doctor {
    Doctor {
        registered_name: "Dr. Jane Roe".to_string(),
        display_name: "Jane".to_string(),
        ward: 4,
    }
}

#[rstest]
fn fields_policy_ignores_properties_with_identical_names(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Doctor, Patient>().unwrap();

    mapper.bind(Policy::fields()).unwrap();
    let patient = mapper.map(&doctor()).unwrap();

    assert_eq!(
        patient,
        Patient {
            registered_name: "Dr. Jane Roe".to_string(),
            display_name: String::new(),
            ward: 4,
        }
    );
}

#[rstest]
fn properties_policy_ignores_fields_with_identical_names(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Doctor, Patient>().unwrap();

    let patient = mapper.map(&doctor()).unwrap();

    assert_eq!(
        patient,
        Patient {
            registered_name: String::new(),
            display_name: "Jane".to_string(),
            ward: 0,
        }
    );
}

#[rstest]
fn all_policy_pairs_members_of_the_same_kind(
    #[values(Backend::Interpreted, Backend::Compiled)] backend: Backend,
) {
    let engine = engine(backend);
    let mapper = engine.build::<Doctor, Patient>().unwrap();

    mapper.bind(Policy::all()).unwrap();
    let patient = mapper.map(&doctor()).unwrap();

    assert_eq!(patient.registered_name, "Dr. Jane Roe");
    assert_eq!(patient.display_name, "Jane");
    assert_eq!(patient.ward, 4);
}

#[rstest]
fn fields_policy_on_derived_shapes_copies_only_fields() {
    let engine = engine(Backend::Compiled);
    let mapper = engine.build::<Student, Person>().unwrap();

    mapper.bind(Policy::fields()).unwrap();
    let person = mapper.map(&student(3, "Ada", 36)).unwrap();

    assert_eq!(person.nickname, "Ada-nick");
    assert_eq!(person.name, "");
    assert_eq!(person.age, 0);
    assert_eq!(person.school, None);
}

#[rstest]
fn engine_default_member_selection_applies_to_new_mappers() {
    let engine = AutoMapper::with_config(
        MapperConfig::default().with_default_members(MemberSelection::Fields),
    );

    let mapper = engine.build::<Doctor, Patient>().unwrap();
    let patient = mapper.map(&doctor()).unwrap();

    assert_eq!(mapper.untyped().policy(), Some(Policy::fields()));
    assert_eq!(patient.registered_name, "Dr. Jane Roe");
    assert_eq!(patient.display_name, "");
}

#[rstest]
fn match_ignores_the_policy() {
    let engine = engine(Backend::Compiled);
    let mapper = engine.build::<Doctor, Patient>().unwrap();

    mapper.match_members("ward", "ward").unwrap();
    let patient = mapper.map(&doctor()).unwrap();

    assert_eq!(patient.ward, 4);
    assert_eq!(patient.registered_name, "");
}
