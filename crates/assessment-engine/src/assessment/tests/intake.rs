use serde_json::json;

use super::common::*;
use crate::assessment::domain::QuestionId;
use crate::assessment::intake::{ensure_known_questions, parse_responses, InputViolation};

#[test]
fn parses_integer_answers_into_typed_map() {
    let questions = two_page_questions();
    let responses = parse_responses(&json!({ "q1": 1, "q4": 5 }), Some(&questions))
        .expect("valid payload parses");

    assert_eq!(responses, answers(&[("q1", 1), ("q4", 5)]));
}

#[test]
fn rejects_payloads_that_are_not_objects() {
    for payload in [json!([1, 2, 3]), json!(null), json!("q1=3")] {
        assert!(matches!(
            parse_responses(&payload, None),
            Err(InputViolation::NotAnObject)
        ));
    }
}

#[test]
fn rejects_non_integer_values() {
    for value in [json!(3.5), json!("3"), json!(true), json!(null), json!(3.0)] {
        match parse_responses(&json!({ "q1": value }), None) {
            Err(InputViolation::NonInteger { question_id }) => {
                assert_eq!(question_id, QuestionId::from("q1"));
            }
            other => panic!("expected non-integer rejection for {value}, got {other:?}"),
        }
    }
}

#[test]
fn rejects_values_outside_the_likert_scale() {
    for value in [0, 6, -1] {
        match parse_responses(&json!({ "q2": value }), None) {
            Err(InputViolation::OutOfRange { value: found, .. }) => assert_eq!(found, value),
            other => panic!("expected out of range rejection for {value}, got {other:?}"),
        }
    }
}

#[test]
fn rejects_unknown_questions_when_the_set_is_known() {
    let questions = two_page_questions();
    match parse_responses(&json!({ "q1": 3, "q99": 3 }), Some(&questions)) {
        Err(InputViolation::UnknownQuestion(id)) => assert_eq!(id, QuestionId::from("q99")),
        other => panic!("expected unknown question, got {other:?}"),
    }

    assert!(parse_responses(&json!({ "q99": 3 }), None).is_ok());
}

#[test]
fn ensure_known_questions_flags_foreign_ids() {
    let questions = two_page_questions();
    assert!(ensure_known_questions(&answers(&[("q2", 2)]), &questions).is_ok());
    assert!(matches!(
        ensure_known_questions(&answers(&[("q2", 2), ("other", 4)]), &questions),
        Err(InputViolation::UnknownQuestion(_))
    ));
}
