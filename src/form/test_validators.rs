use super::validators::{self, create, create_parametrized, when};
use super::*;
use regex::Regex;

fn empty_form() -> Snapshot {
    Snapshot::default()
}

fn run(validator: impl Validator, value: impl Into<FieldValue>) -> Option<FieldError> {
    validator.validate(&value.into(), &empty_form())
}

fn upper_only() -> Regex {
    Regex::new("[A-Z]*").expect("valid regex")
}

#[test]
fn required_rejects_null_empty_text_and_false() {
    assert!(run(validators::required, FieldValue::Null).is_some());
    assert!(run(validators::required, "").is_some());
    assert!(run(validators::required, false).is_some());

    for value in [
        FieldValue::from("TEST"),
        FieldValue::from("null"),
        FieldValue::from("false"),
        FieldValue::from("0"),
        FieldValue::from(0),
        FieldValue::from(Vec::new()),
        FieldValue::map(Vec::<(String, FieldValue)>::new()),
        FieldValue::from(true),
    ] {
        assert_eq!(run(validators::required, value.clone()), None, "{value:?}");
    }
}

#[test]
fn required_error_carries_the_rejected_value() {
    assert_eq!(
        run(validators::required, ""),
        Some(FieldError::new("required").got(""))
    );
}

#[test]
fn required_true_accepts_only_boolean_true() {
    assert!(run(validators::required_true, "true").is_some());
    assert!(run(validators::required_true, FieldValue::Null).is_some());
    assert!(run(validators::required_true, false).is_some());
    assert!(run(validators::required_true, true).is_none());
}

#[test]
fn length_validators_compare_against_bounds() {
    assert!(run(validators::min_length(5), "TEST").is_some());
    assert!(run(validators::min_length(5), "TESTTEST").is_none());
    assert!(run(validators::min_length(4), "1234").is_none());
    assert!(run(validators::min_length(0), "").is_none());

    assert!(run(validators::max_length(3), "TEST").is_some());
    assert!(run(validators::max_length(5), "TEST").is_none());
    assert!(run(validators::max_length(4), "1234").is_none());
}

#[test]
fn length_error_reports_observed_and_expected_length() {
    let error = run(validators::min_length(3), "ab").expect("too short");
    assert_eq!(error.name, "minLength");
    assert_eq!(error.get("length"), Some(&FieldValue::from(2)));
    assert_eq!(error.get("expectedLength"), Some(&FieldValue::from(3)));
    assert_eq!(error.got, Some(FieldValue::from("ab")));
}

#[test]
fn length_validators_ignore_values_without_length() {
    assert!(run(validators::min_length(3), 12).is_none());
    assert!(run(validators::max_length(0), FieldValue::Null).is_none());
    assert!(run(validators::max_length(1), FieldValue::list([FieldValue::from(1), FieldValue::from(2)])).is_some());
}

#[test]
fn numeric_requires_a_finite_coercion() {
    assert!(run(validators::numeric, "test").is_some());
    assert!(run(validators::numeric, FieldValue::map([("num", FieldValue::from(1))])).is_some());
    assert!(run(validators::numeric, "Infinity").is_some());

    for value in [
        FieldValue::from(1),
        FieldValue::from(-1),
        FieldValue::Number(-1.123),
        FieldValue::from("1"),
        FieldValue::from("-1"),
        FieldValue::from("12e3"),
        FieldValue::from("12.123"),
    ] {
        assert_eq!(run(validators::numeric, value.clone()), None, "{value:?}");
    }
}

#[test]
fn min_and_max_compare_numerically() {
    assert!(run(validators::min(5.0), 4).is_some());
    assert!(run(validators::min(4.0), -1).is_some());
    assert!(run(validators::min(5.0), 5).is_none());
    assert!(run(validators::min(-1.0), 4).is_none());

    assert!(run(validators::max(5.0), 6).is_some());
    assert!(run(validators::max(-1.0), 5).is_some());
    assert!(run(validators::max(5.0), 5).is_none());
    assert!(run(validators::max(4.0), -1).is_none());

    assert!(run(validators::min(5.0), "7").is_none());
    assert!(run(validators::min(5.0), "3").is_some());
}

#[test]
fn min_error_carries_got_and_expected() {
    assert_eq!(
        run(validators::min(5.0), 0),
        Some(FieldError::new("min").got(0).expected(5.0))
    );
}

#[test]
fn pattern_requires_whole_value_match() {
    assert!(run(validators::pattern(upper_only()), "ABCD123").is_some());
    assert!(run(validators::pattern(upper_only()), "123123").is_some());
    assert!(run(validators::pattern(upper_only()), "ABCDEFG").is_none());
    assert!(run(validators::pattern(upper_only()), "").is_none());
    assert!(run(validators::pattern(upper_only()), 12).is_some());
}

#[test]
fn pattern_uses_the_leftmost_first_match() {
    let alternation = Regex::new("a|ab").expect("valid regex");
    assert!(run(validators::pattern(alternation), "ab").is_some());
}

#[test]
fn regex_delegates_to_pattern() {
    assert_eq!(
        run(validators::regex(upper_only()), "ABCD123"),
        run(validators::pattern(upper_only()), "ABCD123")
    );
    assert!(run(validators::regex(upper_only()), "ABC").is_none());
}

#[test]
fn collect_errors_without_failures_is_empty() {
    let report = collect_errors(
        &"TEST".into(),
        Some(&[validator(validators::required)]),
        &empty_form(),
    );
    assert!(!report.has_errors);
    assert!(report.errors.is_empty());
    assert!(report.errors_map.is_empty());
}

#[test]
fn collect_errors_tolerates_absent_validators() {
    let report = collect_errors(&FieldValue::Null, None, &empty_form());
    assert_eq!(report, ErrorReport::default());
}

#[test]
fn collect_errors_keeps_declaration_order() {
    let report = collect_errors(
        &"".into(),
        Some(&[
            validator(validators::required),
            validator(validators::min_length(3)),
        ]),
        &empty_form(),
    );

    let required = FieldError::new("required").got("");
    let min_length = FieldError::new("minLength")
        .got("")
        .with("length", 0.0)
        .with("expectedLength", 3.0);
    assert!(report.has_errors);
    assert_eq!(report.errors, vec![required.clone(), min_length.clone()]);
    assert_eq!(report.errors_map.get("required"), Some(&required));
    assert_eq!(report.errors_map.get("minLength"), Some(&min_length));
}

#[test]
fn collect_errors_single_failure_among_several_validators() {
    let report = collect_errors(
        &"".into(),
        Some(&[
            validator(validators::required),
            validator(validators::max_length(3)),
        ]),
        &empty_form(),
    );
    assert_eq!(report.errors, vec![FieldError::new("required").got("")]);
    assert_eq!(report.errors_map.len(), 1);
}

#[test]
fn later_errors_with_the_same_name_win_in_the_map() {
    let first = create(|_value, _form| Some(FieldError::new("custom").with("order", 1)));
    let second = create(|_value, _form| Some(FieldError::new("custom").with("order", 2)));
    let report = collect_errors(
        &FieldValue::Null,
        Some(&[validator(first), validator(second)]),
        &empty_form(),
    );
    assert_eq!(report.errors.len(), 2);
    assert_eq!(
        report.errors_map["custom"].get("order"),
        Some(&FieldValue::from(2))
    );
}

#[test]
fn first_error_only_stops_after_the_first_failure() {
    let report = collect_errors_with(
        &"".into(),
        Some(&[
            validator(validators::required),
            validator(validators::min_length(3)),
        ]),
        &empty_form(),
        true,
    );
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].name, "required");
}

#[test]
fn custom_and_parametrized_validators_plug_in() {
    let is_test = create(|value, _form| {
        (value.as_text() != Some("TEST")).then(|| FieldError::new("isTest").got(value.clone()))
    });
    let is = create_parametrized(|expected: &'static str| {
        create(move |value, _form| {
            (value.as_text() != Some(expected)).then(|| FieldError::new("is").got(value.clone()))
        })
    });

    assert!(run(is_test, "TEST").is_none());
    assert!(run(is_test, "INVALID").is_some());
    assert!(run(is("TEST"), "TEST").is_none());
    assert_eq!(run(is("TEST"), "INVALID").map(|error| error.name), Some("is".to_string()));
}

#[test]
fn cross_field_validator_reads_sibling_values() {
    let is_password_same = create(|repeat, form| {
        (form.value_of("password") != Some(repeat)).then(|| FieldError::new("isPasswordSame"))
    });
    let form = |password: &str| {
        Snapshot::from_iter([(
            FieldKey::new("password"),
            FieldState::assigned(password.into()),
        )])
    };

    let mismatch = is_password_same.validate(&"123".into(), &form("abc"));
    assert_eq!(mismatch.map(|error| error.name), Some("isPasswordSame".to_string()));
    assert!(is_password_same.validate(&"123".into(), &form("123")).is_none());
}

#[test]
fn conditional_validator_runs_only_when_enabled() {
    let switch_is = |enabled: bool| when(move |_, _| enabled, [validator(validators::required)]);

    assert!(run(switch_is(true), "").is_some());
    assert!(run(switch_is(false), "").is_none());
}

#[test]
fn conditional_validator_short_circuits_on_first_failure() {
    let both_fail = when(
        |_, _| true,
        [
            validator(validators::required),
            validator(validators::min_length(3)),
        ],
    );
    assert_eq!(run(both_fail, "").map(|error| error.name), Some("required".to_string()));
}

#[test]
fn error_messages_map_by_name() {
    let messages = ErrorMessages::new().on("required", |_| "req".to_string());
    let report = collect_errors(
        &"".into(),
        Some(&[validator(validators::required)]),
        &empty_form(),
    );
    assert_eq!(messages.message(report.first()).expect("mapped"), "req");
}

#[test]
fn error_messages_are_empty_without_an_error() {
    let messages = ErrorMessages::new().on("required", |_| "req".to_string());
    assert_eq!(messages.message(None).expect("no error"), "");
}

#[test]
fn error_messages_fall_back_to_default() {
    let messages = ErrorMessages::new().fallback(|_| "default".to_string());
    let error = FieldError::new("required");
    assert_eq!(messages.message(Some(&error)).expect("fallback"), "default");

    let by_key = ErrorMessages::new().on("default", |error| format!("bad {}", error.name));
    assert_eq!(by_key.message(Some(&error)).expect("fallback"), "bad required");
}

#[test]
fn error_messages_formatter_sees_the_payload() {
    let messages = ErrorMessages::new().on("minLength", |error| {
        format!(
            "Minimum Length: {}/{}",
            error.get("length").map(FieldValue::display_text).unwrap_or_default(),
            error
                .get("expectedLength")
                .map(FieldValue::display_text)
                .unwrap_or_default()
        )
    });
    let error = run(validators::min_length(5), "abc");
    assert_eq!(
        messages.message(error.as_ref()).expect("mapped"),
        "Minimum Length: 3/5"
    );
}

#[test]
fn missing_error_mapping_fails_loudly() {
    let error = FieldError::new("required");
    let failure = ErrorMessages::new()
        .message(Some(&error))
        .expect_err("unmapped error must fail");
    assert_eq!(
        failure,
        FormError::MissingErrorMapping {
            name: "required".to_string()
        }
    );
    assert!(failure.to_string().contains("No error-mapping specified"));
}
