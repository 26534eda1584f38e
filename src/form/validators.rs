//! Built-in validators and validator combinators.

use regex::Regex;

use super::error::FieldError;
use super::snapshot::Snapshot;
use super::validation::{Validator, ValidatorRef};
use super::value::FieldValue;

/// Fails for null, empty text and `false`. Zero and empty collections pass.
pub fn required(value: &FieldValue, _form: &Snapshot) -> Option<FieldError> {
    let missing = match value {
        FieldValue::Null => true,
        FieldValue::Text(text) => text.is_empty(),
        FieldValue::Bool(flag) => !flag,
        _ => false,
    };
    missing.then(|| FieldError::new("required").got(value.clone()))
}

pub fn required_true(value: &FieldValue, _form: &Snapshot) -> Option<FieldError> {
    (value != &FieldValue::Bool(true)).then(|| FieldError::new("requiredTrue").got(value.clone()))
}

pub fn numeric(value: &FieldValue, _form: &Snapshot) -> Option<FieldError> {
    (!value.to_number().is_finite()).then(|| FieldError::new("numeric").got(value.clone()))
}

fn length_error(name: &str, value: &FieldValue, length: usize, expected: usize) -> FieldError {
    FieldError::new(name)
        .got(value.clone())
        .with("length", length as f64)
        .with("expectedLength", expected as f64)
}

/// Values without a length (numbers, null, ...) are left to other validators.
pub fn min_length(expected: usize) -> impl Validator + Clone {
    move |value: &FieldValue, _form: &Snapshot| {
        let length = value.length()?;
        (length < expected).then(|| length_error("minLength", value, length, expected))
    }
}

pub fn max_length(expected: usize) -> impl Validator + Clone {
    move |value: &FieldValue, _form: &Snapshot| {
        let length = value.length()?;
        (length > expected).then(|| length_error("maxLength", value, length, expected))
    }
}

pub fn min(expected: f64) -> impl Validator + Clone {
    move |value: &FieldValue, _form: &Snapshot| {
        (value.to_number() < expected).then(|| {
            FieldError::new("min")
                .got(value.clone())
                .expected(expected)
        })
    }
}

pub fn max(expected: f64) -> impl Validator + Clone {
    move |value: &FieldValue, _form: &Snapshot| {
        (value.to_number() > expected).then(|| {
            FieldError::new("max")
                .got(value.clone())
                .expected(expected)
        })
    }
}

/// Passes only when the leftmost match of `pattern` covers the whole text.
/// Non-text values never match.
pub fn pattern(pattern: Regex) -> impl Validator + Clone {
    move |value: &FieldValue, _form: &Snapshot| {
        let matched = value.as_text().is_some_and(|text| {
            pattern
                .find(text)
                .is_some_and(|found| found.start() == 0 && found.end() == text.len())
        });
        (!matched).then(|| FieldError::new("pattern").got(value.clone()))
    }
}

pub fn regex(expression: Regex) -> impl Validator + Clone {
    pattern(expression)
}

/// Pins a closure to the validator signature.
pub fn create<F>(validator: F) -> F
where
    F: Fn(&FieldValue, &Snapshot) -> Option<FieldError> + Send + Sync,
{
    validator
}

/// Pins a closure to the shape of a validator factory.
pub fn create_parametrized<P, V, F>(factory: F) -> F
where
    F: Fn(P) -> V,
    V: Validator,
{
    factory
}

/// Runs `validators` only while `condition` holds and reports the first
/// failure among them.
///
/// The condition may read state outside the form; the form cannot see such
/// reads, so callers must invalidate the derived output themselves when that
/// state changes.
pub fn when<C>(condition: C, validators: impl IntoIterator<Item = ValidatorRef>) -> impl Validator
where
    C: Fn(&FieldValue, &Snapshot) -> bool + Send + Sync,
{
    let validators = validators.into_iter().collect::<Vec<_>>();
    move |value: &FieldValue, form: &Snapshot| {
        if !condition(value, form) {
            return None;
        }
        validators
            .iter()
            .find_map(|validator| validator.validate(value, form))
    }
}
