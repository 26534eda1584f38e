use std::collections::BTreeMap;
use std::sync::Arc;

use super::error::{FieldError, FormError, FormResult};
use super::snapshot::Snapshot;
use super::value::FieldValue;

/// Checks one field value. `form` is the whole snapshot, so a validator may
/// look at sibling fields.
pub trait Validator: Send + Sync {
    fn validate(&self, value: &FieldValue, form: &Snapshot) -> Option<FieldError>;
}

impl<F> Validator for F
where
    F: Fn(&FieldValue, &Snapshot) -> Option<FieldError> + Send + Sync,
{
    fn validate(&self, value: &FieldValue, form: &Snapshot) -> Option<FieldError> {
        (self)(value, form)
    }
}

pub type ValidatorRef = Arc<dyn Validator>;

pub fn validator<V>(validator: V) -> ValidatorRef
where
    V: Validator + 'static,
{
    Arc::new(validator)
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ErrorReport {
    pub errors: Vec<FieldError>,
    pub errors_map: BTreeMap<String, FieldError>,
    pub has_errors: bool,
}

impl ErrorReport {
    pub fn first(&self) -> Option<&FieldError> {
        self.errors.first()
    }
}

/// Runs every validator in declaration order and gathers the failures.
/// `None` validators behave like an empty list.
pub fn collect_errors(
    value: &FieldValue,
    validators: Option<&[ValidatorRef]>,
    form: &Snapshot,
) -> ErrorReport {
    collect_errors_with(value, validators, form, false)
}

pub fn collect_errors_with(
    value: &FieldValue,
    validators: Option<&[ValidatorRef]>,
    form: &Snapshot,
    first_error_only: bool,
) -> ErrorReport {
    let mut errors = Vec::new();
    for validator in validators.unwrap_or_default() {
        if let Some(error) = validator.validate(value, form) {
            errors.push(error);
            if first_error_only {
                break;
            }
        }
    }

    let errors_map = errors
        .iter()
        .map(|error| (error.name.clone(), error.clone()))
        .collect::<BTreeMap<_, _>>();
    let has_errors = !errors.is_empty();

    ErrorReport {
        errors,
        errors_map,
        has_errors,
    }
}

pub type MessageFn = Arc<dyn Fn(&FieldError) -> String + Send + Sync>;

/// Maps error names to display messages. The `"default"` entry catches every
/// name without its own formatter.
#[derive(Clone, Default)]
pub struct ErrorMessages {
    formatters: BTreeMap<String, MessageFn>,
}

impl ErrorMessages {
    pub const DEFAULT_KEY: &'static str = "default";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(
        mut self,
        name: impl Into<String>,
        format: impl Fn(&FieldError) -> String + Send + Sync + 'static,
    ) -> Self {
        self.formatters.insert(name.into(), Arc::new(format));
        self
    }

    pub fn fallback(self, format: impl Fn(&FieldError) -> String + Send + Sync + 'static) -> Self {
        self.on(Self::DEFAULT_KEY, format)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.formatters.contains_key(name)
    }

    /// Empty text when there is no error. An error with neither its own nor a
    /// default formatter is a setup fault and is reported as such.
    pub fn message(&self, error: Option<&FieldError>) -> FormResult<String> {
        let Some(error) = error else {
            return Ok(String::new());
        };
        let formatter = self
            .formatters
            .get(&error.name)
            .or_else(|| self.formatters.get(Self::DEFAULT_KEY));
        match formatter {
            Some(format) => Ok(format(error)),
            None => {
                tracing::warn!(error = %error.name, "no message mapping for validation error");
                Err(FormError::MissingErrorMapping {
                    name: error.name.clone(),
                })
            }
        }
    }
}

impl std::fmt::Debug for ErrorMessages {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.formatters.keys()).finish()
    }
}
