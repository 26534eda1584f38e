use std::collections::BTreeMap;

use thiserror::Error;

use super::value::{FieldKey, FieldValue};

/// A validation failure. Produced by validators as plain data.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldError {
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub got: Option<FieldValue>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub expected: Option<FieldValue>,
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub extra: BTreeMap<String, FieldValue>,
}

impl FieldError {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            got: None,
            expected: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn got(mut self, value: impl Into<FieldValue>) -> Self {
        self.got = Some(value.into());
        self
    }

    pub fn expected(mut self, value: impl Into<FieldValue>) -> Self {
        self.expected = Some(value.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        match key {
            "got" => self.got.as_ref(),
            "expected" => self.expected.as_ref(),
            _ => self.extra.get(key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("No error-mapping specified for error `{name}` and no `default` mapping present")]
    MissingErrorMapping { name: String },
    #[error("field `{0}` is declared but has no state in the snapshot")]
    MissingFieldState(FieldKey),
    #[error("no value supplied for field `{0}`")]
    MissingFieldValue(FieldKey),
    #[error("field `{key}` holds a number outside the range of `{target}`")]
    OutOfRange { key: FieldKey, target: &'static str },
    #[error("field `{key}` holds a {found} value where a {expected} value is required")]
    FieldType {
        key: FieldKey,
        expected: &'static str,
        found: &'static str,
    },
}

pub type FormResult<T> = Result<T, FormError>;
