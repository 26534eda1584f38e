use std::borrow::{Borrow, Cow};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::error::{FormError, FormResult};

#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct FieldKey(Cow<'static, str>);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(Cow::Borrowed(value))
    }

    pub fn owned(value: impl Into<String>) -> Self {
        Self(Cow::Owned(value.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for FieldKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for FieldKey {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FieldKey {
    fn from(value: String) -> Self {
        Self::owned(value)
    }
}

/// The plain external view of a form: field name to current value.
pub type ValueMap = BTreeMap<FieldKey, FieldValue>;

/// A dynamically typed field value.
///
/// Compound values are reference counted so that replacing a list or map with
/// a freshly built one is distinguishable from handing back the same instance.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    List(Arc<Vec<FieldValue>>),
    Map(Arc<BTreeMap<String, FieldValue>>),
}

impl FieldValue {
    pub fn list(items: impl IntoIterator<Item = FieldValue>) -> Self {
        Self::List(Arc::new(items.into_iter().collect()))
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, FieldValue)>) -> Self {
        Self::Map(Arc::new(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        ))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    /// Length in UTF-16 code units for text, element count for lists.
    pub fn length(&self) -> Option<usize> {
        match self {
            Self::Text(value) => Some(value.encode_utf16().count()),
            Self::List(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn to_number(&self) -> f64 {
        match self {
            Self::Null => 0.0,
            Self::Bool(value) => f64::from(u8::from(*value)),
            Self::Number(value) => *value,
            Self::Text(value) => coerce_number(value),
            Self::List(_) | Self::Map(_) => f64::NAN,
        }
    }

    /// Primitive values compare by value, compound values by reference.
    pub fn is_identical(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(left), Self::Bool(right)) => left == right,
            (Self::Number(left), Self::Number(right)) => left == right,
            (Self::Text(left), Self::Text(right)) => left == right,
            (Self::List(left), Self::List(right)) => Arc::ptr_eq(left, right),
            (Self::Map(left), Self::Map(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Text rendering used by input adapters; null renders empty.
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Bool(value) => value.to_string(),
            Self::Number(value) => format_number(*value),
            Self::Text(value) => value.clone(),
            Self::List(items) => items
                .iter()
                .map(FieldValue::display_text)
                .collect::<Vec<_>>()
                .join(","),
            Self::Map(_) => "[object Object]".to_string(),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<FieldValue>> for FieldValue {
    fn from(value: Vec<FieldValue>) -> Self {
        Self::List(Arc::new(value))
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        text.to_string()
    } else if value == 0.0 {
        "0".to_string()
    } else {
        value.to_string()
    }
}

fn is_host_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Converts text to a number the way a browser's `Number(text)` does.
///
/// Returns `NaN` when the text is not a numeric literal. Surrounding
/// whitespace is ignored and blank text is zero.
pub fn coerce_number(text: &str) -> f64 {
    let trimmed = text.trim_matches(is_host_whitespace);
    if trimmed.is_empty() {
        return 0.0;
    }
    match trimmed {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    if let Some(value) = parse_radix_literal(trimmed) {
        return value;
    }
    if is_decimal_literal(trimmed) {
        trimmed.parse::<f64>().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

fn parse_radix_literal(text: &str) -> Option<f64> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    let digits = &text[2..];
    if digits.is_empty() {
        return Some(f64::NAN);
    }
    let mut value = 0.0_f64;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            return Some(f64::NAN);
        };
        value = value * f64::from(radix) + f64::from(digit);
    }
    Some(value)
}

fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut index = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        index = 1;
    }

    let integer_start = index;
    while index < bytes.len() && bytes[index].is_ascii_digit() {
        index += 1;
    }
    let integer_digits = index - integer_start;

    let mut fraction_digits = 0;
    if index < bytes.len() && bytes[index] == b'.' {
        index += 1;
        let fraction_start = index;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index += 1;
        }
        fraction_digits = index - fraction_start;
    }
    if integer_digits + fraction_digits == 0 {
        return false;
    }

    if index < bytes.len() && matches!(bytes[index], b'e' | b'E') {
        index += 1;
        if matches!(bytes.get(index), Some(b'+' | b'-')) {
            index += 1;
        }
        let exponent_start = index;
        while index < bytes.len() && bytes[index].is_ascii_digit() {
            index += 1;
        }
        if index == exponent_start {
            return false;
        }
    }

    index == bytes.len()
}

pub trait ToFieldValue {
    fn to_field_value(&self) -> FieldValue;
}

pub trait FromFieldValue: Sized {
    /// `value` is `None` when the map has no entry for `key`.
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self>;
}

fn present<'a>(key: &FieldKey, value: Option<&'a FieldValue>) -> FormResult<&'a FieldValue> {
    value.ok_or_else(|| FormError::MissingFieldValue(key.clone()))
}

fn out_of_range(key: &FieldKey, target: &'static str) -> FormError {
    FormError::OutOfRange {
        key: key.clone(),
        target,
    }
}

fn mismatch(key: &FieldKey, expected: &'static str, found: &FieldValue) -> FormError {
    FormError::FieldType {
        key: key.clone(),
        expected,
        found: found.kind(),
    }
}

impl ToFieldValue for FieldValue {
    fn to_field_value(&self) -> FieldValue {
        self.clone()
    }
}

impl FromFieldValue for FieldValue {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        present(key, value).cloned()
    }
}

impl ToFieldValue for String {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl FromFieldValue for String {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        match present(key, value)? {
            FieldValue::Text(text) => Ok(text.clone()),
            other => Err(mismatch(key, "text", other)),
        }
    }
}

impl ToFieldValue for bool {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

impl FromFieldValue for bool {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        match present(key, value)? {
            FieldValue::Bool(flag) => Ok(*flag),
            other => Err(mismatch(key, "bool", other)),
        }
    }
}

impl ToFieldValue for f64 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(*self)
    }
}

impl FromFieldValue for f64 {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        match present(key, value)? {
            FieldValue::Number(number) => Ok(*number),
            other => Err(mismatch(key, "number", other)),
        }
    }
}

impl ToFieldValue for f32 {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(f64::from(*self))
    }
}

impl FromFieldValue for f32 {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        f64::from_field_value(key, value).map(|number| number as f32)
    }
}

macro_rules! integer_field_value {
    ($($ty:ty),*) => {
        $(
            impl ToFieldValue for $ty {
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::Number(*self as f64)
                }
            }

            impl FromFieldValue for $ty {
                fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
                    let found = present(key, value)?;
                    let FieldValue::Number(number) = found else {
                        return Err(mismatch(key, "integer", found));
                    };
                    if number.fract() != 0.0 {
                        return Err(mismatch(key, "integer", found));
                    }
                    // `MAX as f64` rounds up for 64-bit types, so the upper
                    // bound is exclusive.
                    if *number < <$ty>::MIN as f64 || *number >= <$ty>::MAX as f64 + 1.0 {
                        return Err(out_of_range(key, stringify!($ty)));
                    }
                    Ok(*number as $ty)
                }
            }
        )*
    };
}

integer_field_value!(i32, i64, u32, u64, usize);

impl ToFieldValue for Decimal {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::Number(self.to_f64().unwrap_or(f64::NAN))
    }
}

impl FromFieldValue for Decimal {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        let found = present(key, value)?;
        match found {
            FieldValue::Number(number) if number.is_finite() => {
                decimal_from_f64(*number).ok_or_else(|| out_of_range(key, "Decimal"))
            }
            FieldValue::Text(text) => {
                Decimal::from_str(text.trim()).map_err(|_| mismatch(key, "decimal", found))
            }
            _ => Err(mismatch(key, "decimal", found)),
        }
    }
}

fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_str(&format!("{value:.18}")).ok()
}

impl<T: ToFieldValue> ToFieldValue for Option<T> {
    fn to_field_value(&self) -> FieldValue {
        self.as_ref()
            .map_or(FieldValue::Null, ToFieldValue::to_field_value)
    }
}

impl<T: FromFieldValue> FromFieldValue for Option<T> {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        match value {
            None | Some(FieldValue::Null) => Ok(None),
            Some(inner) => T::from_field_value(key, Some(inner)).map(Some),
        }
    }
}

impl<T: ToFieldValue> ToFieldValue for Vec<T> {
    fn to_field_value(&self) -> FieldValue {
        FieldValue::list(self.iter().map(ToFieldValue::to_field_value))
    }
}

impl<T: FromFieldValue> FromFieldValue for Vec<T> {
    fn from_field_value(key: &FieldKey, value: Option<&FieldValue>) -> FormResult<Self> {
        match present(key, value)? {
            FieldValue::List(items) => items
                .iter()
                .map(|item| T::from_field_value(key, Some(item)))
                .collect(),
            other => Err(mismatch(key, "list", other)),
        }
    }
}
