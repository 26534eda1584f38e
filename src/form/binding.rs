//! Property bags that shape a [`FieldControl`] for input widgets.
//!
//! Two host styles are covered: web-style inputs that report a change event
//! and native-style inputs that report the changed text directly.

use super::controls::{FieldControl, FieldHandle};
use super::error::{FormError, FormResult};
use super::value::FieldValue;

/// What a web-style input reports on change.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ChangeEvent {
    pub value: String,
}

impl ChangeEvent {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TextInputProps {
    pub value: String,
    handle: FieldHandle,
}

impl TextInputProps {
    pub fn on_change(&self, event: &ChangeEvent) {
        self.handle.set_value(event.value.clone());
    }

    pub fn on_blur(&self) {
        self.handle.set_touched(true);
    }
}

/// Null renders as empty text.
#[derive(Clone, Debug)]
pub struct NumberInputProps {
    pub value: String,
    handle: FieldHandle,
}

impl NumberInputProps {
    pub fn on_change(&self, event: &ChangeEvent) {
        self.handle.set_number_value(&event.value);
    }

    pub fn on_blur(&self) {
        self.handle.set_touched(true);
    }
}

#[derive(Clone, Debug)]
pub struct CheckboxProps {
    pub checked: bool,
    handle: FieldHandle,
}

impl CheckboxProps {
    pub fn on_change(&self) {
        self.handle.set_value(!self.checked);
    }

    pub fn on_blur(&self) {
        self.handle.set_touched(true);
    }
}

#[derive(Clone, Debug)]
pub struct NativeTextInputProps {
    pub value: String,
    handle: FieldHandle,
}

impl NativeTextInputProps {
    pub fn on_change_text(&self, text: &str) {
        self.handle.set_value(text);
    }

    pub fn on_blur(&self) {
        self.handle.set_touched(true);
    }
}

#[derive(Clone, Debug)]
pub struct NativeNumberInputProps {
    pub value: String,
    handle: FieldHandle,
}

impl NativeNumberInputProps {
    pub fn on_change_text(&self, text: &str) {
        self.handle.set_number_value(text);
    }

    pub fn on_blur(&self) {
        self.handle.set_touched(true);
    }
}

impl FieldControl {
    pub fn input_props(&self) -> FormResult<TextInputProps> {
        Ok(TextInputProps {
            value: self.text_value()?,
            handle: self.handle().clone(),
        })
    }

    pub fn number_input_props(&self) -> FormResult<NumberInputProps> {
        Ok(NumberInputProps {
            value: self.number_text()?,
            handle: self.handle().clone(),
        })
    }

    pub fn checkbox_props(&self) -> FormResult<CheckboxProps> {
        let checked = match &self.value {
            FieldValue::Bool(checked) => *checked,
            FieldValue::Null => false,
            other => return Err(self.kind_mismatch("bool", other)),
        };
        Ok(CheckboxProps {
            checked,
            handle: self.handle().clone(),
        })
    }

    pub fn native_input_props(&self) -> FormResult<NativeTextInputProps> {
        Ok(NativeTextInputProps {
            value: self.text_value()?,
            handle: self.handle().clone(),
        })
    }

    pub fn native_number_input_props(&self) -> FormResult<NativeNumberInputProps> {
        Ok(NativeNumberInputProps {
            value: self.number_text()?,
            handle: self.handle().clone(),
        })
    }

    fn text_value(&self) -> FormResult<String> {
        match &self.value {
            FieldValue::Text(text) => Ok(text.clone()),
            FieldValue::Null => Ok(String::new()),
            other => Err(self.kind_mismatch("text", other)),
        }
    }

    fn number_text(&self) -> FormResult<String> {
        match &self.value {
            FieldValue::Number(_) | FieldValue::Null => Ok(self.value.display_text()),
            other => Err(self.kind_mismatch("number", other)),
        }
    }

    fn kind_mismatch(&self, expected: &'static str, found: &FieldValue) -> FormError {
        FormError::FieldType {
            key: self.key().clone(),
            expected,
            found: found.kind(),
        }
    }
}
