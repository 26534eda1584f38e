mod binding;
mod controller;
mod controls;
mod error;
mod model;
mod snapshot;
mod validation;
pub mod validators;
mod value;

#[cfg(test)]
mod test_validators;

pub use binding::{
    ChangeEvent, CheckboxProps, NativeNumberInputProps, NativeTextInputProps, NumberInputProps,
    TextInputProps,
};
pub use controller::{DirtyCheck, FormController, FormOptions};
pub use controls::{
    Controls, Dispatch, FieldControl, FieldHandle, FormActions, FormOutput, FormStatus,
    SnapshotUpdate, UpdateQueue, aggregate, derive_controls, derive_controls_with, derive_form,
};
pub use error::{FieldError, FormError, FormResult};
pub use formctl_derive::FormModel;
pub use model::FormModel;
pub use snapshot::{
    FieldSpec, FieldState, FormSpec, Snapshot, initial_snapshot, snapshot_from_values,
    values_from_snapshot,
};
pub use validation::{
    ErrorMessages, ErrorReport, MessageFn, Validator, ValidatorRef, collect_errors,
    collect_errors_with, validator,
};
pub use value::{FieldKey, FieldValue, FromFieldValue, ToFieldValue, ValueMap, coerce_number};
