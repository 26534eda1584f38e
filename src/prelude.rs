pub use crate::form::validators;
pub use crate::form::{
    ChangeEvent, Controls, DirtyCheck, ErrorMessages, FieldControl, FieldError, FieldKey,
    FieldSpec, FieldValue, FormController, FormError, FormModel, FormOptions, FormOutput,
    FormResult, FormSpec, FormStatus, FromFieldValue, Snapshot, ToFieldValue, Validator,
    ValueMap,
};
