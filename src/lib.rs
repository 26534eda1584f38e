pub mod form;
pub mod prelude;

pub use form::{
    FieldControl, FieldError, FieldKey, FieldSpec, FieldValue, FormController, FormError,
    FormModel, FormOptions, FormOutput, FormResult, FormSpec, FormStatus, Snapshot, validators,
};
