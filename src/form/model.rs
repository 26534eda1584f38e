use super::error::FormResult;
use super::value::{FieldKey, ValueMap};

/// A typed view of a form's value map, usually derived with
/// `#[derive(FormModel)]`.
///
/// `Fields` exposes one `const fn` per field returning its [`FieldKey`], so
/// field names are checked at compile time.
pub trait FormModel: Sized {
    type Fields;

    fn fields() -> Self::Fields;

    fn field_keys() -> Vec<FieldKey>;

    fn to_values(&self) -> ValueMap;

    fn from_values(values: &ValueMap) -> FormResult<Self>;
}
