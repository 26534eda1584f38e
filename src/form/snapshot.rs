use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use super::error::{FormError, FormResult};
use super::model::FormModel;
use super::validation::{Validator, ValidatorRef};
use super::value::{FieldKey, FieldValue, ValueMap};

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldState {
    pub value: FieldValue,
    pub dirty: bool,
    pub touched: bool,
}

impl FieldState {
    pub fn pristine(value: FieldValue) -> Self {
        Self {
            value,
            dirty: false,
            touched: false,
        }
    }

    pub fn assigned(value: FieldValue) -> Self {
        Self {
            value,
            dirty: true,
            touched: true,
        }
    }
}

/// Per-field state of one form instance.
///
/// A snapshot is never modified: every update produces a new snapshot and
/// leaves the previous one intact. Clones share storage, and [`Snapshot::ptr_eq`]
/// tells whether two handles are the same snapshot.
#[derive(Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Snapshot {
    fields: Arc<BTreeMap<FieldKey, FieldState>>,
}

impl Snapshot {
    pub fn new(fields: BTreeMap<FieldKey, FieldState>) -> Self {
        Self {
            fields: Arc::new(fields),
        }
    }

    pub fn initial(spec: &FormSpec) -> Self {
        initial_snapshot(spec)
    }

    pub fn from_values(values: &ValueMap) -> Self {
        snapshot_from_values(values)
    }

    pub fn values(&self) -> ValueMap {
        values_from_snapshot(self)
    }

    pub fn get(&self, key: &str) -> Option<&FieldState> {
        self.fields.get(key)
    }

    pub fn value_of(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key).map(|state| &state.value)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldKey, FieldState> {
        self.fields.iter()
    }

    pub fn ptr_eq(&self, other: &Snapshot) -> bool {
        Arc::ptr_eq(&self.fields, &other.fields)
    }

    pub fn with_field(&self, key: FieldKey, state: FieldState) -> Snapshot {
        let mut fields = BTreeMap::clone(&self.fields);
        fields.insert(key, state);
        Snapshot::new(fields)
    }

    /// Rewrites one entry. A missing entry starts from [`FieldState::default`].
    pub fn update_field(
        &self,
        key: FieldKey,
        update: impl FnOnce(FieldState) -> FieldState,
    ) -> Snapshot {
        let previous = self.fields.get(&key).cloned().unwrap_or_default();
        self.with_field(key, update(previous))
    }
}

impl Debug for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_map().entries(self.fields.iter()).finish()
    }
}

impl FromIterator<(FieldKey, FieldState)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (FieldKey, FieldState)>>(iter: I) -> Self {
        Snapshot::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = (&'a FieldKey, &'a FieldState);
    type IntoIter = btree_map::Iter<'a, FieldKey, FieldState>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

#[derive(Clone, Default)]
pub struct FieldSpec {
    pub initial: FieldValue,
    pub validators: Vec<ValidatorRef>,
}

impl FieldSpec {
    pub fn new(initial: impl Into<FieldValue>) -> Self {
        Self {
            initial: initial.into(),
            validators: Vec::new(),
        }
    }

    pub fn validator<V>(mut self, validator: V) -> Self
    where
        V: Validator + 'static,
    {
        self.validators.push(Arc::new(validator));
        self
    }

    pub fn validators(mut self, validators: impl IntoIterator<Item = ValidatorRef>) -> Self {
        self.validators.extend(validators);
        self
    }
}

impl Debug for FieldSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("initial", &self.initial)
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Declarative description of a form: every field with its initial value
/// and validators.
#[derive(Clone, Debug, Default)]
pub struct FormSpec {
    fields: BTreeMap<FieldKey, FieldSpec>,
}

impl FormSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_model<T: FormModel>(model: &T) -> Self {
        Self {
            fields: model
                .to_values()
                .into_iter()
                .map(|(key, value)| (key, FieldSpec::new(value)))
                .collect(),
        }
    }

    pub fn field(mut self, key: impl Into<FieldKey>, spec: FieldSpec) -> Self {
        self.fields.insert(key.into(), spec);
        self
    }

    /// Appends a validator to an already declared field; unknown keys
    /// declare the field with a null initial value.
    pub fn with_validator<V>(mut self, key: impl Into<FieldKey>, validator: V) -> Self
    where
        V: Validator + 'static,
    {
        self.fields
            .entry(key.into())
            .or_default()
            .validators
            .push(Arc::new(validator));
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldKey, FieldSpec> {
        self.fields.iter()
    }

    /// Checks that `values` carries an entry for every declared field.
    pub fn require_values(&self, values: &ValueMap) -> FormResult<()> {
        require_fields(self.keys(), values)
    }
}

pub fn initial_snapshot(spec: &FormSpec) -> Snapshot {
    spec.iter()
        .map(|(key, field)| (key.clone(), FieldState::pristine(field.initial.clone())))
        .collect()
}

/// Every supplied field becomes dirty and touched, whether or not its value
/// actually changed.
pub fn snapshot_from_values(values: &ValueMap) -> Snapshot {
    values
        .iter()
        .map(|(key, value)| (key.clone(), FieldState::assigned(value.clone())))
        .collect()
}

pub fn values_from_snapshot(snapshot: &Snapshot) -> ValueMap {
    snapshot
        .iter()
        .map(|(key, state)| (key.clone(), state.value.clone()))
        .collect()
}

pub(super) fn require_fields<'a>(
    keys: impl IntoIterator<Item = &'a FieldKey>,
    values: &ValueMap,
) -> FormResult<()> {
    match keys.into_iter().find(|key| !values.contains_key(key.as_str())) {
        Some(missing) => Err(FormError::MissingFieldValue(missing.clone())),
        None => Ok(()),
    }
}
