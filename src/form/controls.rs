use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt::{Debug, Formatter};
use std::ops::Index;
use std::sync::{Arc, Mutex};

use super::controller::{DirtyCheck, FormOptions};
use super::error::{FieldError, FormError, FormResult};
use super::snapshot::{
    FieldState, FormSpec, Snapshot, require_fields, snapshot_from_values, values_from_snapshot,
};
use super::validation::collect_errors_with;
use super::value::{FieldKey, FieldValue, ValueMap, coerce_number};

/// A pure snapshot transition. It always receives the latest snapshot, never
/// the one the caller saw when it queued the update.
pub type SnapshotUpdate = Box<dyn FnOnce(&Snapshot) -> Snapshot + Send>;

pub type Dispatch = Arc<dyn Fn(SnapshotUpdate) + Send + Sync>;

/// Mutators for one field: the field name plus the dispatch that applies the
/// resulting snapshot updates.
#[derive(Clone)]
pub struct FieldHandle {
    key: FieldKey,
    dispatch: Dispatch,
    dirty_check: DirtyCheck,
}

impl FieldHandle {
    pub fn new(key: FieldKey, dispatch: Dispatch) -> Self {
        Self {
            key,
            dispatch,
            dirty_check: DirtyCheck::default(),
        }
    }

    pub fn with_dirty_check(mut self, dirty_check: DirtyCheck) -> Self {
        self.dirty_check = dirty_check;
        self
    }

    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    pub fn rebind(&mut self, dispatch: Dispatch) {
        self.dispatch = dispatch;
    }

    fn update(&self, update: impl FnOnce(FieldState) -> FieldState + Send + 'static) {
        let key = self.key.clone();
        tracing::trace!(field = %key, "dispatching field update");
        (self.dispatch)(Box::new(move |previous: &Snapshot| {
            previous.update_field(key, update)
        }));
    }

    pub fn set_value(&self, value: impl Into<FieldValue>) {
        let value = value.into();
        let key = self.key.clone();
        let dirty_check = self.dirty_check;
        tracing::trace!(field = %key, "dispatching field update");
        (self.dispatch)(Box::new(move |previous: &Snapshot| {
            let dirty = previous
                .value_of(key.as_str())
                .is_none_or(|old| dirty_check.differs(old, &value));
            previous.with_field(
                key,
                FieldState {
                    value,
                    dirty,
                    touched: true,
                },
            )
        }));
    }

    pub fn reset_value(&self, value: impl Into<FieldValue>) {
        let value = value.into();
        self.update(move |_| FieldState::pristine(value));
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.update(move |state| FieldState { dirty, ..state });
    }

    pub fn set_touched(&self, touched: bool) {
        self.update(move |state| FieldState { touched, ..state });
    }

    /// Empty text stores null, numeric text stores the number and anything
    /// else only marks the field touched, keeping the last accepted value.
    pub fn set_number_value(&self, text: &str) {
        if text.is_empty() {
            self.set_value(FieldValue::Null);
            return;
        }
        let number = coerce_number(text);
        if number.is_finite() {
            self.set_value(number);
        } else {
            tracing::trace!(field = %self.key, input = text, "rejected non-numeric input");
            self.set_touched(true);
        }
    }
}

impl Debug for FieldHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldHandle")
            .field("key", &self.key)
            .field("dirty_check", &self.dirty_check)
            .finish_non_exhaustive()
    }
}

/// Render-ready state of one field together with its mutators.
#[derive(Clone, Debug)]
pub struct FieldControl {
    pub value: FieldValue,
    pub valid: bool,
    pub invalid: bool,
    pub dirty: bool,
    pub touched: bool,
    pub touched_or_dirty: bool,
    pub error: Option<FieldError>,
    /// `None` unless at least one validator failed.
    pub errors: Option<BTreeMap<String, FieldError>>,
    handle: FieldHandle,
}

impl FieldControl {
    pub fn key(&self) -> &FieldKey {
        self.handle.key()
    }

    pub fn handle(&self) -> &FieldHandle {
        &self.handle
    }

    pub fn rebind(mut self, dispatch: Dispatch) -> Self {
        self.handle.rebind(dispatch);
        self
    }

    pub fn set_value(&self, value: impl Into<FieldValue>) {
        self.handle.set_value(value);
    }

    pub fn reset_value(&self, value: impl Into<FieldValue>) {
        self.handle.reset_value(value);
    }

    pub fn mark_dirty(&self) {
        self.handle.set_dirty(true);
    }

    pub fn set_dirty(&self, dirty: bool) {
        self.handle.set_dirty(dirty);
    }

    pub fn mark_touched(&self) {
        self.handle.set_touched(true);
    }

    pub fn set_touched(&self, touched: bool) {
        self.handle.set_touched(touched);
    }

    pub fn set_number_value(&self, text: &str) {
        self.handle.set_number_value(text);
    }
}

#[derive(Clone, Debug, Default)]
pub struct Controls {
    fields: BTreeMap<FieldKey, FieldControl>,
}

impl Controls {
    pub fn get(&self, key: &str) -> Option<&FieldControl> {
        self.fields.get(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, FieldKey, FieldControl> {
        self.fields.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldControl> {
        self.fields.values()
    }
}

/// Panics when `key` has no control. Rendering code should use
/// [`Controls::get`] instead.
impl Index<&str> for Controls {
    type Output = FieldControl;

    fn index(&self, key: &str) -> &Self::Output {
        match self.fields.get(key) {
            Some(control) => control,
            None => panic!("no control for field `{key}`"),
        }
    }
}

impl FromIterator<(FieldKey, FieldControl)> for Controls {
    fn from_iter<I: IntoIterator<Item = (FieldKey, FieldControl)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Controls {
    type Item = (&'a FieldKey, &'a FieldControl);
    type IntoIter = btree_map::Iter<'a, FieldKey, FieldControl>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

pub fn derive_controls(
    spec: &FormSpec,
    snapshot: &Snapshot,
    dispatch: &Dispatch,
) -> FormResult<Controls> {
    derive_controls_with(spec, snapshot, dispatch, &FormOptions::default())
}

pub fn derive_controls_with(
    spec: &FormSpec,
    snapshot: &Snapshot,
    dispatch: &Dispatch,
    options: &FormOptions,
) -> FormResult<Controls> {
    tracing::trace!(fields = spec.len(), "deriving field controls");
    spec.iter()
        .map(|(key, field)| -> FormResult<(FieldKey, FieldControl)> {
            let state = snapshot
                .get(key.as_str())
                .ok_or_else(|| FormError::MissingFieldState(key.clone()))?;
            let report = collect_errors_with(
                &state.value,
                Some(field.validators.as_slice()),
                snapshot,
                options.validate_first_error_only,
            );
            let control = FieldControl {
                value: state.value.clone(),
                valid: !report.has_errors,
                invalid: report.has_errors,
                dirty: state.dirty,
                touched: state.touched,
                touched_or_dirty: state.dirty || state.touched,
                error: report.errors.first().cloned(),
                errors: report.has_errors.then_some(report.errors_map),
                handle: FieldHandle::new(key.clone(), dispatch.clone())
                    .with_dirty_check(options.dirty_check),
            };
            Ok((key.clone(), control))
        })
        .collect()
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormStatus {
    pub valid: bool,
    pub invalid: bool,
    pub dirty: bool,
    pub touched: bool,
}

/// Valid when every field is valid; dirty or touched when any field is.
pub fn aggregate(controls: &Controls) -> FormStatus {
    let valid = controls.values().all(|control| control.valid);
    FormStatus {
        valid,
        invalid: !valid,
        dirty: controls.values().any(|control| control.dirty),
        touched: controls.values().any(|control| control.touched),
    }
}

/// Whole-form mutators.
#[derive(Clone)]
pub struct FormActions {
    initial: Snapshot,
    fields: Arc<[FieldKey]>,
    dispatch: Dispatch,
}

impl FormActions {
    /// `fields` are the declared field names every assignment must cover.
    pub fn new(
        initial: Snapshot,
        fields: impl IntoIterator<Item = FieldKey>,
        dispatch: Dispatch,
    ) -> Self {
        Self {
            initial,
            fields: fields.into_iter().collect(),
            dispatch,
        }
    }

    /// Replaces the whole snapshot. A map that leaves out a declared field is
    /// rejected and nothing is dispatched.
    pub fn set_value(&self, values: ValueMap) -> FormResult<()> {
        require_fields(self.fields.iter(), &values)?;
        tracing::debug!(fields = values.len(), "assigning whole form value");
        (self.dispatch)(Box::new(move |_previous: &Snapshot| {
            snapshot_from_values(&values)
        }));
        Ok(())
    }

    /// Restores the snapshot the form was created with, as is.
    pub fn reset(&self) {
        tracing::debug!("resetting form to its initial snapshot");
        let initial = self.initial.clone();
        (self.dispatch)(Box::new(move |_previous: &Snapshot| initial));
    }
}

impl Debug for FormActions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormActions")
            .field("initial", &self.initial)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Debug)]
pub struct FormOutput {
    pub controls: Controls,
    pub value: ValueMap,
    pub status: FormStatus,
    pub actions: FormActions,
}

impl FormOutput {
    pub fn valid(&self) -> bool {
        self.status.valid
    }

    pub fn invalid(&self) -> bool {
        self.status.invalid
    }

    pub fn dirty(&self) -> bool {
        self.status.dirty
    }

    pub fn touched(&self) -> bool {
        self.status.touched
    }

    pub fn set_value(&self, values: ValueMap) -> FormResult<()> {
        self.actions.set_value(values)
    }

    pub fn reset(&self) {
        self.actions.reset();
    }
}

pub fn derive_form(
    spec: &FormSpec,
    initial: &Snapshot,
    snapshot: &Snapshot,
    dispatch: &Dispatch,
    options: &FormOptions,
) -> FormResult<FormOutput> {
    let controls = derive_controls_with(spec, snapshot, dispatch, options)?;
    let status = aggregate(&controls);
    Ok(FormOutput {
        controls,
        value: values_from_snapshot(snapshot),
        status,
        actions: FormActions::new(initial.clone(), spec.keys().cloned(), dispatch.clone()),
    })
}

/// A dispatch target that records updates instead of applying them, for hosts
/// that batch several mutations before re-deriving.
#[derive(Clone, Default)]
pub struct UpdateQueue {
    pending: Arc<Mutex<Vec<SnapshotUpdate>>>,
}

impl UpdateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dispatch(&self) -> Dispatch {
        let pending = self.pending.clone();
        Arc::new(move |update: SnapshotUpdate| {
            let mut queue = match pending.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            queue.push(update);
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drains the queue, feeding each update the result of the previous one.
    pub fn apply(&self, snapshot: &Snapshot) -> Snapshot {
        let updates = std::mem::take(&mut *self.lock());
        updates
            .into_iter()
            .fold(snapshot.clone(), |current, update| update(&current))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SnapshotUpdate>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Debug for UpdateQueue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateQueue")
            .field("pending", &self.len())
            .finish()
    }
}
