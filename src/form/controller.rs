use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use super::controls::{
    Controls, Dispatch, FieldControl, FormOutput, FormStatus, SnapshotUpdate, derive_form,
};
use super::error::{FormError, FormResult};
use super::model::FormModel;
use super::snapshot::{FormSpec, Snapshot, initial_snapshot};
use super::value::{FieldValue, ValueMap};

/// How `set_value` decides whether a field became dirty.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DirtyCheck {
    /// Primitives by value, lists and maps by reference.
    #[default]
    Identity,
    /// Deep comparison of the old and new value.
    Structural,
}

impl DirtyCheck {
    pub fn differs(self, old: &FieldValue, new: &FieldValue) -> bool {
        match self {
            DirtyCheck::Identity => !old.is_identical(new),
            DirtyCheck::Structural => old != new,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_first_error_only: bool,
    pub dirty_check: DirtyCheck,
}

struct CachedOutput {
    snapshot: Snapshot,
    revision: u64,
    output: Arc<FormOutput>,
}

pub(super) struct FormState {
    snapshot: Snapshot,
    dependencies: Vec<FieldValue>,
    revision: u64,
    cached: Option<CachedOutput>,
}

/// Owns the snapshot of one form instance and derives its output on demand.
///
/// Clones share the same state. Mutators handed out through controls hold
/// only a weak reference, so dropping every controller ends the form.
#[derive(Clone)]
pub struct FormController {
    options: FormOptions,
    spec: Arc<FormSpec>,
    initial: Snapshot,
    state: Arc<RwLock<FormState>>,
}

impl FormController {
    pub fn new(spec: FormSpec) -> Self {
        Self::with_options(spec, FormOptions::default())
    }

    pub fn with_options(spec: FormSpec, options: FormOptions) -> Self {
        let initial = initial_snapshot(&spec);
        Self::from_snapshot(spec, initial, options)
    }

    /// Starts from a caller-built snapshot; `reset` returns to exactly this
    /// snapshot.
    pub fn from_snapshot(spec: FormSpec, initial: Snapshot, options: FormOptions) -> Self {
        Self {
            options,
            spec: Arc::new(spec),
            initial: initial.clone(),
            state: Arc::new(RwLock::new(FormState {
                snapshot: initial,
                dependencies: Vec::new(),
                revision: 0,
                cached: None,
            })),
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn initial_snapshot(&self) -> Snapshot {
        self.initial.clone()
    }

    pub fn snapshot(&self) -> FormResult<Snapshot> {
        Ok(read_lock(&self.state, "reading snapshot")?.snapshot.clone())
    }

    pub fn value(&self) -> FormResult<ValueMap> {
        Ok(self.snapshot()?.values())
    }

    /// Applies every update to the snapshot current at the time it runs.
    pub fn dispatch(&self) -> Dispatch {
        let state: Weak<RwLock<FormState>> = Arc::downgrade(&self.state);
        Arc::new(move |update: SnapshotUpdate| {
            let Some(state) = state.upgrade() else {
                tracing::warn!("dropping form update: controller no longer exists");
                return;
            };
            let mut state = match state.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let next = update(&state.snapshot);
            state.snapshot = next;
        })
    }

    pub fn apply(&self, update: SnapshotUpdate) {
        (self.dispatch())(update);
    }

    /// Derived output for the current snapshot. Returns the same `Arc` as the
    /// previous call while neither the snapshot nor the dependencies changed.
    pub fn output(&self) -> FormResult<Arc<FormOutput>> {
        let (snapshot, revision) = {
            let state = read_lock(&self.state, "reading state for derivation")?;
            if let Some(cached) = &state.cached {
                if cached.snapshot.ptr_eq(&state.snapshot) && cached.revision == state.revision {
                    return Ok(cached.output.clone());
                }
            }
            (state.snapshot.clone(), state.revision)
        };

        tracing::trace!(revision, "recomputing form output");
        let output = Arc::new(derive_form(
            &self.spec,
            &self.initial,
            &snapshot,
            &self.dispatch(),
            &self.options,
        )?);

        let mut state = write_lock(&self.state, "caching derived output")?;
        if state.snapshot.ptr_eq(&snapshot) && state.revision == revision {
            state.cached = Some(CachedOutput {
                snapshot,
                revision,
                output: output.clone(),
            });
        }
        Ok(output)
    }

    pub fn controls(&self) -> FormResult<Controls> {
        Ok(self.output()?.controls.clone())
    }

    pub fn control(&self, key: &str) -> FormResult<Option<FieldControl>> {
        Ok(self.output()?.controls.get(key).cloned())
    }

    pub fn status(&self) -> FormResult<FormStatus> {
        Ok(self.output()?.status)
    }

    /// Marks every supplied field dirty and touched, even if unchanged.
    pub fn set_value(&self, values: ValueMap) -> FormResult<()> {
        self.spec.require_values(&values)?;
        tracing::debug!(fields = values.len(), "assigning whole form value");
        let next = Snapshot::from_values(&values);
        let mut state = write_lock(&self.state, "assigning form value")?;
        state.snapshot = next;
        Ok(())
    }

    pub fn reset(&self) -> FormResult<()> {
        tracing::debug!("resetting form to its initial snapshot");
        let mut state = write_lock(&self.state, "resetting form")?;
        state.snapshot = self.initial.clone();
        Ok(())
    }

    /// Declares outside values that validators read. A changed list forces
    /// the next `output` to re-derive.
    pub fn set_dependencies(
        &self,
        dependencies: impl IntoIterator<Item = FieldValue>,
    ) -> FormResult<bool> {
        let dependencies = dependencies.into_iter().collect::<Vec<_>>();
        let mut state = write_lock(&self.state, "updating dependencies")?;
        let unchanged = state.dependencies.len() == dependencies.len()
            && state
                .dependencies
                .iter()
                .zip(&dependencies)
                .all(|(old, new)| old.is_identical(new));
        if unchanged {
            return Ok(false);
        }
        tracing::debug!(count = dependencies.len(), "validator dependencies changed");
        state.dependencies = dependencies;
        state.revision = state.revision.wrapping_add(1);
        Ok(true)
    }

    pub fn invalidate(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "invalidating derived output")?;
        tracing::debug!("invalidating derived output");
        state.revision = state.revision.wrapping_add(1);
        Ok(())
    }

    pub fn model<T: FormModel>(&self) -> FormResult<T> {
        T::from_values(&self.value()?)
    }

    pub fn set_model<T: FormModel>(&self, model: &T) -> FormResult<()> {
        self.set_value(model.to_values())
    }
}

impl std::fmt::Debug for FormController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormController")
            .field("options", &self.options)
            .field("spec", &self.spec)
            .field("initial", &self.initial)
            .finish_non_exhaustive()
    }
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
