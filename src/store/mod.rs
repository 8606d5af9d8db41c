//! The normalized store: per-entity tables, slice state, and the `Store`
//! handle that linearizes commands through the reducer.
//!
//! # Modules
//!
//! - [`table`] — [`Table<T>`], the copy-on-write entity table.
//!
//! [`CacheState`] is one immutable whole-cache snapshot. [`Store`] holds the
//! current snapshot behind a mutex and swaps it atomically per command, so
//! there is exactly one logical writer and every reader observes a complete,
//! consistent state.

pub mod table;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::command::Command;
use crate::model::{
    EntityId, Location, MatrixPlate, MatrixTube, Specimen, SpecimenType, Study, StudySubject,
};
use crate::reducer::reduce;
use crate::view::Views;

pub use table::{Table, TableKey};

// ============================================================================
// Error slots
// ============================================================================

/// Per-slice error slots for the three standard mutations.
///
/// A failed mutation attaches its backend message here and leaves entity data
/// untouched; the form layer renders the string next to the relevant field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationErrors {
    pub create: Option<String>,
    pub update: Option<String>,
    pub delete: Option<String>,
}

impl MutationErrors {
    pub fn is_clear(&self) -> bool {
        self.create.is_none() && self.update.is_none() && self.delete.is_none()
    }
}

// ============================================================================
// Slices
// ============================================================================

/// Study table plus study-scoped transient state.
#[derive(Debug, Clone, Default)]
pub struct StudySlice {
    pub table: Table<Study>,
    /// Study currently focused for detail display.
    pub selected_id: Option<EntityId>,
    /// Subject currently expanded within the selected study.
    pub activated_subject_id: Option<EntityId>,
    pub errors: MutationErrors,
    /// Error slot for the subject-delete mutation (issued from the study page).
    pub delete_subject_error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LocationSlice {
    pub table: Table<Location>,
    pub selected_id: Option<EntityId>,
    pub errors: MutationErrors,
}

#[derive(Debug, Clone, Default)]
pub struct SpecimenTypeSlice {
    pub table: Table<SpecimenType>,
    pub selected_id: Option<EntityId>,
    pub errors: MutationErrors,
}

/// Plate table plus plate-scoped transient state.
#[derive(Debug, Clone, Default)]
pub struct PlateSlice {
    pub table: Table<MatrixPlate>,
    pub selected_id: Option<EntityId>,
    /// When false, hidden plates are filtered out of list views.
    pub show_hidden: bool,
    pub errors: MutationErrors,
    /// Error slot for the plate CSV upload.
    pub upload_error: Option<String>,
    /// Error slots for the hide/unhide mutations.
    pub hide_error: Option<String>,
    pub unhide_error: Option<String>,
}

impl PlateSlice {
    pub fn errors_clear(&self) -> bool {
        self.errors.is_clear()
            && self.upload_error.is_none()
            && self.hide_error.is_none()
            && self.unhide_error.is_none()
    }
}

/// Outcome slots for the bulk-delete operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkSlice {
    pub delete_error: Option<String>,
    /// Human-readable summary of the last successful bulk delete.
    pub last_delete: Option<String>,
}

impl BulkSlice {
    pub fn is_clear(&self) -> bool {
        self.delete_error.is_none() && self.last_delete.is_none()
    }
}

/// Error slots for the two CSV search exports.
///
/// A successful search streams a result file to the user and leaves no mark
/// on entity data; only failures are recorded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSlice {
    pub specimens_error: Option<String>,
    pub barcodes_error: Option<String>,
}

impl SearchSlice {
    pub fn is_clear(&self) -> bool {
        self.specimens_error.is_none() && self.barcodes_error.is_none()
    }
}

// ============================================================================
// CacheState
// ============================================================================

/// One immutable snapshot of the whole cache.
///
/// Cloning is cheap: tables share their `Arc`s. Transitions clone the prior
/// snapshot and swap only the slices a command touched, so unrelated tables
/// keep their references across transitions — the property the view engine's
/// memoization rests on.
#[derive(Debug, Clone, Default)]
pub struct CacheState {
    pub studies: StudySlice,
    pub locations: LocationSlice,
    pub specimen_types: SpecimenTypeSlice,
    pub subjects: Table<StudySubject>,
    pub specimens: Table<Specimen>,
    pub plates: PlateSlice,
    pub tubes: Table<MatrixTube>,
    pub bulk: BulkSlice,
    pub search: SearchSlice,
}

impl CacheState {
    /// An empty cache, as at session start.
    pub fn new() -> Self {
        Self::default()
    }
}

// ============================================================================
// Store
// ============================================================================

/// The session's cache instance.
///
/// Constructed at session start, passed by reference, and dropped at session
/// end — there is no global singleton, so independent sessions (and tests)
/// never share state. All mutation goes through [`Store::dispatch`], which
/// holds the write lock for the duration of one reduction: commands are
/// processed strictly in issue order and each transition is all-or-nothing.
/// Reads take an `Arc` snapshot and never block writers for longer than the
/// pointer copy.
pub struct Store {
    state: Mutex<Arc<CacheState>>,
    views: Views,
}

impl Store {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(Arc::new(CacheState::new())),
            views: Views::new(),
        }
    }

    /// The current whole-cache snapshot.
    pub fn snapshot(&self) -> Arc<CacheState> {
        Arc::clone(&self.state.lock())
    }

    /// Apply one command and return the resulting snapshot.
    ///
    /// A command with no effective change returns the identical prior
    /// snapshot reference.
    pub fn dispatch(&self, command: Command) -> Arc<CacheState> {
        let mut state = self.state.lock();
        let next = reduce(&state, command);
        *state = Arc::clone(&next);
        next
    }

    /// The memoized derived-view engine bound to this store.
    pub fn views(&self) -> &Views {
        &self.views
    }

    // -----------------------------------------------------------------------
    // Convenience reads (presentation surface)
    // -----------------------------------------------------------------------

    pub fn all_studies(&self) -> Arc<Vec<Arc<Study>>> {
        self.views.all_studies(&self.snapshot())
    }

    pub fn all_locations(&self) -> Arc<Vec<Arc<Location>>> {
        self.views.all_locations(&self.snapshot())
    }

    pub fn all_specimen_types(&self) -> Arc<Vec<Arc<SpecimenType>>> {
        self.views.all_specimen_types(&self.snapshot())
    }

    pub fn study(&self, id: &str) -> Option<Arc<Study>> {
        self.snapshot().studies.table.get(id).cloned()
    }

    pub fn selected_study(&self) -> Option<Arc<Study>> {
        let state = self.snapshot();
        let id = state.studies.selected_id.as_deref()?;
        state.studies.table.get(id).cloned()
    }

    pub fn activated_subject(&self) -> Option<Arc<StudySubject>> {
        let state = self.snapshot();
        let id = state.studies.activated_subject_id.as_deref()?;
        state.subjects.get(id).cloned()
    }

    pub fn selected_location(&self) -> Option<Arc<Location>> {
        let state = self.snapshot();
        let id = state.locations.selected_id.as_deref()?;
        state.locations.table.get(id).cloned()
    }

    pub fn selected_specimen_type(&self) -> Option<Arc<SpecimenType>> {
        let state = self.snapshot();
        let id = state.specimen_types.selected_id.as_deref()?;
        state.specimen_types.table.get(id).cloned()
    }

    pub fn selected_plate(&self) -> Option<Arc<MatrixPlate>> {
        let state = self.snapshot();
        let id = state.plates.selected_id.as_deref()?;
        state.plates.table.get(id).cloned()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
