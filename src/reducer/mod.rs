//! Command Reducer Engine — one command in, one whole-cache transition out.
//!
//! # Modules
//!
//! - [`merge`] — the entity merger (detail-load ingestion).
//! - [`cascade`] — the cascade resolver (deletes and bulk deletes).
//!
//! [`reduce`] is pure and deterministic: it never performs I/O, never blocks,
//! and builds the next snapshot without touching the prior one. A command
//! with no effective change — re-selecting the selected id, deleting an
//! absent id, re-attaching an identical error message — returns the identical
//! prior `Arc`, and every transition leaves unrelated slices sharing their
//! table references.

mod cascade;
mod merge;

use std::sync::Arc;

use crate::command::Command;
use crate::model::EntityId;
use crate::store::{CacheState, MutationErrors};

/// Apply `command` to `state`, returning the next snapshot.
pub fn reduce(state: &Arc<CacheState>, command: Command) -> Arc<CacheState> {
    match command {
        // -- studies ------------------------------------------------------
        Command::StudiesLoaded(studies) => {
            if studies.is_empty() && state.studies.errors.is_clear() {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.studies.table = next.studies.table.upsert_many(studies);
            next.studies.errors = MutationErrors::default();
            Arc::new(next)
        }
        Command::StudyLoaded(entry) => Arc::new(merge::merge_study_entry(state, entry)),
        Command::StudyCreateFailed(message) => {
            with_error(state, message, |s| &mut s.studies.errors.create)
        }
        Command::StudyUpdateFailed(message) => {
            with_error(state, message, |s| &mut s.studies.errors.update)
        }
        Command::StudyDeleted(id) => apply(state, cascade::delete_study(state, &id)),
        Command::StudyDeleteFailed(message) => {
            with_error(state, message, |s| &mut s.studies.errors.delete)
        }
        Command::SelectStudy(id) => with_selection(state, id, |s| &mut s.studies.selected_id),
        Command::ActivateSubject(id) => {
            if state.studies.activated_subject_id.as_deref() == Some(id.as_str())
                && state.studies.delete_subject_error.is_none()
            {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.studies.activated_subject_id = Some(id);
            next.studies.delete_subject_error = None;
            Arc::new(next)
        }
        Command::DeactivateSubject => {
            if state.studies.activated_subject_id.is_none() {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.studies.activated_subject_id = None;
            Arc::new(next)
        }
        Command::SubjectDeleted(id) => apply(state, cascade::delete_subject(state, &id)),
        Command::SubjectDeleteFailed(message) => {
            with_error(state, message, |s| &mut s.studies.delete_subject_error)
        }

        // -- locations ----------------------------------------------------
        Command::LocationsLoaded(locations) => {
            if locations.is_empty() && state.locations.errors.is_clear() {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.locations.table = next.locations.table.upsert_many(locations);
            next.locations.errors = MutationErrors::default();
            Arc::new(next)
        }
        Command::LocationLoaded(location) => {
            let mut next = (**state).clone();
            next.locations.table = next.locations.table.upsert_one(location);
            Arc::new(next)
        }
        Command::LocationCreateFailed(message) => {
            with_error(state, message, |s| &mut s.locations.errors.create)
        }
        Command::LocationUpdateFailed(message) => {
            with_error(state, message, |s| &mut s.locations.errors.update)
        }
        Command::LocationDeleted(id) => apply(state, cascade::delete_location(state, &id)),
        Command::LocationDeleteFailed(message) => {
            with_error(state, message, |s| &mut s.locations.errors.delete)
        }
        Command::SelectLocation(id) => {
            with_selection(state, id, |s| &mut s.locations.selected_id)
        }

        // -- specimen types -----------------------------------------------
        Command::SpecimenTypesLoaded(types) => {
            if types.is_empty() && state.specimen_types.errors.is_clear() {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.specimen_types.table = next.specimen_types.table.upsert_many(types);
            next.specimen_types.errors = MutationErrors::default();
            Arc::new(next)
        }
        Command::SpecimenTypeLoaded(specimen_type) => {
            let mut next = (**state).clone();
            next.specimen_types.table = next.specimen_types.table.upsert_one(specimen_type);
            Arc::new(next)
        }
        Command::SpecimenTypeCreateFailed(message) => {
            with_error(state, message, |s| &mut s.specimen_types.errors.create)
        }
        Command::SpecimenTypeUpdateFailed(message) => {
            with_error(state, message, |s| &mut s.specimen_types.errors.update)
        }
        Command::SpecimenTypeDeleted(id) => {
            apply(state, cascade::delete_specimen_type(state, &id))
        }
        Command::SpecimenTypeDeleteFailed(message) => {
            with_error(state, message, |s| &mut s.specimen_types.errors.delete)
        }
        Command::SelectSpecimenType(id) => {
            with_selection(state, id, |s| &mut s.specimen_types.selected_id)
        }

        // -- plates -------------------------------------------------------
        Command::PlatesLoaded(plates) => {
            if plates.is_empty() && state.plates.errors_clear() {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.plates.table = next.plates.table.upsert_many(plates);
            next.plates.errors = MutationErrors::default();
            next.plates.upload_error = None;
            next.plates.hide_error = None;
            next.plates.unhide_error = None;
            Arc::new(next)
        }
        Command::PlateLoaded(entry) => Arc::new(merge::merge_plate_entry(state, entry)),
        Command::PlateUpdateFailed(message) => {
            with_error(state, message, |s| &mut s.plates.errors.update)
        }
        Command::PlateUploadFailed(message) => {
            with_error(state, message, |s| &mut s.plates.upload_error)
        }
        Command::PlateHideFailed(message) => {
            with_error(state, message, |s| &mut s.plates.hide_error)
        }
        Command::PlateUnhideFailed(message) => {
            with_error(state, message, |s| &mut s.plates.unhide_error)
        }
        Command::PlateDeleted(id) => apply(state, cascade::delete_plate(state, &id)),
        Command::PlateDeleteFailed(message) => {
            with_error(state, message, |s| &mut s.plates.errors.delete)
        }
        Command::SelectPlate(id) => with_selection(state, id, |s| &mut s.plates.selected_id),
        Command::ToggleShowHidden => {
            let mut next = (**state).clone();
            next.plates.show_hidden = !next.plates.show_hidden;
            Arc::new(next)
        }

        // -- bulk delete --------------------------------------------------
        Command::BulkDeleteSucceeded(outcome) => {
            apply(state, cascade::bulk_delete(state, &outcome))
        }
        Command::BulkDeleteFailed(message) => {
            if state.bulk.delete_error.as_deref() == Some(message.as_str())
                && state.bulk.last_delete.is_none()
            {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.bulk.delete_error = Some(message);
            next.bulk.last_delete = None;
            Arc::new(next)
        }
        // -- search -------------------------------------------------------
        Command::SearchSpecimensSucceeded => {
            clear_slot(state, |s| &mut s.search.specimens_error)
        }
        Command::SearchSpecimensFailed(message) => {
            with_error(state, message, |s| &mut s.search.specimens_error)
        }
        Command::SearchBarcodesSucceeded => {
            clear_slot(state, |s| &mut s.search.barcodes_error)
        }
        Command::SearchBarcodesFailed(message) => {
            with_error(state, message, |s| &mut s.search.barcodes_error)
        }

        Command::ClearErrors => {
            let clear = state.studies.errors.is_clear()
                && state.studies.delete_subject_error.is_none()
                && state.locations.errors.is_clear()
                && state.specimen_types.errors.is_clear()
                && state.plates.errors_clear()
                && state.bulk.is_clear()
                && state.search.is_clear();
            if clear {
                return Arc::clone(state);
            }
            let mut next = (**state).clone();
            next.studies.errors = MutationErrors::default();
            next.studies.delete_subject_error = None;
            next.locations.errors = MutationErrors::default();
            next.specimen_types.errors = MutationErrors::default();
            next.plates.errors = MutationErrors::default();
            next.plates.upload_error = None;
            next.plates.hide_error = None;
            next.plates.unhide_error = None;
            next.bulk = Default::default();
            next.search = Default::default();
            Arc::new(next)
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Wrap a cascade result, falling back to the prior snapshot on no-ops.
fn apply(state: &Arc<CacheState>, next: Option<CacheState>) -> Arc<CacheState> {
    match next {
        Some(next) => Arc::new(next),
        None => Arc::clone(state),
    }
}

/// Attach `message` to the error slot picked by `slot`, unless it already
/// carries that exact message.
fn with_error(
    state: &Arc<CacheState>,
    message: String,
    slot: impl Fn(&mut CacheState) -> &mut Option<String>,
) -> Arc<CacheState> {
    let mut next = (**state).clone();
    let cell = slot(&mut next);
    if cell.as_deref() == Some(message.as_str()) {
        return Arc::clone(state);
    }
    *cell = Some(message);
    Arc::new(next)
}

/// Empty the error slot picked by `slot`, unless it already is.
fn clear_slot(
    state: &Arc<CacheState>,
    slot: impl Fn(&mut CacheState) -> &mut Option<String>,
) -> Arc<CacheState> {
    let mut next = (**state).clone();
    let cell = slot(&mut next);
    if cell.is_none() {
        return Arc::clone(state);
    }
    *cell = None;
    Arc::new(next)
}

/// Point the selection slot picked by `slot` at `id`, unless it already does.
fn with_selection(
    state: &Arc<CacheState>,
    id: EntityId,
    slot: impl Fn(&mut CacheState) -> &mut Option<EntityId>,
) -> Arc<CacheState> {
    let mut next = (**state).clone();
    let cell = slot(&mut next);
    if cell.as_deref() == Some(id.as_str()) {
        return Arc::clone(state);
    }
    *cell = Some(id);
    Arc::new(next)
}
