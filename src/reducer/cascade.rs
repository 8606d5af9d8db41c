//! Cascade Resolver — delete and bulk-delete transitions.
//!
//! Deleting a record is never just a table removal: foreign-key id lists in
//! parent records must be stripped of the dead ids, and any selection or
//! activation pointer targeting the record must be cleared — all within the
//! same transition, so no observer ever sees a dangling reference that a
//! completed transition left behind.
//!
//! Every function here returns `None` when the command has no effect, letting
//! the engine hand back the identical prior snapshot.

use std::collections::HashSet;

use crate::model::BulkDeleteOutcome;
use crate::store::CacheState;

/// Remove the named tubes and specimens and patch every parent id list that
/// referenced them.
///
/// Plates whose `tubes` list does not intersect the deleted tube ids keep
/// their record reference untouched, and likewise for subjects and specimen
/// ids — only genuinely affected parents are rewritten.
pub(crate) fn bulk_delete(state: &CacheState, outcome: &BulkDeleteOutcome) -> Option<CacheState> {
    let tube_ids: HashSet<&str> = outcome.tube_ids.iter().map(String::as_str).collect();
    let specimen_ids: HashSet<&str> = outcome.specimen_ids.iter().map(String::as_str).collect();

    let mut next = state.clone();
    next.tubes = next.tubes.remove_many(&outcome.tube_ids);
    next.specimens = next.specimens.remove_many(&outcome.specimen_ids);

    next.plates.table = next.plates.table.patch(|plate| {
        if !plate.tubes.iter().any(|id| tube_ids.contains(id.as_str())) {
            return None;
        }
        let mut patched = (**plate).clone();
        patched.tubes.retain(|id| !tube_ids.contains(id.as_str()));
        Some(patched)
    });

    next.subjects = next.subjects.patch(|subject| {
        if !subject.specimens.iter().any(|id| specimen_ids.contains(id.as_str())) {
            return None;
        }
        let mut patched = (**subject).clone();
        patched.specimens.retain(|id| !specimen_ids.contains(id.as_str()));
        Some(patched)
    });

    let summary = format!(
        "Deleted {} specimens and {} matrix tubes.",
        outcome.specimen_ids.len(),
        outcome.tube_ids.len()
    );
    let untouched = next.tubes.same_as(&state.tubes)
        && next.specimens.same_as(&state.specimens)
        && next.plates.table.same_as(&state.plates.table)
        && next.subjects.same_as(&state.subjects)
        && state.bulk.delete_error.is_none()
        && state.bulk.last_delete.as_deref() == Some(summary.as_str());
    if untouched {
        return None;
    }

    next.bulk.delete_error = None;
    next.bulk.last_delete = Some(summary);
    Some(next)
}

/// Delete one study. Clears the study selection if it pointed at the deleted
/// study, and the subject activation if the activated subject belonged to it
/// (or is not loaded, so ownership cannot be ruled out).
pub(crate) fn delete_study(state: &CacheState, id: &str) -> Option<CacheState> {
    if !state.studies.table.contains(id) {
        return None;
    }

    let mut next = state.clone();
    next.studies.table = next.studies.table.remove_one(id);
    if next.studies.selected_id.as_deref() == Some(id) {
        next.studies.selected_id = None;
    }
    if let Some(subject_id) = next.studies.activated_subject_id.as_deref() {
        let owned = next
            .subjects
            .get(subject_id)
            .map(|subject| subject.study == id);
        if owned.unwrap_or(true) {
            next.studies.activated_subject_id = None;
        }
    }
    next.studies.errors.delete = None;
    Some(next)
}

/// Delete one study subject: remove the record, strip its id from every
/// study's `subjects` list, and deactivate it if it was the activated one.
pub(crate) fn delete_subject(state: &CacheState, id: &str) -> Option<CacheState> {
    let mut next = state.clone();
    next.subjects = next.subjects.remove_one(id);

    next.studies.table = next.studies.table.patch(|study| {
        if !study.subjects.iter().any(|s| s == id) {
            return None;
        }
        let mut patched = (**study).clone();
        patched.subjects.retain(|s| s != id);
        Some(patched)
    });

    let deactivate = next.studies.activated_subject_id.as_deref() == Some(id);
    if deactivate {
        next.studies.activated_subject_id = None;
    }

    if next.subjects.same_as(&state.subjects)
        && next.studies.table.same_as(&state.studies.table)
        && !deactivate
        && state.studies.delete_subject_error.is_none()
    {
        return None;
    }
    next.studies.delete_subject_error = None;
    Some(next)
}

pub(crate) fn delete_location(state: &CacheState, id: &str) -> Option<CacheState> {
    if !state.locations.table.contains(id) {
        return None;
    }

    let mut next = state.clone();
    next.locations.table = next.locations.table.remove_one(id);
    if next.locations.selected_id.as_deref() == Some(id) {
        next.locations.selected_id = None;
    }
    next.locations.errors.delete = None;
    Some(next)
}

pub(crate) fn delete_specimen_type(state: &CacheState, id: &str) -> Option<CacheState> {
    if !state.specimen_types.table.contains(id) {
        return None;
    }

    let mut next = state.clone();
    next.specimen_types.table = next.specimen_types.table.remove_one(id);
    if next.specimen_types.selected_id.as_deref() == Some(id) {
        next.specimen_types.selected_id = None;
    }
    next.specimen_types.errors.delete = None;
    Some(next)
}

/// Delete one plate.
///
/// The plate-has-no-tubes precondition is enforced here, once, rather than
/// trusted to every caller: a delete naming a plate that still has tubes is
/// refused — entity data stays untouched and the refusal lands in the plate
/// slice's delete error slot.
pub(crate) fn delete_plate(state: &CacheState, id: &str) -> Option<CacheState> {
    let Some(plate) = state.plates.table.get(id) else {
        return None;
    };

    if !plate.tubes.is_empty() {
        let message = format!(
            "Plate {} still holds {} tubes and cannot be deleted.",
            plate.uid,
            plate.tubes.len()
        );
        if state.plates.errors.delete.as_deref() == Some(message.as_str()) {
            return None;
        }
        let mut next = state.clone();
        next.plates.errors.delete = Some(message);
        return Some(next);
    }

    let mut next = state.clone();
    next.plates.table = next.plates.table.remove_one(id);
    if next.plates.selected_id.as_deref() == Some(id) {
        next.plates.selected_id = None;
    }
    next.plates.errors.delete = None;
    Some(next)
}
