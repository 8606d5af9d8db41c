//! Entity Merger — ingests detail-load payloads into the normalized tables.
//!
//! A payload carries one primary entity (or, for the bulk plate update, a
//! list of primaries) plus zero or more related collections. Each collection
//! is upserted into its own table: already-present ids are overwritten in
//! place, genuinely new ids are appended to the ordered list. The whole
//! ingest is one transition.
//!
//! Re-ingesting an identical payload is idempotent: every upsert lands on the
//! same id, and no id is ever appended twice.

use std::collections::HashMap;

use crate::model::{EntityId, PlateEntry, Study, StudyEntry, StudySubject};
use crate::store::{CacheState, Table};

/// Merge a study detail load: the canonical study plus its subjects, their
/// specimens, and those specimens' tubes.
pub(crate) fn merge_study_entry(state: &CacheState, entry: StudyEntry) -> CacheState {
    let StudyEntry {
        study,
        study_subjects,
        specimens,
        matrix_tubes,
    } = entry;

    let mut next = state.clone();
    next.studies.table = next.studies.table.upsert_one(study);
    next.subjects = next.subjects.upsert_many(study_subjects);
    next.specimens = next.specimens.upsert_many(specimens);
    next.tubes = next.tubes.upsert_many(matrix_tubes);
    next
}

/// Merge a plate detail load (or bulk-update echo).
///
/// The primary has already been coerced to a list at the transport boundary.
/// A plate's subgraph can reveal subjects the cache knows nothing about, from
/// studies loaded only in list form — those subject ids are back-patched into
/// the owning studies' `subjects` lists so the study detail view stays
/// complete.
pub(crate) fn merge_plate_entry(state: &CacheState, entry: PlateEntry) -> CacheState {
    let PlateEntry {
        plates,
        study_subjects,
        specimens,
        matrix_tubes,
    } = entry;

    let mut next = state.clone();
    next.plates.table = next.plates.table.upsert_many(plates.into_vec());
    next.studies.table = attach_subjects_to_studies(&next.studies.table, &study_subjects);
    next.subjects = next.subjects.upsert_many(study_subjects);
    next.specimens = next.specimens.upsert_many(specimens);
    next.tubes = next.tubes.upsert_many(matrix_tubes);
    next
}

/// Append newly revealed subject ids to their owning studies.
///
/// Studies with nothing new to attach keep their record reference; if no
/// study gains a subject the table is returned unchanged.
fn attach_subjects_to_studies(
    studies: &Table<Study>,
    subjects: &[StudySubject],
) -> Table<Study> {
    if subjects.is_empty() {
        return studies.clone();
    }

    let mut by_study: HashMap<&str, Vec<&EntityId>> = HashMap::new();
    for subject in subjects {
        by_study.entry(subject.study.as_str()).or_default().push(&subject.id);
    }

    studies.patch(|study| {
        let revealed = by_study.get(study.id.as_str())?;
        let missing: Vec<EntityId> = revealed
            .iter()
            .filter(|id| !study.subjects.contains(**id))
            .map(|id| (*id).clone())
            .collect();
        if missing.is_empty() {
            return None;
        }
        let mut patched = (**study).clone();
        patched.subjects.extend(missing);
        Some(patched)
    })
}
