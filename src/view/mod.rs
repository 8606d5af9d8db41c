//! Derived View Engine — pure, memoized read views over the cache.
//!
//! # Modules
//!
//! - [`memo`] — the single-slot memoization cell.
//! - [`sort`] — stable sort helpers with missing-keys-last semantics.
//!
//! Every view is a pure function of one or more tables (and, where relevant,
//! a selection pointer). Memoization is strictly by input identity: a view
//! recomputes only when a table's generation or the relevant selection
//! pointer changed since the last call — never by deep comparison.
//!
//! Joins must tolerate a referenced entity that has not been loaded yet: the
//! foreign key is real, the record just hasn't arrived. Such slots yield
//! [`Linked::Pending`] rather than an error; callers render them as loading
//! placeholders.

pub mod memo;
pub mod sort;

use std::collections::HashSet;
use std::sync::Arc;

use memo::Memo;
use sort::{sort_by_optional_key, SortDirection};

use crate::model::{
    Entity, EntityId, Location, MatrixPlate, MatrixTube, Specimen, SpecimenType, Study,
    StudySubject,
};
use crate::store::{CacheState, Table, TableKey};

// ============================================================================
// Linked<T>
// ============================================================================

/// A join slot: either the referenced record, or the bare id while the record
/// is still pending a load.
#[derive(Debug)]
pub enum Linked<T> {
    Loaded(Arc<T>),
    Pending(EntityId),
}

impl<T> Clone for Linked<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loaded(record) => Self::Loaded(Arc::clone(record)),
            Self::Pending(id) => Self::Pending(id.clone()),
        }
    }
}

impl<T: Entity> Linked<T> {
    /// The referenced id, loaded or not.
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Loaded(record) => record.id(),
            Self::Pending(id) => id,
        }
    }
}

impl<T> Linked<T> {
    /// The record, if it has arrived.
    pub fn loaded(&self) -> Option<&Arc<T>> {
        match self {
            Self::Loaded(record) => Some(record),
            Self::Pending(_) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }
}

/// Resolve a foreign key against its target table.
fn link<T: Entity>(table: &Table<T>, id: EntityId) -> Linked<T> {
    match table.get(&id) {
        Some(record) => Linked::Loaded(Arc::clone(record)),
        None => Linked::Pending(id),
    }
}

/// A plate joined with its storage location for the plate list page.
#[derive(Debug, Clone)]
pub struct PlateOverview {
    pub plate: Arc<MatrixPlate>,
    pub location: Linked<Location>,
}

// ============================================================================
// Views
// ============================================================================

/// The memoized derived-view engine.
///
/// One instance per [`crate::store::Store`]; each view owns a single memo
/// slot, so a view stays cached exactly as long as its input tables keep
/// their generation and its selection pointers their value.
pub struct Views {
    all_studies: Memo<TableKey, Arc<Vec<Arc<Study>>>>,
    all_locations: Memo<TableKey, Arc<Vec<Arc<Location>>>>,
    all_specimen_types: Memo<TableKey, Arc<Vec<Arc<SpecimenType>>>>,
    all_plates: Memo<TableKey, Arc<Vec<Arc<MatrixPlate>>>>,
    all_tubes: Memo<TableKey, Arc<Vec<Arc<MatrixTube>>>>,
    visible_plates: Memo<(TableKey, bool), Arc<Vec<Arc<MatrixPlate>>>>,
    hidden_plates: Memo<TableKey, Arc<Vec<Arc<MatrixPlate>>>>,
    plate_overviews: Memo<(TableKey, bool, TableKey), Arc<Vec<PlateOverview>>>,
    selected_study_subjects:
        Memo<(TableKey, Option<EntityId>, TableKey), Arc<Vec<Linked<StudySubject>>>>,
    selected_study_specimens:
        Memo<(TableKey, Option<EntityId>, TableKey, TableKey), Arc<Vec<Linked<Specimen>>>>,
    activated_subject_specimens:
        Memo<(TableKey, Option<EntityId>, TableKey), Arc<Vec<Linked<Specimen>>>>,
    activated_subject_tubes:
        Memo<(TableKey, Option<EntityId>, TableKey), Arc<Vec<Arc<MatrixTube>>>>,
    selected_plate_tubes:
        Memo<(TableKey, Option<EntityId>, TableKey), Arc<Vec<Linked<MatrixTube>>>>,
    selected_plate_specimens:
        Memo<(TableKey, Option<EntityId>, TableKey, TableKey), Arc<Vec<Linked<Specimen>>>>,
    selected_plate_subjects: Memo<
        (TableKey, Option<EntityId>, TableKey, TableKey, TableKey),
        Arc<Vec<Linked<StudySubject>>>,
    >,
    selected_plate_location:
        Memo<(TableKey, Option<EntityId>, TableKey), Option<Linked<Location>>>,
}

impl Views {
    pub fn new() -> Self {
        Self {
            all_studies: Memo::new(),
            all_locations: Memo::new(),
            all_specimen_types: Memo::new(),
            all_plates: Memo::new(),
            all_tubes: Memo::new(),
            visible_plates: Memo::new(),
            hidden_plates: Memo::new(),
            plate_overviews: Memo::new(),
            selected_study_subjects: Memo::new(),
            selected_study_specimens: Memo::new(),
            activated_subject_specimens: Memo::new(),
            activated_subject_tubes: Memo::new(),
            selected_plate_tubes: Memo::new(),
            selected_plate_specimens: Memo::new(),
            selected_plate_subjects: Memo::new(),
            selected_plate_location: Memo::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Per-table lists
    // -----------------------------------------------------------------------

    pub fn all_studies(&self, state: &CacheState) -> Arc<Vec<Arc<Study>>> {
        self.all_studies
            .get_or_compute(state.studies.table.key(), || {
                Arc::new(state.studies.table.all())
            })
    }

    pub fn all_locations(&self, state: &CacheState) -> Arc<Vec<Arc<Location>>> {
        self.all_locations
            .get_or_compute(state.locations.table.key(), || {
                Arc::new(state.locations.table.all())
            })
    }

    pub fn all_specimen_types(&self, state: &CacheState) -> Arc<Vec<Arc<SpecimenType>>> {
        self.all_specimen_types
            .get_or_compute(state.specimen_types.table.key(), || {
                Arc::new(state.specimen_types.table.all())
            })
    }

    pub fn all_plates(&self, state: &CacheState) -> Arc<Vec<Arc<MatrixPlate>>> {
        self.all_plates.get_or_compute(state.plates.table.key(), || {
            Arc::new(state.plates.table.all())
        })
    }

    pub fn all_tubes(&self, state: &CacheState) -> Arc<Vec<Arc<MatrixTube>>> {
        self.all_tubes
            .get_or_compute(state.tubes.key(), || Arc::new(state.tubes.all()))
    }

    // -----------------------------------------------------------------------
    // Plate list page
    // -----------------------------------------------------------------------

    /// Plates for the list page: hidden plates are filtered out unless the
    /// show-hidden toggle is on.
    pub fn visible_plates(&self, state: &CacheState) -> Arc<Vec<Arc<MatrixPlate>>> {
        let key = (state.plates.table.key(), state.plates.show_hidden);
        self.visible_plates.get_or_compute(key, || {
            let all = self.all_plates(state);
            if state.plates.show_hidden {
                return all;
            }
            Arc::new(all.iter().filter(|p| !p.hidden).cloned().collect())
        })
    }

    pub fn hidden_plates(&self, state: &CacheState) -> Arc<Vec<Arc<MatrixPlate>>> {
        self.hidden_plates.get_or_compute(state.plates.table.key(), || {
            let all = self.all_plates(state);
            Arc::new(all.iter().filter(|p| p.hidden).cloned().collect())
        })
    }

    /// Visible plates joined with their location, sorted by plate uid.
    pub fn plate_overviews(&self, state: &CacheState) -> Arc<Vec<PlateOverview>> {
        let key = (
            state.plates.table.key(),
            state.plates.show_hidden,
            state.locations.table.key(),
        );
        self.plate_overviews.get_or_compute(key, || {
            let mut plates: Vec<Arc<MatrixPlate>> = (*self.visible_plates(state)).clone();
            sort_by_optional_key(&mut plates, SortDirection::Asc, |p| Some(p.uid.clone()));
            Arc::new(
                plates
                    .into_iter()
                    .map(|plate| {
                        let location = link(&state.locations.table, plate.location.clone());
                        PlateOverview { plate, location }
                    })
                    .collect(),
            )
        })
    }

    // -----------------------------------------------------------------------
    // Selected study
    // -----------------------------------------------------------------------

    pub fn selected_study(&self, state: &CacheState) -> Option<Arc<Study>> {
        let id = state.studies.selected_id.as_deref()?;
        state.studies.table.get(id).cloned()
    }

    /// Subjects of the selected study, in the study's own order.
    pub fn selected_study_subjects(&self, state: &CacheState) -> Arc<Vec<Linked<StudySubject>>> {
        let key = (
            state.studies.table.key(),
            state.studies.selected_id.clone(),
            state.subjects.key(),
        );
        self.selected_study_subjects.get_or_compute(key, || {
            let ids = self
                .selected_study(state)
                .map(|study| study.subjects.clone())
                .unwrap_or_default();
            Arc::new(
                ids.into_iter()
                    .map(|id| link(&state.subjects, id))
                    .collect(),
            )
        })
    }

    /// All specimens under the selected study, grouped by subject order.
    pub fn selected_study_specimens(&self, state: &CacheState) -> Arc<Vec<Linked<Specimen>>> {
        let key = (
            state.studies.table.key(),
            state.studies.selected_id.clone(),
            state.subjects.key(),
            state.specimens.key(),
        );
        self.selected_study_specimens.get_or_compute(key, || {
            let subjects = self.selected_study_subjects(state);
            let mut out = Vec::new();
            for subject in subjects.iter().filter_map(Linked::loaded) {
                for id in &subject.specimens {
                    out.push(link(&state.specimens, id.clone()));
                }
            }
            Arc::new(out)
        })
    }

    // -----------------------------------------------------------------------
    // Activated subject
    // -----------------------------------------------------------------------

    pub fn activated_subject(&self, state: &CacheState) -> Option<Arc<StudySubject>> {
        let id = state.studies.activated_subject_id.as_deref()?;
        state.subjects.get(id).cloned()
    }

    /// Specimens of the activated subject, sorted by collection date (loaded
    /// records first, missing dates last, then still-pending slots).
    pub fn activated_subject_specimens(&self, state: &CacheState) -> Arc<Vec<Linked<Specimen>>> {
        let key = (
            state.subjects.key(),
            state.studies.activated_subject_id.clone(),
            state.specimens.key(),
        );
        self.activated_subject_specimens.get_or_compute(key, || {
            let ids = self
                .activated_subject(state)
                .map(|subject| subject.specimens.clone())
                .unwrap_or_default();
            let mut loaded = Vec::new();
            let mut pending = Vec::new();
            for id in ids {
                match link(&state.specimens, id) {
                    Linked::Loaded(specimen) => loaded.push(specimen),
                    slot => pending.push(slot),
                }
            }
            sort_by_optional_key(&mut loaded, SortDirection::Asc, |s| s.collection_date);
            let mut out: Vec<Linked<Specimen>> =
                loaded.into_iter().map(Linked::Loaded).collect();
            out.extend(pending);
            Arc::new(out)
        })
    }

    /// Tubes holding any specimen of the activated subject.
    pub fn activated_subject_tubes(&self, state: &CacheState) -> Arc<Vec<Arc<MatrixTube>>> {
        let key = (
            state.subjects.key(),
            state.studies.activated_subject_id.clone(),
            state.tubes.key(),
        );
        self.activated_subject_tubes.get_or_compute(key, || {
            let Some(subject) = self.activated_subject(state) else {
                return Arc::new(Vec::new());
            };
            let specimen_ids: HashSet<&EntityId> = subject.specimens.iter().collect();
            Arc::new(
                state
                    .tubes
                    .all()
                    .into_iter()
                    .filter(|tube| specimen_ids.contains(&tube.specimen))
                    .collect(),
            )
        })
    }

    // -----------------------------------------------------------------------
    // Selected plate
    // -----------------------------------------------------------------------

    pub fn selected_plate(&self, state: &CacheState) -> Option<Arc<MatrixPlate>> {
        let id = state.plates.selected_id.as_deref()?;
        state.plates.table.get(id).cloned()
    }

    /// Tubes on the selected plate, in well order as the plate lists them.
    pub fn selected_plate_tubes(&self, state: &CacheState) -> Arc<Vec<Linked<MatrixTube>>> {
        let key = (
            state.plates.table.key(),
            state.plates.selected_id.clone(),
            state.tubes.key(),
        );
        self.selected_plate_tubes.get_or_compute(key, || {
            let ids = self
                .selected_plate(state)
                .map(|plate| plate.tubes.clone())
                .unwrap_or_default();
            Arc::new(ids.into_iter().map(|id| link(&state.tubes, id)).collect())
        })
    }

    /// Distinct specimens held by the selected plate's tubes, in first-tube
    /// order.
    pub fn selected_plate_specimens(&self, state: &CacheState) -> Arc<Vec<Linked<Specimen>>> {
        let key = (
            state.plates.table.key(),
            state.plates.selected_id.clone(),
            state.tubes.key(),
            state.specimens.key(),
        );
        self.selected_plate_specimens.get_or_compute(key, || {
            let tubes = self.selected_plate_tubes(state);
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for tube in tubes.iter().filter_map(Linked::loaded) {
                if seen.insert(tube.specimen.clone()) {
                    out.push(link(&state.specimens, tube.specimen.clone()));
                }
            }
            Arc::new(out)
        })
    }

    /// Distinct subjects owning the selected plate's specimens.
    pub fn selected_plate_subjects(&self, state: &CacheState) -> Arc<Vec<Linked<StudySubject>>> {
        let key = (
            state.plates.table.key(),
            state.plates.selected_id.clone(),
            state.tubes.key(),
            state.specimens.key(),
            state.subjects.key(),
        );
        self.selected_plate_subjects.get_or_compute(key, || {
            let specimens = self.selected_plate_specimens(state);
            let mut seen = HashSet::new();
            let mut out = Vec::new();
            for specimen in specimens.iter().filter_map(Linked::loaded) {
                if seen.insert(specimen.study_subject.clone()) {
                    out.push(link(&state.subjects, specimen.study_subject.clone()));
                }
            }
            Arc::new(out)
        })
    }

    /// The selected plate's storage location.
    pub fn selected_plate_location(&self, state: &CacheState) -> Option<Linked<Location>> {
        let key = (
            state.plates.table.key(),
            state.plates.selected_id.clone(),
            state.locations.table.key(),
        );
        self.selected_plate_location.get_or_compute(key, || {
            let plate = self.selected_plate(state)?;
            Some(link(&state.locations.table, plate.location.clone()))
        })
    }
}

impl Default for Views {
    fn default() -> Self {
        Self::new()
    }
}
