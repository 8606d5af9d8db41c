//! The command set dispatched into the reducer engine.
//!
//! Commands describe *outcomes*, not requests: the gateway performs the fetch
//! and issues a command only once the result (or failure) is known. The
//! reducer therefore never waits on anything — each command maps to exactly
//! one synchronous whole-cache transition.

use crate::model::{
    BulkDeleteOutcome, EntityId, Location, MatrixPlate, PlateEntry, SpecimenType, Study,
    StudyEntry,
};

/// One cache transition request.
#[derive(Debug, Clone)]
pub enum Command {
    // -- studies ----------------------------------------------------------
    /// Load-all response for studies.
    StudiesLoaded(Vec<Study>),
    /// Detail load (or create/update echo) for one study and its subgraph.
    StudyLoaded(StudyEntry),
    StudyCreateFailed(String),
    StudyUpdateFailed(String),
    StudyDeleted(EntityId),
    StudyDeleteFailed(String),
    SelectStudy(EntityId),
    /// Expand one subject of the selected study.
    ActivateSubject(EntityId),
    DeactivateSubject,
    SubjectDeleted(EntityId),
    SubjectDeleteFailed(String),

    // -- locations --------------------------------------------------------
    LocationsLoaded(Vec<Location>),
    LocationLoaded(Location),
    LocationCreateFailed(String),
    LocationUpdateFailed(String),
    LocationDeleted(EntityId),
    LocationDeleteFailed(String),
    SelectLocation(EntityId),

    // -- specimen types ---------------------------------------------------
    SpecimenTypesLoaded(Vec<SpecimenType>),
    SpecimenTypeLoaded(SpecimenType),
    SpecimenTypeCreateFailed(String),
    SpecimenTypeUpdateFailed(String),
    SpecimenTypeDeleted(EntityId),
    SpecimenTypeDeleteFailed(String),
    SelectSpecimenType(EntityId),

    // -- plates -----------------------------------------------------------
    PlatesLoaded(Vec<MatrixPlate>),
    /// Detail load, upload echo, or bulk-update echo (one or many plates)
    /// plus the related subgraph.
    PlateLoaded(PlateEntry),
    PlateUpdateFailed(String),
    /// Plate CSV upload was rejected.
    PlateUploadFailed(String),
    PlateHideFailed(String),
    PlateUnhideFailed(String),
    PlateDeleted(EntityId),
    PlateDeleteFailed(String),
    SelectPlate(EntityId),
    /// Toggle whether hidden plates appear in list views.
    ToggleShowHidden,

    // -- bulk delete ------------------------------------------------------
    BulkDeleteSucceeded(BulkDeleteOutcome),
    BulkDeleteFailed(String),

    // -- search -----------------------------------------------------------
    /// The search result file was produced; results download out of band.
    SearchSpecimensSucceeded,
    SearchSpecimensFailed(String),
    SearchBarcodesSucceeded,
    SearchBarcodesFailed(String),

    /// Reset every slice's error and outcome slots.
    ClearErrors,
}
