//! Sync Gateway — the seam between the backend API and the reducer.
//!
//! Network fetches run out here, never inside the reducer. Each gateway
//! method performs one backend call and communicates solely by dispatching a
//! command once the outcome is known:
//!
//! - success → the matching `*Loaded` / `*Deleted` / `BulkDeleteSucceeded`
//!   command;
//! - validation failure (4xx) → the matching `*Failed` command, recovered
//!   locally — the method still returns `Ok(())`;
//! - transport failure → logged and propagated; nothing reaches the cache;
//! - not-found → propagated so the router can show its not-found view.
//!
//! List loads are the exception: a failed list fetch is dispatched as an
//! empty result rather than surfaced, so list pages degrade to "no rows".
//!
//! The gateway never tracks in-flight request identity. Superseded detail
//! fetches resolve by last-command-wins at the selection pointer; a late
//! response for an id nobody is looking at is still merged, harmlessly.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::command::Command;
use crate::error::{ApiError, ApiResult};
use crate::model::{
    BulkDeleteOutcome, EntityId, Location, MatrixPlate, PlateEntry, SpecimenType, Study,
    StudyEntry,
};
use crate::store::Store;

// ============================================================================
// BackendApi
// ============================================================================

/// The backend HTTP API, as the cache consumes it.
///
/// Implemented over the real transport in the application shell; tests
/// substitute a mock. Create/update echo the server-canonical entity (plus
/// subgraph where the endpoint denormalizes one), so the cache can reuse the
/// load path for mutation results.
#[async_trait]
pub trait BackendApi: Send + Sync {
    // -- studies ----------------------------------------------------------
    async fn studies(&self) -> ApiResult<Vec<Study>>;
    async fn study(&self, id: &str) -> ApiResult<StudyEntry>;
    async fn create_study(&self, study: &Study) -> ApiResult<StudyEntry>;
    async fn update_study(&self, study: &Study) -> ApiResult<StudyEntry>;
    async fn delete_study(&self, id: &str) -> ApiResult<()>;
    async fn delete_subject(&self, id: &str) -> ApiResult<()>;

    // -- locations --------------------------------------------------------
    async fn locations(&self) -> ApiResult<Vec<Location>>;
    async fn location(&self, id: &str) -> ApiResult<Location>;
    async fn create_location(&self, location: &Location) -> ApiResult<Location>;
    async fn update_location(&self, location: &Location) -> ApiResult<Location>;
    async fn delete_location(&self, id: &str) -> ApiResult<()>;

    // -- specimen types ---------------------------------------------------
    async fn specimen_types(&self) -> ApiResult<Vec<SpecimenType>>;
    async fn specimen_type(&self, id: &str) -> ApiResult<SpecimenType>;
    async fn create_specimen_type(&self, specimen_type: &SpecimenType)
        -> ApiResult<SpecimenType>;
    async fn update_specimen_type(&self, specimen_type: &SpecimenType)
        -> ApiResult<SpecimenType>;
    async fn delete_specimen_type(&self, id: &str) -> ApiResult<()>;

    // -- plates -----------------------------------------------------------
    async fn plates(&self) -> ApiResult<Vec<MatrixPlate>>;
    async fn plate(&self, id: &str) -> ApiResult<PlateEntry>;
    /// Upload a scanner CSV creating one plate.
    async fn upload_plate(&self, csv: &[u8]) -> ApiResult<PlateEntry>;
    /// Upload scanner CSVs updating plates matched by filename; may return
    /// several plates.
    async fn update_plates(&self, csv: &[u8]) -> ApiResult<PlateEntry>;
    async fn delete_plate(&self, id: &str) -> ApiResult<()>;
    /// Mark plates hidden; echoes the updated plates.
    async fn hide_plates(&self, ids: &[EntityId]) -> ApiResult<Vec<MatrixPlate>>;
    /// Mark plates visible again; echoes the updated plates.
    async fn unhide_plates(&self, ids: &[EntityId]) -> ApiResult<Vec<MatrixPlate>>;

    // -- bulk delete ------------------------------------------------------
    async fn bulk_delete_specimens(&self, csv: &[u8]) -> ApiResult<BulkDeleteOutcome>;
    async fn bulk_delete_barcodes(&self, csv: &[u8]) -> ApiResult<BulkDeleteOutcome>;

    // -- search -----------------------------------------------------------
    /// Produce a specimen search result file from an uploaded CSV.
    async fn search_specimens(&self, csv: &[u8]) -> ApiResult<()>;
    /// Produce a barcode search result file from an uploaded CSV.
    async fn search_barcodes(&self, csv: &[u8]) -> ApiResult<()>;
}

// ============================================================================
// SyncGateway
// ============================================================================

/// Issues commands into a [`Store`] based on backend call outcomes.
pub struct SyncGateway {
    api: Arc<dyn BackendApi>,
    store: Arc<Store>,
}

impl SyncGateway {
    pub fn new(api: Arc<dyn BackendApi>, store: Arc<Store>) -> Self {
        Self { api, store }
    }

    /// Recover a validation failure into `failed`; log and propagate
    /// everything else.
    fn recover(&self, err: ApiError, failed: impl FnOnce(String) -> Command) -> ApiResult<()> {
        match err {
            ApiError::Validation(message) => {
                self.store.dispatch(failed(message));
                Ok(())
            }
            other => {
                warn!(error = %other, "backend call failed");
                Err(other)
            }
        }
    }

    /// Dispatch a list-load result, degrading failures to an empty list.
    fn load_list<T>(&self, result: ApiResult<Vec<T>>, loaded: impl FnOnce(Vec<T>) -> Command) {
        match result {
            Ok(list) => {
                self.store.dispatch(loaded(list));
            }
            Err(err) => {
                warn!(error = %err, "list load failed; merging empty result");
                self.store.dispatch(loaded(Vec::new()));
            }
        }
    }

    // -----------------------------------------------------------------------
    // Studies
    // -----------------------------------------------------------------------

    pub async fn load_studies(&self) {
        self.load_list(self.api.studies().await, Command::StudiesLoaded);
    }

    pub async fn load_study(&self, id: &str) -> ApiResult<()> {
        let entry = self.api.study(id).await.inspect_err(|err| {
            warn!(error = %err, id, "study load failed");
        })?;
        self.store.dispatch(Command::StudyLoaded(entry));
        Ok(())
    }

    pub async fn create_study(&self, study: &Study) -> ApiResult<()> {
        match self.api.create_study(study).await {
            Ok(entry) => {
                self.store.dispatch(Command::StudyLoaded(entry));
                Ok(())
            }
            Err(err) => self.recover(err, Command::StudyCreateFailed),
        }
    }

    pub async fn update_study(&self, study: &Study) -> ApiResult<()> {
        match self.api.update_study(study).await {
            Ok(entry) => {
                self.store.dispatch(Command::StudyLoaded(entry));
                Ok(())
            }
            Err(err) => self.recover(err, Command::StudyUpdateFailed),
        }
    }

    pub async fn delete_study(&self, id: &str) -> ApiResult<()> {
        match self.api.delete_study(id).await {
            Ok(()) => {
                self.store.dispatch(Command::StudyDeleted(id.to_owned()));
                Ok(())
            }
            Err(err) => self.recover(err, Command::StudyDeleteFailed),
        }
    }

    pub async fn delete_subject(&self, id: &str) -> ApiResult<()> {
        match self.api.delete_subject(id).await {
            Ok(()) => {
                self.store.dispatch(Command::SubjectDeleted(id.to_owned()));
                Ok(())
            }
            Err(err) => self.recover(err, Command::SubjectDeleteFailed),
        }
    }

    // -----------------------------------------------------------------------
    // Locations
    // -----------------------------------------------------------------------

    pub async fn load_locations(&self) {
        self.load_list(self.api.locations().await, Command::LocationsLoaded);
    }

    pub async fn load_location(&self, id: &str) -> ApiResult<()> {
        let location = self.api.location(id).await.inspect_err(|err| {
            warn!(error = %err, id, "location load failed");
        })?;
        self.store.dispatch(Command::LocationLoaded(location));
        Ok(())
    }

    pub async fn create_location(&self, location: &Location) -> ApiResult<()> {
        match self.api.create_location(location).await {
            Ok(echo) => {
                self.store.dispatch(Command::LocationLoaded(echo));
                Ok(())
            }
            Err(err) => self.recover(err, Command::LocationCreateFailed),
        }
    }

    pub async fn update_location(&self, location: &Location) -> ApiResult<()> {
        match self.api.update_location(location).await {
            Ok(echo) => {
                self.store.dispatch(Command::LocationLoaded(echo));
                Ok(())
            }
            Err(err) => self.recover(err, Command::LocationUpdateFailed),
        }
    }

    pub async fn delete_location(&self, id: &str) -> ApiResult<()> {
        match self.api.delete_location(id).await {
            Ok(()) => {
                self.store.dispatch(Command::LocationDeleted(id.to_owned()));
                Ok(())
            }
            Err(err) => self.recover(err, Command::LocationDeleteFailed),
        }
    }

    // -----------------------------------------------------------------------
    // Specimen types
    // -----------------------------------------------------------------------

    pub async fn load_specimen_types(&self) {
        self.load_list(
            self.api.specimen_types().await,
            Command::SpecimenTypesLoaded,
        );
    }

    pub async fn load_specimen_type(&self, id: &str) -> ApiResult<()> {
        let specimen_type = self.api.specimen_type(id).await.inspect_err(|err| {
            warn!(error = %err, id, "specimen type load failed");
        })?;
        self.store
            .dispatch(Command::SpecimenTypeLoaded(specimen_type));
        Ok(())
    }

    pub async fn create_specimen_type(&self, specimen_type: &SpecimenType) -> ApiResult<()> {
        match self.api.create_specimen_type(specimen_type).await {
            Ok(echo) => {
                self.store.dispatch(Command::SpecimenTypeLoaded(echo));
                Ok(())
            }
            Err(err) => self.recover(err, Command::SpecimenTypeCreateFailed),
        }
    }

    pub async fn update_specimen_type(&self, specimen_type: &SpecimenType) -> ApiResult<()> {
        match self.api.update_specimen_type(specimen_type).await {
            Ok(echo) => {
                self.store.dispatch(Command::SpecimenTypeLoaded(echo));
                Ok(())
            }
            Err(err) => self.recover(err, Command::SpecimenTypeUpdateFailed),
        }
    }

    pub async fn delete_specimen_type(&self, id: &str) -> ApiResult<()> {
        match self.api.delete_specimen_type(id).await {
            Ok(()) => {
                self.store
                    .dispatch(Command::SpecimenTypeDeleted(id.to_owned()));
                Ok(())
            }
            Err(err) => self.recover(err, Command::SpecimenTypeDeleteFailed),
        }
    }

    // -----------------------------------------------------------------------
    // Plates
    // -----------------------------------------------------------------------

    pub async fn load_plates(&self) {
        self.load_list(self.api.plates().await, Command::PlatesLoaded);
    }

    pub async fn load_plate(&self, id: &str) -> ApiResult<()> {
        let entry = self.api.plate(id).await.inspect_err(|err| {
            warn!(error = %err, id, "plate load failed");
        })?;
        self.store.dispatch(Command::PlateLoaded(entry));
        Ok(())
    }

    pub async fn upload_plate(&self, csv: &[u8]) -> ApiResult<()> {
        match self.api.upload_plate(csv).await {
            Ok(entry) => {
                self.store.dispatch(Command::PlateLoaded(entry));
                Ok(())
            }
            Err(err) => self.recover(err, Command::PlateUploadFailed),
        }
    }

    pub async fn update_plates(&self, csv: &[u8]) -> ApiResult<()> {
        match self.api.update_plates(csv).await {
            Ok(entry) => {
                self.store.dispatch(Command::PlateLoaded(entry));
                Ok(())
            }
            Err(err) => self.recover(err, Command::PlateUpdateFailed),
        }
    }

    pub async fn delete_plate(&self, id: &str) -> ApiResult<()> {
        match self.api.delete_plate(id).await {
            Ok(()) => {
                self.store.dispatch(Command::PlateDeleted(id.to_owned()));
                Ok(())
            }
            Err(err) => self.recover(err, Command::PlateDeleteFailed),
        }
    }

    pub async fn hide_plates(&self, ids: &[EntityId]) -> ApiResult<()> {
        match self.api.hide_plates(ids).await {
            Ok(plates) => {
                self.store
                    .dispatch(Command::PlateLoaded(PlateEntry::many(plates)));
                Ok(())
            }
            Err(err) => self.recover(err, Command::PlateHideFailed),
        }
    }

    pub async fn unhide_plates(&self, ids: &[EntityId]) -> ApiResult<()> {
        match self.api.unhide_plates(ids).await {
            Ok(plates) => {
                self.store
                    .dispatch(Command::PlateLoaded(PlateEntry::many(plates)));
                Ok(())
            }
            Err(err) => self.recover(err, Command::PlateUnhideFailed),
        }
    }

    // -----------------------------------------------------------------------
    // Bulk delete
    // -----------------------------------------------------------------------

    pub async fn bulk_delete_specimens(&self, csv: &[u8]) -> ApiResult<()> {
        match self.api.bulk_delete_specimens(csv).await {
            Ok(outcome) => {
                self.store.dispatch(Command::BulkDeleteSucceeded(outcome));
                Ok(())
            }
            Err(err) => self.recover(err, Command::BulkDeleteFailed),
        }
    }

    pub async fn bulk_delete_barcodes(&self, csv: &[u8]) -> ApiResult<()> {
        match self.api.bulk_delete_barcodes(csv).await {
            Ok(outcome) => {
                self.store.dispatch(Command::BulkDeleteSucceeded(outcome));
                Ok(())
            }
            Err(err) => self.recover(err, Command::BulkDeleteFailed),
        }
    }

    // -----------------------------------------------------------------------
    // Search
    // -----------------------------------------------------------------------

    pub async fn search_specimens(&self, csv: &[u8]) -> ApiResult<()> {
        match self.api.search_specimens(csv).await {
            Ok(()) => {
                self.store.dispatch(Command::SearchSpecimensSucceeded);
                Ok(())
            }
            Err(err) => self.recover(err, Command::SearchSpecimensFailed),
        }
    }

    pub async fn search_barcodes(&self, csv: &[u8]) -> ApiResult<()> {
        match self.api.search_barcodes(csv).await {
            Ok(()) => {
                self.store.dispatch(Command::SearchBarcodesSucceeded);
                Ok(())
            }
            Err(err) => self.recover(err, Command::SearchBarcodesFailed),
        }
    }
}
