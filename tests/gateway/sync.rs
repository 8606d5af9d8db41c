//! Sync gateway tests: command dispatch per backend outcome.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use sample_cache::gateway::{BackendApi, SyncGateway};
use sample_cache::model::{
    BulkDeleteOutcome, Location, MatrixPlate, PlateEntry, SpecimenType, Study, StudyEntry,
};
use sample_cache::{ApiError, ApiResult, Store};

use crate::fixtures::*;

// ============================================================================
// Scripted backend
// ============================================================================

/// A backend whose next response per endpoint is scripted by the test.
/// Unscripted calls panic.
#[derive(Default)]
struct MockApi {
    studies: Mutex<Option<ApiResult<Vec<Study>>>>,
    study: Mutex<Option<ApiResult<StudyEntry>>>,
    create_location: Mutex<Option<ApiResult<Location>>>,
    delete_plate: Mutex<Option<ApiResult<()>>>,
    hide_plates: Mutex<Option<ApiResult<Vec<MatrixPlate>>>>,
    bulk_delete_specimens: Mutex<Option<ApiResult<BulkDeleteOutcome>>>,
    search_specimens: Mutex<Option<ApiResult<()>>>,
}

fn take<T>(slot: &Mutex<Option<ApiResult<T>>>) -> ApiResult<T> {
    slot.lock().take().expect("backend call was not scripted")
}

#[async_trait]
impl BackendApi for MockApi {
    async fn studies(&self) -> ApiResult<Vec<Study>> {
        take(&self.studies)
    }
    async fn study(&self, _id: &str) -> ApiResult<StudyEntry> {
        take(&self.study)
    }
    async fn create_study(&self, _study: &Study) -> ApiResult<StudyEntry> {
        unimplemented!()
    }
    async fn update_study(&self, _study: &Study) -> ApiResult<StudyEntry> {
        unimplemented!()
    }
    async fn delete_study(&self, _id: &str) -> ApiResult<()> {
        unimplemented!()
    }
    async fn delete_subject(&self, _id: &str) -> ApiResult<()> {
        unimplemented!()
    }

    async fn locations(&self) -> ApiResult<Vec<Location>> {
        unimplemented!()
    }
    async fn location(&self, _id: &str) -> ApiResult<Location> {
        unimplemented!()
    }
    async fn create_location(&self, _location: &Location) -> ApiResult<Location> {
        take(&self.create_location)
    }
    async fn update_location(&self, _location: &Location) -> ApiResult<Location> {
        unimplemented!()
    }
    async fn delete_location(&self, _id: &str) -> ApiResult<()> {
        unimplemented!()
    }

    async fn specimen_types(&self) -> ApiResult<Vec<SpecimenType>> {
        unimplemented!()
    }
    async fn specimen_type(&self, _id: &str) -> ApiResult<SpecimenType> {
        unimplemented!()
    }
    async fn create_specimen_type(
        &self,
        _specimen_type: &SpecimenType,
    ) -> ApiResult<SpecimenType> {
        unimplemented!()
    }
    async fn update_specimen_type(
        &self,
        _specimen_type: &SpecimenType,
    ) -> ApiResult<SpecimenType> {
        unimplemented!()
    }
    async fn delete_specimen_type(&self, _id: &str) -> ApiResult<()> {
        unimplemented!()
    }

    async fn plates(&self) -> ApiResult<Vec<MatrixPlate>> {
        unimplemented!()
    }
    async fn plate(&self, _id: &str) -> ApiResult<PlateEntry> {
        unimplemented!()
    }
    async fn upload_plate(&self, _csv: &[u8]) -> ApiResult<PlateEntry> {
        unimplemented!()
    }
    async fn update_plates(&self, _csv: &[u8]) -> ApiResult<PlateEntry> {
        unimplemented!()
    }
    async fn delete_plate(&self, _id: &str) -> ApiResult<()> {
        take(&self.delete_plate)
    }
    async fn hide_plates(&self, _ids: &[String]) -> ApiResult<Vec<MatrixPlate>> {
        take(&self.hide_plates)
    }
    async fn unhide_plates(&self, _ids: &[String]) -> ApiResult<Vec<MatrixPlate>> {
        unimplemented!()
    }

    async fn bulk_delete_specimens(&self, _csv: &[u8]) -> ApiResult<BulkDeleteOutcome> {
        take(&self.bulk_delete_specimens)
    }
    async fn bulk_delete_barcodes(&self, _csv: &[u8]) -> ApiResult<BulkDeleteOutcome> {
        unimplemented!()
    }

    async fn search_specimens(&self, _csv: &[u8]) -> ApiResult<()> {
        take(&self.search_specimens)
    }
    async fn search_barcodes(&self, _csv: &[u8]) -> ApiResult<()> {
        unimplemented!()
    }
}

fn gateway(api: MockApi) -> (SyncGateway, Arc<Store>) {
    let store = Arc::new(Store::new());
    (
        SyncGateway::new(Arc::new(api), Arc::clone(&store)),
        store,
    )
}

// ============================================================================
// Outcome handling
// ============================================================================

#[tokio::test]
async fn successful_create_merges_the_server_echo() {
    let api = MockApi::default();
    *api.create_location.lock() = Some(Ok(location("42", "Freezer A")));
    let (gateway, store) = gateway(api);

    gateway
        .create_location(&location("", "Freezer A"))
        .await
        .unwrap();

    let state = store.snapshot();
    assert!(state.locations.table.contains("42"));
    assert!(state.locations.errors.is_clear());
}

#[tokio::test]
async fn validation_failure_lands_in_the_error_slot_and_is_recovered() {
    let api = MockApi::default();
    *api.create_location.lock() =
        Some(Err(ApiError::Validation("description is required".into())));
    let (gateway, store) = gateway(api);

    let result = gateway.create_location(&location("", "")).await;

    assert!(result.is_ok());
    let state = store.snapshot();
    assert_eq!(
        state.locations.errors.create.as_deref(),
        Some("description is required")
    );
    assert!(state.locations.table.is_empty());
}

#[tokio::test]
async fn transport_failure_on_a_mutation_propagates_without_dispatch() {
    let api = MockApi::default();
    *api.delete_plate.lock() = Some(Err(ApiError::transport("connection refused")));
    let (gateway, store) = gateway(api);
    let before = store.snapshot();

    let result = gateway.delete_plate("P1").await;

    assert!(matches!(result, Err(ApiError::Transport { .. })));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[tokio::test]
async fn failed_list_load_degrades_to_an_empty_result() {
    let api = MockApi::default();
    *api.studies.lock() = Some(Err(ApiError::transport("backend down")));
    let (gateway, store) = gateway(api);
    store.dispatch(sample_cache::Command::StudyCreateFailed("stale".into()));

    gateway.load_studies().await;

    let state = store.snapshot();
    assert!(state.studies.table.is_empty());
    // The empty merge still runs the load path, clearing stale errors.
    assert!(state.studies.errors.is_clear());
}

#[tokio::test]
async fn not_found_detail_load_propagates_for_the_router() {
    let api = MockApi::default();
    *api.study.lock() = Some(Err(ApiError::NotFound("S9".into())));
    let (gateway, store) = gateway(api);
    let before = store.snapshot();

    let result = gateway.load_study("S9").await;

    assert!(matches!(result, Err(ApiError::NotFound(id)) if id == "S9"));
    assert!(Arc::ptr_eq(&before, &store.snapshot()));
}

#[tokio::test]
async fn hide_echo_merges_the_updated_plates() {
    let api = MockApi::default();
    let mut hidden = plate("P1", "plate-1", "L1", &[]);
    hidden.hidden = true;
    *api.hide_plates.lock() = Some(Ok(vec![hidden]));
    let (gateway, store) = gateway(api);
    store.dispatch(sample_cache::Command::PlatesLoaded(vec![plate(
        "P1", "plate-1", "L1", &[],
    )]));

    gateway.hide_plates(&["P1".into()]).await.unwrap();

    let state = store.snapshot();
    assert!(state.plates.table.get("P1").unwrap().hidden);
    assert!(state.plates.hide_error.is_none());
}

#[tokio::test]
async fn hide_validation_failure_lands_in_the_hide_error_slot() {
    let api = MockApi::default();
    *api.hide_plates.lock() = Some(Err(ApiError::Validation("plate is locked".into())));
    let (gateway, store) = gateway(api);

    let result = gateway.hide_plates(&["P1".into()]).await;

    assert!(result.is_ok());
    assert_eq!(
        store.snapshot().plates.hide_error.as_deref(),
        Some("plate is locked")
    );
}

#[tokio::test]
async fn search_failure_is_recovered_into_its_error_slot() {
    let api = MockApi::default();
    *api.search_specimens.lock() =
        Some(Err(ApiError::Validation("unreadable csv".into())));
    let (gateway, store) = gateway(api);

    let result = gateway.search_specimens(b"uid\n").await;

    assert!(result.is_ok());
    assert_eq!(
        store.snapshot().search.specimens_error.as_deref(),
        Some("unreadable csv")
    );
}

#[tokio::test]
async fn search_success_clears_the_prior_error() {
    let api = MockApi::default();
    *api.search_specimens.lock() = Some(Ok(()));
    let (gateway, store) = gateway(api);
    store.dispatch(sample_cache::Command::SearchSpecimensFailed("old".into()));

    gateway.search_specimens(b"uid\nSub1\n").await.unwrap();

    assert!(store.snapshot().search.specimens_error.is_none());
}

#[tokio::test]
async fn successful_bulk_delete_cascades_through_the_cache() {
    let api = MockApi::default();
    *api.bulk_delete_specimens.lock() = Some(Ok(BulkDeleteOutcome {
        tube_ids: vec!["T1".into()],
        specimen_ids: vec!["Sp1".into()],
    }));
    let (gateway, store) = gateway(api);
    seed_sample_graph(&store);

    gateway.bulk_delete_specimens(b"barcode\nBCT1\n").await.unwrap();

    let state = store.snapshot();
    assert!(!state.tubes.contains("T1"));
    assert!(!state.specimens.contains("Sp1"));
    assert!(state.plates.table.get("P1").unwrap().tubes.is_empty());
    assert!(state.bulk.last_delete.is_some());
}
