//! Command engine tests: error slots, selection, toggles, and the
//! reference-stability contract.

use std::sync::Arc;

use sample_cache::{Command, Store};

use crate::fixtures::*;

// ============================================================================
// Failure commands
// ============================================================================

#[test]
fn failed_mutation_attaches_message_and_leaves_data_untouched() {
    let store = Store::new();
    seed_sample_graph(&store);
    let before = store.snapshot();

    let after = store.dispatch(Command::StudyCreateFailed("title is required".into()));

    assert_eq!(
        after.studies.errors.create.as_deref(),
        Some("title is required")
    );
    assert!(after.studies.table.same_as(&before.studies.table));
    assert!(after.subjects.same_as(&before.subjects));
    assert!(after.specimens.same_as(&before.specimens));
    assert!(after.tubes.same_as(&before.tubes));
}

#[test]
fn repeating_the_same_failure_returns_the_prior_state_reference() {
    let store = Store::new();
    let once = store.dispatch(Command::LocationUpdateFailed("nope".into()));

    let twice = store.dispatch(Command::LocationUpdateFailed("nope".into()));

    assert!(Arc::ptr_eq(&once, &twice));
}

#[test]
fn each_slice_keeps_its_own_error_slots() {
    let store = Store::new();

    store.dispatch(Command::StudyDeleteFailed("study busy".into()));
    store.dispatch(Command::PlateUploadFailed("bad csv".into()));
    store.dispatch(Command::SubjectDeleteFailed("subject busy".into()));

    let state = store.snapshot();
    assert_eq!(state.studies.errors.delete.as_deref(), Some("study busy"));
    assert_eq!(state.plates.upload_error.as_deref(), Some("bad csv"));
    assert_eq!(
        state.studies.delete_subject_error.as_deref(),
        Some("subject busy")
    );
    assert!(state.locations.errors.is_clear());
}

#[test]
fn load_all_clears_the_slice_error_slots() {
    let store = Store::new();
    store.dispatch(Command::LocationCreateFailed("duplicate".into()));

    let state = store.dispatch(Command::LocationsLoaded(vec![location("L1", "Freezer")]));

    assert!(state.locations.errors.is_clear());
    assert!(state.locations.table.contains("L1"));
}

#[test]
fn plate_hide_and_unhide_failures_have_their_own_slots() {
    let store = Store::new();

    store.dispatch(Command::PlateHideFailed("hide rejected".into()));
    let state = store.dispatch(Command::PlateUnhideFailed("unhide rejected".into()));

    assert_eq!(state.plates.hide_error.as_deref(), Some("hide rejected"));
    assert_eq!(state.plates.unhide_error.as_deref(), Some("unhide rejected"));
    assert!(state.plates.errors.is_clear());
}

#[test]
fn plate_list_load_clears_hide_and_unhide_errors() {
    let store = Store::new();
    store.dispatch(Command::PlateHideFailed("hide rejected".into()));
    store.dispatch(Command::PlateUnhideFailed("unhide rejected".into()));

    let state = store.dispatch(Command::PlatesLoaded(vec![plate(
        "P1", "plate-1", "L1", &[],
    )]));

    assert!(state.plates.hide_error.is_none());
    assert!(state.plates.unhide_error.is_none());
}

#[test]
fn search_failures_land_in_the_search_slice() {
    let store = Store::new();
    let before = store.snapshot();

    store.dispatch(Command::SearchSpecimensFailed("no matches column".into()));
    let state = store.dispatch(Command::SearchBarcodesFailed("bad barcode".into()));

    assert_eq!(
        state.search.specimens_error.as_deref(),
        Some("no matches column")
    );
    assert_eq!(state.search.barcodes_error.as_deref(), Some("bad barcode"));
    // Entity data is untouched by search outcomes.
    assert!(state.plates.table.same_as(&before.plates.table));
    assert!(state.specimens.same_as(&before.specimens));
}

#[test]
fn search_success_clears_only_its_own_slot() {
    let store = Store::new();
    store.dispatch(Command::SearchSpecimensFailed("stale".into()));
    store.dispatch(Command::SearchBarcodesFailed("still here".into()));

    let state = store.dispatch(Command::SearchSpecimensSucceeded);

    assert!(state.search.specimens_error.is_none());
    assert_eq!(state.search.barcodes_error.as_deref(), Some("still here"));
}

#[test]
fn search_success_with_clear_slot_returns_the_prior_state_reference() {
    let store = Store::new();
    let before = store.snapshot();

    let after = store.dispatch(Command::SearchBarcodesSucceeded);

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn clear_errors_resets_every_error_slot() {
    let store = Store::new();
    store.dispatch(Command::StudyCreateFailed("a".into()));
    store.dispatch(Command::PlateUploadFailed("b".into()));
    store.dispatch(Command::PlateHideFailed("c".into()));
    store.dispatch(Command::BulkDeleteFailed("d".into()));
    store.dispatch(Command::SearchSpecimensFailed("e".into()));

    let state = store.dispatch(Command::ClearErrors);

    assert!(state.studies.errors.is_clear());
    assert!(state.plates.upload_error.is_none());
    assert!(state.plates.hide_error.is_none());
    assert!(state.bulk.is_clear());
    assert!(state.search.is_clear());
}

#[test]
fn clear_errors_on_clean_state_returns_the_prior_state_reference() {
    let store = Store::new();
    let before = store.dispatch(Command::SelectStudy("S1".into()));

    let after = store.dispatch(Command::ClearErrors);

    assert!(Arc::ptr_eq(&before, &after));
}

// ============================================================================
// Selection and activation
// ============================================================================

#[test]
fn select_commands_set_their_pointer_only() {
    let store = Store::new();

    store.dispatch(Command::SelectStudy("S1".into()));
    store.dispatch(Command::SelectPlate("P1".into()));

    let state = store.snapshot();
    assert_eq!(state.studies.selected_id.as_deref(), Some("S1"));
    assert_eq!(state.plates.selected_id.as_deref(), Some("P1"));
    assert!(state.locations.selected_id.is_none());
}

#[test]
fn reselecting_the_selected_id_returns_the_prior_state_reference() {
    let store = Store::new();
    let before = store.dispatch(Command::SelectLocation("L1".into()));

    let after = store.dispatch(Command::SelectLocation("L1".into()));

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn deactivate_with_no_active_subject_returns_the_prior_state_reference() {
    let store = Store::new();
    let before = store.snapshot();

    let after = store.dispatch(Command::DeactivateSubject);

    assert!(Arc::ptr_eq(&before, &after));
}

#[test]
fn activate_then_deactivate_round_trips() {
    let store = Store::new();

    store.dispatch(Command::ActivateSubject("Sub1".into()));
    assert_eq!(
        store.snapshot().studies.activated_subject_id.as_deref(),
        Some("Sub1")
    );

    store.dispatch(Command::DeactivateSubject);
    assert!(store.snapshot().studies.activated_subject_id.is_none());
}

#[test]
fn activating_a_subject_clears_the_subject_delete_error() {
    let store = Store::new();
    store.dispatch(Command::SubjectDeleteFailed("busy".into()));

    let state = store.dispatch(Command::ActivateSubject("Sub1".into()));

    assert!(state.studies.delete_subject_error.is_none());
}

// ============================================================================
// Toggles and cross-slice stability
// ============================================================================

#[test]
fn toggle_show_hidden_flips_the_flag() {
    let store = Store::new();
    assert!(!store.snapshot().plates.show_hidden);

    store.dispatch(Command::ToggleShowHidden);
    assert!(store.snapshot().plates.show_hidden);

    store.dispatch(Command::ToggleShowHidden);
    assert!(!store.snapshot().plates.show_hidden);
}

#[test]
fn a_command_never_touches_unrelated_tables() {
    let store = Store::new();
    seed_sample_graph(&store);
    let before = store.snapshot();

    let after = store.dispatch(Command::SpecimenTypesLoaded(vec![specimen_type(
        "ST2", "Urine",
    )]));

    assert!(after.studies.table.same_as(&before.studies.table));
    assert!(after.locations.table.same_as(&before.locations.table));
    assert!(after.plates.table.same_as(&before.plates.table));
    assert!(after.subjects.same_as(&before.subjects));
    assert!(after.specimens.same_as(&before.specimens));
    assert!(after.tubes.same_as(&before.tubes));
    assert!(!after.specimen_types.table.same_as(&before.specimen_types.table));
}
