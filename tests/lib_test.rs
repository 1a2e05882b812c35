use anyhow::Result;
use mapty_lib::{
    Config, Coords, FixedLocation, FormField, FormMode, HeadlessMap, KeyValueStore, ListItem,
    MemoryStore, PendingAction, SortState, UiEvent, WorkoutController, WorkoutType,
};

type TestController = WorkoutController<MemoryStore, HeadlessMap>;

const HOME: Coords = Coords::new(51.5074, -0.1278);

// Controller over an in-memory store with a headless map centred on HOME
fn create_test_controller(storage: MemoryStore) -> Result<TestController> {
    let mut controller = WorkoutController::new(Config::default(), storage);
    controller.attach_map(HeadlessMap::new(), &mut FixedLocation(Some(HOME)))?;
    Ok(controller)
}

fn log_running(
    controller: &mut TestController,
    coords: Coords,
    distance: &str,
    duration: &str,
    cadence: &str,
) -> Result<()> {
    controller.handle(UiEvent::MapClicked(coords))?;
    controller.handle(UiEvent::TypeChanged(WorkoutType::Running))?;
    controller.handle(UiEvent::FieldChanged(FormField::Distance, distance.into()))?;
    controller.handle(UiEvent::FieldChanged(FormField::Duration, duration.into()))?;
    controller.handle(UiEvent::FieldChanged(FormField::Cadence, cadence.into()))?;
    controller.handle(UiEvent::Submit)?;
    Ok(())
}

fn log_cycling(
    controller: &mut TestController,
    coords: Coords,
    distance: &str,
    duration: &str,
    elevation: &str,
) -> Result<()> {
    controller.handle(UiEvent::MapClicked(coords))?;
    controller.handle(UiEvent::TypeChanged(WorkoutType::Cycling))?;
    controller.handle(UiEvent::FieldChanged(FormField::Distance, distance.into()))?;
    controller.handle(UiEvent::FieldChanged(FormField::Duration, duration.into()))?;
    controller.handle(UiEvent::FieldChanged(FormField::Elevation, elevation.into()))?;
    controller.handle(UiEvent::Submit)?;
    Ok(())
}

fn workout_ids(controller: &TestController) -> Vec<String> {
    controller.workouts().iter().map(|w| w.id.clone()).collect()
}

fn listed_ids(controller: &TestController) -> Vec<String> {
    controller.list().entries().map(|e| e.id.clone()).collect()
}

#[test]
fn test_create_running_workout() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    let spot = Coords::new(51.51, -0.12);

    log_running(&mut controller, spot, "5", "30", "150")?;

    assert_eq!(controller.workouts().len(), 1);
    let workout = &controller.workouts().workouts()[0];
    assert_eq!(workout.pace(), Some(6.0));
    assert_eq!(workout.cadence(), Some(150.0));
    assert_eq!(workout.speed(), None);
    assert_eq!(workout.coords, spot);
    assert!(workout.description.starts_with("Running on "));

    // One list entry with pace to two decimals
    let entries: Vec<_> = controller.list().entries().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].metrics[2].value, "6.00");
    assert_eq!(entries[0].metrics[2].unit, "min/km");
    assert_eq!(entries[0].metrics[3].value, "150");

    // One marker with the popup for a run
    let map = controller.map().expect("map attached");
    assert_eq!(map.markers.len(), 1);
    let marker = map.marker(workout.marker.expect("marker placed")).expect("marker on map");
    assert_eq!(marker.coords, spot);
    assert_eq!(marker.popup.class_name, "running-popup");
    assert_eq!(marker.popup.max_width, 300);
    assert_eq!(marker.popup.min_width, 50);
    assert!(!marker.popup.auto_close);
    assert!(!marker.popup.close_on_click);
    assert!(marker.popup.content.ends_with(&workout.description));

    // Back to idle with a hidden, reset form
    assert_eq!(controller.pending(), &PendingAction::Idle);
    assert!(!controller.form().visible);
    assert!(controller.form().distance.is_empty());
    Ok(())
}

#[test]
fn test_create_cycling_with_negative_elevation() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;

    log_cycling(&mut controller, HOME, "20", "60", "-10")?;

    assert_eq!(controller.workouts().len(), 1);
    let workout = &controller.workouts().workouts()[0];
    assert_eq!(workout.speed(), Some(20.0));
    assert_eq!(workout.elevation(), Some(-10.0));
    assert_eq!(workout.cadence(), None);

    let entry = controller.list().entries().next().expect("entry rendered");
    assert_eq!(entry.metrics[2].value, "20.00");
    assert_eq!(entry.metrics[2].unit, "km/h");
    assert_eq!(entry.metrics[3].value, "-10");
    Ok(())
}

#[test]
fn test_blank_distance_is_rejected() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;

    log_running(&mut controller, HOME, "", "30", "0")?;

    assert!(controller.workouts().is_empty());
    let form = controller.form();
    assert!(form.visible);
    assert_eq!(form.invalid, vec![FormField::Distance, FormField::Cadence]);
    let message = form.message.as_ref().expect("message shown");
    assert_eq!(message.field, FormField::Distance);
    assert_eq!(message.text, "Field is empty");
    assert_eq!(form.focus, Some(FormField::Distance));
    assert!(matches!(controller.pending(), PendingAction::Create { .. }));
    Ok(())
}

#[test]
fn test_non_positive_value_is_rejected() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;

    log_running(&mut controller, HOME, "5", "-3", "150")?;

    assert!(controller.workouts().is_empty());
    let message = controller.form().message.clone().expect("message shown");
    assert_eq!(message.field, FormField::Duration);
    assert_eq!(message.text, "Positive number expected");

    // Correcting the field clears its mark and lets the submit through
    controller.handle(UiEvent::FieldChanged(FormField::Duration, "25".into()))?;
    assert!(controller.form().invalid.is_empty());
    assert!(controller.form().message.is_none());
    controller.handle(UiEvent::Submit)?;
    assert_eq!(controller.workouts().len(), 1);
    Ok(())
}

#[test]
fn test_edit_running_to_cycling() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    let spot = Coords::new(48.85, 2.35);
    log_running(&mut controller, spot, "5", "30", "150")?;
    let before = controller.workouts().workouts()[0].clone();

    controller.handle(UiEvent::EditClicked(before.id.clone()))?;
    assert_eq!(controller.pending(), &PendingAction::Edit { id: before.id.clone() });
    assert_eq!(controller.form().mode, FormMode::Edit);
    assert_eq!(controller.form().distance, "5");
    assert_eq!(controller.form().cadence, "150");
    assert!(controller.list().is_hidden(&before.id));

    controller.handle(UiEvent::TypeChanged(WorkoutType::Cycling))?;
    controller.handle(UiEvent::FieldChanged(FormField::Elevation, "100".into()))?;
    controller.handle(UiEvent::Submit)?;

    let after = controller.workouts().find(&before.id).expect("still stored");
    assert_eq!(after.workout_type(), WorkoutType::Cycling);
    assert_eq!(after.cadence(), None);
    assert_eq!(after.pace(), None);
    assert_eq!(after.elevation(), Some(100.0));
    assert_eq!(after.speed(), Some(10.0));
    assert_eq!(after.coords, spot);
    assert_eq!(after.created, before.created);
    assert_eq!(after.description, before.description.replacen("Running", "Cycling", 1));

    // Old marker removed exactly once, new one placed
    let map = controller.map().expect("map attached");
    assert_eq!(map.removed, vec![before.marker.expect("marker placed")]);
    assert_eq!(map.markers.len(), 1);
    let marker = map.marker(after.marker.expect("new marker")).expect("on map");
    assert_eq!(marker.popup.class_name, "cycling-popup");

    // Entry replaced in place and visible again
    assert_eq!(listed_ids(&controller), vec![before.id.clone()]);
    assert!(!controller.list().is_hidden(&before.id));
    assert_eq!(controller.pending(), &PendingAction::Idle);
    Ok(())
}

#[test]
fn test_edit_keeps_list_position() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    log_running(&mut controller, HOME, "7", "40", "160")?;
    log_running(&mut controller, HOME, "9", "50", "170")?;
    let before = listed_ids(&controller);

    controller.handle(UiEvent::EditClicked(before[1].clone()))?;
    controller.handle(UiEvent::FieldChanged(FormField::Distance, "8".into()))?;
    controller.handle(UiEvent::Submit)?;

    assert_eq!(listed_ids(&controller), before);
    let entry = controller.list().entry(&before[1]).expect("entry listed");
    assert_eq!(entry.metrics[0].value, "8");
    Ok(())
}

#[test]
fn test_delete_workout_with_confirmation() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    log_cycling(&mut controller, HOME, "20", "60", "5")?;
    let ids = workout_ids(&controller);
    let target = controller.workouts().find(&ids[0]).expect("stored").clone();

    controller.handle(UiEvent::DeleteClicked(target.id.clone()))?;
    assert_eq!(controller.pending(), &PendingAction::DeleteOne { id: target.id.clone() });
    assert!(controller.list().is_hidden(&target.id));
    // The prompt sits right after the hidden entry
    let items = controller.list().items();
    let entry_index = items
        .iter()
        .position(|item| matches!(item, ListItem::Workout { entry, .. } if entry.id == target.id))
        .expect("entry listed");
    assert!(matches!(
        &items[entry_index + 1],
        ListItem::DeletePrompt { workout_id, .. } if *workout_id == target.id
    ));

    controller.handle(UiEvent::Confirm(true))?;

    assert_eq!(workout_ids(&controller), vec![ids[1].clone()]);
    assert_eq!(listed_ids(&controller), vec![ids[1].clone()]);
    assert!(!controller.list().has_prompt());
    let map = controller.map().expect("map attached");
    assert_eq!(map.removed, vec![target.marker.expect("marker placed")]);
    assert_eq!(map.markers.len(), 1);
    assert_eq!(controller.pending(), &PendingAction::Idle);
    // One workout left: no sort/delete-all buttons
    assert!(!controller.toolbar().visible);
    Ok(())
}

#[test]
fn test_delete_declined_changes_nothing() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    let id = workout_ids(&controller)[0].clone();

    controller.handle(UiEvent::DeleteClicked(id.clone()))?;
    controller.handle(UiEvent::Confirm(false))?;

    assert_eq!(workout_ids(&controller), vec![id.clone()]);
    assert!(!controller.list().is_hidden(&id));
    assert!(!controller.list().has_prompt());
    assert!(controller.map().expect("map attached").removed.is_empty());
    assert_eq!(controller.pending(), &PendingAction::Idle);
    Ok(())
}

#[test]
fn test_delete_unknown_id_is_ignored() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;

    controller.handle(UiEvent::DeleteClicked("missing".into()))?;
    controller.handle(UiEvent::Confirm(true))?;

    assert_eq!(controller.workouts().len(), 1);
    assert_eq!(controller.pending(), &PendingAction::Idle);
    Ok(())
}

#[test]
fn test_delete_all() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    log_running(&mut controller, HOME, "7", "40", "160")?;
    assert!(controller.toolbar().visible);

    controller.handle(UiEvent::DeleteAllClicked)?;
    assert_eq!(controller.pending(), &PendingAction::DeleteAll);
    assert!(controller.toolbar().delete_all_prompt);
    assert_eq!(controller.list().visible_items().count(), 0);

    controller.handle(UiEvent::Confirm(true))?;

    assert!(controller.workouts().is_empty());
    assert!(controller.list().items().is_empty());
    assert!(!controller.toolbar().visible);
    assert!(!controller.toolbar().delete_all_prompt);
    let map = controller.map().expect("map attached");
    assert!(map.markers.is_empty());
    assert_eq!(map.removed.len(), 2);
    assert_eq!(controller.storage().get("workouts")?, None);
    Ok(())
}

#[test]
fn test_delete_all_on_empty_collection_does_nothing() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    controller.handle(UiEvent::DeleteAllClicked)?;
    assert_eq!(controller.pending(), &PendingAction::Idle);
    assert!(!controller.toolbar().delete_all_prompt);
    Ok(())
}

#[test]
fn test_starting_an_action_cancels_the_pending_one() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    log_running(&mut controller, HOME, "7", "40", "160")?;
    let ids = workout_ids(&controller);

    controller.handle(UiEvent::DeleteClicked(ids[0].clone()))?;
    controller.handle(UiEvent::EditClicked(ids[1].clone()))?;

    assert_eq!(controller.pending(), &PendingAction::Edit { id: ids[1].clone() });
    assert!(!controller.list().has_prompt());
    assert!(!controller.list().is_hidden(&ids[0]));
    assert!(controller.list().is_hidden(&ids[1]));

    // A map click drops the edit and opens a blank create form
    controller.handle(UiEvent::MapClicked(HOME))?;
    assert_eq!(controller.pending(), &PendingAction::Create { coords: HOME });
    assert_eq!(controller.form().mode, FormMode::Create);
    assert!(controller.form().distance.is_empty());
    assert!(!controller.list().is_hidden(&ids[1]));

    controller.handle(UiEvent::DeleteAllClicked)?;
    assert_eq!(controller.pending(), &PendingAction::DeleteAll);
    assert!(!controller.form().visible);
    Ok(())
}

#[test]
fn test_escape_cancels_without_mutation() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    let id = workout_ids(&controller)[0].clone();

    controller.handle(UiEvent::EditClicked(id.clone()))?;
    controller.handle(UiEvent::FieldChanged(FormField::Distance, "50".into()))?;
    controller.handle(UiEvent::Escape)?;

    assert_eq!(controller.pending(), &PendingAction::Idle);
    assert!(!controller.form().visible);
    assert_eq!(controller.workouts().find(&id).expect("stored").distance, 5.0);
    assert!(!controller.list().is_hidden(&id));

    controller.handle(UiEvent::DeleteAllClicked)?;
    controller.handle(UiEvent::Escape)?;
    assert_eq!(controller.workouts().len(), 1);
    assert!(!controller.toolbar().delete_all_prompt);
    assert_eq!(controller.list().visible_items().count(), 1);
    Ok(())
}

#[test]
fn test_submit_without_open_form_is_ignored() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    controller.handle(UiEvent::FieldChanged(FormField::Distance, "5".into()))?;
    controller.handle(UiEvent::Submit)?;
    assert!(controller.workouts().is_empty());
    Ok(())
}

#[test]
fn test_sort_toggle_restores_insertion_view() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    log_cycling(&mut controller, HOME, "20", "60", "5")?;
    log_running(&mut controller, HOME, "10", "55", "160")?;
    let stored = workout_ids(&controller);
    let unsorted = listed_ids(&controller);
    // Newest first
    let mut newest_first = stored.clone();
    newest_first.reverse();
    assert_eq!(unsorted, newest_first);

    controller.handle(UiEvent::SortClicked)?;
    assert_eq!(controller.toolbar().sort, SortState::Sorted);
    let distances: Vec<String> = controller
        .list()
        .entries()
        .map(|e| e.metrics[0].value.clone())
        .collect();
    assert_eq!(distances, vec!["20", "10", "5"]);
    // Store order and markers untouched
    assert_eq!(workout_ids(&controller), stored);
    assert_eq!(controller.map().expect("map attached").markers.len(), 3);

    controller.handle(UiEvent::SortClicked)?;
    assert_eq!(controller.toolbar().sort, SortState::Unsorted);
    assert_eq!(listed_ids(&controller), unsorted);
    Ok(())
}

#[test]
fn test_submit_resets_sort_toggle() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, HOME, "5", "30", "150")?;
    log_running(&mut controller, HOME, "10", "55", "160")?;
    controller.handle(UiEvent::SortClicked)?;

    log_running(&mut controller, HOME, "1", "10", "150")?;

    assert_eq!(controller.toolbar().sort, SortState::Unsorted);
    let newest = controller.workouts().workouts().last().expect("stored").id.clone();
    assert_eq!(listed_ids(&controller)[0], newest);
    Ok(())
}

#[test]
fn test_workouts_survive_restart() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, Coords::new(1.0, 2.0), "5", "30", "150")?;
    log_cycling(&mut controller, Coords::new(3.0, 4.0), "20", "60", "-10")?;
    let before: Vec<_> = controller.workouts().iter().cloned().collect();
    let storage = controller.storage().clone();

    let restored = create_test_controller(storage)?;

    assert_eq!(restored.workouts().len(), 2);
    for (old, new) in before.iter().zip(restored.workouts().iter()) {
        assert_eq!(old.id, new.id);
        assert_eq!(old.kind, new.kind);
        assert_eq!(old.description, new.description);
        assert_eq!(old.coords, new.coords);
        assert_eq!(old.distance, new.distance);
        assert_eq!(old.duration, new.duration);
    }
    // Markers are placed afresh for the restored workouts
    let map = restored.map().expect("map attached");
    assert_eq!(map.markers.len(), 2);
    assert!(restored.workouts().iter().all(|w| w.marker.is_some()));
    assert!(restored.toolbar().visible);
    Ok(())
}

#[test]
fn test_geolocation_failure_degrades_to_list_only() -> Result<()> {
    let mut controller: TestController = WorkoutController::new(Config::default(), MemoryStore::new());

    let result = controller.attach_map(HeadlessMap::new(), &mut FixedLocation(None));

    assert!(result.is_err());
    assert!(controller.map().is_none());
    assert!(controller.notice().is_some());
    controller.dismiss_notice();
    assert!(controller.notice().is_none());

    // Logging still works; there is just no marker
    log_running(&mut controller, HOME, "5", "30", "150")?;
    assert_eq!(controller.workouts().len(), 1);
    assert!(controller.workouts().workouts()[0].marker.is_none());
    // Panning without a map is a no-op
    let id = workout_ids(&controller)[0].clone();
    controller.handle(UiEvent::WorkoutClicked(id))?;
    Ok(())
}

#[test]
fn test_workout_click_pans_map() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    let spot = Coords::new(40.0, -3.7);
    log_running(&mut controller, spot, "5", "30", "150")?;
    assert_eq!(controller.map().expect("map attached").center, Some(HOME));

    let id = workout_ids(&controller)[0].clone();
    controller.handle(UiEvent::WorkoutClicked(id))?;

    assert_eq!(controller.map().expect("map attached").center, Some(spot));
    Ok(())
}

#[test]
fn test_map_initialized_from_config() -> Result<()> {
    let controller = create_test_controller(MemoryStore::new())?;
    let map = controller.map().expect("map attached");
    assert_eq!(map.zoom, 14);
    assert_eq!(map.tile_layers, vec![Config::default().map.tile_url]);
    Ok(())
}

#[test]
fn test_non_finite_map_click_is_ignored() -> Result<()> {
    let mut controller = create_test_controller(MemoryStore::new())?;
    log_running(&mut controller, Coords::new(1.0, 2.0), "5", "30", "150")?;

    log_running(&mut controller, Coords::new(f64::NAN, 0.0), "7", "40", "160")?;
    log_running(&mut controller, Coords::new(0.0, f64::INFINITY), "7", "40", "160")?;

    assert_eq!(controller.workouts().len(), 1);
    assert_eq!(controller.pending(), &PendingAction::Idle);
    assert!(!controller.form().visible);

    // The saved collection still restores in full
    let restored = create_test_controller(controller.storage().clone())?;
    assert_eq!(workout_ids(&restored), workout_ids(&controller));
    Ok(())
}
