// src/controller.rs
use chrono::Local;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::form::{FormField, FormView};
use crate::map::{Geolocation, GeolocationError, MapWidget, PanOptions};
use crate::presentation::{
    delete_question, marker_popup, SortState, Toolbar, WorkoutEntryView, WorkoutList,
};
use crate::storage::{self, KeyValueStore, StorageError};
use crate::workout::{Coords, SortOrder, WorkoutStore, WorkoutType};

/// The single in-flight interaction. Starting another one cancels it.
#[derive(Clone, Debug, PartialEq)]
pub enum PendingAction {
    Idle,
    Create { coords: Coords },
    Edit { id: String },
    DeleteOne { id: String },
    DeleteAll,
}

/// Raw input from a front end.
#[derive(Clone, Debug, PartialEq)]
pub enum UiEvent {
    MapClicked(Coords),
    /// Click on a list entry outside its buttons.
    WorkoutClicked(String),
    EditClicked(String),
    DeleteClicked(String),
    DeleteAllClicked,
    SortClicked,
    TypeChanged(WorkoutType),
    FieldChanged(FormField, String),
    Submit,
    Confirm(bool),
    Escape,
}

/// Keeps the workout collection, the rendered list, the map markers and
/// storage consistent.
///
/// Every mutation goes: event -> store -> list/markers -> storage. A storage
/// failure is returned after the in-memory state and views are updated.
pub struct WorkoutController<S, M> {
    config: Config,
    storage: S,
    map: Option<M>,
    workouts: WorkoutStore,
    list: WorkoutList,
    form: FormView,
    toolbar: Toolbar,
    pending: PendingAction,
    notice: Option<String>,
}

impl<S: KeyValueStore, M: MapWidget> WorkoutController<S, M> {
    /// Restores saved workouts and renders the list. There is no map yet;
    /// see `attach_map`.
    pub fn new(config: Config, storage: S) -> Self {
        let mut workouts = WorkoutStore::new();
        workouts.restore(storage::load(&storage));
        info!(count = workouts.len(), "restored workouts");

        let mut controller = Self {
            config,
            storage,
            map: None,
            workouts,
            list: WorkoutList::new(),
            form: FormView::new(),
            toolbar: Toolbar::default(),
            pending: PendingAction::Idle,
            notice: None,
        };
        controller.render_list();
        controller.toolbar.sync(controller.workouts.len());
        controller
    }

    /// Resolves the current position, centres the map on it and places a
    /// marker for every restored workout. On failure the error is kept as a
    /// notice and the controller carries on without a map.
    /// # Errors
    /// Returns the `GeolocationError` reported by `geolocation`.
    pub fn attach_map<G>(&mut self, mut map: M, geolocation: &mut G) -> Result<Coords, GeolocationError>
    where
        G: Geolocation + ?Sized,
    {
        let position = match geolocation.current_position() {
            Ok(position) => position,
            Err(e) => {
                warn!(error = %e, "no position, map features disabled");
                self.notice = Some(e.to_string());
                return Err(e);
            }
        };

        map.initialize(position, self.config.map.zoom);
        map.add_tile_layer(&self.config.map.tile_url, &self.config.map.attribution);
        self.map = Some(map);

        let ids: Vec<String> = self.workouts.iter().map(|w| w.id.clone()).collect();
        for id in &ids {
            self.place_marker(id);
        }
        Ok(position)
    }

    /// # Errors
    /// Returns `StorageError` if persisting a mutation fails.
    pub fn handle(&mut self, event: UiEvent) -> Result<(), StorageError> {
        debug!(?event, "ui event");
        match event {
            UiEvent::MapClicked(coords) => self.open_create_form(coords),
            UiEvent::WorkoutClicked(id) => self.pan_to(&id),
            UiEvent::EditClicked(id) => self.open_edit_form(&id),
            UiEvent::DeleteClicked(id) => self.prompt_delete(&id),
            UiEvent::DeleteAllClicked => self.prompt_delete_all(),
            UiEvent::SortClicked => self.toggle_sort(),
            UiEvent::TypeChanged(workout_type) => self.form.set_type(workout_type),
            UiEvent::FieldChanged(field, value) => self.form.set_value(field, value),
            UiEvent::Submit => return self.submit(),
            UiEvent::Confirm(yes) => return self.confirm(yes),
            UiEvent::Escape => self.escape(),
        }
        Ok(())
    }

    // --- Accessors ---

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn workouts(&self) -> &WorkoutStore {
        &self.workouts
    }

    pub fn list(&self) -> &WorkoutList {
        &self.list
    }

    pub fn form(&self) -> &FormView {
        &self.form
    }

    /// Direct access for front ends that edit the text inputs keystroke by
    /// keystroke.
    pub fn form_mut(&mut self) -> &mut FormView {
        &mut self.form
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn pending(&self) -> &PendingAction {
        &self.pending
    }

    pub fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub fn map_mut(&mut self) -> Option<&mut M> {
        self.map.as_mut()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// True during the cosmetic pause after the form was hidden.
    pub fn form_is_settling(&self, now: Instant) -> bool {
        self.form
            .is_settling(now, Duration::from_millis(self.config.form_reset_delay_ms))
    }

    // --- Transitions ---

    fn open_create_form(&mut self, coords: Coords) {
        if let Err(e) = coords.validate() {
            warn!(error = %e, "map click ignored");
            return;
        }
        self.cancel_current_action();
        self.form.show();
        self.pending = PendingAction::Create { coords };
    }

    fn open_edit_form(&mut self, id: &str) {
        let Some(workout) = self.workouts.find(id).cloned() else {
            warn!(id, "edit target not found");
            return;
        };
        self.cancel_current_action();
        self.list.hide(id);
        self.form.prefill(&workout);
        self.form.show();
        self.pending = PendingAction::Edit { id: id.to_string() };
    }

    fn prompt_delete(&mut self, id: &str) {
        let Some(question) = self.workouts.find(id).map(delete_question) else {
            warn!(id, "delete target not found");
            return;
        };
        self.form.hide(Instant::now());
        self.cancel_current_action();
        self.list.hide(id);
        self.list.insert_prompt_after(id, question);
        self.pending = PendingAction::DeleteOne { id: id.to_string() };
    }

    fn prompt_delete_all(&mut self) {
        if self.workouts.is_empty() {
            return;
        }
        self.form.hide(Instant::now());
        self.cancel_current_action();
        self.list.hide_all();
        self.toolbar.delete_all_prompt = true;
        self.pending = PendingAction::DeleteAll;
    }

    fn toggle_sort(&mut self) {
        if self.workouts.is_empty() {
            return;
        }
        self.form.hide(Instant::now());
        self.cancel_current_action();
        self.toolbar.sort = match self.toolbar.sort {
            SortState::Unsorted => SortState::Sorted,
            SortState::Sorted => SortState::Unsorted,
        };
        self.render_list();
    }

    fn escape(&mut self) {
        if self.pending == PendingAction::Idle && !self.form.visible {
            return;
        }
        self.form.hide(Instant::now());
        self.cancel_current_action();
    }

    fn submit(&mut self) -> Result<(), StorageError> {
        let pending = self.pending.clone();
        if !matches!(pending, PendingAction::Create { .. } | PendingAction::Edit { .. }) {
            debug!("submit without an open form ignored");
            return Ok(());
        }

        let input = match self.form.read_input() {
            Ok(input) => input,
            Err(rejection) => {
                debug!(invalid = ?rejection.invalid, "form rejected");
                self.form.apply_rejection(rejection);
                return Ok(());
            }
        };

        let was_sorted = self.toolbar.sort == SortState::Sorted;
        let changed_id = match pending {
            PendingAction::Create { coords } => {
                match self.workouts.create(input, coords, Local::now()) {
                    Ok(workout) => {
                        let id = workout.id.clone();
                        if !was_sorted {
                            self.list.prepend(WorkoutEntryView::from(workout));
                        }
                        Some(id)
                    }
                    Err(e) => {
                        warn!(error = %e, "create refused");
                        None
                    }
                }
            }
            PendingAction::Edit { id } => match self.workouts.edit(&id, input) {
                Ok(workout) => {
                    self.list.replace(WorkoutEntryView::from(workout));
                    Some(id)
                }
                Err(e) => {
                    warn!(error = %e, "edit refused");
                    None
                }
            },
            PendingAction::Idle | PendingAction::DeleteOne { .. } | PendingAction::DeleteAll => None,
        };

        // An edited workout's old marker goes before the new one is placed
        if let Some(id) = &changed_id {
            self.remove_marker(id);
            self.place_marker(id);
        }

        self.form.reset();
        self.form.hide(Instant::now());
        self.pending = PendingAction::Idle;
        self.list.show_all();
        if was_sorted {
            self.toolbar.sort = SortState::Unsorted;
            self.render_list();
        }
        self.toolbar.sync(self.workouts.len());

        if changed_id.is_some() {
            self.persist()?;
        }
        Ok(())
    }

    fn confirm(&mut self, yes: bool) -> Result<(), StorageError> {
        if !yes {
            if matches!(
                self.pending,
                PendingAction::DeleteOne { .. } | PendingAction::DeleteAll
            ) {
                self.cancel_current_action();
            }
            return Ok(());
        }

        match std::mem::replace(&mut self.pending, PendingAction::Idle) {
            PendingAction::DeleteOne { id } => {
                self.remove_marker(&id);
                if self.workouts.delete(&id).is_none() {
                    warn!(%id, "delete target vanished");
                }
                self.list.remove(&id);
                self.list.remove_prompts();
                self.toolbar.sync(self.workouts.len());
                self.persist()
            }
            PendingAction::DeleteAll => {
                let removed = self.workouts.delete_all();
                if let Some(map) = self.map.as_mut() {
                    for marker in removed.iter().filter_map(|w| w.marker) {
                        map.remove_marker(marker);
                    }
                }
                info!(count = removed.len(), "deleted all workouts");
                self.list.clear();
                self.toolbar.delete_all_prompt = false;
                self.toolbar.sync(0);
                storage::clear(&mut self.storage)
            }
            other => {
                self.pending = other;
                Ok(())
            }
        }
    }

    fn pan_to(&mut self, id: &str) {
        let options = PanOptions {
            animate: true,
            duration_secs: self.config.map.pan_duration_secs,
        };
        if let (Some(map), Some(workout)) = (self.map.as_mut(), self.workouts.find(id)) {
            map.pan_to(workout.coords, options);
        }
    }

    /// Drops whatever was pending: form inputs, the edit/delete selection,
    /// prompts, and hidden list entries. The form's visibility is left to the
    /// caller.
    fn cancel_current_action(&mut self) {
        self.form.reset();
        self.list.show_all();
        self.list.remove_prompts();
        self.toolbar.delete_all_prompt = false;
        self.pending = PendingAction::Idle;
    }

    fn render_list(&mut self) {
        let entries: Vec<WorkoutEntryView> = match self.toolbar.sort {
            // Newest first, as each new entry lands at the top
            SortState::Unsorted => self.workouts.iter().rev().map(WorkoutEntryView::from).collect(),
            SortState::Sorted => self
                .workouts
                .sorted_by_distance(SortOrder::Descending)
                .into_iter()
                .map(WorkoutEntryView::from)
                .collect(),
        };
        self.list.render_all(entries);
    }

    fn place_marker(&mut self, id: &str) {
        let Some(map) = self.map.as_mut() else {
            return;
        };
        let Some(workout) = self.workouts.find(id) else {
            return;
        };
        let popup = marker_popup(workout, &self.config.popup);
        let handle = map.place_marker(workout.coords, &popup);
        self.workouts.set_marker(id, handle);
    }

    fn remove_marker(&mut self, id: &str) {
        let Some(marker) = self.workouts.take_marker(id) else {
            return;
        };
        if let Some(map) = self.map.as_mut() {
            map.remove_marker(marker);
        }
    }

    fn persist(&mut self) -> Result<(), StorageError> {
        storage::save(&mut self.storage, self.workouts.iter())
    }
}
