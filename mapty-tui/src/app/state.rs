// mapty-tui/src/app/state.rs
use mapty_lib::{ListItem, SqliteStore, WorkoutController};
use ratatui::{layout::Rect, widgets::ListState};
use std::time::{Duration, Instant};

use crate::canvas_map::CanvasMap;

pub type Controller = WorkoutController<SqliteStore, CanvasMap>;

const ERROR_DISPLAY_TIME: Duration = Duration::from_secs(5);

// Which pane receives keys
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Map,
    List,
    Form,
}

// Represents the state of active modals
#[derive(Clone, Debug, PartialEq)]
pub enum ActiveModal {
    None,
    Help,
    Notice(String),
}

// Holds the application state
pub struct App {
    pub controller: Controller,
    pub should_quit: bool,
    pub focus: Focus,
    pub active_modal: ActiveModal,
    pub last_error: Option<String>,
    pub list_state: ListState,
    // Where the last frame put the map pane and the list rows, for mouse
    // hit-testing
    pub map_area: Rect,
    pub list_area: Rect,

    error_clear_time: Option<Instant>,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let active_modal = controller
            .notice()
            .map_or(ActiveModal::None, |notice| ActiveModal::Notice(notice.to_string()));
        let focus = if controller.map().is_some() {
            Focus::Map
        } else {
            Focus::List
        };
        let mut app = Self {
            controller,
            should_quit: false,
            focus,
            active_modal,
            last_error: None,
            list_state: ListState::default(),
            map_area: Rect::default(),
            list_area: Rect::default(),
            error_clear_time: None,
        };
        app.clamp_selection();
        app
    }

    pub fn set_error(&mut self, msg: String) {
        self.last_error = Some(msg);
        self.error_clear_time = Some(Instant::now() + ERROR_DISPLAY_TIME);
    }

    /// Expires the status-bar error.
    pub fn tick(&mut self) {
        if self.error_clear_time.is_some_and(|at| Instant::now() >= at) {
            self.last_error = None;
            self.error_clear_time = None;
        }
    }

    /// The workout the selected row belongs to. A delete prompt counts as
    /// its workout's row.
    pub fn selected_workout_id(&self) -> Option<String> {
        let index = self.list_state.selected()?;
        match self.controller.list().visible_items().nth(index)? {
            ListItem::Workout { entry, .. } => Some(entry.id.clone()),
            ListItem::DeletePrompt { workout_id, .. } => Some(workout_id.clone()),
        }
    }

    /// Keeps the selection inside the visible rows after the list changes.
    pub fn clamp_selection(&mut self) {
        let count = self.controller.list().visible_items().count();
        let selected = match (self.list_state.selected(), count) {
            (_, 0) => None,
            (None, _) => Some(0),
            (Some(i), n) => Some(i.min(n - 1)),
        };
        self.list_state.select(selected);
    }
}
