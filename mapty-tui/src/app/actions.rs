// mapty-tui/src/app/actions.rs
use mapty_lib::{FormField, PendingAction, UiEvent};
use ratatui::layout::Margin;
use tracing::error;

use super::state::{ActiveModal, App, Focus};

impl App {
    /// Hands an event to the controller and follows its outcome with the
    /// pane focus and list selection.
    pub(super) fn dispatch(&mut self, event: UiEvent) {
        let opens_form = matches!(event, UiEvent::MapClicked(_) | UiEvent::EditClicked(_));
        if let Err(e) = self.controller.handle(event) {
            error!(error = %e, "failed to save workouts");
            self.set_error(format!("Save failed: {e}"));
        }

        let form_visible = self.controller.form().visible;
        if opens_form && form_visible {
            self.focus = Focus::Form;
        } else if self.focus == Focus::Form && !form_visible {
            self.focus = Focus::List;
        }
        self.clamp_selection();
    }

    pub(super) fn awaiting_confirmation(&self) -> bool {
        matches!(
            self.controller.pending(),
            PendingAction::DeleteOne { .. } | PendingAction::DeleteAll
        )
    }

    pub(super) fn cycle_focus(&mut self) {
        let has_map = self.controller.map().is_some();
        let form_visible = self.controller.form().visible;
        let mut next = self.focus;
        // At most three hops before landing back where we started
        for _ in 0..3 {
            next = match next {
                Focus::Map => Focus::List,
                Focus::List => Focus::Form,
                Focus::Form => Focus::Map,
            };
            let usable = match next {
                Focus::Map => has_map,
                Focus::List => true,
                Focus::Form => form_visible,
            };
            if usable {
                break;
            }
        }
        self.focus = next;
    }

    pub(super) fn list_next(&mut self) {
        let count = self.controller.list().visible_items().count();
        if count == 0 {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % count);
        self.list_state.select(Some(i));
    }

    pub(super) fn list_previous(&mut self) {
        let count = self.controller.list().visible_items().count();
        if count == 0 {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map_or(0, |i| if i == 0 { count - 1 } else { i - 1 });
        self.list_state.select(Some(i));
    }

    pub(super) fn with_selected(&mut self, make: impl FnOnce(String) -> UiEvent) {
        if let Some(id) = self.selected_workout_id() {
            self.dispatch(make(id));
        }
    }

    // --- Form editing ---

    fn focused_field(&self) -> FormField {
        let form = self.controller.form();
        form.focus.unwrap_or(form.fields()[0])
    }

    pub(super) fn form_type_char(&mut self, c: char) {
        let field = self.focused_field();
        let mut value = self.controller.form().value(field).to_string();
        value.push(c);
        self.dispatch(UiEvent::FieldChanged(field, value));
    }

    pub(super) fn form_backspace(&mut self) {
        let field = self.focused_field();
        let mut value = self.controller.form().value(field).to_string();
        if value.pop().is_some() {
            self.dispatch(UiEvent::FieldChanged(field, value));
        }
    }

    pub(super) fn form_move_focus(&mut self, forward: bool) {
        let current = self.focused_field();
        let form = self.controller.form_mut();
        let fields = form.fields();
        let index = fields.iter().position(|f| *f == current).unwrap_or(0);
        let next = if forward {
            (index + 1) % fields.len()
        } else {
            (index + fields.len() - 1) % fields.len()
        };
        form.focus = Some(fields[next]);
    }

    pub(super) fn form_toggle_type(&mut self) {
        let toggled = self.controller.form().workout_type.toggled();
        self.dispatch(UiEvent::TypeChanged(toggled));
    }

    // --- Mouse ---

    /// A left click on the map logs a workout there; on the list it selects
    /// the row and pans to its workout.
    pub fn handle_click(&mut self, column: u16, row: u16) {
        if self.active_modal != ActiveModal::None {
            return;
        }

        let canvas_area = self.map_area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        });
        let clicked = self
            .controller
            .map()
            .and_then(|map| map.coords_at(canvas_area, column, row));
        if let Some(coords) = clicked {
            if let Some(map) = self.controller.map_mut() {
                map.cursor = coords;
            }
            self.focus = Focus::Map;
            self.dispatch(UiEvent::MapClicked(coords));
            return;
        }

        let rows = self.list_area;
        if rows.height == 0
            || column < rows.x
            || column >= rows.x + rows.width
            || row < rows.y
            || row >= rows.y + rows.height
        {
            return;
        }
        // Workout rows are two lines tall, prompts one
        let mut line = usize::from(row - rows.y);
        let clicked_index = self
            .controller
            .list()
            .visible_items()
            .skip(self.list_state.offset())
            .enumerate()
            .find_map(|(i, item)| {
                let height = match item {
                    mapty_lib::ListItem::Workout { .. } => 2,
                    mapty_lib::ListItem::DeletePrompt { .. } => 1,
                };
                if line < height {
                    Some(i)
                } else {
                    line -= height;
                    None
                }
            });
        if let Some(i) = clicked_index {
            self.focus = Focus::List;
            self.list_state.select(Some(self.list_state.offset() + i));
            if !self.awaiting_confirmation() {
                self.with_selected(UiEvent::WorkoutClicked);
            }
        }
    }
}
