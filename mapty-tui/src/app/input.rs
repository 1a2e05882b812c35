// mapty-tui/src/app/input.rs
use crossterm::event::{KeyCode, KeyEvent};
use mapty_lib::UiEvent;

use super::state::{ActiveModal, App, Focus};

// Main key event handler method on App
impl App {
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        // Handle based on active modal first
        if self.active_modal != ActiveModal::None {
            self.handle_modal_input(key);
            return;
        }

        // An open delete prompt takes the answer from any pane
        if self.awaiting_confirmation() {
            match key.code {
                KeyCode::Char('y') => {
                    self.dispatch(UiEvent::Confirm(true));
                    return;
                }
                KeyCode::Char('n') => {
                    self.dispatch(UiEvent::Confirm(false));
                    return;
                }
                _ => {}
            }
        }

        // Global keys
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.active_modal = ActiveModal::Help,
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Esc => self.dispatch(UiEvent::Escape),
            _ => match self.focus {
                Focus::Map => self.handle_map_input(key),
                Focus::List => self.handle_list_input(key),
                Focus::Form => self.handle_form_input(key),
            },
        }
    }

    // --- Modal Input Handling ---
    fn handle_modal_input(&mut self, key: KeyEvent) {
        let close = match self.active_modal {
            ActiveModal::Help => matches!(
                key.code,
                KeyCode::Esc | KeyCode::Char('q' | '?') | KeyCode::Enter
            ),
            ActiveModal::Notice(_) => matches!(key.code, KeyCode::Esc | KeyCode::Enter),
            ActiveModal::None => false,
        };
        if close {
            self.active_modal = ActiveModal::None;
            self.controller.dismiss_notice();
        }
    }

    // --- Pane-Specific Input Handling ---
    fn handle_map_input(&mut self, key: KeyEvent) {
        let Some(map) = self.controller.map_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => map.nudge_cursor(-1, 0),
            KeyCode::Char('l') | KeyCode::Right => map.nudge_cursor(1, 0),
            KeyCode::Char('k') | KeyCode::Up => map.nudge_cursor(0, 1),
            KeyCode::Char('j') | KeyCode::Down => map.nudge_cursor(0, -1),
            KeyCode::Char('+' | '=') => map.zoom_in(),
            KeyCode::Char('-') => map.zoom_out(),
            KeyCode::Enter => {
                let cursor = map.cursor;
                self.dispatch(UiEvent::MapClicked(cursor));
            }
            _ => {}
        }
    }

    fn handle_list_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('k') | KeyCode::Up => self.list_previous(),
            KeyCode::Char('j') | KeyCode::Down => self.list_next(),
            KeyCode::Enter => self.with_selected(UiEvent::WorkoutClicked),
            KeyCode::Char('e') => self.with_selected(UiEvent::EditClicked),
            KeyCode::Char('d') | KeyCode::Delete => self.with_selected(UiEvent::DeleteClicked),
            KeyCode::Char('D') => self.dispatch(UiEvent::DeleteAllClicked),
            KeyCode::Char('s') => self.dispatch(UiEvent::SortClicked),
            _ => {}
        }
    }

    fn handle_form_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('t') => self.form_toggle_type(),
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                self.form_type_char(c);
            }
            KeyCode::Backspace => self.form_backspace(),
            KeyCode::Down => self.form_move_focus(true),
            KeyCode::Up => self.form_move_focus(false),
            KeyCode::Enter => self.dispatch(UiEvent::Submit),
            _ => {}
        }
    }
}
