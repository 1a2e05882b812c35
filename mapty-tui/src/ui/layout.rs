// mapty-tui/src/ui/layout.rs
use crate::{
    app::{ActiveModal, App, Focus},
    ui::{
        form_pane::render_form_pane, list_pane::render_list_pane, map_pane::render_map_pane,
        modals::render_modal, status_bar::render_status_bar,
    },
};
use mapty_lib::{StandardColor, Theme, WorkoutType};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    Frame,
};
use std::time::Instant;

pub fn render_ui(f: &mut Frame, app: &mut App) {
    let size = f.size();

    // Content on top, status bar at the bottom
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(size);

    let content_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(main_chunks[0]);

    // The form only takes room while it is shown or settling
    let form_height = if app.controller.form().visible
        || app.controller.form_is_settling(Instant::now())
    {
        8
    } else {
        3
    };
    let side_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(form_height), Constraint::Min(0)])
        .split(content_chunks[1]);

    app.map_area = content_chunks[0];

    render_map_pane(f, app, content_chunks[0]);
    render_form_pane(f, app, side_chunks[0]);
    render_list_pane(f, app, side_chunks[1]);
    render_status_bar(f, app, main_chunks[1]);

    // Render modal last if active
    if app.active_modal != ActiveModal::None {
        render_modal(f, app);
    }
}

pub fn border_style(app: &App, pane: Focus) -> Style {
    if app.focus == pane && app.active_modal == ActiveModal::None {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// Terminal color for a workout type, from the configured theme.
pub fn workout_color(theme: &Theme, workout_type: WorkoutType) -> Color {
    match theme.color_for(workout_type) {
        StandardColor::Black => Color::Black,
        StandardColor::Red => Color::Red,
        StandardColor::Green => Color::Green,
        StandardColor::Yellow => Color::Yellow,
        StandardColor::Blue => Color::Blue,
        StandardColor::Magenta => Color::Magenta,
        StandardColor::Cyan => Color::Cyan,
        StandardColor::White => Color::White,
        StandardColor::Grey => Color::Gray,
    }
}

/// Helper function to create a centered rectangle for modals
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let percent_x = percent_x.min(100);
    let percent_y = percent_y.min(100);
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
