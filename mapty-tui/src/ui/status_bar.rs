// mapty-tui/src/ui/status_bar.rs
use crate::app::{ActiveModal, App, Focus};
use mapty_lib::PendingAction;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

pub fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let status_text = match app.active_modal {
        ActiveModal::None => match (app.controller.pending(), app.focus) {
            (PendingAction::DeleteOne { .. } | PendingAction::DeleteAll, _) => {
                " [y] Confirm delete | [n/Esc] Keep "
            }
            (_, Focus::Map) => {
                " [Tab] Focus | [←↑↓→/hjkl] Move | [Enter/click] Log here | [+/-] Zoom | [?] Help | [q]uit "
            }
            (_, Focus::List) => {
                " [Tab] Focus | [↑↓/jk] Nav | [Enter] Show on map | [e]dit | [d]elete | [D]elete all | [s]ort | [?] Help | [q]uit "
            }
            (_, Focus::Form) => {
                " [Tab] Focus | [↑↓] Field | [t] Type | [Enter] Save | [Esc] Cancel "
            }
        },
        ActiveModal::Help => " [Esc/Enter/?] Close Help ",
        ActiveModal::Notice(_) => " [Esc/Enter] Dismiss ",
    };

    let error_text = app.last_error.as_deref().unwrap_or("");

    let status_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
        .split(area);

    let status_paragraph =
        Paragraph::new(status_text).style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status_paragraph, status_chunks[0]);

    let error_paragraph = Paragraph::new(error_text)
        .style(Style::default().bg(Color::DarkGray).fg(Color::Red))
        .alignment(Alignment::Right);
    f.render_widget(error_paragraph, status_chunks[1]);
}
