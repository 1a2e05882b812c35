// mapty-tui/src/ui/form_pane.rs
use crate::{
    app::{App, Focus},
    ui::layout::{border_style, workout_color},
};
use mapty_lib::{FormMode, WorkoutType};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Instant;

const LABEL_WIDTH: u16 = 20;

pub fn render_form_pane(f: &mut Frame, app: &App, area: Rect) {
    let form = app.controller.form();
    if !form.visible {
        let block = Block::default().borders(Borders::ALL);
        // Blank while the form settles, a hint afterwards
        let text = if app.controller.form_is_settling(Instant::now()) {
            ""
        } else {
            "Pick a location on the map to log a workout"
        };
        f.render_widget(Paragraph::new(text).dark_gray().block(block), area);
        return;
    }

    let title = match form.mode {
        FormMode::Create => "New workout",
        FormMode::Edit => "Edit workout",
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(border_style(app, Focus::Form));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Type
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1), // Message
            Constraint::Min(0),
        ])
        .split(inner);

    let theme = &app.controller.config().theme;
    let mut type_spans = vec![Span::raw(format!(
        "{:<width$}",
        "Type",
        width = usize::from(LABEL_WIDTH)
    ))];
    for t in [WorkoutType::Running, WorkoutType::Cycling] {
        let style = if t == form.workout_type {
            Style::default().fg(workout_color(theme, t)).bold().reversed()
        } else {
            Style::default().dark_gray()
        };
        type_spans.push(Span::styled(format!(" {} ", t.label()), style));
        type_spans.push(Span::raw(" "));
    }
    type_spans.push(Span::styled("[t] toggle", Style::default().dark_gray()));
    f.render_widget(Paragraph::new(Line::from(type_spans)), chunks[0]);

    for (field, row) in form.fields().into_iter().zip(&chunks[1..4]) {
        let focused = app.focus == Focus::Form && form.focus == Some(field);
        let invalid = form.invalid.contains(&field);
        let value_style = match (focused, invalid) {
            (true, _) => Style::default().reversed(),
            (false, true) => Style::default().fg(Color::Red).underlined(),
            (false, false) => Style::default(),
        };
        let label_style = if invalid {
            Style::default().fg(Color::Red)
        } else {
            Style::default()
        };
        let value = form.value(field);
        let line = Line::from(vec![
            Span::styled(
                format!("{:<width$}", field.label(), width = usize::from(LABEL_WIDTH)),
                label_style,
            ),
            Span::styled(format!("{value} "), value_style),
        ]);
        f.render_widget(Paragraph::new(line), *row);

        if focused {
            let offset = u16::try_from(value.chars().count()).unwrap_or(u16::MAX);
            let x = row.x.saturating_add(LABEL_WIDTH).saturating_add(offset);
            f.set_cursor(x.min(row.x + row.width.saturating_sub(1)), row.y);
        }
    }

    if let Some(message) = &form.message {
        let line = Line::from(vec![
            Span::styled(format!("{}: ", message.field.label()), Style::default().fg(Color::Red)),
            Span::styled(message.text, Style::default().fg(Color::Red).bold()),
        ]);
        f.render_widget(Paragraph::new(line), chunks[4]);
    }
}
