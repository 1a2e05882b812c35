// mapty-tui/src/ui/modals.rs
use crate::{
    app::{ActiveModal, App},
    ui::layout::centered_rect,
};
use ratatui::{
    layout::Margin,
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

pub fn render_modal(f: &mut Frame, app: &App) {
    match &app.active_modal {
        ActiveModal::Help => render_help_modal(f),
        ActiveModal::Notice(message) => render_notice_modal(f, message),
        ActiveModal::None => {}
    }
}

fn render_help_modal(f: &mut Frame) {
    let block = Block::default()
        .title("Help (?)")
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().yellow());
    let area = centered_rect(60, 70, f.size());
    f.render_widget(Clear, area);
    f.render_widget(block, area);

    let help_text = vec![
        Line::from("--- Global ---").style(Style::new().bold().underlined()),
        Line::from(" q: Quit Application"),
        Line::from(" ?: Show/Hide This Help"),
        Line::from(" Tab: Cycle Focus (Map > Workouts > Form)"),
        Line::from(" Esc: Cancel Edit / Delete / New Workout"),
        Line::from(" y / n: Answer a Delete Prompt"),
        Line::from(""),
        Line::from("--- Map ---").style(Style::new().bold().underlined()),
        Line::from(" h/j/k/l / arrows: Move Cursor"),
        Line::from(" + / -: Zoom In / Out"),
        Line::from(" Enter / Left Click: Log a Workout Here"),
        Line::from(""),
        Line::from("--- Workouts ---").style(Style::new().bold().underlined()),
        Line::from(" k/j / ↑/↓: Navigate"),
        Line::from(" Enter / Left Click: Show on Map"),
        Line::from(" e: Edit Selected Workout"),
        Line::from(" d / Delete: Delete Selected Workout"),
        Line::from(" D: Delete All Workouts"),
        Line::from(" s: Toggle Sort by Distance"),
        Line::from(""),
        Line::from("--- Form ---").style(Style::new().bold().underlined()),
        Line::from(" ↑/↓: Previous / Next Field"),
        Line::from(" t: Toggle Running / Cycling"),
        Line::from(" Enter: Save Workout"),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc, ?, or Enter to close ",
            Style::new().italic().yellow(),
        )),
    ];

    let paragraph = Paragraph::new(help_text).wrap(Wrap { trim: false });
    f.render_widget(
        paragraph,
        area.inner(&Margin {
            vertical: 1,
            horizontal: 1,
        }),
    );
}

fn render_notice_modal(f: &mut Frame, message: &str) {
    let block = Block::default()
        .title("Notice")
        .borders(Borders::ALL)
        .title_style(Style::new().bold())
        .border_style(Style::new().red());
    let area = centered_rect(50, 20, f.size());
    f.render_widget(Clear, area);

    let text = vec![
        Line::from(message.to_string()),
        Line::from(""),
        Line::from(Span::styled(
            " Press Esc or Enter to continue ",
            Style::new().italic().yellow(),
        )),
    ];
    f.render_widget(
        Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
