// mapty-tui/src/ui/list_pane.rs
use crate::{
    app::{App, Focus},
    ui::layout::{border_style, workout_color},
};
use mapty_lib::{ListItem as Row, SortState, WorkoutEntryView};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

pub fn render_list_pane(f: &mut Frame, app: &mut App, area: Rect) {
    let toolbar = app.controller.toolbar().clone();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!("Workouts ({})", app.controller.workouts().len()))
        .border_style(border_style(app, Focus::List));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let toolbar_height = u16::from(toolbar.visible || toolbar.delete_all_prompt);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(toolbar_height), Constraint::Min(0)])
        .split(inner);
    app.list_area = chunks[1];

    if toolbar.delete_all_prompt {
        let prompt = Line::from(vec![
            Span::styled("Delete all workouts? ", Style::default().fg(Color::Red).bold()),
            Span::raw("[y]es / [n]o"),
        ]);
        f.render_widget(Paragraph::new(prompt), chunks[0]);
    } else if toolbar.visible {
        let sort_label = match toolbar.sort {
            SortState::Unsorted => "[s] Sort by distance",
            SortState::Sorted => "[s] Unsort",
        };
        let line = Line::from(vec![
            Span::styled(sort_label, Style::default().fg(Color::Cyan)),
            Span::raw("  "),
            Span::styled("[D] Delete all", Style::default().fg(Color::Red)),
        ]);
        f.render_widget(Paragraph::new(line), chunks[0]);
    }

    let theme = &app.controller.config().theme;
    let items: Vec<ListItem> = app
        .controller
        .list()
        .visible_items()
        .map(|row| match row {
            Row::Workout { entry, .. } => {
                entry_item(entry, workout_color(theme, entry.workout_type))
            }
            Row::DeletePrompt { question, .. } => ListItem::new(Line::from(vec![
                Span::styled(question.clone(), Style::default().fg(Color::Red)),
                Span::raw(" [y/n]"),
            ])),
        })
        .collect();

    if items.is_empty() && !toolbar.delete_all_prompt {
        let hint = if app.controller.map().is_some() {
            "Click the map (or press Enter on it) to log a workout."
        } else {
            "No workouts logged yet."
        };
        f.render_widget(Paragraph::new(hint).dark_gray(), chunks[1]);
        return;
    }

    let list = List::new(items)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    f.render_stateful_widget(list, chunks[1], &mut app.list_state);
}

fn entry_item(entry: &WorkoutEntryView, color: Color) -> ListItem<'static> {
    let title = Line::from(Span::styled(
        format!("{} {}", entry.icon, entry.title),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    ));
    let metrics: Vec<Span> = entry
        .metrics
        .iter()
        .flat_map(|m| {
            [
                Span::raw(format!("{} ", m.icon)),
                Span::styled(m.value.clone(), Style::default().bold()),
                Span::styled(format!(" {}  ", m.unit), Style::default().dark_gray()),
            ]
        })
        .collect();
    ListItem::new(vec![title, Line::from(metrics)])
}
