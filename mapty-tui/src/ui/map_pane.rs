// mapty-tui/src/ui/map_pane.rs
use crate::{
    app::{App, Focus},
    ui::layout::{border_style, workout_color},
};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style, Stylize},
    symbols,
    text::Line,
    widgets::{
        block::{Position, Title},
        canvas::{Canvas, Line as CanvasLine, Map, MapResolution, Points},
        Block, Borders, Paragraph, Wrap,
    },
    Frame,
};

pub fn render_map_pane(f: &mut Frame, app: &App, area: Rect) {
    let Some(map) = app.controller.map() else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Map")
            .border_style(border_style(app, Focus::Map));
        let text = "No position available, the map is disabled.\nWorkouts can still be listed, edited and deleted.";
        f.render_widget(
            Paragraph::new(text)
                .block(block)
                .style(Style::default().fg(Color::DarkGray))
                .wrap(Wrap { trim: true }),
            area,
        );
        return;
    };

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(
            "Map (zoom {}) {:.4}, {:.4}",
            map.zoom, map.cursor.lat, map.cursor.lng
        ))
        .border_style(border_style(app, Focus::Map));
    if let Some(attribution) = &map.attribution {
        block = block.title(
            Title::from(attribution.as_str().dark_gray())
                .position(Position::Bottom)
                .alignment(Alignment::Right),
        );
    }

    let theme = &app.controller.config().theme;
    let [west, east] = map.x_bounds();
    let [south, north] = map.y_bounds();
    // Crosshair arms span a small share of the view
    let arm_x = (east - west) / 40.0;
    let arm_y = (north - south) / 20.0;

    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([west, east])
        .y_bounds([south, north])
        .paint(|ctx| {
            ctx.draw(&Map {
                color: Color::DarkGray,
                resolution: MapResolution::High,
            });
            ctx.layer();

            for (coords, popup) in map.markers() {
                let color = workout_color(theme, popup.workout_type);
                ctx.draw(&Points {
                    coords: &[(coords.lng, coords.lat)],
                    color,
                });
                // Popups stay open, one label per marker
                ctx.print(
                    coords.lng,
                    coords.lat,
                    Line::styled(format!(" {}", popup.content), Style::default().fg(color)),
                );
            }

            let cursor = map.cursor;
            ctx.draw(&CanvasLine {
                x1: cursor.lng - arm_x,
                y1: cursor.lat,
                x2: cursor.lng + arm_x,
                y2: cursor.lat,
                color: Color::Red,
            });
            ctx.draw(&CanvasLine {
                x1: cursor.lng,
                y1: cursor.lat - arm_y,
                x2: cursor.lng,
                y2: cursor.lat + arm_y,
                color: Color::Red,
            });
        });
    f.render_widget(canvas, area);
}
