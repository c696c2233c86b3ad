use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &mut App, area: Rect) {
    let title = format!(" {} ", app.projection_name());
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    // Braille gives 2x4 resolution per character
    app.view
        .set_size(inner.width as usize * 2, inner.height as usize * 4);

    let shapes = app.shapes();
    let layers = app.map_renderer.render(
        inner.width as usize,
        inner.height as usize,
        &shapes,
        &app.context,
        &app.projection,
        &app.view,
        app.hovered.as_ref(),
    );

    // Get mouse cursor position for marker
    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    let map_widget = MapWidget { layers, cursor_pos };
    frame.render_widget(map_widget, inner);
}

/// Braille layers plus text labels, drawn back to front
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

/// Copy the set cells of a braille canvas into the buffer with one color
fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
    for row in 0..area.height {
        for col in 0..area.width {
            if let Some(ch) = canvas.cell(col as usize, row as usize) {
                buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        render_layer(&self.layers.outline, Color::DarkGray, area, buf);
        render_layer(&self.layers.regions, Color::Cyan, area, buf);
        render_layer(&self.layers.highlight, Color::Yellow, area, buf);
        render_layer(&self.layers.cities, Color::White, area, buf);

        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= area.height || *lx >= area.width {
                continue;
            }

            let max_len = (area.width - *lx) as usize;
            let y = area.y + *ly;
            for (i, ch) in text.chars().take(max_len.min(24)).enumerate() {
                buf[(area.x + *lx + i as u16, y)]
                    .set_char(ch)
                    .set_style(label_style);
            }
        }

        if let Some((cx, cy)) = self.cursor_pos {
            buf[(area.x + cx, area.y + cy)]
                .set_char('╋')
                .set_fg(Color::Red);
        }
    }
}

fn toggle_span(on: bool, on_label: &'static str, off_label: &'static str) -> Span<'static> {
    Span::styled(
        if on { on_label } else { off_label },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;
    let dim = Style::default().fg(Color::DarkGray);

    let hovered = app
        .hovered_label()
        .unwrap_or_else(|| "-".to_string());

    let status = Line::from(vec![
        Span::styled(" Zoom: ", dim),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", dim),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", dim),
        Span::styled(hovered, Style::default().fg(Color::Yellow)),
        Span::styled(" @ ", dim),
        Span::styled(app.cursor_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", dim),
        Span::styled(app.cache_summary(), Style::default().fg(Color::Magenta)),
        Span::styled(" | ", dim),
        toggle_span(settings.show_outline, "[O]utline ", "[o]utline "),
        toggle_span(settings.show_regions, "[G]eo ", "[g]eo "),
        toggle_span(settings.show_cities, "[C]ities ", "[c]ities "),
        toggle_span(settings.show_labels, "[L]abels ", "[l]abels "),
        Span::styled(
            "| m:proj []:lon {}:lat +/-:zoom r:reset q:quit",
            dim,
        ),
    ]);

    let paragraph = Paragraph::new(status);
    frame.render_widget(paragraph, area);
}
