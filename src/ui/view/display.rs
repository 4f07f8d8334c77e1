use ratatui::Frame;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use super::App;

pub(super) fn render_devices(f: &mut Frame, area: Rect, app: &App) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(18),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(area);

    render_screen(f, parts[0], app);
    render_number(f, parts[1], app);
    render_chars(f, parts[2], app);
    render_controller(f, parts[3], app);
}

fn device_block(title: String) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_type(BorderType::Rounded)
        .title(title)
}

/// Two pixel rows per terminal row using half blocks.
fn render_screen(f: &mut Frame, area: Rect, app: &App) {
    let screen = &app.state.screen;
    let lines: Vec<Line> = screen
        .chunks(2)
        .map(|pair| {
            let top = &pair[0];
            let bottom = pair.get(1);
            let row: String = (0..top.len())
                .map(|x| {
                    let t = top[x] != 0;
                    let b = bottom.is_some_and(|r| r[x] != 0);
                    match (t, b) {
                        (true, true) => '█',
                        (true, false) => '▀',
                        (false, true) => '▄',
                        (false, false) => ' ',
                    }
                })
                .collect();
            Line::raw(row)
        })
        .collect();
    let title = format!("Screen ({},{})", app.state.pixel_x, app.state.pixel_y);
    let para = Paragraph::new(lines)
        .style(Style::default().fg(Color::LightGreen))
        .block(device_block(title));
    f.render_widget(para, area);
}

fn render_number(f: &mut Frame, area: Rect, app: &App) {
    let text = match app.state.number_display {
        Some(n) => n.to_string(),
        None => "-".into(),
    };
    let mode = if app.state.signed_mode { "signed" } else { "unsigned" };
    let para = Paragraph::new(text)
        .alignment(Alignment::Right)
        .block(device_block(format!("Number ({mode})")));
    f.render_widget(para, area);
}

fn render_chars(f: &mut Frame, area: Rect, app: &App) {
    let st = &app.state;
    let para = Paragraph::new(st.char_buffer.clone())
        .wrap(Wrap { trim: false })
        .block(device_block(format!("Chars (pending: {:?})", st.pending_chars)));
    f.render_widget(para, area);
}

fn render_controller(f: &mut Frame, area: Rect, app: &App) {
    let bits: String = (0..8)
        .map(|bit| if app.controller & (1 << bit) != 0 { '■' } else { '□' })
        .collect();
    let para = Paragraph::new(format!("{bits}  {:#010b}", app.controller))
        .block(device_block("Controller 1-8".into()));
    f.render_widget(para, area);
}
