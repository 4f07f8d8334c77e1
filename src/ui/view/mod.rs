use ratatui::{
    Frame,
    prelude::*,
    widgets::{Block, BorderType, Borders, Paragraph},
};

pub(super) use super::app::App;

mod display;
mod listing;
mod memory;
mod sidebar;

use display::render_devices;
use listing::render_listing;
use memory::render_memory;
use sidebar::render_sidebar;

pub fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(28),
            Constraint::Min(56),
            Constraint::Length(34),
        ])
        .split(chunks[1]);
    render_sidebar(f, columns[0], app);
    // 16 memory rows, a header and the border
    let middle = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(19)])
        .split(columns[1]);
    render_listing(f, middle[0], app);
    render_memory(f, middle[1], app);
    render_devices(f, columns[2], app);

    render_footer(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let st = &app.state;
    let (label, color) = if st.fault.is_some() {
        ("FAULT", Color::Red)
    } else if st.halted {
        ("HALTED", Color::Red)
    } else if app.is_running {
        ("RUNNING", Color::Green)
    } else {
        ("READY", Color::Yellow)
    };
    let last = st.last_instruction.as_deref().unwrap_or("-");
    let line = Line::from(vec![
        Span::styled(
            format!(" {label} "),
            Style::default().fg(Color::Black).bg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "  pc {}  instructions {}  program {} words  last: {last}",
            st.pc, st.instructions, st.program_length
        )),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_type(BorderType::Rounded)
        .title(format!("BatPU - {}", app.title));
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let text = match &app.message {
        Some(msg) => msg.clone(),
        None => "s:step  r:run/pause  x:reset  b:breakpoint  up/down:cursor  g:goto pc  1-8:buttons  0:release  q:quit".into(),
    };
    let style = if app.state.fault.is_some() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };
    let para = Paragraph::new(text)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded));
    f.render_widget(para, area);
}
