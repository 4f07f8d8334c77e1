use ratatui::Frame;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use super::App;
use crate::batpu::ports::PORT_BASE;

const ROW_BYTES: usize = 16;

pub(super) fn render_memory(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_type(BorderType::Rounded)
        .title("Memory (ports from 0xF0)");
    let para = Paragraph::new(memory_lines(&app.state.memory, &app.prev_memory)).block(block);
    f.render_widget(para, area);
}

/// Header plus one line per 16 bytes: `F0 | 00 01 ...`.
fn memory_lines(memory: &[u8], prev: &[u8]) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let header: String = (0..ROW_BYTES).map(|col| format!(" {col:X} ")).collect();
    let mut lines = vec![Line::styled(format!("     {header}"), dim)];

    for (row, bytes) in memory.chunks(ROW_BYTES).enumerate() {
        let base = row * ROW_BYTES;
        let mut spans = vec![Span::styled(format!("{base:02X} | "), dim)];
        for (col, &value) in bytes.iter().enumerate() {
            let addr = base + col;
            let changed = prev.get(addr).is_some_and(|&p| p != value);
            spans.push(Span::styled(format!("{value:02X} "), cell_style(addr, changed)));
        }
        lines.push(Line::from(spans));
    }
    lines
}

fn cell_style(addr: usize, changed: bool) -> Style {
    if changed {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if addr >= PORT_BASE as usize {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}
