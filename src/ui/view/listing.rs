use ratatui::Frame;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph};

use super::App;
use crate::batpu::disasm::DisasmLine;

pub(super) fn render_listing(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_type(BorderType::Rounded)
        .title("Program");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.listing.is_empty() {
        f.render_widget(Paragraph::new("no program loaded"), inner);
        return;
    }

    let start = visible_start(inner.height as usize, app);
    let items: Vec<ListItem> = app
        .listing
        .iter()
        .skip(start)
        .take(inner.height as usize)
        .map(|line| listing_item(line, app.cursor == line.addr))
        .collect();
    f.render_widget(List::new(items), inner);
}

/// First row shown, keeping the cursor on screen.
fn visible_start(rows: usize, app: &App) -> usize {
    let rows = rows.max(1);
    let mut start = app.list_scroll;
    if app.cursor >= start + rows {
        start = app.cursor + 1 - rows;
    }
    start.min(app.listing.len().saturating_sub(1))
}

fn listing_item(line: &DisasmLine, selected: bool) -> ListItem<'static> {
    let pc = if line.current { "▶" } else { " " };
    let bp = if line.breakpoint { "●" } else { " " };
    let text = format!("{bp}{pc} {:4}: {}  {}", line.addr, line.binary, line.text);

    let mut style = Style::default();
    if line.breakpoint {
        style = style.fg(Color::Red);
    }
    if line.current {
        style = style.bg(Color::Yellow).fg(Color::Black);
    }
    if selected {
        style = style.add_modifier(Modifier::REVERSED);
    }
    ListItem::new(text).style(style)
}
