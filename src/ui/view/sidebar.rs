use ratatui::Frame;
use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

use super::App;

pub(super) fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(20), Constraint::Min(3)])
        .split(area);
    render_registers(f, parts[0], app);
    render_call_stack(f, parts[1], app);
}

fn render_registers(f: &mut Frame, area: Rect, app: &App) {
    let st = &app.state;
    let mut rows: Vec<Row> = st
        .registers
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let style = if v != app.prev_registers[i] {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(format!("r{i}")),
                Cell::from(format!("{v:3}")),
                Cell::from(format!("{:#04x}", v)),
                Cell::from(format!("{:4}", v as i8)),
            ])
            .style(style)
        })
        .collect();
    rows.push(Row::new(vec![
        Cell::from("Z"),
        Cell::from(flag(st.flags.zero)),
        Cell::from("C"),
        Cell::from(flag(st.flags.carry)),
    ]));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_type(BorderType::Rounded)
        .title("Registers");
    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(5),
        ],
    )
    .block(block);
    f.render_widget(table, area);
}

fn flag(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}

fn render_call_stack(f: &mut Frame, area: Rect, app: &App) {
    let lines: Vec<Line> = if app.state.call_stack.is_empty() {
        vec![Line::styled("(empty)", Style::default().fg(Color::DarkGray))]
    } else {
        app.state
            .call_stack
            .iter()
            .rev()
            .map(|addr| Line::raw(format!("-> {addr}")))
            .collect()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .border_type(BorderType::Rounded)
        .title(format!("Call stack ({})", app.state.call_stack.len()));
    f.render_widget(Paragraph::new(lines).block(block), area);
}
