use crate::ui::app::App;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && matches!(key.code, KeyCode::Char('c')) {
        app.should_quit = true;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('s') => {
            app.is_running = false;
            app.single_step();
        }
        KeyCode::Char('r') => app.toggle_running(),
        KeyCode::Char('x') => app.reset(),
        KeyCode::Char('b') => app.toggle_breakpoint(),

        // controller buttons: 1..=8 flip bits 0..=7, 0 releases all
        KeyCode::Char(c @ '1'..='8') => app.press_button(c as u8 - b'1'),
        KeyCode::Char('0') => app.set_controller(0),

        KeyCode::Up => app.move_cursor(-1),
        KeyCode::Down => app.move_cursor(1),
        KeyCode::PageUp => app.move_cursor(-16),
        KeyCode::PageDown => app.move_cursor(16),
        KeyCode::Home => app.move_cursor(isize::MIN / 2),
        KeyCode::End => app.move_cursor(isize::MAX / 2),
        KeyCode::Char('g') => {
            app.cursor = app.state.pc as usize;
            app.move_cursor(0);
        }
        _ => {}
    }
    follow_cursor(app);
}

fn follow_cursor(app: &mut App) {
    if app.cursor < app.list_scroll {
        app.list_scroll = app.cursor;
    }
}
