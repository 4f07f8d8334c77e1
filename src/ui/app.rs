use super::{input::handle_key, view::ui};
use crate::batpu::disasm::DisasmLine;
use crate::batpu::exec::StopReason;
use crate::batpu::isa::NUM_REGISTERS;
use crate::batpu::session::{Session, StateSnapshot};
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use std::{
    io,
    time::{Duration, Instant},
};

pub struct App {
    pub(super) session: Session,
    pub(super) title: String,

    // Last values read back from the session
    pub(super) state: StateSnapshot,
    pub(super) listing: Vec<DisasmLine>,
    pub(super) prev_registers: [u8; NUM_REGISTERS],
    pub(super) prev_memory: Vec<u8>,

    // Listing cursor, used for breakpoint toggles
    pub(super) cursor: usize,
    pub(super) list_scroll: usize,
    /// Controller byte last sent to the session.
    pub(super) controller: u8,

    pub(super) is_running: bool,
    pub(super) last_step_time: Instant,
    pub(super) step_interval: Duration,
    /// Instructions per tick while running.
    pub(super) batch: u64,

    pub(super) message: Option<String>,
    pub(super) should_quit: bool,
}

impl App {
    pub fn new(session: Session, title: impl Into<String>) -> Self {
        let state = session.state();
        let listing = session.disasm().disasm;
        Self {
            prev_registers: state.registers,
            prev_memory: state.memory.clone(),
            state,
            listing,
            session,
            title: title.into(),
            cursor: 0,
            list_scroll: 0,
            controller: 0,
            is_running: false,
            last_step_time: Instant::now(),
            step_interval: Duration::from_millis(30),
            batch: 64,
            message: None,
            should_quit: false,
        }
    }

    pub(super) fn single_step(&mut self) {
        self.remember_state();
        let st = self.session.step();
        self.apply(st);
    }

    pub(super) fn toggle_running(&mut self) {
        if self.state.halted {
            self.message = Some("halted, press x to reset".into());
            return;
        }
        self.is_running = !self.is_running;
        self.message = None;
    }

    pub(super) fn reset(&mut self) {
        self.is_running = false;
        let st = self.session.reset();
        self.prev_registers = st.registers;
        self.prev_memory.clone_from(&st.memory);
        self.message = Some("reset".into());
        self.apply(st);
    }

    pub(super) fn toggle_breakpoint(&mut self) {
        let resp = self.session.breakpoint(self.cursor);
        self.message = resp
            .action
            .map(|a| format!("breakpoint {a:?} at {}", self.cursor).to_lowercase());
        self.listing = self.session.disasm().disasm;
    }

    /// Flips one controller button bit.
    pub(super) fn press_button(&mut self, bit: u8) {
        self.set_controller(self.controller ^ (1 << bit));
    }

    pub(super) fn set_controller(&mut self, value: u8) {
        self.controller = value;
        let st = self.session.input(value);
        self.apply(st);
    }

    pub(super) fn move_cursor(&mut self, delta: isize) {
        let last = self.listing.len().saturating_sub(1);
        self.cursor = self.cursor.saturating_add_signed(delta).min(last);
    }

    /// Values shown before the next step, for change highlighting.
    fn remember_state(&mut self) {
        self.prev_registers = self.state.registers;
        self.prev_memory.clone_from(&self.state.memory);
    }

    fn apply(&mut self, st: StateSnapshot) {
        if let Some(fault) = &st.fault {
            self.message = Some(fault.clone());
        }
        if st.halted {
            self.is_running = false;
        }
        self.state = st;
        self.listing = self.session.disasm().disasm;
    }

    fn tick(&mut self) {
        if self.is_running && self.last_step_time.elapsed() >= self.step_interval {
            self.remember_state();
            let st = self.session.run(Some(self.batch));
            if st.stop_reason == Some(StopReason::Breakpoint) {
                self.is_running = false;
                self.message = Some(format!("breakpoint at {}", st.pc));
            }
            self.apply(st);
            self.last_step_time = Instant::now();
        }
        // keep the listing following the PC while running
        if self.is_running {
            self.list_scroll = (self.state.pc as usize).saturating_sub(2);
        }
    }
}

pub fn run(terminal: &mut DefaultTerminal, mut app: App) -> io::Result<()> {
    let mut last_draw: Option<Instant> = None;
    loop {
        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                handle_key(&mut app, key);
            }
        }
        if app.should_quit {
            break;
        }
        app.tick();
        // ~60 FPS cap
        if last_draw.is_none_or(|t| t.elapsed() >= Duration::from_millis(16)) {
            terminal.draw(|f| ui(f, &app))?;
            last_draw = Some(Instant::now());
        }
    }
    Ok(())
}
