//! The debugger session: one program, one CPU, one memory, one breakpoint set.
//!
//! Every front-end (CLI, `serve`, TUI) drives the machine only through the
//! operations here and reads it back through [`StateSnapshot`].

use serde::Serialize;

use crate::batpu::{
    asm::{self, Diagnostics, Program},
    breakpoints::{Breakpoints, Toggle},
    decoder,
    disasm::{self, DisasmLine},
    errors::Fault,
    exec::{self, StopReason},
    isa::{MAX_PROGRAM_WORDS, NUM_REGISTERS},
    loader,
    memory::Memory,
    registers::Cpu,
};

pub const DEFAULT_RUN_LIMIT: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Instruction limit for `run` when the caller gives none.
    pub default_run_limit: u64,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub rng_seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { default_run_limit: DEFAULT_RUN_LIMIT, rng_seed: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisasmResponse {
    pub disasm: Vec<DisasmLine>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreakpointResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<Toggle>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlagsView {
    pub zero: bool,
    pub carry: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub pc: u16,
    pub instructions: u64,
    pub program_length: usize,
    pub halted: bool,
    pub registers: [u8; NUM_REGISTERS],
    pub flags: FlagsView,
    pub memory: Vec<u8>,
    pub call_stack: Vec<u16>,
    pub number_display: Option<i16>,
    pub char_buffer: String,
    /// Characters written but not yet flushed to `char_buffer`.
    pub pending_chars: String,
    pub outputs: Vec<String>,
    pub pixel_x: u8,
    pub pixel_y: u8,
    pub signed_mode: bool,
    /// Visible screen, row-major, 1 = lit.
    pub screen: Vec<Vec<u8>>,
    pub fault: Option<String>,
    pub stop_reason: Option<StopReason>,
    pub last_instruction: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    program: Program,
    cpu: Cpu,
    mem: Memory,
    breakpoints: Breakpoints,
    fault: Option<Fault>,
    stop: Option<StopReason>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new(SessionConfig::default())
    }
}

impl Session {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            program: Program::default(),
            cpu: Cpu::default(),
            mem: Memory::new(config.rng_seed),
            breakpoints: Breakpoints::default(),
            fault: None,
            stop: None,
        }
    }

    /// Assembles `code` and, only on success, replaces the program and resets
    /// the machine. Breakpoints are kept.
    pub fn load(&mut self, code: &str) -> LoadResponse {
        self.install(asm::assemble(code), "assembled")
    }

    /// Like [`Session::load`] for a binary machine code image.
    pub fn load_machine_code(&mut self, text: &str) -> LoadResponse {
        self.install(loader::parse_machine_code(text), "loaded")
    }

    fn install(&mut self, result: Result<Program, Diagnostics>, verb: &str) -> LoadResponse {
        match result {
            Ok(program) => {
                let n = program.len();
                self.program = program;
                self.reset_machine();
                tracing::info!(words = n, "program loaded");
                LoadResponse { success: true, message: format!("{verb} {n} instructions") }
            }
            Err(diags) => {
                tracing::debug!(errors = diags.len(), "load rejected");
                LoadResponse { success: false, message: diags.to_string() }
            }
        }
    }

    pub fn step(&mut self) -> StateSnapshot {
        if let Err(fault) = exec::step(&mut self.cpu, &mut self.mem, &self.program) {
            self.record_fault(fault);
        }
        self.stop = self.cpu.halted().then_some(StopReason::Halted);
        self.state()
    }

    /// Runs up to `max` instructions (the configured limit when `None`).
    pub fn run(&mut self, max: Option<u64>) -> StateSnapshot {
        let max = max.unwrap_or(self.config.default_run_limit);
        let out = exec::run(&mut self.cpu, &mut self.mem, &self.program, &self.breakpoints, max);
        if let Some(fault) = out.fault {
            self.record_fault(fault);
        }
        match out.reason {
            StopReason::Breakpoint => tracing::info!(pc = self.cpu.pc, "breakpoint hit"),
            StopReason::Limit => tracing::info!(max, "run limit reached"),
            StopReason::Halted => tracing::debug!(executed = out.executed, "halted"),
        }
        self.stop = Some(out.reason);
        self.state()
    }

    pub fn reset(&mut self) -> StateSnapshot {
        self.reset_machine();
        self.state()
    }

    fn reset_machine(&mut self) {
        self.cpu = Cpu::default();
        self.mem.reset();
        self.fault = None;
        self.stop = None;
    }

    fn record_fault(&mut self, fault: Fault) {
        tracing::warn!(%fault, "cpu fault");
        self.fault = Some(fault);
    }

    pub fn breakpoint(&mut self, addr: usize) -> BreakpointResponse {
        if addr >= MAX_PROGRAM_WORDS {
            return BreakpointResponse { success: false, action: None };
        }
        let action = self.breakpoints.toggle(addr);
        BreakpointResponse { success: true, action: Some(action) }
    }

    /// Sets the controller sample read through port 255.
    pub fn input(&mut self, value: u8) -> StateSnapshot {
        self.mem.io.controller = value;
        self.state()
    }

    pub fn disasm(&self) -> DisasmResponse {
        DisasmResponse {
            disasm: disasm::disassemble(&self.program.text, self.cpu.pc as usize, &self.breakpoints),
        }
    }

    pub fn state(&self) -> StateSnapshot {
        let cpu = &self.cpu;
        let io = &self.mem.io;
        let mut registers = [0u8; NUM_REGISTERS];
        for (i, r) in registers.iter_mut().enumerate() {
            *r = cpu.read(i as u8);
        }
        let outputs = registers
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0)
            .map(|(i, v)| format!("r{i} = {v}"))
            .collect();
        let screen = io
            .screen()
            .iter()
            .map(|row| row.iter().map(|&lit| lit as u8).collect())
            .collect();

        StateSnapshot {
            pc: cpu.pc,
            instructions: cpu.instructions,
            program_length: self.program.len(),
            halted: cpu.halted(),
            registers,
            flags: FlagsView { zero: cpu.flags.zero, carry: cpu.flags.carry },
            memory: self.mem.cells().to_vec(),
            call_stack: cpu.call_stack.clone(),
            number_display: io.number_display(),
            char_buffer: io.char_buffer().to_string(),
            pending_chars: io.pending_chars().to_string(),
            outputs,
            pixel_x: io.pixel_x,
            pixel_y: io.pixel_y,
            signed_mode: io.signed_mode,
            screen,
            fault: self.fault.map(|f| f.to_string()),
            stop_reason: self.stop,
            last_instruction: cpu
                .last_pc
                .and_then(|pc| self.program.word(pc as usize))
                .map(decoder::disasm),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUM: &str = "ldi r1 5\nldi r2 3\nadd r1 r2 r3\nhlt";

    fn session() -> Session {
        Session::new(SessionConfig { default_run_limit: 1000, rng_seed: Some(42) })
    }

    fn loaded(src: &str) -> Session {
        let mut s = session();
        let resp = s.load(src);
        assert!(resp.success, "{}", resp.message);
        s
    }

    #[test]
    fn load_reports_word_count() {
        let mut s = session();
        let resp = s.load(SUM);
        assert_eq!(resp, LoadResponse { success: true, message: "assembled 4 instructions".into() });
        assert_eq!(s.state().program_length, 4);
    }

    #[test]
    fn failed_load_leaves_session_untouched() {
        let mut s = loaded(SUM);
        s.step();
        let before = s.state();
        let resp = s.load("ldi r1 5\nfrobnicate r1");
        assert!(!resp.success);
        assert!(resp.message.contains("line 2"), "{}", resp.message);
        assert_eq!(s.state(), before);
    }

    #[test]
    fn sum_program_runs_to_halt() {
        let mut s = loaded(SUM);
        let st = s.run(None);
        assert!(st.halted);
        assert_eq!(st.registers[3], 8);
        assert_eq!(st.instructions, 4);
        assert_eq!(st.flags, FlagsView { zero: false, carry: false });
        assert_eq!(st.outputs, vec!["r1 = 5", "r2 = 3", "r3 = 8"]);
        assert_eq!(st.stop_reason, Some(StopReason::Halted));
        assert_eq!(st.last_instruction.as_deref(), Some("hlt"));
    }

    #[test]
    fn step_on_halted_session_is_idempotent() {
        let mut s = loaded("hlt");
        let first = s.step();
        assert!(first.halted);
        let second = s.step();
        assert_eq!(first, second);
        assert_eq!(s.state(), second);
    }

    #[test]
    fn reset_clears_machine_and_keeps_breakpoints() {
        let mut s = loaded("ldi r1 1\nldi r2 2\nstr r1 r2\nhlt");
        s.breakpoint(2);
        s.run(None);
        let st = s.reset();
        assert_eq!(st.pc, 0);
        assert_eq!(st.instructions, 0);
        assert!(!st.halted);
        assert_eq!(st.registers, [0; NUM_REGISTERS]);
        assert!(st.memory.iter().all(|&b| b == 0));
        assert!(st.call_stack.is_empty());
        assert_eq!(st.fault, None);
        assert_eq!(st.stop_reason, None);
        assert_eq!(st.program_length, 4);
        assert!(s.disasm().disasm[2].breakpoint);
    }

    #[test]
    fn breakpoint_toggles_and_pauses_run() {
        let mut s = loaded("ldi r1 1\nldi r2 2\nldi r3 3\nhlt");
        assert_eq!(s.breakpoint(2).action, Some(Toggle::Added));
        let st = s.run(None);
        assert_eq!(st.pc, 2);
        assert_eq!(st.stop_reason, Some(StopReason::Breakpoint));
        // resuming from the breakpoint makes progress
        let st = s.run(None);
        assert!(st.halted);
        assert_eq!(st.registers[3], 3);
        assert_eq!(s.breakpoint(2).action, Some(Toggle::Removed));
    }

    #[test]
    fn out_of_range_breakpoint_is_rejected() {
        let mut s = session();
        assert_eq!(s.breakpoint(MAX_PROGRAM_WORDS), BreakpointResponse { success: false, action: None });
    }

    #[test]
    fn breakpoints_survive_load() {
        let mut s = session();
        s.breakpoint(1);
        s.load("nop\nnop\nhlt");
        let st = s.run(None);
        assert_eq!(st.pc, 1);
        assert_eq!(st.stop_reason, Some(StopReason::Breakpoint));
    }

    #[test]
    fn run_limit_is_not_a_halt() {
        let mut s = loaded(".loop\njmp .loop");
        let st = s.run(Some(10));
        assert!(!st.halted);
        assert_eq!(st.instructions, 10);
        assert_eq!(st.stop_reason, Some(StopReason::Limit));
        let st = s.run(None);
        assert_eq!(st.instructions, 1010);
    }

    #[test]
    fn deep_calls_fault_instead_of_crashing() {
        let mut s = loaded(".f\ncal .f");
        let st = s.run(None);
        assert!(st.halted);
        assert_eq!(st.call_stack.len(), 16);
        assert!(st.fault.as_deref().unwrap_or("").contains("overflow"));
    }

    #[test]
    fn controller_input_reaches_port_and_survives_reset() {
        let mut s = loaded("ldi r1 255\nlod r2 r1\nhlt");
        s.input(0b1010);
        assert_eq!(s.run(None).registers[2], 0b1010);
        s.reset();
        assert_eq!(s.run(None).registers[2], 0b1010);
    }

    #[test]
    fn screen_and_chars_show_up_in_snapshot() {
        let src = "\
            ldi r1 240\n ldi r2 3\n str r2 r1\n\
            ldi r1 241\n ldi r2 4\n str r2 r1\n\
            ldi r1 242\n str r2 r1\n\
            ldi r1 245\n str r2 r1\n\
            ldi r1 247\n ldi r2 8\n str r2 r1\n ldi r2 9\n str r2 r1\n\
            ldi r1 248\n str r2 r1\n\
            ldi r1 250\n ldi r2 200\n str r2 r1\n\
            hlt";
        let mut s = loaded(src);
        let st = s.run(None);
        assert_eq!(st.screen[4][3], 1);
        assert_eq!(st.screen.iter().flatten().filter(|&&p| p == 1).count(), 1);
        assert_eq!(st.char_buffer, "hi");
        assert_eq!(st.number_display, Some(200));
        assert_eq!((st.pixel_x, st.pixel_y), (3, 4));
    }

    #[test]
    fn reset_clears_flags_and_every_device() {
        let src = "\
            ldi r1 240\n ldi r2 3\n str r2 r1\n\
            ldi r1 242\n str r2 r1\n\
            ldi r1 245\n str r2 r1\n\
            ldi r1 247\n ldi r2 8\n str r2 r1\n\
            ldi r1 248\n str r2 r1\n\
            ldi r1 247\n ldi r2 29\n str r2 r1\n\
            ldi r1 250\n str r2 r1\n\
            ldi r1 255\n adi r1 1\n\
            hlt";
        let mut s = loaded(src);
        let st = s.run(None);
        assert!(st.flags.zero && st.flags.carry);
        assert_eq!(st.number_display, Some(29));
        assert_eq!(st.char_buffer, "h");
        assert_eq!(st.pending_chars, "?");
        assert_eq!(st.screen.iter().flatten().filter(|&&p| p == 1).count(), 1);
        s.breakpoint(3);

        let st = s.reset();
        assert!(!st.flags.zero && !st.flags.carry);
        assert_eq!(st.number_display, None);
        assert_eq!(st.char_buffer, "");
        assert_eq!(st.pending_chars, "");
        assert!(st.screen.iter().flatten().all(|&p| p == 0));
        assert_eq!((st.pixel_x, st.pixel_y), (0, 0));
        assert_eq!(st.last_instruction, None);
        assert!(s.disasm().disasm[3].breakpoint);
    }

    #[test]
    fn seeded_rng_repeats_after_reset() {
        let mut s = loaded("ldi r1 254\nlod r2 r1\nlod r3 r1\nhlt");
        let a = s.run(None).registers;
        s.reset();
        let b = s.run(None).registers;
        assert_eq!(a, b);
    }

    #[test]
    fn machine_code_load_matches_assembly() {
        let mut s = session();
        let resp = s.load_machine_code("1000000100000101\n1000001000000011\n0010000100100011\n0001000000000000\n");
        assert!(resp.success, "{}", resp.message);
        assert_eq!(s.run(None).registers[3], 8);
    }

    #[test]
    fn snapshot_serializes_camel_case() {
        let s = loaded(SUM);
        let json = serde_json::to_value(s.state()).unwrap();
        assert_eq!(json["programLength"], 4);
        assert_eq!(json["screen"].as_array().map(Vec::len), Some(32));
        assert_eq!(json["memory"].as_array().map(Vec::len), Some(256));
        assert!(json["stopReason"].is_null());
        assert!(json.get("callStack").is_some());
    }
}
