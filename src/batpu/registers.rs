// batpu/registers.rs
use crate::batpu::isa::{CALL_STACK_DEPTH, NUM_REGISTERS};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub zero: bool,
    pub carry: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    #[default]
    Ready,
    Running,
    Halted,
}

#[derive(Debug, Default, Clone)]
pub struct Cpu {
    pub r: [u8; NUM_REGISTERS], // r0..r15 (r0 always 0)
    pub pc: u16,
    pub flags: Flags,
    pub call_stack: Vec<u16>,
    pub state: CpuState,
    /// Instructions executed since the last reset.
    pub instructions: u64,
    /// Address of the most recently executed instruction.
    pub last_pc: Option<u16>,
}

impl Cpu {
    #[inline] pub fn read(&self, r: u8) -> u8 { if r == 0 { 0 } else { self.r[r as usize] } }
    #[inline] pub fn write(&mut self, r: u8, v: u8) { if r != 0 { self.r[r as usize] = v; } }

    pub fn halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    /// `false` when the stack is already full.
    pub fn push_return(&mut self, addr: u16) -> bool {
        if self.call_stack.len() >= CALL_STACK_DEPTH {
            return false;
        }
        self.call_stack.push(addr);
        true
    }

    pub fn pop_return(&mut self) -> Option<u16> {
        self.call_stack.pop()
    }
}
