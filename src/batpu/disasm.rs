use serde::Serialize;

use crate::batpu::breakpoints::Breakpoints;
use crate::batpu::decoder;
use crate::batpu::isa::binary_string;

/// One row of the disassembly listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisasmLine {
    pub addr: usize,
    pub text: String,
    pub binary: String,
    pub current: bool,
    pub breakpoint: bool,
}

pub fn disassemble(program: &[u16], pc: usize, breakpoints: &Breakpoints) -> Vec<DisasmLine> {
    program
        .iter()
        .enumerate()
        .map(|(addr, &word)| DisasmLine {
            addr,
            text: decoder::disasm(word),
            binary: binary_string(word),
            current: addr == pc,
            breakpoint: breakpoints.contains(addr),
        })
        .collect()
}
