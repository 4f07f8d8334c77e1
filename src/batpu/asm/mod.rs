// src/batpu/asm/mod.rs
mod assembler;
mod errors;
mod program;
pub(crate) mod utils;

pub use assembler::assemble;
pub use errors::{AsmError, Diagnostics};
pub use program::Program;
