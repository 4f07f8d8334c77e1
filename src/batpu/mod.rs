pub mod errors;
pub mod exec;
pub mod instruction;
pub mod isa;
pub mod memory;
pub mod ports;
pub mod registers;

pub mod decoder;
pub mod disasm;

pub mod asm;
pub mod encoder;
pub mod loader;

pub mod breakpoints;
pub mod session;
