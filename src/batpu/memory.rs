use crate::batpu::ports::{self, Peripherals};

pub const MEMORY_SIZE: usize = 256;

/// Byte-addressed data bus seen by the CPU core.
pub trait Bus {
    fn load8(&mut self, addr: u8) -> u8;
    fn store8(&mut self, addr: u8, value: u8);
}

/// 256-byte data memory with the port registry mapped over 240..=255.
#[derive(Debug, Clone)]
pub struct Memory {
    cells: [u8; MEMORY_SIZE],
    pub io: Peripherals,
}

impl Memory {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
            io: Peripherals::new(seed),
        }
    }

    pub fn reset(&mut self) {
        self.cells = [0; MEMORY_SIZE];
        self.io.reset();
    }

    /// Raw cell contents, without port read side effects.
    pub fn cells(&self) -> &[u8; MEMORY_SIZE] {
        &self.cells
    }
}

impl Bus for Memory {
    fn load8(&mut self, addr: u8) -> u8 {
        match ports::port(addr).and_then(|p| p.on_read(&mut self.io)) {
            Some(v) => v,
            None => self.cells[addr as usize],
        }
    }

    fn store8(&mut self, addr: u8, value: u8) {
        self.cells[addr as usize] = value;
        if let Some(p) = ports::port(addr) {
            tracing::trace!(port = p.name(), value, "port write");
            p.on_write(&mut self.io, value);
        }
    }
}
