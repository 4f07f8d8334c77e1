use thiserror::Error;

/// Conditions that halt the CPU. They are reported through the session
/// state, never as a process failure.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// Word does not decode to any instruction.
    #[error("illegal instruction {word:#06x} at address {pc}")]
    IllegalInstruction { pc: u16, word: u16 },

    /// `cal` with all call stack slots in use.
    #[error("call stack overflow at address {pc}")]
    CallStackOverflow { pc: u16 },

    /// `ret` with nothing to return to.
    #[error("return with empty call stack at address {pc}")]
    CallStackUnderflow { pc: u16 },
}

/// Errors at the program boundary: files, machine code images, requests.
#[derive(Error, Debug)]
pub enum BatError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected program; the message carries the diagnostics.
    #[error("{0}")]
    Load(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported file type: {0} (expected .as or .mc)")]
    FileType(String),
}
