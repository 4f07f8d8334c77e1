// Structure returned by the assembler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    /// Instruction words, index = address.
    pub text: Vec<u16>,
    /// 0-based source line of each word, same length as `text`.
    pub lines: Vec<usize>,
}

impl Program {
    #[cfg(test)]
    pub fn from_words(text: Vec<u16>) -> Self {
        let lines = (0..text.len()).collect();
        Program { text, lines }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn word(&self, addr: usize) -> Option<u16> {
        self.text.get(addr).copied()
    }
}
