use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsmError {
    /// 0-based source line
    pub line: usize,
    pub msg: String,
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line + 1, self.msg)
    }
}

impl std::error::Error for AsmError {}

/// Every diagnostic found in one source, in line order. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostics(pub Vec<AsmError>);

impl Diagnostics {
    #[cfg(test)]
    pub fn first(&self) -> Option<&AsmError> {
        self.0.first()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &AsmError> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostics {}

impl From<AsmError> for Diagnostics {
    fn from(e: AsmError) -> Self {
        Diagnostics(vec![e])
    }
}
