use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Toggle {
    Added,
    Removed,
}

/// Program addresses where `run` pauses. Independent of the loaded program.
#[derive(Debug, Default, Clone)]
pub struct Breakpoints {
    addrs: BTreeSet<usize>,
}

impl Breakpoints {
    pub fn toggle(&mut self, addr: usize) -> Toggle {
        if self.addrs.remove(&addr) {
            Toggle::Removed
        } else {
            self.addrs.insert(addr);
            Toggle::Added
        }
    }

    pub fn contains(&self, addr: usize) -> bool {
        self.addrs.contains(&addr)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.addrs.is_empty()
    }
}
