//! Bounded chat history.

use std::collections::VecDeque;

/// Insertion-ordered chat log that drops its oldest line once full.
#[derive(Debug, Clone)]
pub struct ChatLog {
    lines: VecDeque<String>,
    capacity: usize,
}

impl ChatLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append a line, evicting from the front past capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push_back(line.into());
        while self.lines.len() > self.capacity {
            self.lines.pop_front();
        }
    }

    /// Lines oldest first.
    pub fn to_vec(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}
