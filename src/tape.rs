//! A logically bi-infinite tape stored as a zipper of two vectors.
//!
//! `before` holds the cells strictly left of the head in left-to-right order. `after` holds
//! the head cell and everything right of it, head last, so both moves are a pop and a push.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    blank: char,
    before: Vec<char>,
    after: Vec<char>,
    position: isize,
}

impl Tape {
    /// Creates a tape holding `input` with the head on its first symbol.
    /// An empty input yields a single blank cell.
    pub fn new(blank: char, input: &[char]) -> Self {
        let mut after: Vec<char> = input.iter().rev().copied().collect();
        if after.is_empty() {
            after.push(blank);
        }

        Self {
            blank,
            before: Vec::new(),
            after,
            position: 0,
        }
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> char {
        self.after.last().copied().unwrap_or(self.blank)
    }

    /// Replaces the symbol under the head.
    pub fn write(&mut self, symbol: char) {
        match self.after.last_mut() {
            Some(cell) => *cell = symbol,
            None => self.after.push(symbol),
        }
    }

    pub fn head_left(&mut self) {
        let cell = self.before.pop().unwrap_or(self.blank);
        self.after.push(cell);
        self.position -= 1;
    }

    pub fn head_right(&mut self) {
        if let Some(cell) = self.after.pop() {
            self.before.push(cell);
        }
        if self.after.is_empty() {
            self.after.push(self.blank);
        }
        self.position += 1;
    }

    /// Reads the cell `offset` positions from the head (negative is left).
    /// Cells never written read as blank.
    pub fn read_offset(&self, offset: isize) -> char {
        let cell = if offset >= 0 {
            let i = offset.unsigned_abs();
            self.after
                .len()
                .checked_sub(i + 1)
                .and_then(|index| self.after.get(index))
        } else {
            let i = offset.unsigned_abs();
            self.before
                .len()
                .checked_sub(i)
                .and_then(|index| self.before.get(index))
        };

        cell.copied().unwrap_or(self.blank)
    }

    /// Reads the offsets in `[start, end)` relative to the head.
    pub fn read_range(&self, start: isize, end: isize) -> Vec<char> {
        (start..end).map(|offset| self.read_offset(offset)).collect()
    }

    /// Head index relative to the first input cell.
    pub fn position(&self) -> isize {
        self.position
    }

    /// Every cell visited so far, left to right.
    pub fn cells(&self) -> Vec<char> {
        self.before
            .iter()
            .chain(self.after.iter().rev())
            .copied()
            .collect()
    }

    /// Index of the head within [`Tape::cells`].
    pub fn head_index(&self) -> usize {
        self.before.len()
    }
}

impl fmt::Display for Tape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let before: String = self.before.iter().collect();
        let rest: String = self.after.iter().rev().skip(1).collect();
        write!(f, "{before}[{}]{rest}", self.read())
    }
}
