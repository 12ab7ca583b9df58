//! Forward-only line cursor over one page of markup.
//!
//! The parsers pull lines one at a time. `peek` looks one line ahead and
//! `pushback` returns the most recently consumed line to the stream, which is
//! all the lookahead the wiki tables need.

pub struct LineCursor<'a> {
    lines: Vec<&'a str>,
    pos: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines().collect(),
            pos: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.pos < self.lines.len()
    }

    /// Next line without consuming it
    pub fn peek(&self) -> Option<&'a str> {
        self.lines.get(self.pos).copied()
    }

    /// Consume and return the next line
    pub fn advance(&mut self) -> Option<&'a str> {
        let line = self.lines.get(self.pos).copied()?;
        self.pos += 1;
        Some(line)
    }

    /// Consume the next line, skipping it once if it lacks `marker`
    pub fn advance_to_marked(&mut self, marker: &str) -> Option<&'a str> {
        let line = self.advance()?;
        if line.contains(marker) {
            return Some(line);
        }
        self.advance()
    }

    /// Un-consume the last line returned by `advance`
    pub fn pushback(&mut self) {
        self.pos = self.pos.saturating_sub(1);
    }

    /// 1-based number of the last consumed line, 0 before the first `advance`
    pub fn line_number(&self) -> usize {
        self.pos
    }
}
