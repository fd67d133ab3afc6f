use serde::{Deserialize, Serialize};

/// A byte range inside a document, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Make the selection usable against `text`: order the bounds, clamp them
    /// to the text length and move them off UTF-8 continuation bytes.
    pub fn normalized(self, text: &str) -> Self {
        let (a, b) = if self.start <= self.end {
            (self.start, self.end)
        } else {
            (self.end, self.start)
        };
        Self {
            start: floor_char_boundary(text, a),
            end: floor_char_boundary(text, b),
        }
    }
}

/// Largest char boundary `<= pos`, clamped to the text length.
pub fn floor_char_boundary(text: &str, pos: usize) -> usize {
    let mut pos = pos.min(text.len());
    while !text.is_char_boundary(pos) {
        pos -= 1;
    }
    pos
}
