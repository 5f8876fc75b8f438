//! Ordered word sequence with a reading cursor.

/// Immutable word list owned by a single reading session.
///
/// `cursor` always stays within `0..len` (or at `0` for an empty stream);
/// `resume_index` is the last position committed for a later session.
#[derive(Debug, Clone, Default)]
pub struct WordStream {
    words: Vec<String>,
    cursor: usize,
    resume_index: usize,
}

impl WordStream {
    pub fn new(words: Vec<String>, start_index: usize) -> Self {
        let last = words.len().saturating_sub(1);
        let cursor = start_index.min(last);
        Self {
            words,
            cursor,
            resume_index: cursor,
        }
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn resume_index(&self) -> usize {
        self.resume_index
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn last_index(&self) -> usize {
        self.words.len().saturating_sub(1)
    }

    pub fn is_at_end(&self) -> bool {
        !self.words.is_empty() && self.cursor == self.last_index()
    }

    /// Word under the cursor, or `""` for an empty stream.
    pub fn current(&self) -> &str {
        self.words
            .get(self.cursor)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Move to the next word. Returns `false` at the last word.
    pub fn advance(&mut self) -> bool {
        if self.cursor + 1 < self.words.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    pub fn set_cursor(&mut self, index: usize) {
        if self.words.is_empty() {
            return;
        }
        self.cursor = index.min(self.last_index());
    }

    /// Record the current cursor as the position to restore next time.
    pub fn commit_resume(&mut self) {
        self.resume_index = self.cursor;
    }
}
