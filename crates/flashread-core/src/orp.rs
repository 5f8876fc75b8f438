//! Optimal recognition point (ORP) calculation.
//!
//! Every word is split around a single focal character so the reader's eye can
//! stay fixed on one column. The focal index depends only on the word length,
//! counted in Unicode scalar values rather than bytes.

/// A word split into the parts rendered left of, on, and right of the focal
/// column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayTriple {
    pub prefix: String,
    pub focus: String,
    pub suffix: String,
}

impl DisplayTriple {
    pub fn is_empty(&self) -> bool {
        self.prefix.is_empty() && self.focus.is_empty() && self.suffix.is_empty()
    }
}

/// Focal character index for a word.
pub fn orp_index(word: &str) -> usize {
    match word.chars().count() {
        0..=1 => 0,
        2..=5 => 1,
        6..=9 => 2,
        10..=13 => 3,
        _ => 4,
    }
}

/// Split a word into prefix, focal character and suffix.
pub fn split(word: &str) -> DisplayTriple {
    let idx = orp_index(word);
    let mut chars = word.char_indices().skip(idx);
    let Some((focus_start, focus_char)) = chars.next() else {
        return DisplayTriple {
            prefix: word.to_string(),
            focus: String::new(),
            suffix: String::new(),
        };
    };
    let focus_end = focus_start + focus_char.len_utf8();
    DisplayTriple {
        prefix: word[..focus_start].to_string(),
        focus: word[focus_start..focus_end].to_string(),
        suffix: word[focus_end..].to_string(),
    }
}
