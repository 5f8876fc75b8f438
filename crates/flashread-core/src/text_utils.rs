//! Word splitting for RSVP playback.

use unicode_normalization::UnicodeNormalization;

/// Split text on any whitespace run, discarding empty tokens.
///
/// Text is NFC-normalized first so a decomposed accent counts as a single
/// character when the focal point is computed.
pub fn split_words(text: &str) -> Vec<String> {
    let normalized: String = text.nfc().collect();
    normalized
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
