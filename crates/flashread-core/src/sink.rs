//! Push stream towards the renderer.

use crate::orp::{self, DisplayTriple};
use crate::pacing::PlaybackState;
use crate::progress;
use crate::stream::WordStream;

/// Everything a renderer needs to draw the current word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub triple: DisplayTriple,
    pub progress_percent: u8,
    pub cursor: usize,
    pub word_count: usize,
    pub state: PlaybackState,
}

impl DisplayFrame {
    pub fn capture(stream: &WordStream, state: PlaybackState) -> Self {
        Self {
            triple: orp::split(stream.current()),
            progress_percent: progress::percent(stream.cursor(), stream.len()),
            cursor: stream.cursor(),
            word_count: stream.len(),
            state,
        }
    }
}

/// Receives a frame after every cursor change, in mutation order.
pub trait FrameSink {
    fn emit(&mut self, frame: &DisplayFrame);
}

impl FrameSink for Vec<DisplayFrame> {
    fn emit(&mut self, frame: &DisplayFrame) {
        self.push(frame.clone());
    }
}

/// Sink that drops every frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn emit(&mut self, _frame: &DisplayFrame) {}
}
