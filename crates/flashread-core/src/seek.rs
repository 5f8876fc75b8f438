//! Explicit jumps within the stream.
//!
//! Both operations stop the engine before touching the cursor, so a tick that
//! was already scheduled can never land after the jump.

use crate::pacing::PacingEngine;
use crate::sink::{DisplayFrame, FrameSink};
use crate::stream::WordStream;
use tracing::info;

/// Move the cursor by `delta` words, clamped to the stream bounds.
pub fn skip(
    engine: &mut PacingEngine,
    stream: &mut WordStream,
    delta: i64,
    sink: &mut dyn FrameSink,
) {
    engine.halt_for_seek(stream);
    let from = stream.cursor();
    let target = (from as i64).saturating_add(delta).max(0);
    stream.set_cursor(usize::try_from(target).unwrap_or(usize::MAX));
    info!(delta, from, to = stream.cursor(), "Skipped words");
    sink.emit(&DisplayFrame::capture(stream, engine.state()));
}

/// Jump to `floor(fraction * (len - 1))`. `fraction` is clamped to `[0, 1]`
/// and NaN is treated as 0.
pub fn seek_to_percent(
    engine: &mut PacingEngine,
    stream: &mut WordStream,
    fraction: f64,
    sink: &mut dyn FrameSink,
) {
    engine.halt_for_seek(stream);
    let fraction = if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    };
    let target = (fraction * stream.last_index() as f64).floor() as usize;
    stream.set_cursor(target);
    info!(fraction, to = stream.cursor(), "Seeked to position");
    sink.emit(&DisplayFrame::capture(stream, engine.state()));
}
