//! Terminal front end: frame rendering on stdout and line commands on stdin.

use flashread_core::{DisplayFrame, FrameSink, PlaybackState, SessionCommand};
use std::io::{self, Write};

/// Columns reserved left of the focal character; the widest ORP prefix is
/// four characters, so the focus always lands in the same column.
const PREFIX_WIDTH: usize = 4;

pub struct TerminalSink<W: Write> {
    out: W,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl TerminalSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

pub fn render_frame(frame: &DisplayFrame) -> String {
    let marker = match frame.state {
        PlaybackState::Playing => ">",
        PlaybackState::Paused => "=",
        PlaybackState::Finished => "#",
        PlaybackState::Idle => " ",
    };
    format!(
        "{marker} {:>width$}[{}]{}  {:>3}% ({}/{})",
        frame.triple.prefix,
        frame.triple.focus,
        frame.triple.suffix,
        frame.progress_percent,
        (frame.cursor + 1).min(frame.word_count),
        frame.word_count,
        width = PREFIX_WIDTH,
    )
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn emit(&mut self, frame: &DisplayFrame) {
        let _ = write!(self.out, "\r\x1b[2K{}", render_frame(frame));
        let _ = self.out.flush();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserInput {
    Command(SessionCommand),
    Quit,
}

/// Parse one stdin line. Unknown input yields `None`.
pub fn parse_input(line: &str) -> Option<UserInput> {
    let line = line.trim();
    let command = match line {
        "" | "p" | " " => SessionCommand::TogglePlayPause,
        "q" => return Some(UserInput::Quit),
        "f" => SessionCommand::SkipForward,
        "b" => SessionCommand::SkipBackward,
        _ => {
            if let Some(rest) = line.strip_prefix('%') {
                let percent: f64 = rest.trim().parse().ok()?;
                SessionCommand::SeekToPercent {
                    fraction: percent / 100.0,
                }
            } else if let Some(rest) = line.strip_prefix('w') {
                let words_per_second: u32 = rest.trim().parse().ok()?;
                SessionCommand::SetWordsPerSecond { words_per_second }
            } else if line.starts_with('+') || line.starts_with('-') {
                let delta: i64 = line.trim_start_matches('+').parse().ok()?;
                SessionCommand::Skip { delta }
            } else {
                return None;
            }
        }
    };
    Some(UserInput::Command(command))
}
