//! Playback state machine and punctuation-aware word pacing.
//!
//! Pacing is a free-running comparison: every tick checks how long the current
//! word has been on screen against a delay recomputed from the live rate. There
//! is no fixed-period timer to restart, so a rate change or a pause applies on
//! the next tick without drift.

use crate::cancellation::CancellationToken;
use crate::sink::{DisplayFrame, FrameSink};
use crate::stream::WordStream;
use crate::ticker::Ticker;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

pub const MIN_WORDS_PER_SECOND: u32 = 1;
pub const MAX_WORDS_PER_SECOND: u32 = 30;
pub const DEFAULT_WORDS_PER_SECOND: u32 = 5;

const SENTENCE_END_MULTIPLIER: f64 = 2.0;
const CLAUSE_END_MULTIPLIER: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    Idle,
    Playing,
    Paused,
    Finished,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PlaybackState::Idle => "idle",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Finished => "finished",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PacingError {
    #[error("words per second must be between {min} and {max}, got {value}")]
    RateOutOfRange { value: u32, min: u32, max: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingConfig {
    words_per_second: u32,
}

impl PacingConfig {
    pub fn new(words_per_second: u32) -> Result<Self, PacingError> {
        validate_rate(words_per_second)?;
        Ok(Self { words_per_second })
    }

    pub fn words_per_second(&self) -> u32 {
        self.words_per_second
    }

    /// Rejected values leave the current rate untouched.
    pub fn set_words_per_second(&mut self, words_per_second: u32) -> Result<(), PacingError> {
        validate_rate(words_per_second)?;
        self.words_per_second = words_per_second;
        Ok(())
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            words_per_second: DEFAULT_WORDS_PER_SECOND,
        }
    }
}

fn validate_rate(value: u32) -> Result<(), PacingError> {
    if (MIN_WORDS_PER_SECOND..=MAX_WORDS_PER_SECOND).contains(&value) {
        Ok(())
    } else {
        Err(PacingError::RateOutOfRange {
            value,
            min: MIN_WORDS_PER_SECOND,
            max: MAX_WORDS_PER_SECOND,
        })
    }
}

/// Dwell multiplier for the word about to be left behind.
///
/// Sentence enders are checked before clause separators; a word cannot end in
/// both.
pub fn punctuation_multiplier(word: &str) -> f64 {
    if word.ends_with(|c| matches!(c, '.' | '!' | '?')) {
        SENTENCE_END_MULTIPLIER
    } else if word.ends_with(|c| matches!(c, ',' | ';' | ':' | '—')) {
        CLAUSE_END_MULTIPLIER
    } else {
        1.0
    }
}

/// How long `word` stays on screen at the given rate.
pub fn word_delay(word: &str, config: &PacingConfig) -> Duration {
    let base_secs = 1.0 / config.words_per_second().max(MIN_WORDS_PER_SECOND) as f64;
    Duration::from_secs_f64(base_secs * punctuation_multiplier(word))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not playing; the tick was ignored.
    Inactive,
    /// Delay for the current word has not elapsed yet.
    Waiting,
    Advanced,
    Finished,
}

#[derive(Debug)]
pub struct PacingEngine {
    state: PlaybackState,
    last_tick: Duration,
    config: PacingConfig,
    ticker: Ticker,
}

impl PacingEngine {
    pub fn new(config: PacingConfig, tick_period: Duration) -> Self {
        Self {
            state: PlaybackState::Idle,
            last_tick: Duration::ZERO,
            config,
            ticker: Ticker::new(tick_period),
        }
    }

    /// A `Playing` engine whose stop handle was cancelled from outside
    /// reports `Paused`.
    pub fn state(&self) -> PlaybackState {
        if self.state == PlaybackState::Playing && !self.ticker.is_armed() {
            PlaybackState::Paused
        } else {
            self.state
        }
    }

    pub fn config(&self) -> &PacingConfig {
        &self.config
    }

    pub fn set_words_per_second(&mut self, words_per_second: u32) -> Result<(), PacingError> {
        self.config.set_words_per_second(words_per_second)?;
        info!(words_per_second, state = %self.state, "Updated reading rate");
        Ok(())
    }

    pub fn is_armed(&self) -> bool {
        self.ticker.is_armed()
    }

    pub fn tick_handle(&self) -> Option<CancellationToken> {
        self.ticker.handle()
    }

    pub fn tick_period(&self) -> Duration {
        self.ticker.period()
    }

    /// Begin or resume playback. Returns `false` for an empty stream.
    pub fn start(
        &mut self,
        stream: &mut WordStream,
        now: Duration,
        sink: &mut dyn FrameSink,
    ) -> bool {
        if stream.is_empty() {
            debug!("Ignoring start on empty word stream");
            return false;
        }
        if self.state == PlaybackState::Finished && stream.is_at_end() {
            info!("Replaying finished stream from the first word");
            stream.set_cursor(0);
            sink.emit(&DisplayFrame::capture(stream, self.state));
        }
        self.last_tick = now;
        self.state = PlaybackState::Playing;
        self.ticker.arm();
        info!(
            cursor = stream.cursor(),
            words_per_second = self.config.words_per_second(),
            "Playback started"
        );
        true
    }

    /// Stop a running loop. Idle and finished engines are left as they are.
    pub fn pause(&mut self) {
        self.ticker.disarm();
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
            info!("Playback paused");
        }
    }

    /// Unconditional stop used before explicit jumps: any non-empty stream
    /// ends up `Paused`.
    pub(crate) fn halt_for_seek(&mut self, stream: &WordStream) {
        self.ticker.disarm();
        if !stream.is_empty() {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn toggle(&mut self, stream: &mut WordStream, now: Duration, sink: &mut dyn FrameSink) {
        if self.state() == PlaybackState::Playing {
            self.pause();
        } else {
            self.start(stream, now, sink);
        }
    }

    pub fn tick(
        &mut self,
        stream: &mut WordStream,
        now: Duration,
        sink: &mut dyn FrameSink,
    ) -> TickOutcome {
        if self.state != PlaybackState::Playing {
            return TickOutcome::Inactive;
        }
        if !self.ticker.is_armed() {
            self.pause();
            return TickOutcome::Inactive;
        }

        let delay = word_delay(stream.current(), &self.config);
        if now.saturating_sub(self.last_tick) < delay {
            return TickOutcome::Waiting;
        }

        if !stream.advance() {
            self.finish(stream, sink);
            return TickOutcome::Finished;
        }

        self.last_tick = now;
        debug!(cursor = stream.cursor(), word = stream.current(), "Advanced word");
        if stream.is_at_end() {
            self.finish(stream, sink);
            return TickOutcome::Finished;
        }
        sink.emit(&DisplayFrame::capture(stream, self.state));
        TickOutcome::Advanced
    }

    fn finish(&mut self, stream: &WordStream, sink: &mut dyn FrameSink) {
        self.state = PlaybackState::Finished;
        self.ticker.disarm();
        info!(cursor = stream.cursor(), total = stream.len(), "Reached end of stream");
        sink.emit(&DisplayFrame::capture(stream, self.state));
    }
}

impl Default for PacingEngine {
    fn default() -> Self {
        Self::new(PacingConfig::default(), crate::ticker::DEFAULT_TICK_PERIOD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn stream(words: &[&str]) -> WordStream {
        WordStream::new(words.iter().map(|w| w.to_string()).collect(), 0)
    }

    fn engine(wps: u32) -> PacingEngine {
        PacingEngine::new(PacingConfig::new(wps).expect("valid rate"), ms(16))
    }

    #[test]
    fn multiplier_checks_sentence_enders_then_clause_separators() {
        assert_eq!(punctuation_multiplier("end."), 2.0);
        assert_eq!(punctuation_multiplier("what?"), 2.0);
        assert_eq!(punctuation_multiplier("wow!"), 2.0);
        assert_eq!(punctuation_multiplier("list,"), 1.5);
        assert_eq!(punctuation_multiplier("clause;"), 1.5);
        assert_eq!(punctuation_multiplier("label:"), 1.5);
        assert_eq!(punctuation_multiplier("aside—"), 1.5);
        assert_eq!(punctuation_multiplier("plain"), 1.0);
        assert_eq!(punctuation_multiplier("mid.dle"), 1.0);
        assert_eq!(punctuation_multiplier(""), 1.0);
    }

    #[test]
    fn word_delay_scales_with_rate_and_punctuation() {
        let config = PacingConfig::new(2).expect("valid rate");
        assert_eq!(word_delay("Hello", &config), ms(500));
        assert_eq!(word_delay("world.", &config), ms(1_000));
        assert_eq!(word_delay("so,", &config), ms(750));
    }

    #[test]
    fn rate_outside_range_is_rejected_and_keeps_previous_value() {
        let mut config = PacingConfig::default();
        assert_eq!(
            config.set_words_per_second(0),
            Err(PacingError::RateOutOfRange {
                value: 0,
                min: MIN_WORDS_PER_SECOND,
                max: MAX_WORDS_PER_SECOND,
            })
        );
        assert!(config.set_words_per_second(31).is_err());
        assert_eq!(config.words_per_second(), DEFAULT_WORDS_PER_SECOND);
        assert!(PacingConfig::new(0).is_err());
    }

    #[test]
    fn start_on_empty_stream_stays_idle() {
        let mut engine = engine(2);
        let mut words = stream(&[]);
        let mut frames: Vec<DisplayFrame> = Vec::new();

        assert!(!engine.start(&mut words, ms(0), &mut frames));

        assert_eq!(engine.state(), PlaybackState::Idle);
        assert!(!engine.is_armed());
        assert!(frames.is_empty());
    }

    #[test]
    fn paces_hello_world_scenario_and_finishes() {
        let mut engine = engine(2);
        let mut words = stream(&["Hello", "world.", "Again"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);
        assert_eq!(engine.state(), PlaybackState::Playing);

        assert_eq!(engine.tick(&mut words, ms(499), &mut frames), TickOutcome::Waiting);
        assert_eq!(engine.tick(&mut words, ms(500), &mut frames), TickOutcome::Advanced);
        assert_eq!(words.cursor(), 1);

        // "world." carries the sentence multiplier: 1000ms from the last advance.
        assert_eq!(engine.tick(&mut words, ms(1_000), &mut frames), TickOutcome::Waiting);
        assert_eq!(engine.tick(&mut words, ms(1_499), &mut frames), TickOutcome::Waiting);
        assert_eq!(engine.tick(&mut words, ms(1_500), &mut frames), TickOutcome::Finished);
        assert_eq!(words.cursor(), 2);
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert!(!engine.is_armed());

        assert_eq!(engine.tick(&mut words, ms(60_000), &mut frames), TickOutcome::Inactive);
        assert_eq!(words.cursor(), 2);

        let cursors: Vec<usize> = frames.iter().map(|f| f.cursor).collect();
        assert_eq!(cursors, vec![1, 2]);
        assert_eq!(frames[1].state, PlaybackState::Finished);
        assert_eq!(frames[1].progress_percent, 100);
    }

    #[test]
    fn finishes_after_len_minus_one_advances() {
        let mut engine = engine(30);
        let mut words = stream(&["a", "b", "c", "d", "e"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);

        let mut now = ms(0);
        let mut advances = 0;
        loop {
            now += ms(100);
            match engine.tick(&mut words, now, &mut frames) {
                TickOutcome::Advanced => {
                    advances += 1;
                    assert_eq!(engine.state(), PlaybackState::Playing);
                }
                TickOutcome::Finished => {
                    advances += 1;
                    break;
                }
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(advances, words.len() - 1);
        for _ in 0..5 {
            now += ms(100);
            engine.tick(&mut words, now, &mut frames);
            assert_ne!(engine.state(), PlaybackState::Playing);
        }
    }

    #[test]
    fn rate_change_applies_on_the_very_next_tick() {
        let mut engine = engine(1);
        let mut words = stream(&["one", "two", "three"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);

        assert_eq!(engine.tick(&mut words, ms(200), &mut frames), TickOutcome::Waiting);
        engine.set_words_per_second(5).expect("valid rate");
        assert_eq!(engine.tick(&mut words, ms(201), &mut frames), TickOutcome::Advanced);
        assert_eq!(words.cursor(), 1);
    }

    #[test]
    fn pause_disarms_and_blocks_further_ticks() {
        let mut engine = engine(10);
        let mut words = stream(&["a", "b", "c"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);
        let handle = engine.tick_handle().expect("armed after start");

        engine.pause();
        engine.pause();

        assert!(handle.is_cancelled());
        assert_eq!(engine.state(), PlaybackState::Paused);
        assert_eq!(engine.tick(&mut words, ms(10_000), &mut frames), TickOutcome::Inactive);
        assert_eq!(words.cursor(), 0);
    }

    #[test]
    fn cancelled_handle_leaves_engine_paused() {
        let mut engine = engine(10);
        let mut words = stream(&["a", "b", "c"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);

        engine.tick_handle().expect("armed after start").cancel();

        assert!(!engine.is_armed());
        assert_eq!(engine.state(), PlaybackState::Paused);
        assert_eq!(engine.tick(&mut words, ms(5_000), &mut frames), TickOutcome::Inactive);
        assert_eq!(engine.state(), PlaybackState::Paused);
        assert_eq!(words.cursor(), 0);
        assert!(frames.is_empty());

        engine.toggle(&mut words, ms(6_000), &mut frames);
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert!(engine.is_armed());
    }

    #[test]
    fn toggle_alternates_between_playing_and_paused() {
        let mut engine = engine(10);
        let mut words = stream(&["a", "b"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();

        engine.toggle(&mut words, ms(0), &mut frames);
        assert_eq!(engine.state(), PlaybackState::Playing);
        engine.toggle(&mut words, ms(5), &mut frames);
        assert_eq!(engine.state(), PlaybackState::Paused);
        engine.toggle(&mut words, ms(10), &mut frames);
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[test]
    fn resume_measures_delay_from_start_time() {
        let mut engine = engine(2);
        let mut words = stream(&["a", "b", "c"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);
        engine.pause();

        engine.start(&mut words, ms(10_000), &mut frames);

        assert_eq!(engine.tick(&mut words, ms(10_400), &mut frames), TickOutcome::Waiting);
        assert_eq!(engine.tick(&mut words, ms(10_500), &mut frames), TickOutcome::Advanced);
    }

    #[test]
    fn start_after_finish_replays_from_first_word() {
        let mut engine = engine(10);
        let mut words = stream(&["a", "b"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);
        assert_eq!(engine.tick(&mut words, ms(100), &mut frames), TickOutcome::Finished);

        assert!(engine.start(&mut words, ms(200), &mut frames));

        assert_eq!(words.cursor(), 0);
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(frames.last().map(|f| f.cursor), Some(0));
    }

    #[test]
    fn single_word_stream_finishes_on_first_due_tick() {
        let mut engine = engine(10);
        let mut words = stream(&["solo"]);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        engine.start(&mut words, ms(0), &mut frames);

        assert_eq!(engine.tick(&mut words, ms(50), &mut frames), TickOutcome::Waiting);
        assert_eq!(engine.tick(&mut words, ms(100), &mut frames), TickOutcome::Finished);
        assert_eq!(engine.state(), PlaybackState::Finished);
        assert_eq!(frames.len(), 1);
    }
}
