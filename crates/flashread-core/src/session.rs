use crate::cache::{SessionStore, StoredSession};
use crate::cancellation::CancellationToken;
use crate::config::AppConfig;
use crate::document::Document;
use crate::orp::DisplayTriple;
use crate::pacing::{PacingEngine, PacingError, PlaybackState, TickOutcome};
use crate::seek;
use crate::sink::{DisplayFrame, FrameSink};
use crate::stream::WordStream;
use anyhow::Result;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ReaderSnapshot {
    pub title: String,
    pub state: PlaybackState,
    pub cursor: usize,
    pub word_count: usize,
    pub resume_index: usize,
    pub frame: DisplayTriple,
    pub progress_percent: u8,
    pub words_per_second: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    GetSnapshot,
    Start,
    Pause,
    TogglePlayPause,
    Skip { delta: i64 },
    SkipForward,
    SkipBackward,
    SeekToPercent { fraction: f64 },
    SetWordsPerSecond { words_per_second: u32 },
}

impl SessionCommand {
    pub fn action(&self) -> &'static str {
        match self {
            Self::GetSnapshot => "reader_get_snapshot",
            Self::Start => "reader_start",
            Self::Pause => "reader_pause",
            Self::TogglePlayPause => "reader_toggle_play_pause",
            Self::Skip { .. } => "reader_skip",
            Self::SkipForward => "reader_skip_forward",
            Self::SkipBackward => "reader_skip_backward",
            Self::SeekToPercent { .. } => "reader_seek_to_percent",
            Self::SetWordsPerSecond { .. } => "reader_set_words_per_second",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub action: &'static str,
    pub snapshot: ReaderSnapshot,
}

/// One open document: its words, the cursor and the playback engine.
///
/// All mutation goes through `&mut self`, so the engine and seeks never race.
#[derive(Debug)]
pub struct ReaderSession {
    title: String,
    stream: WordStream,
    engine: PacingEngine,
    skip_step: i64,
}

impl ReaderSession {
    pub fn new(
        title: impl Into<String>,
        words: Vec<String>,
        resume_index: usize,
        config: &AppConfig,
    ) -> Self {
        Self {
            title: title.into(),
            stream: WordStream::new(words, resume_index),
            engine: PacingEngine::new(config.pacing(), config.tick_interval()),
            skip_step: config.skip_step.max(1),
        }
    }

    /// Restore a stored session if one exists, otherwise start `document`
    /// from the first word.
    pub fn open(
        store: &mut dyn SessionStore,
        session_id: &str,
        document: Document,
        config: &AppConfig,
    ) -> Result<Self> {
        let stored = store.load(session_id)?;
        let session = match stored {
            Some(record) if !record.words.is_empty() => {
                let title = if record.title.is_empty() {
                    document.title
                } else {
                    record.title
                };
                Self::new(title, record.words, record.progress, config)
            }
            Some(record) => Self::new(document.title, document.words, record.progress, config),
            None => Self::new(document.title, document.words, 0, config),
        };
        info!(
            title = %session.title,
            words = session.stream.len(),
            resume_index = session.stream.cursor(),
            "Opened reading session"
        );
        Ok(session)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn stream(&self) -> &WordStream {
        &self.stream
    }

    pub fn current_playback_state(&self) -> PlaybackState {
        self.engine.state()
    }

    pub fn words_per_second(&self) -> u32 {
        self.engine.config().words_per_second()
    }

    pub fn is_armed(&self) -> bool {
        self.engine.is_armed()
    }

    pub fn tick_handle(&self) -> Option<CancellationToken> {
        self.engine.tick_handle()
    }

    pub fn tick_period(&self) -> Duration {
        self.engine.tick_period()
    }

    pub fn current_frame(&self) -> DisplayFrame {
        DisplayFrame::capture(&self.stream, self.engine.state())
    }

    pub fn snapshot(&self) -> ReaderSnapshot {
        let frame = self.current_frame();
        ReaderSnapshot {
            title: self.title.clone(),
            state: frame.state,
            cursor: frame.cursor,
            word_count: frame.word_count,
            resume_index: self.stream.resume_index(),
            frame: frame.triple,
            progress_percent: frame.progress_percent,
            words_per_second: self.words_per_second(),
        }
    }

    pub fn start(&mut self, now: Duration, sink: &mut dyn FrameSink) -> bool {
        self.engine.start(&mut self.stream, now, sink)
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn toggle(&mut self, now: Duration, sink: &mut dyn FrameSink) {
        self.engine.toggle(&mut self.stream, now, sink);
    }

    pub fn skip(&mut self, delta: i64, sink: &mut dyn FrameSink) {
        seek::skip(&mut self.engine, &mut self.stream, delta, sink);
    }

    pub fn seek_to_percent(&mut self, fraction: f64, sink: &mut dyn FrameSink) {
        seek::seek_to_percent(&mut self.engine, &mut self.stream, fraction, sink);
    }

    pub fn set_words_per_second(&mut self, words_per_second: u32) -> Result<(), PacingError> {
        self.engine.set_words_per_second(words_per_second)
    }

    pub fn tick(&mut self, now: Duration, sink: &mut dyn FrameSink) -> TickOutcome {
        self.engine.tick(&mut self.stream, now, sink)
    }

    pub fn apply_command(
        &mut self,
        command: SessionCommand,
        now: Duration,
        sink: &mut dyn FrameSink,
    ) -> SessionEvent {
        let action = command.action();
        match command {
            SessionCommand::GetSnapshot => {}
            SessionCommand::Start => {
                self.start(now, sink);
            }
            SessionCommand::Pause => self.pause(),
            SessionCommand::TogglePlayPause => self.toggle(now, sink),
            SessionCommand::Skip { delta } => self.skip(delta, sink),
            SessionCommand::SkipForward => self.skip(self.skip_step, sink),
            SessionCommand::SkipBackward => self.skip(-self.skip_step, sink),
            SessionCommand::SeekToPercent { fraction } => self.seek_to_percent(fraction, sink),
            SessionCommand::SetWordsPerSecond { words_per_second } => {
                if let Err(err) = self.set_words_per_second(words_per_second) {
                    warn!(words_per_second, "Rejected rate change: {err}");
                }
            }
        }
        SessionEvent {
            action,
            snapshot: self.snapshot(),
        }
    }

    pub fn to_record(&self) -> StoredSession {
        StoredSession {
            title: self.title.clone(),
            words: self.stream.words().to_vec(),
            progress: self.stream.cursor(),
        }
    }

    /// Stop playback, commit the cursor and persist the session.
    pub fn close(&mut self, store: &mut dyn SessionStore, session_id: &str) -> Result<()> {
        self.engine.pause();
        self.stream.commit_resume();
        info!(
            title = %self.title,
            resume_index = self.stream.resume_index(),
            "Closing reading session"
        );
        store.save(session_id, &self.to_record())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySessionStore;
    use crate::sink::NullSink;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn build_test_session(words: &[&str], resume_index: usize) -> ReaderSession {
        let config = AppConfig {
            words_per_second: 2,
            skip_step: 3,
            ..AppConfig::default()
        };
        ReaderSession::new(
            "test",
            words.iter().map(|w| w.to_string()).collect(),
            resume_index,
            &config,
        )
    }

    fn document(words: &[&str]) -> Document {
        Document {
            title: "doc".to_string(),
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    #[test]
    fn command_dispatch_emits_expected_action_and_snapshot() {
        let mut session = build_test_session(&["Hello", "world.", "Again"], 0);

        let event = session.apply_command(SessionCommand::TogglePlayPause, ms(0), &mut NullSink);

        assert_eq!(event.action, "reader_toggle_play_pause");
        assert_eq!(event.snapshot.state, PlaybackState::Playing);
        assert_eq!(event.snapshot.frame.focus, "e");
        assert_eq!(event.snapshot.words_per_second, 2);
    }

    #[test]
    fn skip_forward_uses_configured_step_and_pauses() {
        let mut session = build_test_session(&["a", "b", "c", "d", "e", "f"], 0);
        session.start(ms(0), &mut NullSink);
        let mut frames: Vec<DisplayFrame> = Vec::new();

        let event = session.apply_command(SessionCommand::SkipForward, ms(10), &mut frames);
        assert_eq!(event.snapshot.cursor, 3);
        assert_eq!(event.snapshot.state, PlaybackState::Paused);

        let event = session.apply_command(SessionCommand::SkipBackward, ms(20), &mut frames);
        assert_eq!(event.snapshot.cursor, 0);
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn seek_command_floors_fraction() {
        let words: Vec<String> = (0..10).map(|i| format!("w{i}")).collect();
        let mut session = ReaderSession::new("ten", words, 0, &AppConfig::default());

        let event = session.apply_command(
            SessionCommand::SeekToPercent { fraction: 0.5 },
            ms(0),
            &mut NullSink,
        );

        assert_eq!(event.action, "reader_seek_to_percent");
        assert_eq!(event.snapshot.cursor, 4);
        assert_eq!(event.snapshot.progress_percent, 44);
    }

    #[test]
    fn rejected_rate_keeps_previous_rate() {
        let mut session = build_test_session(&["a", "b"], 0);

        let event = session.apply_command(
            SessionCommand::SetWordsPerSecond {
                words_per_second: 0,
            },
            ms(0),
            &mut NullSink,
        );
        assert_eq!(event.snapshot.words_per_second, 2);

        let event = session.apply_command(
            SessionCommand::SetWordsPerSecond {
                words_per_second: 12,
            },
            ms(0),
            &mut NullSink,
        );
        assert_eq!(event.snapshot.words_per_second, 12);
    }

    #[test]
    fn start_on_empty_session_is_noop() {
        let mut session = build_test_session(&[], 0);

        let event = session.apply_command(SessionCommand::Start, ms(0), &mut NullSink);

        assert_eq!(event.snapshot.state, PlaybackState::Idle);
        assert!(event.snapshot.frame.is_empty());
        assert!(!session.is_armed());
    }

    #[test]
    fn ticks_drive_the_stream_to_finished() {
        let mut session = build_test_session(&["Hello", "world.", "Again"], 0);
        let mut frames: Vec<DisplayFrame> = Vec::new();
        session.start(ms(0), &mut frames);

        assert_eq!(session.tick(ms(500), &mut frames), TickOutcome::Advanced);
        assert_eq!(session.tick(ms(1_500), &mut frames), TickOutcome::Finished);
        assert_eq!(session.current_playback_state(), PlaybackState::Finished);
        assert_eq!(session.tick(ms(9_000), &mut frames), TickOutcome::Inactive);
        assert_eq!(session.stream().cursor(), 2);
    }

    #[test]
    fn open_restores_stored_progress() {
        let mut store = MemorySessionStore::new();
        store
            .save(
                "id",
                &StoredSession {
                    title: "Stored".to_string(),
                    words: vec!["x".into(), "y".into(), "z".into()],
                    progress: 2,
                },
            )
            .expect("save");

        let session =
            ReaderSession::open(&mut store, "id", document(&["a"]), &AppConfig::default())
                .expect("open");

        assert_eq!(session.title(), "Stored");
        assert_eq!(session.stream().cursor(), 2);
        assert_eq!(session.stream().current(), "z");
    }

    #[test]
    fn open_without_record_starts_document_at_zero() {
        let mut store = MemorySessionStore::new();

        let session =
            ReaderSession::open(&mut store, "id", document(&["a", "b"]), &AppConfig::default())
                .expect("open");

        assert_eq!(session.title(), "doc");
        assert_eq!(session.stream().cursor(), 0);
        assert_eq!(session.current_playback_state(), PlaybackState::Idle);
    }

    #[test]
    fn open_clamps_stale_progress() {
        let mut store = MemorySessionStore::new();
        store
            .save(
                "id",
                &StoredSession {
                    title: String::new(),
                    words: Vec::new(),
                    progress: 50,
                },
            )
            .expect("save");

        let session =
            ReaderSession::open(&mut store, "id", document(&["a", "b"]), &AppConfig::default())
                .expect("open");

        assert_eq!(session.title(), "doc");
        assert_eq!(session.stream().cursor(), 1);
    }

    #[test]
    fn close_pauses_commits_and_saves() {
        let mut store = MemorySessionStore::new();
        let mut session = build_test_session(&["a", "b", "c"], 0);
        session.start(ms(0), &mut NullSink);
        session.tick(ms(500), &mut NullSink);

        session.close(&mut store, "id").expect("save");

        assert!(!session.is_armed());
        assert_eq!(session.current_playback_state(), PlaybackState::Paused);
        assert_eq!(session.stream().resume_index(), 1);
        let saved = store.get("id").expect("record saved");
        assert_eq!(saved.progress, 1);
        assert_eq!(saved.words.len(), 3);
    }
}
