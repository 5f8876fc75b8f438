//! Word pacing and playback core for an RSVP reader.
//!
//! A [`session::ReaderSession`] owns a [`stream::WordStream`] and a
//! [`pacing::PacingEngine`]; every cursor change pushes a
//! [`sink::DisplayFrame`] (ORP split plus progress) to a [`sink::FrameSink`].
//! [`driver::run`] is a ready-made single-threaded tick loop.

pub mod cache;
pub mod cancellation;
pub mod config;
pub mod document;
pub mod driver;
pub mod orp;
pub mod pacing;
pub mod progress;
pub mod seek;
pub mod session;
pub mod sink;
pub mod stream;
pub mod text_utils;
pub mod ticker;

pub use cancellation::{CancellationToken, Cancelled};
pub use pacing::{PacingConfig, PacingEngine, PacingError, PlaybackState, TickOutcome};
pub use session::{ReaderSession, ReaderSnapshot, SessionCommand, SessionEvent};
pub use sink::{DisplayFrame, FrameSink};
