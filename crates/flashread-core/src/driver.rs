//! Cooperative playback loop.
//!
//! Runs entirely on the calling thread: queued commands are applied, the loop
//! sleeps one tick period, then the session ticks. Other threads interact only
//! through the command channel and the stop token.

use crate::cancellation::CancellationToken;
use crate::pacing::PlaybackState;
use crate::session::{ReaderSession, SessionCommand};
use crate::sink::FrameSink;
use crate::ticker::Clock;
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Return as soon as no tick loop is armed.
    UntilIdle,
    /// Keep waiting for commands while the channel is open.
    Interactive,
}

pub fn run(
    session: &mut ReaderSession,
    clock: &dyn Clock,
    sink: &mut dyn FrameSink,
    commands: Option<&Receiver<SessionCommand>>,
    stop: &CancellationToken,
    mode: RunMode,
) -> PlaybackState {
    let mut commands_open = commands.is_some();
    loop {
        if stop.is_cancelled() {
            info!("Stop requested; pausing playback");
            session.pause();
            break;
        }

        if let Some(receiver) = commands.filter(|_| commands_open) {
            loop {
                match receiver.try_recv() {
                    Ok(command) => {
                        let event = session.apply_command(command, clock.now(), sink);
                        debug!(
                            action = event.action,
                            cursor = event.snapshot.cursor,
                            state = %event.snapshot.state,
                            "Applied command"
                        );
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        commands_open = false;
                        break;
                    }
                }
            }
        }

        let handle = session.tick_handle();
        if handle.is_none() && (mode == RunMode::UntilIdle || !commands_open) {
            break;
        }

        thread::sleep(session.tick_period());

        // A handle cancelled while we slept belongs to a loop that no longer
        // exists; its tick must not run.
        if handle.is_some_and(|handle| !handle.is_cancelled()) {
            session.tick(clock.now(), sink);
        }
    }

    let state = session.current_playback_state();
    info!(
        state = %state,
        cursor = session.stream().cursor(),
        "Playback loop exited"
    );
    state
}
