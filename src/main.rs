//! Entry point for the terminal RSVP reader.
//!
//! - Parse command-line arguments.
//! - Load configuration (default `conf/config.toml`).
//! - Load the document and restore any cached session.
//! - Run the playback loop, feeding it commands read from stdin.
//! - Save the session on exit.

mod terminal;

use crate::terminal::{TerminalSink, UserInput, parse_input};
use anyhow::{Context, Result, anyhow};
use flashread_core::cache::{FileSessionStore, session_id_for};
use flashread_core::config::{AppConfig, load_config};
use flashread_core::document::load_document_with_cancel;
use flashread_core::driver::{self, RunMode};
use flashread_core::ticker::{Clock, MonotonicClock};
use flashread_core::{CancellationToken, FrameSink, PacingConfig, ReaderSession, SessionCommand};
use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";
const USAGE: &str = "Usage: flashread [--config <path>] [--wps <n>] <document>";

#[derive(Debug)]
struct CliArgs {
    config_path: PathBuf,
    words_per_second: Option<u32>,
    document: PathBuf,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let args = parse_args(env::args().skip(1))?;
    let mut config = load_config(&args.config_path);
    if let Some(words_per_second) = args.words_per_second {
        PacingConfig::new(words_per_second).context("Invalid --wps value")?;
        config.words_per_second = words_per_second;
    }
    set_log_level(reload_handle, config.log_level.as_filter_str());
    info!(
        path = %args.document.display(),
        level = %config.log_level,
        words_per_second = config.words_per_second,
        "Starting flashread"
    );

    let stop = CancellationToken::new();
    install_ctrlc_handler(&stop);
    let document = load_document_with_cancel(&args.document, Some(&stop))?;
    let mut store = FileSessionStore::new(&config.cache_dir);
    let session_id = session_id_for(&args.document);
    let mut session = ReaderSession::open(&mut store, &session_id, document, &config)?;

    let (tx, rx) = mpsc::channel();
    spawn_stdin_reader(tx, stop.clone());

    let clock = MonotonicClock::new();
    let mut sink = TerminalSink::stdout();
    print_help(&config);
    sink.emit(&session.current_frame());
    session.start(clock.now(), &mut sink);

    let state = driver::run(
        &mut session,
        &clock,
        &mut sink,
        Some(&rx),
        &stop,
        RunMode::Interactive,
    );
    println!();
    info!(state = %state, "Playback stopped");

    session
        .close(&mut store, &session_id)
        .context("Failed to save reading session")?;
    Ok(())
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliArgs> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut words_per_second = None;
    let mut document = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let value = args.next().ok_or_else(|| anyhow!("{USAGE}"))?;
                config_path = PathBuf::from(value);
            }
            "--wps" => {
                let value = args.next().ok_or_else(|| anyhow!("{USAGE}"))?;
                let parsed = value
                    .parse::<u32>()
                    .with_context(|| format!("Invalid --wps value '{value}'"))?;
                words_per_second = Some(parsed);
            }
            "-h" | "--help" => return Err(anyhow!("{USAGE}")),
            _ if document.is_none() => document = Some(PathBuf::from(arg)),
            _ => return Err(anyhow!("Unexpected argument '{arg}'\n{USAGE}")),
        }
    }

    let document = document.ok_or_else(|| anyhow!("{USAGE}"))?;
    if !document.exists() {
        return Err(anyhow!("File not found: {}", document.display()));
    }
    Ok(CliArgs {
        config_path,
        words_per_second,
        document,
    })
}

fn install_ctrlc_handler(stop: &CancellationToken) {
    let stop = stop.clone();
    if let Err(err) = ctrlc::set_handler(move || {
        info!("Received Ctrl+C; stopping playback");
        stop.cancel();
    }) {
        warn!("Failed to install Ctrl+C signal handler: {err}");
    }
}

/// Reads stdin on its own thread; the session itself is only touched by the
/// playback loop.
fn spawn_stdin_reader(tx: Sender<SessionCommand>, stop: CancellationToken) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    warn!("Failed to read stdin: {err}");
                    break;
                }
            };
            match parse_input(&line) {
                Some(UserInput::Quit) => {
                    stop.cancel();
                    break;
                }
                Some(UserInput::Command(command)) => {
                    if tx.send(command).is_err() {
                        break;
                    }
                }
                None => debug!(input = %line, "Ignoring unrecognised input"),
            }
        }
    });
}

fn print_help(config: &AppConfig) {
    eprintln!(
        "Enter: p/<enter> play-pause, f/b skip {step}, +N/-N skip, %NN seek, w N rate, q quit",
        step = config.skip_step
    );
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    debug!("Logging initialized; override level with config.log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(err) = handle.modify(|filter| *filter = parsed) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        debug!(%level, "Applied log level from config");
    }
}
