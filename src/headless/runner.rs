//! Headless runner - drives the engine from stdin and prints NDJSON
//!
//! Stdin is read on a dedicated blocking thread. Parsed commands, engine
//! messages and Ctrl+C are multiplexed on one task, so the engine only ever
//! sees one message at a time.

use tokio::sync::{broadcast, mpsc};

use beectl_app::config::Settings;
use beectl_app::{Engine, EngineEvent, Message};
use beectl_core::prelude::*;
use beectl_device::MediaStore;

use super::commands::{parse_command, ConsoleCommand};
use super::HeadlessEvent;

/// Lines parsed on the stdin thread, or the reason a line was rejected.
type ConsoleInput = std::result::Result<ConsoleCommand, String>;

const CONSOLE_CHANNEL_CAPACITY: usize = 64;

/// Run the headless console until `quit` or Ctrl+C.
pub async fn run_headless(settings: Settings) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("beectl starting in headless mode");
    info!("Device: {}:{}", settings.device.host, settings.device.port);
    info!("═══════════════════════════════════════════════════════");

    let mut engine = Engine::new(settings);
    let mut events = engine.subscribe();

    let (console_tx, console_rx) = mpsc::channel(CONSOLE_CHANNEL_CAPACITY);
    std::thread::spawn(move || {
        spawn_stdin_reader_blocking(console_tx);
    });

    HeadlessEvent::connection(engine.connection_state()).emit();

    let result = headless_event_loop(&mut engine, &mut events, console_rx).await;

    engine.shutdown().await;
    emit_engine_events(&mut events);

    info!("beectl headless mode exiting");
    result
}

/// Main headless event loop
async fn headless_event_loop(
    engine: &mut Engine,
    events: &mut broadcast::Receiver<EngineEvent>,
    mut console_rx: mpsc::Receiver<ConsoleInput>,
) -> Result<()> {
    let mut stdin_open = true;

    loop {
        if engine.should_quit() {
            info!("Quit requested");
            break;
        }

        tokio::select! {
            msg = engine.msg_rx.recv() => match msg {
                Some(msg) => engine.process_message(msg),
                None => {
                    info!("Message channel closed");
                    break;
                }
            },
            input = console_rx.recv(), if stdin_open => match input {
                Some(Ok(command)) => run_command(engine, command),
                Some(Err(problem)) => HeadlessEvent::error(problem, false).emit(),
                None => {
                    // Keep running on EOF so piped scripts can watch the device.
                    debug!("Stdin closed");
                    stdin_open = false;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                engine.process_message(Message::Quit);
            }
        }

        emit_engine_events(events);
    }

    Ok(())
}

fn run_command(engine: &mut Engine, command: ConsoleCommand) {
    match command {
        ConsoleCommand::Message(message) => engine.process_message(message),
        ConsoleCommand::Status => status_event(engine).emit(),
        ConsoleCommand::Apps => match engine.state.config() {
            Some(config) => HeadlessEvent::config(config).emit(),
            None => HeadlessEvent::error("No device config received yet".into(), false).emit(),
        },
        ConsoleCommand::Media => {
            let media = &engine.state.media;
            HeadlessEvent::media(media.assets(), media.is_uploading()).emit();
        }
        ConsoleCommand::Url(file) => {
            let url = engine.media_store().resolve_url(&file);
            HeadlessEvent::url(&file, url).emit();
        }
    }
}

fn status_event(engine: &Engine) -> HeadlessEvent {
    let state = &engine.state;
    HeadlessEvent::Status {
        connection: state.connection,
        active_app_id: state.config().map(|c| c.active_app_id.clone()),
        apps: state.config().map_or(0, |c| c.applications.len()),
        editing: state.editor().draft_id().map(str::to_string),
        uploading: state.media.is_uploading(),
        notice: state.notice.as_ref().map(|n| n.message.clone()),
        timestamp: chrono::Utc::now().timestamp_millis(),
    }
}

/// Print everything the engine broadcast since the last call.
fn emit_engine_events(events: &mut broadcast::Receiver<EngineEvent>) {
    loop {
        match events.try_recv() {
            Ok(event) => HeadlessEvent::from(event).emit(),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!("Headless output lagged, {} events skipped", skipped);
            }
            Err(_) => break,
        }
    }
}

/// Read stdin lines on a blocking thread and hand parsed commands over.
fn spawn_stdin_reader_blocking(console_tx: mpsc::Sender<ConsoleInput>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    let reader = stdin.lock();

    for line in reader.lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                error!("Failed to read stdin: {}", e);
                break;
            }
        };

        let input = match parse_command(&line) {
            Ok(Some(command)) => Ok(command),
            Ok(None) => continue,
            Err(problem) => {
                warn!("Rejected stdin command: {}", line.trim());
                Err(problem)
            }
        };

        let quitting = matches!(input, Ok(ConsoleCommand::Message(Message::Quit)));
        if console_tx.blocking_send(input).is_err() || quitting {
            break;
        }
    }

    info!("Stdin reader exiting");
}
