//! Self-healing WebSocket command channel to the device.
//!
//! [`DeviceChannel::spawn`] starts a background Tokio task that owns the
//! WebSocket. The task reconnects forever with a fixed delay, sends `getConfig`
//! every time a connection opens, and forwards classified inbound frames
//! through an mpsc channel in arrival order.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       DeviceChannel                          │
//! │                                                              │
//! │  ┌──────────────┐        ┌──────────────────────────────┐   │
//! │  │ ChannelHandle│        │   Background Task             │   │
//! │  │              │        │                                │   │
//! │  │  send()  ────┼──cmd──▶│  connect → getConfig → I/O    │   │
//! │  │  (drops when │  chan  │  loop → Closed → fixed delay   │   │
//! │  │   not open)  │        │  → connect ...                 │   │
//! │  │              │        │                                │   │
//! │  │  events() ◀──┼──evt──◀│  ConnectionChanged / Message   │   │
//! │  └──────────────┘  chan  └──────────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Commands are never queued across a disconnect. A command sent while the
//! channel is not open is dropped at the handle. Anything still sitting in the
//! command queue when a connection is lost is dropped by the task once the
//! state reads `Closed`, so a command accepted while `Open` is only lost if
//! its connection is.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use beectl_core::prelude::*;
use beectl_core::ConnectionState;

use super::protocol::{parse_device_message, DeviceCommand, DeviceMessage};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Delay between a close and the next connection attempt.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// Upper bound on a single connection attempt.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Capacity of the command channel.
const CMD_CHANNEL_CAPACITY: usize = 32;

/// Capacity of the event channel.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// How long `shutdown()` waits for the task to say goodbye.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Where to connect and how long to wait between attempts.
#[derive(Debug, Clone)]
pub struct ChannelOptions {
    pub ws_url: String,
    pub reconnect_delay: Duration,
}

impl ChannelOptions {
    pub fn new(ws_url: impl Into<String>) -> Self {
        Self {
            ws_url: ws_url.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }

    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }
}

/// Events emitted by the channel task, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelEvent {
    /// The connection state changed.
    ConnectionChanged(ConnectionState),
    /// A recognized inbound message. Unknown frames are never forwarded.
    Message(DeviceMessage),
}

/// Internal messages sent from the public API to the background task.
enum ChannelCommand {
    Send(DeviceCommand),
    Shutdown,
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// Why a single connection's I/O loop ended.
#[derive(Debug, PartialEq)]
enum LoopExit {
    /// The connection dropped; wait and reconnect.
    ConnectionLost,
    /// Shutdown was requested or every handle is gone.
    Shutdown,
}

// ---------------------------------------------------------------------------
// ChannelHandle
// ---------------------------------------------------------------------------

/// A clonable handle for issuing fire-and-forget commands.
///
/// `send` never reports delivery. Callers must not assume a command has any
/// local effect; the device's next snapshot or `stateChanged` push is the only
/// confirmation.
#[derive(Clone)]
pub struct ChannelHandle {
    cmd_tx: mpsc::Sender<ChannelCommand>,
    state: Arc<RwLock<ConnectionState>>,
}

impl std::fmt::Debug for ChannelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelHandle")
            .field("connection_state", &self.connection_state())
            .finish()
    }
}

impl ChannelHandle {
    /// Send a command if the channel is open, otherwise drop it silently.
    pub fn send(&self, command: DeviceCommand) {
        let state = self.connection_state();
        if !state.is_open() {
            debug!(
                "Device channel {}: dropping '{}' command",
                state,
                command.method()
            );
            return;
        }

        if let Err(err) = self.cmd_tx.try_send(ChannelCommand::Send(command)) {
            warn!("Device channel: command queue unavailable, dropping command: {err}");
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_open(&self) -> bool {
        self.connection_state().is_open()
    }

    /// A handle whose commands go nowhere, for tests that need one.
    #[cfg(any(test, feature = "test-helpers"))]
    pub fn new_for_test(state: ConnectionState) -> (Self, TestCommandSink) {
        let (cmd_tx, cmd_rx) = mpsc::channel(CMD_CHANNEL_CAPACITY);
        let handle = Self {
            cmd_tx,
            state: Arc::new(RwLock::new(state)),
        };
        let sink = TestCommandSink {
            cmd_rx,
            state: Arc::clone(&handle.state),
        };
        (handle, sink)
    }
}

/// Receiving side of a test handle.
#[cfg(any(test, feature = "test-helpers"))]
pub struct TestCommandSink {
    cmd_rx: mpsc::Receiver<ChannelCommand>,
    state: Arc<RwLock<ConnectionState>>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl TestCommandSink {
    /// Commands that made it past the handle so far.
    pub fn drain(&mut self) -> Vec<DeviceCommand> {
        let mut sent = Vec::new();
        while let Ok(cmd) = self.cmd_rx.try_recv() {
            if let ChannelCommand::Send(cmd) = cmd {
                sent.push(cmd);
            }
        }
        sent
    }

    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write().unwrap_or_else(|e| e.into_inner()) = state;
    }
}

// ---------------------------------------------------------------------------
// DeviceChannel
// ---------------------------------------------------------------------------

/// Owner of the background connection task.
///
/// Must be created inside a Tokio runtime. Dropping the channel aborts the
/// task; prefer [`DeviceChannel::shutdown`] for a clean Close frame.
pub struct DeviceChannel {
    handle: ChannelHandle,
    event_rx: Option<mpsc::Receiver<ChannelEvent>>,
    task: Option<JoinHandle<()>>,
}

impl DeviceChannel {
    /// Start connecting to `options.ws_url` in the background.
    pub fn spawn(options: ChannelOptions) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<ChannelCommand>(CMD_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<ChannelEvent>(EVENT_CHANNEL_CAPACITY);
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));

        info!("Device channel: connecting to {}", options.ws_url);
        let task = tokio::spawn(run_channel_task(
            options,
            cmd_rx,
            event_tx,
            Arc::clone(&state),
        ));

        Self {
            handle: ChannelHandle { cmd_tx, state },
            event_rx: Some(event_rx),
            task: Some(task),
        }
    }

    /// A clonable handle for sending commands.
    pub fn handle(&self) -> ChannelHandle {
        self.handle.clone()
    }

    /// Send a command. See [`ChannelHandle::send`].
    pub fn send(&self, command: DeviceCommand) {
        self.handle.send(command)
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.handle.connection_state()
    }

    /// Take ownership of the event receiver, e.g. to forward it elsewhere.
    pub fn take_event_receiver(&mut self) -> Option<mpsc::Receiver<ChannelEvent>> {
        self.event_rx.take()
    }

    /// Stop the retry loop and close the connection.
    pub async fn shutdown(&mut self) {
        // A closed channel means the task already exited.
        let _ = self.handle.cmd_tx.send(ChannelCommand::Shutdown).await;
        if let Some(mut task) = self.task.take() {
            if tokio::time::timeout(SHUTDOWN_GRACE, &mut task).await.is_err() {
                warn!("Device channel: task did not stop in time, aborting");
                task.abort();
            }
        }
        *self.handle.state.write().unwrap_or_else(|e| e.into_inner()) = ConnectionState::Closed;
    }
}

impl Drop for DeviceChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Background task
// ---------------------------------------------------------------------------

async fn run_channel_task(
    options: ChannelOptions,
    mut cmd_rx: mpsc::Receiver<ChannelCommand>,
    event_tx: mpsc::Sender<ChannelEvent>,
    state: Arc<RwLock<ConnectionState>>,
) {
    let mut attempt: u64 = 0;
    loop {
        attempt += 1;
        set_state(&state, &event_tx, ConnectionState::Connecting).await;

        match connect_ws(&options.ws_url).await {
            Ok(ws_stream) => {
                info!("Device channel: connected (attempt {})", attempt);
                attempt = 0;
                set_state(&state, &event_tx, ConnectionState::Open).await;

                if run_io_loop(ws_stream, &mut cmd_rx, &event_tx).await == LoopExit::Shutdown {
                    set_state(&state, &event_tx, ConnectionState::Closed).await;
                    break;
                }
            }
            Err(err) => {
                warn!("Device channel: attempt {} failed: {}", attempt, err);
            }
        }

        set_state(&state, &event_tx, ConnectionState::Closed).await;
        if drop_queued(&mut cmd_rx) == LoopExit::Shutdown {
            break;
        }
        debug!(
            "Device channel: reconnecting in {:?}",
            options.reconnect_delay
        );
        if wait_for_retry(options.reconnect_delay, &mut cmd_rx).await == LoopExit::Shutdown {
            break;
        }
    }

    debug!("Device channel task exiting");
}

/// Drop commands left over from a lost connection so none reach the next one.
fn drop_queued(cmd_rx: &mut mpsc::Receiver<ChannelCommand>) -> LoopExit {
    while let Ok(cmd) = cmd_rx.try_recv() {
        match cmd {
            ChannelCommand::Send(command) => {
                debug!("Device channel: dropping unsent '{}' command", command.method());
            }
            ChannelCommand::Shutdown => return LoopExit::Shutdown,
        }
    }
    LoopExit::ConnectionLost
}

/// Sleep out the reconnect delay, dropping any commands that arrive meanwhile.
async fn wait_for_retry(delay: Duration, cmd_rx: &mut mpsc::Receiver<ChannelCommand>) -> LoopExit {
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return LoopExit::ConnectionLost,
            cmd = cmd_rx.recv() => match cmd {
                Some(ChannelCommand::Send(command)) => {
                    debug!("Device channel closed: dropping '{}' command", command.method());
                }
                Some(ChannelCommand::Shutdown) | None => return LoopExit::Shutdown,
            },
        }
    }
}

/// Run one connection's read/write select loop.
async fn run_io_loop(
    ws_stream: WsStream,
    cmd_rx: &mut mpsc::Receiver<ChannelCommand>,
    event_tx: &mpsc::Sender<ChannelEvent>,
) -> LoopExit {
    let (mut ws_sink, mut ws_stream) = ws_stream.split();

    if let Err(err) = write_command(&mut ws_sink, DeviceCommand::GetConfig).await {
        warn!("Device channel: failed to request config: {}", err);
        return LoopExit::ConnectionLost;
    }

    loop {
        tokio::select! {
            frame = ws_stream.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        handle_ws_text(text.as_str(), event_tx).await;
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        debug!("Device channel: received Close frame");
                        return LoopExit::ConnectionLost;
                    }
                    Some(Ok(_)) => {
                        // Ping, Pong and Binary frames are ignored
                    }
                    Some(Err(err)) => {
                        warn!("Device channel: read error: {}", err);
                        return LoopExit::ConnectionLost;
                    }
                    None => {
                        debug!("Device channel: stream ended");
                        return LoopExit::ConnectionLost;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(ChannelCommand::Send(command)) => {
                        let method = command.method();
                        if let Err(err) = write_command(&mut ws_sink, command).await {
                            warn!("Device channel: failed to send '{}': {}", method, err);
                            return LoopExit::ConnectionLost;
                        }
                    }
                    Some(ChannelCommand::Shutdown) | None => {
                        send_close(&mut ws_sink).await;
                        return LoopExit::Shutdown;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Helper functions
// ---------------------------------------------------------------------------

async fn connect_ws(ws_url: &str) -> Result<WsStream> {
    match tokio::time::timeout(CONNECT_TIMEOUT, connect_async(ws_url)).await {
        Ok(Ok((ws_stream, _response))) => Ok(ws_stream),
        Ok(Err(err)) => Err(Error::connection(format!(
            "failed to connect to {ws_url}: {err}"
        ))),
        Err(_) => Err(Error::connection(format!(
            "timed out connecting to {ws_url}"
        ))),
    }
}

async fn set_state(
    state: &Arc<RwLock<ConnectionState>>,
    event_tx: &mpsc::Sender<ChannelEvent>,
    new_state: ConnectionState,
) {
    {
        let mut guard = state.write().unwrap_or_else(|e| e.into_inner());
        if *guard == new_state {
            return;
        }
        *guard = new_state;
    }
    // Nobody listening is fine; the state is still readable through handles.
    let _ = event_tx
        .send(ChannelEvent::ConnectionChanged(new_state))
        .await;
}

async fn handle_ws_text(text: &str, event_tx: &mpsc::Sender<ChannelEvent>) {
    match parse_device_message(text) {
        DeviceMessage::Unknown(raw) => {
            debug!(
                "Device channel: ignoring unrecognized message: {}",
                truncate(&raw, 120)
            );
        }
        message => {
            trace!("Device channel: received {}", message.kind());
            let _ = event_tx.send(ChannelEvent::Message(message)).await;
        }
    }
}

async fn write_command(
    ws_sink: &mut SplitSink<WsStream, WsMessage>,
    command: DeviceCommand,
) -> Result<()> {
    let json = command.into_request()?.to_json()?;
    ws_sink
        .send(WsMessage::Text(json.into()))
        .await
        .map_err(|err| Error::connection(format!("write failed: {err}")))
}

async fn send_close(ws_sink: &mut SplitSink<WsStream, WsMessage>) {
    let _ = ws_sink.send(WsMessage::Close(None)).await;
    let _ = ws_sink.close().await;
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_default_delay() {
        let options = ChannelOptions::new("ws://127.0.0.1:5000/ws");
        assert_eq!(options.reconnect_delay, Duration::from_secs(3));

        let options = options.with_reconnect_delay(Duration::from_millis(50));
        assert_eq!(options.reconnect_delay, Duration::from_millis(50));
    }

    #[test]
    fn test_send_drops_when_not_open() {
        for state in [ConnectionState::Connecting, ConnectionState::Closed] {
            let (handle, mut sink) = ChannelHandle::new_for_test(state);
            handle.send(DeviceCommand::SetActiveApp {
                app_id: "a1".to_string(),
            });
            assert!(sink.drain().is_empty(), "command leaked while {state}");
        }
    }

    #[test]
    fn test_send_queues_when_open() {
        let (handle, mut sink) = ChannelHandle::new_for_test(ConnectionState::Open);
        handle.send(DeviceCommand::RemoveApp {
            id: "a1".to_string(),
        });
        assert_eq!(
            sink.drain(),
            vec![DeviceCommand::RemoveApp {
                id: "a1".to_string()
            }]
        );
    }

    #[test]
    fn test_handle_clones_share_state() {
        let (handle, sink) = ChannelHandle::new_for_test(ConnectionState::Open);
        let cloned = handle.clone();
        sink.set_state(ConnectionState::Closed);
        assert!(!handle.is_open());
        assert!(!cloned.is_open());
    }

    #[test]
    fn test_handle_debug_shows_state() {
        let (handle, _sink) = ChannelHandle::new_for_test(ConnectionState::Open);
        let debug_str = format!("{handle:?}");
        assert!(debug_str.contains("ChannelHandle"));
        assert!(debug_str.contains("Open"));
    }

    #[test]
    fn test_handle_is_send_sync() {
        fn assert_send_sync<T: Send + Sync + Clone>() {}
        assert_send_sync::<ChannelHandle>();
    }

    #[tokio::test]
    async fn test_wait_for_retry_drops_commands() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(ChannelCommand::Send(DeviceCommand::GetConfig))
            .await
            .unwrap();
        let exit = wait_for_retry(Duration::from_millis(20), &mut rx).await;
        assert_eq!(exit, LoopExit::ConnectionLost);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_wait_for_retry_stops_on_shutdown() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(ChannelCommand::Shutdown).await.unwrap();
        let exit = wait_for_retry(Duration::from_secs(60), &mut rx).await;
        assert_eq!(exit, LoopExit::Shutdown);
    }

    #[tokio::test]
    async fn test_wait_for_retry_stops_when_handles_dropped() {
        let (tx, mut rx) = mpsc::channel::<ChannelCommand>(4);
        drop(tx);
        let exit = wait_for_retry(Duration::from_secs(60), &mut rx).await;
        assert_eq!(exit, LoopExit::Shutdown);
    }

    #[tokio::test]
    async fn test_set_state_emits_only_on_change() {
        let state = Arc::new(RwLock::new(ConnectionState::Connecting));
        let (tx, mut rx) = mpsc::channel(8);

        set_state(&state, &tx, ConnectionState::Open).await;
        set_state(&state, &tx, ConnectionState::Open).await;
        set_state(&state, &tx, ConnectionState::Closed).await;

        assert_eq!(
            rx.try_recv().unwrap(),
            ChannelEvent::ConnectionChanged(ConnectionState::Open)
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ChannelEvent::ConnectionChanged(ConnectionState::Closed)
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unknown_frames_are_not_forwarded() {
        let (tx, mut rx) = mpsc::channel(8);
        handle_ws_text("garbage", &tx).await;
        handle_ws_text(r#"{"jsonrpc":"2.0","id":1,"result":{}}"#, &tx).await;
        assert!(rx.try_recv().is_err());

        handle_ws_text(
            r#"{"method":"stateChanged","params":{"active_app_id":"a1","applications":[]}}"#,
            &tx,
        )
        .await;
        assert!(matches!(
            rx.try_recv().unwrap(),
            ChannelEvent::Message(DeviceMessage::StateChanged(_))
        ));
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
