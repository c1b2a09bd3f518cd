//! Engine - owns application state and wires it to the device
//!
//! The engine holds the [`AppState`], the message channel every producer feeds,
//! the device command channel and the asset store. Front-ends pull messages off
//! `msg_rx`, hand them to [`Engine::process_message`], and read state or
//! subscribe to [`EngineEvent`]s.
//!
//! Messages are processed one at a time, in arrival order, on the caller's
//! task. Nothing else mutates the state.

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace};

use beectl_core::ConnectionState;
use beectl_device::{ChannelEvent, ChannelOptions, DeviceChannel, HttpMediaStore, MediaStore};

use crate::actions::ActionContext;
use crate::config::Settings;
use crate::engine_event::{EngineEvent, StateView};
use crate::message::Message;
use crate::process::process_message;
use crate::state::AppState;

/// Capacity of the message channel
const MSG_CHANNEL_CAPACITY: usize = 256;

/// Capacity of the event broadcast; slow subscribers lag rather than block
const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct Engine<S = HttpMediaStore> {
    /// Application state, mutated only by `process_message`
    pub state: AppState,

    /// Sender handed to input sources (stdin reader, tests)
    pub msg_tx: mpsc::Sender<Message>,

    /// Every message the engine will process
    pub msg_rx: mpsc::Receiver<Message>,

    channel: DeviceChannel,
    media: S,
    event_tx: broadcast::Sender<EngineEvent>,
    forward_task: Option<JoinHandle<()>>,
}

impl Engine<HttpMediaStore> {
    /// Connect to the device described by `settings`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(settings: Settings) -> Self {
        let endpoints = settings.endpoints();
        info!("Device at {}", endpoints.ws_url());

        let options = ChannelOptions::new(endpoints.ws_url())
            .with_reconnect_delay(settings.reconnect_delay());
        let channel = DeviceChannel::spawn(options);
        let media = HttpMediaStore::new(endpoints);

        Self::with_parts(settings, channel, media)
    }
}

impl<S> Engine<S>
where
    S: MediaStore + Clone + Send + Sync + 'static,
{
    /// Build an engine around an already spawned channel and a media store.
    pub fn with_parts(settings: Settings, mut channel: DeviceChannel, media: S) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel(MSG_CHANNEL_CAPACITY);
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let forward_task = channel
            .take_event_receiver()
            .map(|events| spawn_channel_forwarder(events, msg_tx.clone()));

        let mut engine = Self {
            state: AppState::with_settings(settings),
            msg_tx,
            msg_rx,
            channel,
            media,
            event_tx,
            forward_task,
        };

        // The asset library is plain HTTP; list it without waiting for the
        // command channel.
        engine.process_message(Message::RefreshMedia);
        engine
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.event_tx.subscribe()
    }

    /// Live channel state, which may be ahead of `state.connection`.
    pub fn connection_state(&self) -> ConnectionState {
        self.channel.connection_state()
    }

    pub fn media_store(&self) -> &S {
        &self.media
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit()
    }

    /// Process one message and broadcast whatever it changed.
    pub fn process_message(&mut self, message: Message) {
        trace!("Processing {:?}", message);
        let before = StateView::capture(&self.state);

        let ctx = ActionContext {
            msg_tx: self.msg_tx.clone(),
            channel: self.channel.handle(),
            media: self.media.clone(),
        };
        process_message(&mut self.state, message, &ctx);

        let after = StateView::capture(&self.state);
        for event in before.diff(&after) {
            self.emit(event);
        }
        for message in self.state.take_errors() {
            self.emit(EngineEvent::Error { message });
        }
    }

    fn emit(&self, event: EngineEvent) {
        trace!("Engine event: {}", event.event_type());
        // No subscribers is fine.
        let _ = self.event_tx.send(event);
    }

    /// Stop the device channel and tell subscribers we are done.
    pub async fn shutdown(&mut self) {
        info!("Engine shutting down");
        self.emit(EngineEvent::Shutdown);
        self.channel.shutdown().await;
        if let Some(task) = self.forward_task.take() {
            task.abort();
        }
    }
}

/// Feed channel events into the message queue, preserving their order.
fn spawn_channel_forwarder(
    mut events: mpsc::Receiver<ChannelEvent>,
    msg_tx: mpsc::Sender<Message>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            let Some(message) = Message::from_channel_event(event) else {
                continue;
            };
            if msg_tx.send(message).await.is_err() {
                break;
            }
        }
        debug!("Channel forwarder exiting");
    })
}
