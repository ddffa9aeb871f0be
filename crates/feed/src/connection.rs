//! Reconnecting websocket connection to the opportunity feed.
//!
//! The connection is owned by a single actor task. Callers hold a cheap
//! [`ConnectionManager`] handle and receive [`FeedEvent`]s on a channel:
//!
//! ```text
//! ConnectionManager::spawn(config)
//!        │
//!        ├─► Spawns the connection actor
//!        │   ├─► ConnectionStateMachine decides (open/close/ready/dropped/timer)
//!        │   ├─► Owns the websocket, the one reconnect timer, the ping interval
//!        │   └─► Decodes frames and emits FeedEvents in transport order
//!        │
//!        └─► Returns (handle, mpsc::Receiver<FeedEvent>)
//! ```
//!
//! Malformed frames are logged and dropped; the connection stays open.
//! Transport failures move the machine to `Disconnected` and arm the
//! reconnect timer, unless [`ConnectionManager::close`] was called.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use arbwatch_core::{FeedConfig, FeedEvent};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{sleep, Sleep};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

use crate::decode::decode;
use crate::error::FeedError;
use crate::state::{Action, ConnectionStateMachine, ReconnectPolicy};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type ConnectAttempt =
    Pin<Box<dyn Future<Output = Result<WsStream, tokio_tungstenite::tungstenite::Error>> + Send>>;

/// Configuration for the connection actor.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Websocket endpoint of the feed.
    pub url: String,
    pub policy: ReconnectPolicy,
    /// Keepalive ping interval while connected.
    pub ping_interval: Duration,
    /// Event channel capacity.
    pub channel_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::from_feed_config(&FeedConfig::default())
    }
}

impl ConnectionConfig {
    #[must_use]
    pub fn from_feed_config(config: &FeedConfig) -> Self {
        Self {
            url: config.ws_url.clone(),
            policy: ReconnectPolicy::from_config(config),
            ping_interval: config.ping_interval(),
            channel_buffer_size: config.channel_buffer_size.max(1),
        }
    }
}

#[derive(Debug)]
enum Command {
    Open,
    Close,
    Shutdown,
}

/// Handle to the connection actor.
#[derive(Clone)]
pub struct ConnectionManager {
    commands: mpsc::Sender<Command>,
}

impl ConnectionManager {
    /// Spawns the connection actor in the `Disconnected` state. Nothing is
    /// dialled until [`open`](Self::open) is called.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(config: ConnectionConfig) -> (Self, mpsc::Receiver<FeedEvent>) {
        let (event_tx, event_rx) = mpsc::channel(config.channel_buffer_size);
        let (command_tx, command_rx) = mpsc::channel(16);

        let actor = ConnectionActor {
            machine: ConnectionStateMachine::new(config.policy),
            config,
            events: event_tx,
            transport: Transport::Idle,
            reconnect: None,
        };
        tokio::spawn(actor.run(command_rx));

        (
            Self {
                commands: command_tx,
            },
            event_rx,
        )
    }

    /// Connects, and keeps reconnecting after drops until [`close`](Self::close).
    ///
    /// # Errors
    /// Returns [`FeedError::ActorStopped`] if the actor has shut down.
    pub async fn open(&self) -> Result<(), FeedError> {
        self.send(Command::Open).await
    }

    /// Disconnects and cancels any pending reconnect.
    ///
    /// # Errors
    /// Returns [`FeedError::ActorStopped`] if the actor has shut down.
    pub async fn close(&self) -> Result<(), FeedError> {
        self.send(Command::Close).await
    }

    /// Closes the connection and stops the actor.
    pub async fn shutdown(&self) {
        let _ = self.commands.send(Command::Shutdown).await;
    }

    async fn send(&self, command: Command) -> Result<(), FeedError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| FeedError::ActorStopped)
    }
}

enum Transport {
    Idle,
    Connecting(ConnectAttempt),
    Connected(WsStream),
}

/// Something the actor woke up for.
enum Wake {
    Command(Option<Command>),
    ReconnectTimer,
    Ping,
    Connected(WsStream),
    ConnectFailed(String),
    Frame(Message),
    Dropped(String),
}

struct ConnectionActor {
    config: ConnectionConfig,
    machine: ConnectionStateMachine,
    events: mpsc::Sender<FeedEvent>,
    transport: Transport,
    /// The single outstanding reconnect timer, if any.
    reconnect: Option<Pin<Box<Sleep>>>,
}

impl ConnectionActor {
    async fn run(mut self, mut commands: mpsc::Receiver<Command>) {
        let mut ping = tokio::time::interval(self.config.ping_interval);
        ping.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            let connected = matches!(self.transport, Transport::Connected(_));

            let wake = tokio::select! {
                command = commands.recv() => Wake::Command(command),
                () = wait_reconnect(&mut self.reconnect) => Wake::ReconnectTimer,
                wake = next_transport_event(&mut self.transport) => wake,
                _ = ping.tick(), if connected => Wake::Ping,
            };

            let actions = match wake {
                Wake::Command(Some(Command::Open)) => {
                    info!(url = %self.config.url, "Opening feed connection");
                    self.machine.open()
                }
                Wake::Command(Some(Command::Close)) => {
                    info!("Closing feed connection");
                    self.machine.close()
                }
                Wake::Command(Some(Command::Shutdown) | None) => break,
                Wake::ReconnectTimer => {
                    self.reconnect = None;
                    info!("Attempting to reconnect");
                    self.machine.reconnect_timer_fired()
                }
                Wake::Ping => match self.send_frame(Message::Ping(Vec::new())).await {
                    Ok(()) => Vec::new(),
                    Err(reason) => self.drop_transport(&reason),
                },
                Wake::Connected(stream) => {
                    info!(url = %self.config.url, "Feed connected");
                    self.transport = Transport::Connected(stream);
                    ping.reset();
                    self.machine.transport_ready()
                }
                Wake::ConnectFailed(reason) => {
                    warn!(
                        url = %self.config.url,
                        error = %reason,
                        "Feed connection attempt failed"
                    );
                    self.drop_transport(&reason)
                }
                Wake::Frame(message) => self.on_frame(message).await,
                Wake::Dropped(reason) => self.drop_transport(&reason),
            };

            self.apply(actions).await;
        }

        let actions = self.machine.close();
        self.apply(actions).await;
        info!("Feed connection actor stopped");
    }

    fn drop_transport(&mut self, reason: &str) -> Vec<Action> {
        if matches!(self.transport, Transport::Connected(_)) {
            warn!(reason, "Feed connection lost");
        }
        self.transport = Transport::Idle;
        self.machine.transport_closed()
    }

    async fn on_frame(&mut self, message: Message) -> Vec<Action> {
        match message {
            Message::Text(text) => {
                self.deliver(&text).await;
                Vec::new()
            }
            Message::Binary(data) => {
                match String::from_utf8(data) {
                    Ok(text) => self.deliver(&text).await,
                    Err(e) => warn!(error = %e, "Dropping non-UTF-8 binary frame"),
                }
                Vec::new()
            }
            Message::Ping(data) => {
                debug!("Received ping, sending pong");
                match self.send_frame(Message::Pong(data)).await {
                    Ok(()) => Vec::new(),
                    Err(reason) => self.drop_transport(&reason),
                }
            }
            Message::Pong(_) => {
                debug!("Received pong");
                Vec::new()
            }
            Message::Close(frame) => {
                info!(frame = ?frame, "Received close frame");
                let reason = frame
                    .map(|f| f.reason.to_string())
                    .unwrap_or_else(|| "connection closed".to_string());
                self.drop_transport(&reason)
            }
            Message::Frame(_) => Vec::new(),
        }
    }

    async fn deliver(&mut self, text: &str) {
        match decode(text) {
            Ok(envelope) => {
                debug!(kind = envelope.message.kind(), "Feed message decoded");
                let _ = self.events.send(FeedEvent::Message(envelope)).await;
            }
            Err(e) => {
                warn!(error = %e, "Dropping malformed feed message");
            }
        }
    }

    async fn send_frame(&mut self, message: Message) -> Result<(), String> {
        match &mut self.transport {
            Transport::Connected(stream) => stream.send(message).await.map_err(|e| e.to_string()),
            _ => Ok(()),
        }
    }

    async fn apply(&mut self, actions: Vec<Action>) {
        for action in actions {
            match action {
                Action::Connect => {
                    let url = self.config.url.clone();
                    debug!(url = %url, "Dialling feed");
                    self.transport = Transport::Connecting(Box::pin(async move {
                        connect_async(url).await.map(|(stream, _response)| stream)
                    }));
                }
                Action::Disconnect => {
                    if let Transport::Connected(mut stream) =
                        std::mem::replace(&mut self.transport, Transport::Idle)
                    {
                        if let Err(e) = stream.close(None).await {
                            debug!(error = %e, "Error while closing websocket");
                        }
                    }
                }
                Action::ScheduleReconnect(delay) => {
                    info!(delay = ?delay, "Waiting before reconnect");
                    self.reconnect = Some(Box::pin(sleep(delay)));
                }
                Action::CancelReconnect => {
                    debug!("Reconnect timer cancelled");
                    self.reconnect = None;
                }
                Action::Emit(state) => {
                    let _ = self.events.send(FeedEvent::StateChanged(state)).await;
                }
                Action::Abandon { attempts } => {
                    error!(attempts, "Max reconnection attempts exceeded");
                    let _ = self
                        .events
                        .send(FeedEvent::ReconnectAbandoned { attempts })
                        .await;
                }
            }
        }
    }
}

async fn wait_reconnect(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(sleep) => sleep.as_mut().await,
        None => std::future::pending().await,
    }
}

async fn next_transport_event(transport: &mut Transport) -> Wake {
    match transport {
        Transport::Idle => std::future::pending().await,
        Transport::Connecting(attempt) => match attempt.await {
            Ok(stream) => Wake::Connected(stream),
            Err(e) => Wake::ConnectFailed(e.to_string()),
        },
        Transport::Connected(stream) => match stream.next().await {
            Some(Ok(message)) => Wake::Frame(message),
            Some(Err(e)) => Wake::Dropped(e.to_string()),
            None => Wake::Dropped("stream ended".to_string()),
        },
    }
}
