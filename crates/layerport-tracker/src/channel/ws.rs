//! WebSocket transport for the push channel.
//!
//! A background task owns the socket. It connects with a timeout, reconnects
//! with capped exponential backoff, re-joins every room it has been asked to
//! join, and forwards parsed events to the [`WsPushChannel`] handle. A join is
//! confirmed only once its frame has been written to a live socket.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::{client::IntoClientRequest, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::Instrument;

use layerport_core::{ChannelError, JobId};

use super::frame::{join_frame, parse_frame};
use super::{ChannelEvent, PushChannel};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const INITIAL_BACKOFF: Duration = Duration::from_millis(500);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

type JoinReply = oneshot::Sender<Result<(), ChannelError>>;

#[derive(Debug)]
enum Command {
    Join(JobId, JoinReply),
    Leave(JobId),
    Close,
}

/// Handle to a push channel connection running in a background task.
pub struct WsPushChannel {
    commands: mpsc::UnboundedSender<Command>,
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    task: Option<JoinHandle<()>>,
    join_timeout: Duration,
}

impl WsPushChannel {
    /// Start connecting to `url`. Returns immediately; connection progress is
    /// reported through [`ChannelEvent`]s.
    pub fn connect(url: &str, auth_token: Option<String>, connect_timeout: Duration) -> Self {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let span = tracing::info_span!("push_channel", url = %url);
        let actor = Actor {
            url: url.to_string(),
            auth_token,
            connect_timeout,
            rooms: Vec::new(),
            pending: Vec::new(),
            commands: command_rx,
            events: event_tx,
        };
        let task = tokio::spawn(actor.run().instrument(span));

        Self {
            commands: command_tx,
            events: event_rx,
            task: Some(task),
            join_timeout: connect_timeout,
        }
    }
}

#[async_trait]
impl PushChannel for WsPushChannel {
    /// Resolves once the join frame has been written to a connected socket.
    /// If no connection comes up within the connect timeout the room stays
    /// remembered and is joined as soon as the socket opens.
    async fn join(&mut self, job_id: &JobId) -> Result<(), ChannelError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::Join(job_id.clone(), reply_tx))
            .map_err(|_| ChannelError::Closed)?;

        match tokio::time::timeout(self.join_timeout, reply_rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(ChannelError::Closed),
            Err(_) => Err(ChannelError::Connect(format!(
                "room not joined within {:?}",
                self.join_timeout
            ))),
        }
    }

    fn leave(&mut self, job_id: &JobId) {
        let _ = self.commands.send(Command::Leave(job_id.clone()));
    }

    async fn recv(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    async fn close(&mut self) {
        let _ = self.commands.send(Command::Close);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::debug!(error = %e, "Push channel task ended abnormally");
            }
        }
        self.events.close();
    }
}

impl Drop for WsPushChannel {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

enum Outcome {
    Reconnect,
    Stop,
}

struct Actor {
    url: String,
    auth_token: Option<String>,
    connect_timeout: Duration,
    /// Rooms re-joined on every connect.
    rooms: Vec<JobId>,
    /// Joins waiting for a live socket.
    pending: Vec<(JobId, JoinReply)>,
    commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<ChannelEvent>,
}

impl Actor {
    async fn run(mut self) {
        let mut backoff = INITIAL_BACKOFF;
        // Only the first failure of an outage is reported.
        let mut failure_reported = false;

        loop {
            let connected = match self.connect().await {
                Some(result) => result,
                None => return,
            };

            match connected {
                Ok(ws) => {
                    backoff = INITIAL_BACKOFF;
                    failure_reported = false;
                    tracing::info!("Push channel connected");
                    if !self.emit(ChannelEvent::Connected) {
                        return;
                    }
                    match self.session(ws).await {
                        Outcome::Reconnect => {}
                        Outcome::Stop => return,
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, backoff_ms = backoff.as_millis() as u64, "Push channel connection failed");
                    if !failure_reported {
                        failure_reported = true;
                        if !self.emit(ChannelEvent::ConnectFailed {
                            reason: e.to_string(),
                        }) {
                            return;
                        }
                    }
                }
            }

            if !self.wait(backoff).await {
                return;
            }
            backoff = (backoff * 2).min(MAX_BACKOFF);
        }
    }

    /// Connect while still accepting commands. `None` means the handle asked to stop.
    async fn connect(&mut self) -> Option<Result<WsStream, ChannelError>> {
        let url = self.url.clone();
        let auth_token = self.auth_token.clone();
        let attempt = tokio::time::timeout(
            self.connect_timeout,
            open(&url, auth_token.as_deref()),
        );
        tokio::pin!(attempt);

        loop {
            tokio::select! {
                result = &mut attempt => {
                    return Some(match result {
                        Ok(inner) => inner,
                        Err(_) => Err(ChannelError::Connect(format!(
                            "timed out after {:?}",
                            self.connect_timeout
                        ))),
                    });
                }
                command = self.commands.recv() => {
                    if !self.offline(command) {
                        return None;
                    }
                }
            }
        }
    }

    async fn session(&mut self, ws: WsStream) -> Outcome {
        let (mut sink, mut stream) = ws.split();

        for job_id in self.rooms.clone() {
            if let Err(e) = send_join(&mut sink, &job_id).await {
                tracing::warn!(error = %e, job_id = %job_id, "Failed to join job room");
                return self.disconnected(e.to_string());
            }
        }
        for (job_id, reply) in self.pending.drain(..) {
            tracing::debug!(job_id = %job_id, "Joined job room");
            let _ = reply.send(Ok(()));
        }

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Join(job_id, reply)) => {
                        if self.remember(job_id.clone()) {
                            if let Err(e) = send_join(&mut sink, &job_id).await {
                                self.pending.push((job_id, reply));
                                return self.disconnected(e.to_string());
                            }
                            tracing::debug!(job_id = %job_id, "Joined job room");
                        }
                        let _ = reply.send(Ok(()));
                    }
                    Some(Command::Leave(job_id)) => self.forget(&job_id),
                    Some(Command::Close) | None => {
                        let _ = sink.send(WsMessage::Close(None)).await;
                        tracing::debug!("Push channel closed");
                        return Outcome::Stop;
                    }
                },
                message = stream.next() => match message {
                    Some(Ok(WsMessage::Text(text))) => match parse_frame(&text) {
                        Ok(Some(event)) => {
                            if !self.emit(event) {
                                return Outcome::Stop;
                            }
                        }
                        Ok(None) => {}
                        Err(e) => tracing::warn!(error = %e, "Ignoring malformed push frame"),
                    },
                    Some(Ok(WsMessage::Close(_))) | None => {
                        return self.disconnected("closed by server".to_string());
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return self.disconnected(e.to_string()),
                },
            }
        }
    }

    fn disconnected(&mut self, reason: String) -> Outcome {
        tracing::info!(reason = %reason, "Push channel disconnected");
        if self.emit(ChannelEvent::Disconnected { reason }) {
            Outcome::Reconnect
        } else {
            Outcome::Stop
        }
    }

    /// Sleep for `delay` while recording joins. Returns false if asked to stop.
    async fn wait(&mut self, delay: Duration) -> bool {
        let sleep = tokio::time::sleep(delay);
        tokio::pin!(sleep);

        loop {
            tokio::select! {
                _ = &mut sleep => return true,
                command = self.commands.recv() => {
                    if !self.offline(command) {
                        return false;
                    }
                }
            }
        }
    }

    /// Handle a command while no socket is open. Returns false if asked to stop.
    fn offline(&mut self, command: Option<Command>) -> bool {
        match command {
            Some(Command::Join(job_id, reply)) => {
                self.remember(job_id.clone());
                self.pending.push((job_id, reply));
                true
            }
            Some(Command::Leave(job_id)) => {
                self.forget(&job_id);
                true
            }
            Some(Command::Close) | None => false,
        }
    }

    /// Record a room; false if it was already joined.
    fn remember(&mut self, job_id: JobId) -> bool {
        if self.rooms.contains(&job_id) {
            return false;
        }
        self.rooms.push(job_id);
        true
    }

    /// Stop re-joining a room. Waiting joins for it resolve as closed.
    fn forget(&mut self, job_id: &JobId) {
        self.rooms.retain(|room| room != job_id);
        self.pending.retain(|(pending, _)| pending != job_id);
        tracing::debug!(job_id = %job_id, "Left job room");
    }

    /// Forward an event; false once the handle has been dropped.
    fn emit(&self, event: ChannelEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

async fn open(url: &str, auth_token: Option<&str>) -> Result<WsStream, ChannelError> {
    let mut request = url
        .into_client_request()
        .map_err(|e| ChannelError::Connect(e.to_string()))?;

    if let Some(token) = auth_token {
        let value = format!("Bearer {}", token)
            .parse()
            .map_err(|_| ChannelError::Connect("invalid auth token".to_string()))?;
        request.headers_mut().insert("Authorization", value);
    }

    let (ws, _) = tokio_tungstenite::connect_async(request)
        .await
        .map_err(|e| ChannelError::Connect(e.to_string()))?;
    Ok(ws)
}

async fn send_join<S>(sink: &mut S, job_id: &JobId) -> Result<(), ChannelError>
where
    S: futures::Sink<WsMessage> + Unpin,
    S::Error: std::fmt::Display,
{
    let frame = join_frame(job_id)?;
    sink.send(WsMessage::Text(frame.into()))
        .await
        .map_err(|e| ChannelError::Protocol(e.to_string()))
}
