//! Link task: connection lifecycle, handshake, polling, and correlation.
//!
//! The task runs one *session* per connection attempt. A session walks the
//! state machine `Connecting -> Authenticating -> Connected` and ends on
//! auth rejection, transport failure, close, or shutdown. Between sessions
//! the task sleeps for the fixed reconnect delay; commands arriving during
//! that window are rejected, never queued.

use futures_util::{SinkExt, StreamExt};
use hexpilot_types::{AUTH_FAILURE, AUTH_SUCCESS, Command, LinkState, Reply, TelemetrySnapshot};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

use crate::LinkConfig;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type ReplySlot = oneshot::Sender<Result<Reply, LinkError>>;

/// Depth of the handle-to-task op channel. Ops are consumed immediately by
/// the session loop; the buffer only absorbs scheduling hiccups.
const OP_CHANNEL_CAPACITY: usize = 16;

/// Failures surfaced to command-link callers.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    #[error("link is not connected")]
    NotConnected,
    #[error("another correlated request is already outstanding")]
    Busy,
    #[error("no reply arrived within the request timeout")]
    Timeout,
    #[error("connection lost before a reply arrived")]
    ConnectionLost,
    #[error("link has shut down")]
    Closed,
}

enum Op {
    Send(Command),
    Request(Command, ReplySlot),
    Shutdown,
}

/// Capability to use the link, held by every component that sends commands
/// or reads published state. Cloning is cheap; all clones talk to the same
/// background task.
#[derive(Clone)]
pub struct LinkHandle {
    ops: mpsc::Sender<Op>,
    state: watch::Receiver<LinkState>,
    telemetry: watch::Receiver<Option<TelemetrySnapshot>>,
}

impl LinkHandle {
    /// The last-published connectivity state.
    pub fn state(&self) -> LinkState {
        *self.state.borrow()
    }

    /// A watch receiver that observes every published state change.
    pub fn state_changes(&self) -> watch::Receiver<LinkState> {
        self.state.clone()
    }

    /// The last-published telemetry snapshot, if any poll has succeeded
    /// since startup.
    pub fn telemetry(&self) -> Option<TelemetrySnapshot> {
        self.telemetry.borrow().clone()
    }

    pub fn telemetry_changes(&self) -> watch::Receiver<Option<TelemetrySnapshot>> {
        self.telemetry.clone()
    }

    /// Fire-and-forget send.
    ///
    /// Reports [`LinkError::NotConnected`] without touching the transport
    /// unless the link is currently `Connected`; commands are never queued
    /// for later delivery.
    pub async fn send(&self, command: Command) -> Result<(), LinkError> {
        let state = self.state();
        if !state.is_connected() {
            warn!(command = %command.name(), %state, "link not connected; command dropped");
            return Err(LinkError::NotConnected);
        }
        self.ops
            .send(Op::Send(command))
            .await
            .map_err(|_| LinkError::Closed)
    }

    /// Correlated send: waits for the controller's reply.
    ///
    /// Fails fast when the link is not connected or another request is
    /// outstanding, and fails with [`LinkError::Timeout`] when no reply
    /// arrives within the configured bound.
    pub async fn request(&self, command: Command) -> Result<Reply, LinkError> {
        let state = self.state();
        if !state.is_connected() {
            warn!(command = %command.name(), %state, "link not connected; request rejected");
            return Err(LinkError::NotConnected);
        }
        let (reply_tx, reply_rx) = oneshot::channel();
        self.ops
            .send(Op::Request(command, reply_tx))
            .await
            .map_err(|_| LinkError::Closed)?;
        reply_rx.await.map_err(|_| LinkError::Closed)?
    }

    /// Tear the link down: stop polling, cancel any scheduled reconnect,
    /// fail the pending request, close the socket, settle in `Closed`.
    pub async fn shutdown(&self) {
        let _ = self.ops.send(Op::Shutdown).await;
    }
}

/// Spawner for the background link task.
pub struct CommandLink;

impl CommandLink {
    /// Start the link task and return the handle that owns access to it.
    ///
    /// The task connects immediately and keeps reconnecting with the
    /// configured fixed delay until [`LinkHandle::shutdown`] is called or
    /// every handle is dropped.
    pub fn spawn(config: LinkConfig) -> LinkHandle {
        let (op_tx, op_rx) = mpsc::channel(OP_CHANNEL_CAPACITY);
        let (state_tx, state_rx) = watch::channel(LinkState::Connecting);
        let (telemetry_tx, telemetry_rx) = watch::channel(None);
        tokio::spawn(run_link(config, op_rx, state_tx, telemetry_tx));
        LinkHandle {
            ops: op_tx,
            state: state_rx,
            telemetry: telemetry_rx,
        }
    }
}

/// Why a session ended, which decides what the outer loop does next.
enum SessionEnd {
    /// Operator teardown or all handles dropped: no reconnect.
    Shutdown,
    /// Token rejected, transport closed, or transport failed: reconnect
    /// after the fixed delay.
    Lost,
}

async fn run_link(
    config: LinkConfig,
    mut ops: mpsc::Receiver<Op>,
    state: watch::Sender<LinkState>,
    telemetry: watch::Sender<Option<TelemetrySnapshot>>,
) {
    loop {
        state.send_replace(LinkState::Connecting);
        debug!(url = %config.url, "connecting to controller");

        let end = match connect_async(&config.url).await {
            Ok((ws, _)) => run_session(ws, &config, &mut ops, &state, &telemetry).await,
            Err(e) => {
                warn!(url = %config.url, error = %e, "connection attempt failed");
                state.send_replace(LinkState::Error);
                SessionEnd::Lost
            }
        };

        if matches!(end, SessionEnd::Shutdown) {
            state.send_replace(LinkState::Closed);
            info!("link shut down");
            return;
        }

        // Exactly one reconnect per teardown, after a fixed delay. Commands
        // that arrive while we wait are rejected so nothing is ever queued.
        if matches!(wait_for_reconnect(&config, &mut ops).await, SessionEnd::Shutdown) {
            state.send_replace(LinkState::Closed);
            info!("link shut down during reconnect backoff");
            return;
        }
    }
}

/// Sleep out the reconnect delay while draining (and rejecting) ops.
async fn wait_for_reconnect(config: &LinkConfig, ops: &mut mpsc::Receiver<Op>) -> SessionEnd {
    let deadline = Instant::now() + config.reconnect_delay;
    loop {
        tokio::select! {
            _ = tokio::time::sleep_until(deadline) => return SessionEnd::Lost,
            op = ops.recv() => match op {
                None | Some(Op::Shutdown) => return SessionEnd::Shutdown,
                Some(Op::Send(command)) => {
                    warn!(command = %command.name(), "link down; command dropped");
                }
                Some(Op::Request(_, reply_tx)) => {
                    let _ = reply_tx.send(Err(LinkError::NotConnected));
                }
            },
        }
    }
}

/// Drive one connection from handshake to teardown.
async fn run_session(
    mut ws: WsStream,
    config: &LinkConfig,
    ops: &mut mpsc::Receiver<Op>,
    state: &watch::Sender<LinkState>,
    telemetry: &watch::Sender<Option<TelemetrySnapshot>>,
) -> SessionEnd {
    // The token goes out as the very first frame, bare text, before any
    // structured traffic.
    if let Err(e) = ws.send(Message::Text(config.authorization.clone().into())).await {
        warn!(error = %e, "failed to send authorization token");
        state.send_replace(LinkState::Error);
        return SessionEnd::Lost;
    }
    state.send_replace(LinkState::Authenticating);

    match authenticate(&mut ws, ops, state).await {
        AuthOutcome::Authenticated => {}
        AuthOutcome::End(end) => return end,
    }

    state.send_replace(LinkState::Connected);
    info!("authenticated with controller");

    connected_loop(ws, config, ops, state, telemetry).await
}

enum AuthOutcome {
    Authenticated,
    End(SessionEnd),
}

/// Wait for the literal success/failure sentinel.
async fn authenticate(
    ws: &mut WsStream,
    ops: &mut mpsc::Receiver<Op>,
    state: &watch::Sender<LinkState>,
) -> AuthOutcome {
    loop {
        tokio::select! {
            op = ops.recv() => match op {
                None | Some(Op::Shutdown) => {
                    let _ = ws.close(None).await;
                    return AuthOutcome::End(SessionEnd::Shutdown);
                }
                Some(Op::Send(command)) => {
                    warn!(command = %command.name(), "still authenticating; command dropped");
                }
                Some(Op::Request(_, reply_tx)) => {
                    let _ = reply_tx.send(Err(LinkError::NotConnected));
                }
            },
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => match text.as_str() {
                    AUTH_SUCCESS => return AuthOutcome::Authenticated,
                    AUTH_FAILURE => {
                        warn!("controller rejected the authorization token");
                        state.send_replace(LinkState::AuthFailed);
                        let _ = ws.close(None).await;
                        return AuthOutcome::End(SessionEnd::Lost);
                    }
                    other => {
                        warn!(frame = other, "unexpected pre-auth frame; discarded");
                    }
                },
                Some(Ok(Message::Close(_))) | None => {
                    state.send_replace(LinkState::Closed);
                    return AuthOutcome::End(SessionEnd::Lost);
                }
                Some(Err(e)) => {
                    warn!(error = %e, "transport error during authentication");
                    state.send_replace(LinkState::Error);
                    return AuthOutcome::End(SessionEnd::Lost);
                }
                Some(Ok(_)) => {}
            },
        }
    }
}

/// Normal operation: poll telemetry, ship commands, correlate replies.
async fn connected_loop(
    mut ws: WsStream,
    config: &LinkConfig,
    ops: &mut mpsc::Receiver<Op>,
    state: &watch::Sender<LinkState>,
    telemetry: &watch::Sender<Option<TelemetrySnapshot>>,
) -> SessionEnd {
    // First tick fires immediately, so telemetry is requested right after
    // authentication and then on every interval.
    let mut poll = tokio::time::interval(config.poll_interval);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut pending: Option<ReplySlot> = None;
    let mut deadline: Option<Instant> = None;

    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Err(e) = send_command(&mut ws, &Command::GetInfo).await {
                    warn!(error = %e, "telemetry poll failed; tearing session down");
                    fail_pending(&mut pending, LinkError::ConnectionLost);
                    state.send_replace(LinkState::Error);
                    return SessionEnd::Lost;
                }
            }
            op = ops.recv() => match op {
                None | Some(Op::Shutdown) => {
                    fail_pending(&mut pending, LinkError::Closed);
                    let _ = ws.close(None).await;
                    return SessionEnd::Shutdown;
                }
                Some(Op::Send(command)) => {
                    if let Err(e) = send_command(&mut ws, &command).await {
                        warn!(command = %command.name(), error = %e, "send failed");
                        fail_pending(&mut pending, LinkError::ConnectionLost);
                        state.send_replace(LinkState::Error);
                        return SessionEnd::Lost;
                    }
                }
                Some(Op::Request(command, reply_tx)) => {
                    if pending.is_some() {
                        let _ = reply_tx.send(Err(LinkError::Busy));
                    } else if let Err(e) = send_command(&mut ws, &command).await {
                        warn!(command = %command.name(), error = %e, "request send failed");
                        let _ = reply_tx.send(Err(LinkError::ConnectionLost));
                        state.send_replace(LinkState::Error);
                        return SessionEnd::Lost;
                    } else {
                        pending = Some(reply_tx);
                        deadline = Some(Instant::now() + config.request_timeout);
                    }
                }
            },
            frame = ws.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handle_frame(text.as_str(), &mut pending, &mut deadline, telemetry);
                }
                Some(Ok(Message::Close(_))) | None => {
                    info!("controller closed the connection");
                    fail_pending(&mut pending, LinkError::ConnectionLost);
                    state.send_replace(LinkState::Closed);
                    return SessionEnd::Lost;
                }
                Some(Err(e)) => {
                    warn!(error = %e, "transport error");
                    fail_pending(&mut pending, LinkError::ConnectionLost);
                    state.send_replace(LinkState::Error);
                    return SessionEnd::Lost;
                }
                Some(Ok(_)) => {}
            },
            _ = request_deadline(deadline) => {
                warn!("correlated request timed out");
                deadline = None;
                fail_pending(&mut pending, LinkError::Timeout);
            }
        }
    }
}

/// Route one inbound structured frame.
///
/// Telemetry replies (`data.title == "get_info"`) always go to the
/// telemetry publisher, never to the pending correlated request, so a poll
/// response landing mid-request cannot be misdelivered. Any other
/// well-formed reply resolves the pending request if one exists.
fn handle_frame(
    raw: &str,
    pending: &mut Option<ReplySlot>,
    deadline: &mut Option<Instant>,
    telemetry: &watch::Sender<Option<TelemetrySnapshot>>,
) {
    let reply = match Reply::parse(raw) {
        Ok(reply) => reply,
        Err(e) => {
            warn!(error = %e, frame = raw, "discarding malformed frame");
            return;
        }
    };

    if reply.is_telemetry() {
        match reply.telemetry_values() {
            Some(values) => {
                telemetry.send_replace(Some(TelemetrySnapshot::from_values(values)));
            }
            None => warn!(frame = raw, "telemetry reply without usable values; discarded"),
        }
        return;
    }

    match pending.take() {
        Some(reply_tx) => {
            *deadline = None;
            let _ = reply_tx.send(Ok(reply));
        }
        None => debug!(frame = raw, "unsolicited reply; discarded"),
    }
}

async fn send_command(
    ws: &mut WsStream,
    command: &Command,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    match serde_json::to_string(command) {
        Ok(json) => {
            debug!(command = %command.name(), "sending");
            ws.send(Message::Text(json.into())).await
        }
        Err(e) => {
            // Commands are plain data; serialisation cannot realistically
            // fail, but a swallowed command must at least leave a trace.
            error!(command = %command.name(), error = %e, "command serialisation failed");
            Ok(())
        }
    }
}

fn fail_pending(pending: &mut Option<ReplySlot>, err: LinkError) {
    if let Some(reply_tx) = pending.take() {
        let _ = reply_tx.send(Err(err));
    }
}

/// Completes at the request deadline; never completes while no request is
/// outstanding.
async fn request_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
