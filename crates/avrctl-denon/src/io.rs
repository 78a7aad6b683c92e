//! The IO task: single owner of the transport, line pump, and reply
//! correlator.
//!
//! One tokio task owns the `Box<dyn Transport>` exclusively. Callers reach
//! it through an `mpsc` request channel: writes are forwarded to the
//! transport, and reply waits are registered in the [`Waiters`] table. The
//! task continuously drains inbound bytes, dispatches each complete line to
//! the mirror, broadcasts the resulting change event, and resolves the
//! oldest matching wait.
//!
//! The channel is deliberately a single FIFO queue: a wait registered before
//! its query is written is guaranteed to be in the table before the
//! receiver's reply can arrive. The dispatch path itself never suspends on a
//! wait — if it did, the reply that would satisfy the wait could never be
//! delivered.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use avrctl_core::error::{Error, Result};
use avrctl_core::events::AvrEvent;
use avrctl_core::transport::Transport;

use crate::protocol::{self, DecodeResult};
use crate::state::Mirror;

/// Maximum inbound buffer size before reset. Status lines are 3-15 bytes;
/// anything approaching this is line noise with no terminator.
const MAX_BUF: usize = 8192;

/// How long a single idle read blocks before the loop re-checks its
/// channels.
const IDLE_READ_TIMEOUT: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A request sent from driver methods to the IO task.
pub(crate) enum Request {
    /// Write one encoded command line to the transport.
    WriteLine {
        bytes: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Register interest in an inbound line for a command code.
    Wait {
        code: String,
        /// When set, the wait only resolves on a line whose full text starts
        /// with this prefix; non-matching lines for the code are consumed
        /// and the wait re-registers itself.
        full_prefix: Option<String>,
        reply: oneshot::Sender<String>,
    },
    /// Graceful shutdown; returns the transport for recovery.
    Shutdown {
        reply: oneshot::Sender<Box<dyn Transport>>,
    },
}

/// Handle to the IO task. Stored inside the driver struct.
pub(crate) struct AvrIo {
    pub req_tx: mpsc::Sender<Request>,
    /// Stops the loop without draining the request channel.
    #[allow(dead_code)]
    pub cancel: CancellationToken,
    /// Bound on every registered wait.
    pub reply_timeout: Duration,
    /// Kept so the task can be joined on shutdown.
    #[allow(dead_code)]
    pub task: JoinHandle<()>,
}

/// A registered wait, not yet awaited. Dropping it abandons the wait; the
/// stale table entry is discarded the next time a line for its code arrives.
pub(crate) struct PendingReply {
    rx: oneshot::Receiver<String>,
    timeout: Duration,
}

impl PendingReply {
    /// Await the matching inbound line, bounded by the reply timeout.
    pub async fn recv(self) -> Result<String> {
        match tokio::time::timeout(self.timeout, self.rx).await {
            Ok(Ok(line)) => Ok(line),
            // Sender dropped: the IO task tore down with the wait pending.
            Ok(Err(_)) => Err(Error::ConnectionLost),
            Err(_) => Err(Error::Timeout),
        }
    }
}

impl AvrIo {
    /// Write one encoded line and wait for the transport write to complete.
    pub async fn write_line(&self, bytes: Vec<u8>) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(Request::WriteLine {
                bytes,
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;
        reply_rx.await.map_err(|_| Error::NotConnected)?
    }

    /// Register a wait for the next inbound line carrying `code` (or, with
    /// `full_prefix`, the next one whose text starts with that prefix).
    ///
    /// Register *before* writing the query the wait answers; the shared FIFO
    /// request channel then guarantees the registration is processed first.
    pub async fn register_wait(
        &self,
        code: &str,
        full_prefix: Option<&str>,
    ) -> Result<PendingReply> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.req_tx
            .send(Request::Wait {
                code: code.to_string(),
                full_prefix: full_prefix.map(str::to_string),
                reply: reply_tx,
            })
            .await
            .map_err(|_| Error::NotConnected)?;
        Ok(PendingReply {
            rx: reply_rx,
            timeout: self.reply_timeout,
        })
    }

    /// Shut down the IO task and recover the transport.
    pub async fn shutdown(self) -> Result<Box<dyn Transport>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let _ = self
            .req_tx
            .send(Request::Shutdown { reply: reply_tx })
            .await;
        let transport = reply_rx.await.map_err(|_| Error::NotConnected)?;
        let _ = self.task.await;
        Ok(transport)
    }
}

// ---------------------------------------------------------------------------
// Reply correlator
// ---------------------------------------------------------------------------

/// Pending-reply table: command code to FIFO queue of outstanding waits.
#[derive(Default)]
struct Waiters {
    by_code: HashMap<String, VecDeque<Waiter>>,
}

struct Waiter {
    full_prefix: Option<String>,
    tx: oneshot::Sender<String>,
}

impl Waiters {
    fn register(&mut self, code: String, full_prefix: Option<String>, tx: oneshot::Sender<String>) {
        self.by_code
            .entry(code)
            .or_default()
            .push_back(Waiter { full_prefix, tx });
    }

    /// Offer a dispatched line to the oldest outstanding wait for `code`.
    ///
    /// Waits are satisfied at most once, oldest-registered-first. A wait
    /// whose receiver has gone away (timed out) is discarded and the next
    /// one tried. A full-prefix wait that does not match consumes the line
    /// and re-registers itself at the back of the queue.
    fn resolve(&mut self, code: &str, line: &str) {
        let Some(queue) = self.by_code.get_mut(code) else {
            return;
        };
        while let Some(waiter) = queue.pop_front() {
            if waiter.tx.is_closed() {
                continue;
            }
            if let Some(prefix) = &waiter.full_prefix {
                if !line.starts_with(prefix.as_str()) {
                    queue.push_back(waiter);
                    break;
                }
            }
            let _ = waiter.tx.send(line.to_string());
            break;
        }
        if queue.is_empty() {
            self.by_code.remove(code);
        }
    }

    /// Drop every pending wait. Each waiter observes the closed channel as
    /// [`Error::ConnectionLost`].
    fn fail_all(&mut self) {
        self.by_code.clear();
    }

    #[cfg(test)]
    fn pending(&self, code: &str) -> usize {
        self.by_code.get(code).map_or(0, VecDeque::len)
    }
}

// ---------------------------------------------------------------------------
// Spawn
// ---------------------------------------------------------------------------

/// Spawn the IO task.
///
/// The task owns the transport exclusively; `mirror` is the shared state it
/// alone writes, `event_tx` carries change notifications.
pub(crate) fn spawn_io_task(
    transport: Box<dyn Transport>,
    mirror: Arc<RwLock<Mirror>>,
    event_tx: broadcast::Sender<AvrEvent>,
    reply_timeout: Duration,
) -> AvrIo {
    let (req_tx, req_rx) = mpsc::channel::<Request>(32);
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();

    let task = tokio::spawn(io_loop(transport, mirror, event_tx, req_rx, cancel_clone));

    AvrIo {
        req_tx,
        cancel,
        reply_timeout,
        task,
    }
}

// ---------------------------------------------------------------------------
// IO loop
// ---------------------------------------------------------------------------

/// Outcome of one idle read pass.
enum ReadOutcome {
    Continue,
    Fatal,
}

/// The main loop of the IO task.
///
/// Uses `tokio::select! { biased; }` to prioritize cancellation, then
/// requests, then idle reads. Inbound lines are processed strictly in
/// arrival order.
async fn io_loop(
    mut transport: Box<dyn Transport>,
    mirror: Arc<RwLock<Mirror>>,
    event_tx: broadcast::Sender<AvrEvent>,
    mut req_rx: mpsc::Receiver<Request>,
    cancel: CancellationToken,
) {
    let mut waiters = Waiters::default();
    let mut line_buf: Vec<u8> = Vec::new();

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                debug!("IO task cancelled");
                break;
            }

            req = req_rx.recv() => {
                match req {
                    Some(Request::WriteLine { bytes, reply }) => {
                        let result = transport.send(&bytes).await;
                        let fatal = matches!(
                            result,
                            Err(Error::ConnectionLost) | Err(Error::NotConnected)
                        );
                        let _ = reply.send(result);
                        if fatal {
                            break;
                        }
                    }
                    Some(Request::Wait { code, full_prefix, reply }) => {
                        waiters.register(code, full_prefix, reply);
                    }
                    Some(Request::Shutdown { reply }) => {
                        debug!("IO task shutdown requested");
                        let _ = reply.send(transport);
                        return;
                    }
                    None => {
                        // All senders dropped -- the driver was dropped.
                        debug!("request channel closed, exiting IO task");
                        let _ = transport.close().await;
                        return;
                    }
                }
            }

            // Idle: drain inbound status lines from the receiver.
            outcome = async {
                let mut buf = [0u8; 256];
                match transport.receive(&mut buf, IDLE_READ_TIMEOUT).await {
                    Ok(n) if n > 0 => {
                        line_buf.extend_from_slice(&buf[..n]);
                        if line_buf.len() > MAX_BUF {
                            warn!(len = line_buf.len(), "inbound buffer overflow, resetting");
                            line_buf.clear();
                            return ReadOutcome::Continue;
                        }
                        pump_lines(&mut line_buf, &mirror, &event_tx, &mut waiters);
                        ReadOutcome::Continue
                    }
                    Ok(_) | Err(Error::Timeout) => {
                        // No data -- yield briefly so the loop can check
                        // for requests or cancellation.
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        ReadOutcome::Continue
                    }
                    Err(e) => {
                        error!(error = %e, "transport read failed");
                        ReadOutcome::Fatal
                    }
                }
            } => {
                if matches!(outcome, ReadOutcome::Fatal) {
                    break;
                }
            }
        }
    }

    // Teardown: a pending wait must never dangle past the session.
    waiters.fail_all();
    let _ = event_tx.send(AvrEvent::Disconnected);
    let _ = transport.close().await;
}

/// Drain all complete lines from the buffer and dispatch each in order.
///
/// Incomplete data is left in the buffer for the next read cycle.
fn pump_lines(
    buf: &mut Vec<u8>,
    mirror: &RwLock<Mirror>,
    event_tx: &broadcast::Sender<AvrEvent>,
    waiters: &mut Waiters,
) {
    loop {
        match protocol::decode_line(buf) {
            DecodeResult::Line { text, consumed } => {
                buf.drain(..consumed);
                dispatch_line(&text, mirror, event_tx, waiters);
            }
            DecodeResult::Ignored(consumed) => {
                buf.drain(..consumed);
                debug!("ignoring short or non-text inbound line");
            }
            DecodeResult::Incomplete => break,
        }
    }
}

/// Dispatch one complete inbound line: update the mirror, resolve the oldest
/// matching wait, then broadcast the change event.
fn dispatch_line(
    line: &str,
    mirror: &RwLock<Mirror>,
    event_tx: &broadcast::Sender<AvrEvent>,
    waiters: &mut Waiters,
) {
    let (code, arg) = protocol::split_code(line);

    let applied = {
        let mut state = mirror.write().unwrap_or_else(|e| e.into_inner());
        state.apply(code, arg)
    };

    match applied {
        Ok(event) => {
            waiters.resolve(code, line);
            if let Some(event) = event {
                let _ = event_tx.send(event);
            }
        }
        Err(e) => {
            // A recognized code with an unmodeled argument: the mirror is
            // stale for this attribute and the fault must be visible.
            error!(line, error = %e, "protocol violation in inbound line");
            let _ = event_tx.send(AvrEvent::ProtocolFault {
                line: line.to_string(),
                detail: e.to_string(),
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
