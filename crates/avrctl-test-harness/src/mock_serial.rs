//! Mock transport for deterministic testing of the protocol engine.
//!
//! [`MockTransport`] implements the [`Transport`] trait without hardware.
//! Because the driver's IO task takes exclusive ownership of the transport,
//! tests interact with it through a [`MockHandle`] obtained *before* the
//! transport is handed over: the handle injects inbound bytes (solicited or
//! unsolicited status lines) and inspects everything the driver wrote.
//!
//! # Example
//!
//! ```
//! use avrctl_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! let handle = mock.handle();
//!
//! // Pre-load: when the driver sends this request, return this reply.
//! mock.expect(b"PW?\r", b"PWON\r");
//!
//! // Or push an unsolicited status line at any time:
//! handle.inject(b"MV51\r");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;

use avrctl_core::error::{Error, Result};
use avrctl_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes to queue as inbound data when the matching request arrives.
    response: Vec<u8>,
}

/// A mock [`Transport`] for testing the protocol engine without hardware.
///
/// Inbound data comes from two places: responses attached to consumed
/// [`expect()`](MockTransport::expect) entries, and bytes pushed through
/// [`MockHandle::inject`]. Both land in the same queue and are delivered in
/// order by `receive()`.
///
/// Expectations are matched in order against `send()` calls. A send that
/// mismatches the front expectation is an error; a send with no expectations
/// queued is simply recorded (the fire-and-forget setter path).
pub struct MockTransport {
    /// Ordered queue of expected request/response pairs.
    expectations: VecDeque<Expectation>,
    /// Inbound byte chunks awaiting delivery.
    incoming_rx: mpsc::UnboundedReceiver<Vec<u8>>,
    incoming_tx: mpsc::UnboundedSender<Vec<u8>>,
    /// Partially delivered inbound chunk (receive buffer was smaller).
    pending: Vec<u8>,
    cursor: usize,
    /// Whether the transport is "connected".
    connected: Arc<AtomicBool>,
    /// Log of all bytes sent through this transport, one entry per `send()`.
    sent_log: Arc<Mutex<Vec<Vec<u8>>>>,
}

/// Controller handle for a [`MockTransport`] that has been moved into the
/// driver's IO task.
#[derive(Clone)]
pub struct MockHandle {
    incoming_tx: mpsc::UnboundedSender<Vec<u8>>,
    connected: Arc<AtomicBool>,
    sent_log: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        MockTransport {
            expectations: VecDeque::new(),
            incoming_rx,
            incoming_tx,
            pending: Vec::new(),
            cursor: 0,
            connected: Arc::new(AtomicBool::new(true)),
            sent_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Obtain a controller handle. Call before handing the transport to the
    /// driver; the handle stays valid for the life of the transport.
    pub fn handle(&self) -> MockHandle {
        MockHandle {
            incoming_tx: self.incoming_tx.clone(),
            connected: Arc::clone(&self.connected),
            sent_log: Arc::clone(&self.sent_log),
        }
    }

    /// Add an expected request/response pair.
    ///
    /// When `send()` is called with data matching `request`, `response` is
    /// queued as inbound data (an empty response queues nothing).
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    fn lock_sent(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        self.sent_log.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHandle {
    /// Queue inbound bytes for delivery, as if the receiver had sent them.
    ///
    /// Chunk boundaries are preserved: each call is delivered by one or more
    /// `receive()` calls before the next chunk starts, so tests can exercise
    /// partial-line buffering by splitting a line across two injections.
    pub fn inject(&self, bytes: &[u8]) {
        let _ = self.incoming_tx.send(bytes.to_vec());
    }

    /// Return a copy of everything sent so far, one entry per `send()` call.
    pub fn sent(&self) -> Vec<Vec<u8>> {
        self.sent_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Discard the sent log.
    pub fn clear_sent(&self) {
        self.sent_log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    /// Simulate losing the connection. Subsequent transport operations fail
    /// with [`Error::ConnectionLost`].
    pub fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    /// Wait until the sent log holds at least `count` entries, polling for up
    /// to `timeout`. Returns `false` on expiry.
    pub async fn wait_for_sent_count(&self, count: usize, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if self.sent().len() >= count {
                return true;
            }
            if tokio::time::Instant::now() >= deadline {
                return false;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(Error::ConnectionLost);
        }

        self.lock_sent().push(data.to_vec());

        // Match against the next expectation, if any are queued.
        if let Some(expectation) = self.expectations.pop_front() {
            if data != expectation.request.as_slice() {
                return Err(Error::Protocol(format!(
                    "unexpected send data: expected {:02X?}, got {:02X?}",
                    expectation.request, data
                )));
            }
            if !expectation.response.is_empty() {
                let _ = self.incoming_tx.send(expectation.response);
            }
        }
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize> {
        if !self.connected.load(Ordering::SeqCst) {
            return Err(Error::ConnectionLost);
        }

        // Serve any partially delivered chunk first.
        if self.cursor >= self.pending.len() {
            match tokio::time::timeout(timeout, self.incoming_rx.recv()).await {
                Ok(Some(bytes)) => {
                    self.pending = bytes;
                    self.cursor = 0;
                }
                Ok(None) => return Err(Error::ConnectionLost),
                Err(_) => return Err(Error::Timeout),
            }
        }

        let remaining = &self.pending[self.cursor..];
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.cursor += n;
        Ok(n)
    }

    async fn close(&mut self) -> Result<()> {
        self.connected.store(false, Ordering::SeqCst);
        self.pending.clear();
        self.cursor = 0;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_transport_basic_send_receive() {
        let mut mock = MockTransport::new();
        mock.expect(b"PW?\r", b"PWON\r");

        mock.send(b"PW?\r").await.unwrap();

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();

        assert_eq!(&buf[..n], b"PWON\r");
    }

    #[tokio::test]
    async fn mock_transport_tracks_sent_data() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();

        mock.send(b"MUON\r").await.unwrap();
        mock.send(b"MV19\r").await.unwrap();

        let sent = handle.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], b"MUON\r");
        assert_eq!(sent[1], b"MV19\r");
    }

    #[tokio::test]
    async fn mock_transport_send_without_expectations_succeeds() {
        let mut mock = MockTransport::new();
        // Fire-and-forget setter path: no expectations queued.
        mock.send(b"MUON\r").await.unwrap();
    }

    #[tokio::test]
    async fn mock_transport_wrong_data_errors() {
        let mut mock = MockTransport::new();
        mock.expect(b"PW?\r", b"PWON\r");

        let result = mock.send(b"MV?\r").await;
        assert!(matches!(result.unwrap_err(), Error::Protocol(_)));
    }

    #[tokio::test]
    async fn mock_transport_inject_delivers_unsolicited() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();

        handle.inject(b"MSDIRECT\r");

        let mut buf = [0u8; 64];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"MSDIRECT\r");
    }

    #[tokio::test]
    async fn mock_transport_receive_without_data_times_out() {
        let mut mock = MockTransport::new();
        let mut buf = [0u8; 64];

        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::Timeout));
    }

    #[tokio::test]
    async fn mock_transport_partial_receive() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();
        handle.inject(b"PSFRONT A\r");

        // Read with a buffer smaller than the chunk.
        let mut buf = [0u8; 4];
        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"PSFR");

        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"ONT ");

        let n = mock
            .receive(&mut buf, Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&buf[..n], b"A\r");
    }

    #[tokio::test]
    async fn mock_transport_disconnect() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();
        assert!(mock.is_connected());

        handle.disconnect();
        assert!(!mock.is_connected());

        let result = mock.send(b"PW?\r").await;
        assert!(matches!(result.unwrap_err(), Error::ConnectionLost));

        let mut buf = [0u8; 8];
        let result = mock.receive(&mut buf, Duration::from_millis(10)).await;
        assert!(matches!(result.unwrap_err(), Error::ConnectionLost));
    }

    #[tokio::test]
    async fn mock_transport_close() {
        let mut mock = MockTransport::new();
        mock.close().await.unwrap();
        assert!(!mock.is_connected());

        let result = mock.send(b"PW?\r").await;
        assert!(matches!(result.unwrap_err(), Error::ConnectionLost));
    }

    #[tokio::test]
    async fn mock_transport_remaining_expectations() {
        let mut mock = MockTransport::new();
        mock.expect(b"PW?\r", b"PWON\r");
        mock.expect(b"MV?\r", b"MV51\r");
        assert_eq!(mock.remaining_expectations(), 2);

        mock.send(b"PW?\r").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 1);

        mock.send(b"MV?\r").await.unwrap();
        assert_eq!(mock.remaining_expectations(), 0);
    }

    #[tokio::test]
    async fn mock_handle_wait_for_sent_count() {
        let mut mock = MockTransport::new();
        let handle = mock.handle();

        mock.send(b"MUON\r").await.unwrap();
        assert!(
            handle
                .wait_for_sent_count(1, Duration::from_millis(100))
                .await
        );
        assert!(
            !handle
                .wait_for_sent_count(2, Duration::from_millis(20))
                .await
        );
    }
}
