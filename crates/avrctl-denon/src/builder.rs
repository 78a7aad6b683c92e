//! DenonBuilder -- fluent builder for constructing [`DenonAvr`] instances.
//!
//! Separates configuration from construction so that callers can set up
//! serial port parameters and the reply timeout before the transport is
//! handed to the background IO task.
//!
//! # Example
//!
//! ```no_run
//! use avrctl_denon::builder::DenonBuilder;
//! use std::time::Duration;
//!
//! # async fn example() -> avrctl_core::Result<()> {
//! let avr = DenonBuilder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .reply_timeout(Duration::from_secs(2))
//!     .build()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use avrctl_core::error::{Error, Result};
use avrctl_core::transport::Transport;

use crate::avr::DenonAvr;

/// Fluent builder for [`DenonAvr`].
///
/// Defaults match the receiver's rear-panel RS-232C port: 9600 baud and a
/// 1 second reply timeout.
pub struct DenonBuilder {
    serial_port: Option<String>,
    baud_rate: u32,
    reply_timeout: Duration,
}

impl DenonBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        DenonBuilder {
            serial_port: None,
            baud_rate: 9600,
            reply_timeout: Duration::from_secs(1),
        }
    }

    /// Set the serial port path (e.g. `/dev/ttyUSB0` or `COM3`).
    pub fn serial_port(mut self, port: &str) -> Self {
        self.serial_port = Some(port.to_string());
        self
    }

    /// Override the default 9600 baud rate (for USB bridges that translate).
    pub fn baud_rate(mut self, baud: u32) -> Self {
        self.baud_rate = baud;
        self
    }

    /// Set the timeout bounding each awaited reply (default: 1 s).
    ///
    /// Applies to [`refresh()`](DenonAvr::refresh) stages and every
    /// registered wait; an expired wait fails with
    /// [`Error::Timeout`](avrctl_core::Error::Timeout) and is removed from
    /// the pending-reply table.
    pub fn reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    /// Build a [`DenonAvr`] with a caller-provided transport.
    ///
    /// This is the primary entry point for testing (pass a `MockTransport`
    /// from `avrctl-test-harness`) and for advanced use cases where the
    /// caller manages the transport lifecycle directly.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<DenonAvr> {
        Ok(DenonAvr::new(transport, self.reply_timeout))
    }

    /// Build a [`DenonAvr`] using a serial transport.
    ///
    /// Requires that [`serial_port()`](Self::serial_port) has been called.
    pub async fn build(self) -> Result<DenonAvr> {
        let port = self
            .serial_port
            .as_ref()
            .ok_or_else(|| Error::InvalidParameter("serial_port is required for build()".into()))?;

        let transport = avrctl_transport::SerialTransport::open(port, self.baud_rate).await?;
        self.build_with_transport(Box::new(transport)).await
    }
}

impl Default for DenonBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avrctl_test_harness::MockTransport;

    #[tokio::test]
    async fn builder_defaults() {
        let mock = MockTransport::new();
        let avr = DenonBuilder::new()
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        // Fresh session: nothing observed yet.
        assert_eq!(avr.power(), None);
    }

    #[tokio::test]
    async fn builder_custom_settings() {
        let mock = MockTransport::new();
        let avr = DenonBuilder::new()
            .serial_port("/dev/ttyUSB0")
            .baud_rate(115_200)
            .reply_timeout(Duration::from_millis(200))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap();

        assert_eq!(avr.volume(), None);
    }

    #[tokio::test]
    async fn builder_serial_port_required_for_build() {
        let result = DenonBuilder::new().build().await;
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }
}
