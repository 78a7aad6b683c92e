//! Error types for avrctl.
//!
//! All fallible operations across the library return [`Result<T>`], which
//! uses [`Error`] as the error type. Transport-layer, protocol-layer, and
//! application-layer errors are all captured here.

/// The error type for all avrctl operations.
///
/// Variants cover the full range of failure modes encountered when talking
/// to a receiver over its serial control port: physical transport failures,
/// malformed status lines, reply timeouts, and rejected parameters.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A transport-level error (serial port open/configure failure).
    #[error("transport error: {0}")]
    Transport(String),

    /// A protocol-level error (a status line whose argument does not match
    /// any recognized value for its command code).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Timed out waiting for a reply from the receiver.
    ///
    /// This typically indicates the receiver is powered off at the mains,
    /// the cable is disconnected, or the baud rate is wrong.
    #[error("timeout waiting for reply")]
    Timeout,

    /// An invalid parameter was passed to a setter.
    ///
    /// Raised synchronously before any bytes are written.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// No connection to the receiver has been established.
    #[error("not connected")]
    NotConnected,

    /// The connection to the receiver was lost unexpectedly.
    ///
    /// All replies pending at the moment of loss fail with this error.
    #[error("connection lost")]
    ConnectionLost,

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience `Result` alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_transport() {
        let e = Error::Transport("port busy".into());
        assert_eq!(e.to_string(), "transport error: port busy");
    }

    #[test]
    fn error_display_protocol() {
        let e = Error::Protocol("unknown PW argument".into());
        assert_eq!(e.to_string(), "protocol error: unknown PW argument");
    }

    #[test]
    fn error_display_timeout() {
        let e = Error::Timeout;
        assert_eq!(e.to_string(), "timeout waiting for reply");
    }

    #[test]
    fn error_display_invalid_parameter() {
        let e = Error::InvalidParameter("volume out of range".into());
        assert_eq!(e.to_string(), "invalid parameter: volume out of range");
    }

    #[test]
    fn error_display_not_connected() {
        let e = Error::NotConnected;
        assert_eq!(e.to_string(), "not connected");
    }

    #[test]
    fn error_display_connection_lost() {
        let e = Error::ConnectionLost;
        assert_eq!(e.to_string(), "connection lost");
    }

    #[test]
    fn error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe broken");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(e.to_string().contains("pipe broken"));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<Error>();
        assert_sync::<Error>();
    }

    #[test]
    fn error_implements_std_error() {
        fn assert_std_error<T: std::error::Error>() {}
        assert_std_error::<Error>();
    }
}
