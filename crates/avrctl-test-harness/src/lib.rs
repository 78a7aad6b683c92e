//! avrctl-test-harness: Test utilities and mock transports for avrctl.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! the protocol engine without receiver hardware, together with the
//! [`MockHandle`] controller used to drive a transport after the driver's
//! IO task has taken ownership of it.

pub mod mock_serial;

pub use mock_serial::{MockHandle, MockTransport};
