//! avrctl-transport: Transport implementations for avrctl.
//!
//! Provides [`SerialTransport`] for the receiver's RS-232C control port and
//! USB-serial adapters. Protocol engines consume the
//! [`Transport`](avrctl_core::Transport) trait, so a
//! `MockTransport` from `avrctl-test-harness` can stand in for hardware
//! during testing.

pub mod serial;

pub use serial::{DataBits, FlowControl, Parity, SerialConfig, SerialTransport, StopBits};
