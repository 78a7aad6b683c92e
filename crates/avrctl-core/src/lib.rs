//! avrctl-core: Core traits, types, and error definitions for avrctl.
//!
//! This crate defines the abstractions shared by the protocol engine and
//! transport implementations. Applications depend on these types without
//! pulling in a specific transport.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`AvrEvent`] -- asynchronous state change notifications
//! - [`InputSource`] / [`SourceType`] -- typed setter value domains
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod events;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use avrctl_core::*`.
pub use error::{Error, Result};
pub use events::AvrEvent;
pub use transport::Transport;
pub use types::{InputSource, ParseInputSourceError, ParseSourceTypeError, SourceType};
