//! # avrctl -- Serial Control for Denon A/V Receivers
//!
//! `avrctl` is an asynchronous Rust library for controlling Denon A/V
//! receivers over their RS-232C serial control port. It is designed for
//! home-automation bridges and control panels where the receiver's state
//! must stay observable even while someone turns the physical knobs.
//!
//! ## Quick Start
//!
//! Add `avrctl` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! avrctl = "0.1"
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Connect to a receiver and read its state:
//!
//! ```no_run
//! use avrctl::DenonBuilder;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let avr = DenonBuilder::new()
//!         .serial_port("/dev/ttyUSB0")
//!         .build()
//!         .await?;
//!
//!     avr.refresh().await?;
//!     println!("power: {:?}  volume: {:?}", avr.power(), avr.volume());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                 | Purpose                                      |
//! |-----------------------|----------------------------------------------|
//! | `avrctl-core`         | Traits, typed value domains, events, errors  |
//! | `avrctl-transport`    | Serial transport implementation              |
//! | `avrctl-denon`        | Denon text protocol driver                   |
//! | `avrctl-test-harness` | Mock transport for deterministic tests       |
//! | **`avrctl`**          | This facade crate -- re-exports everything   |
//!
//! ## The Mirror
//!
//! The driver keeps an in-process mirror of the receiver's state. Every
//! attribute starts unknown and is updated *only* when the receiver reports
//! it -- setters request a change and return immediately; the mirror follows
//! once the confirmation line arrives. This means a getter never returns a
//! guessed value: it is either the last confirmed state or `None`.
//!
//! ## Event Subscription
//!
//! The driver emits [`AvrEvent`]s through a broadcast channel. Subscribe to
//! receive power, volume, mute, and input changes without polling -- the
//! receiver volunteers these whenever state changes at the front panel:
//!
//! ```no_run
//! use avrctl::{AvrEvent, DenonAvr};
//! # async fn example(avr: &DenonAvr) {
//! let mut events = avr.subscribe();
//! loop {
//!     match events.recv().await {
//!         Ok(AvrEvent::VolumeChanged { level }) => {
//!             println!("volume: {level}");
//!         }
//!         Ok(event) => println!("{event:?}"),
//!         Err(_) => break,
//!     }
//! }
//! # }
//! ```

pub use avrctl_core::*;

pub use avrctl_denon::{DenonAvr, DenonBuilder, Mirror};

/// Denon protocol driver internals.
///
/// The facade re-exports the common surface ([`DenonAvr`], [`DenonBuilder`],
/// [`Mirror`]); this module exposes the protocol engine for callers that
/// need the codec or command builders directly.
pub mod denon {
    pub use avrctl_denon::*;
}

/// Transport implementations.
///
/// Provides [`SerialTransport`](transport::SerialTransport) for the
/// receiver's RS-232C port. Any [`Transport`] implementation can be passed
/// to [`DenonBuilder::build_with_transport`].
pub mod transport {
    pub use avrctl_transport::*;
}
