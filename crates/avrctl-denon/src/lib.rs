//! avrctl-denon: Denon serial control protocol driver.
//!
//! Implements the carriage-return-terminated text protocol spoken on the
//! receiver's RS-232C port. The receiver volunteers a status line whenever
//! state changes at the front panel, so inbound traffic interleaves replies
//! with unsolicited reports; a background IO task dispatches every line into
//! an in-process mirror and pairs replies with their queries by command
//! code.
//!
//! # Modules
//!
//! - [`avr`] -- the [`DenonAvr`] driver: getters, setters, refresh, events
//! - [`builder`] -- [`DenonBuilder`] construction API
//! - [`protocol`] -- line codec (encode, incremental decode, code split)
//! - [`commands`] -- outbound command builders and the volume transform
//! - [`state`] -- the [`Mirror`] and its per-code dispatch table
//!
//! # Example
//!
//! ```no_run
//! use avrctl_denon::DenonBuilder;
//!
//! # async fn example() -> avrctl_core::Result<()> {
//! let avr = DenonBuilder::new()
//!     .serial_port("/dev/ttyUSB0")
//!     .build()
//!     .await?;
//!
//! avr.refresh().await?;
//! println!("power: {:?}, volume: {:?}", avr.power(), avr.volume());
//!
//! avr.set_volume(20).await?;
//! # Ok(())
//! # }
//! ```

pub mod avr;
pub mod builder;
pub mod commands;
mod io;
pub mod protocol;
pub mod state;

pub use avr::DenonAvr;
pub use builder::DenonBuilder;
pub use state::Mirror;
