//! DenonAvr -- the driver for a receiver connected over its serial control
//! port.
//!
//! This module ties the protocol engine ([`protocol`](crate::protocol),
//! [`commands`](crate::commands), [`state`](crate::state)) to a
//! [`Transport`] through the background IO task in [`io`](crate::io).
//!
//! Getters are synchronous and return the last mirrored value (`None` until
//! first observed). Setters are fire-and-forget: they validate, skip the
//! write when the mirror already matches, and otherwise emit exactly one
//! command line — the mirror only changes when the receiver's confirmation
//! line is dispatched, which also fires the corresponding
//! [`AvrEvent`]. Calling code that needs the confirmation subscribes to
//! events rather than polling.

use std::sync::{Arc, RwLock, RwLockReadGuard};
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

use avrctl_core::error::{Error, Result};
use avrctl_core::events::AvrEvent;
use avrctl_core::transport::Transport;
use avrctl_core::types::{InputSource, SourceType};

use crate::commands;
use crate::io::{self, AvrIo};
use crate::state::Mirror;

/// A connected Denon receiver.
///
/// Constructed via [`DenonBuilder`](crate::builder::DenonBuilder). All
/// communication goes through the [`Transport`] provided at build time,
/// owned by a background IO task for the life of the session.
pub struct DenonAvr {
    io: AvrIo,
    mirror: Arc<RwLock<Mirror>>,
    event_tx: broadcast::Sender<AvrEvent>,
}

impl DenonAvr {
    /// Create a new `DenonAvr` over the given transport.
    ///
    /// This is called by [`DenonBuilder`](crate::builder::DenonBuilder);
    /// callers should use the builder API instead.
    pub(crate) fn new(transport: Box<dyn Transport>, reply_timeout: Duration) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        let mirror = Arc::new(RwLock::new(Mirror::default()));
        let io = io::spawn_io_task(
            transport,
            Arc::clone(&mirror),
            event_tx.clone(),
            reply_timeout,
        );
        DenonAvr {
            io,
            mirror,
            event_tx,
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, Mirror> {
        self.mirror.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Return a copy of the entire mirrored state.
    pub fn snapshot(&self) -> Mirror {
        self.state().clone()
    }

    // -----------------------------------------------------------------
    // Getters (mirrored state; `None` until first observed)
    // -----------------------------------------------------------------

    /// Main power state, `true` if on.
    pub fn power(&self) -> Option<bool> {
        self.state().power
    }

    /// Master volume, 0-99.
    pub fn volume(&self) -> Option<u8> {
        self.state().volume
    }

    /// Maximum volume the receiver reports as settable.
    pub fn volume_max(&self) -> Option<u8> {
        self.state().volume_max
    }

    /// Mute state, `true` if the speakers are muted.
    pub fn mute(&self) -> Option<bool> {
        self.state().mute
    }

    /// Main zone power state.
    pub fn main_zone(&self) -> Option<bool> {
        self.state().main_zone
    }

    /// Zone-2 mute state.
    pub fn zone2_mute(&self) -> Option<bool> {
        self.state().zone2_mute
    }

    /// Last reported input source token (e.g. `"PHONO"`). May be a token
    /// outside the modeled [`InputSource`] set on newer firmware.
    pub fn input_source(&self) -> Option<String> {
        self.state().input_source.clone()
    }

    /// Last reported signal source type token (e.g. `"ANALOG"`).
    pub fn source_type(&self) -> Option<String> {
        self.state().source_type.clone()
    }

    /// Surround mode, free-form (e.g. `"DIRECT"`, `"DOLBY PL2 MUSIC"`).
    pub fn surround_mode(&self) -> Option<String> {
        self.state().surround_mode.clone()
    }

    /// Whether speaker bank A is active.
    pub fn speaker_a(&self) -> Option<bool> {
        self.state().speaker_a
    }

    /// Whether speaker bank B is active.
    pub fn speaker_b(&self) -> Option<bool> {
        self.state().speaker_b
    }

    // -----------------------------------------------------------------
    // Setters (fire-and-forget; the mirror follows the confirmation)
    // -----------------------------------------------------------------

    /// Request main power on or standby.
    pub async fn set_power(&self, on: bool) -> Result<()> {
        if self.power() == Some(on) {
            return Ok(());
        }
        debug!(on, "setting power");
        self.io.write_line(commands::cmd_set_power(on)).await
    }

    /// Request mute on or off.
    pub async fn set_mute(&self, on: bool) -> Result<()> {
        if self.mute() == Some(on) {
            return Ok(());
        }
        debug!(on, "setting mute");
        self.io.write_line(commands::cmd_set_mute(on)).await
    }

    /// Request main zone power on or off.
    pub async fn set_main_zone(&self, on: bool) -> Result<()> {
        if self.main_zone() == Some(on) {
            return Ok(());
        }
        debug!(on, "setting main zone");
        self.io.write_line(commands::cmd_set_main_zone(on)).await
    }

    /// Request zone-2 mute on or off.
    pub async fn set_zone2_mute(&self, on: bool) -> Result<()> {
        if self.zone2_mute() == Some(on) {
            return Ok(());
        }
        debug!(on, "setting zone-2 mute");
        self.io.write_line(commands::cmd_set_zone2_mute(on)).await
    }

    /// Request a master volume level (0-99).
    ///
    /// Fails with [`Error::InvalidParameter`] before any I/O when the level
    /// is out of range or exceeds the ceiling the receiver has reported.
    pub async fn set_volume(&self, level: u8) -> Result<()> {
        if level > 99 {
            return Err(Error::InvalidParameter(format!(
                "volume {level} out of range 0-99"
            )));
        }
        if let Some(max) = self.volume_max() {
            if level > max {
                return Err(Error::InvalidParameter(format!(
                    "volume {level} exceeds receiver maximum {max}"
                )));
            }
        }
        if self.volume() == Some(level) {
            return Ok(());
        }
        debug!(level, "setting volume");
        self.io.write_line(commands::cmd_set_volume(level)?).await
    }

    /// Request an input source.
    pub async fn set_input_source(&self, source: InputSource) -> Result<()> {
        if self.state().input_source.as_deref() == Some(source.to_string().as_str()) {
            return Ok(());
        }
        debug!(%source, "setting input source");
        self.io
            .write_line(commands::cmd_set_input_source(source))
            .await
    }

    /// Request a signal source type.
    pub async fn set_source_type(&self, source: SourceType) -> Result<()> {
        if self.state().source_type.as_deref() == Some(source.to_string().as_str()) {
            return Ok(());
        }
        debug!(%source, "setting source type");
        self.io
            .write_line(commands::cmd_set_source_type(source))
            .await
    }

    // -----------------------------------------------------------------
    // Refresh
    // -----------------------------------------------------------------

    /// Resynchronize the mirror with the receiver.
    ///
    /// Issues the query sequence power → volume → input, awaiting each
    /// reply before the next query so request/response pairing stays
    /// deterministic on a channel that also carries unsolicited lines. The
    /// volume stage waits for the `MVMAX` ceiling line, which follows the
    /// plain value line in the receiver's two-line answer. Returns once the
    /// last awaited reply has been dispatched into the mirror.
    pub async fn refresh(&self) -> Result<()> {
        debug!("refreshing mirrored state");

        let wait = self.io.register_wait("PW", None).await?;
        self.io.write_line(commands::cmd_query_power()).await?;
        wait.recv().await?;

        let wait = self.io.register_wait("MV", Some("MVMAX")).await?;
        self.io.write_line(commands::cmd_query_volume()).await?;
        wait.recv().await?;

        let wait = self.io.register_wait("SI", None).await?;
        self.io
            .write_line(commands::cmd_query_input_source())
            .await?;
        wait.recv().await?;

        Ok(())
    }

    // -----------------------------------------------------------------
    // Events / lifecycle
    // -----------------------------------------------------------------

    /// Subscribe to state-change events.
    ///
    /// Returns a broadcast receiver. The channel is bounded; if the consumer
    /// falls behind, older events are dropped (lagged). Dropping the
    /// receiver unsubscribes.
    pub fn subscribe(&self) -> broadcast::Receiver<AvrEvent> {
        self.event_tx.subscribe()
    }

    /// End the session: stop the IO task and close the transport.
    ///
    /// Pending waits fail with
    /// [`Error::ConnectionLost`](avrctl_core::Error::ConnectionLost).
    pub async fn close(self) -> Result<()> {
        let mut transport = self.io.shutdown().await?;
        transport.close().await
    }
}
