//! Asynchronous state-change event types.
//!
//! Events are emitted by the driver through a [`tokio::sync::broadcast`]
//! channel whenever an inbound status line changes the mirrored state.
//! Front-ends and automation rules subscribe to these events for real-time
//! updates without polling.
//!
//! One inbound line produces at most one event. Codes whose handlers update
//! derived fields without an announcement (speaker configuration, surround
//! mode, zone-2 mute confirmations) emit nothing.

/// An event emitted by the driver when mirrored receiver state changes.
///
/// Subscribe via `DenonAvr::subscribe()` in `avrctl-denon`. Events are
/// delivered on a best-effort basis through a bounded broadcast channel;
/// slow consumers may miss events under load (e.g. a volume knob sweep).
/// Dropping the receiver unsubscribes.
#[derive(Debug, Clone)]
pub enum AvrEvent {
    /// Main power state changed.
    PowerChanged {
        /// `true` if on, `false` if in standby.
        on: bool,
    },

    /// Master volume changed.
    VolumeChanged {
        /// New volume level, 0-99.
        level: u8,
    },

    /// The receiver reported its volume ceiling.
    VolumeMaxChanged {
        /// Maximum settable volume level.
        level: u8,
    },

    /// Mute state changed.
    MuteChanged {
        /// `true` if the speakers are muted.
        on: bool,
    },

    /// Main zone power state changed.
    MainZoneChanged {
        /// `true` if the main zone is on.
        on: bool,
    },

    /// The input source changed.
    InputChanged {
        /// The wire token the receiver reported (may be a token outside
        /// the modeled [`InputSource`](crate::types::InputSource) set).
        source: String,
    },

    /// The signal source type changed.
    SourceTypeChanged {
        /// The wire token the receiver reported.
        source: String,
    },

    /// An inbound line carried a recognized code with an argument the
    /// driver does not model.
    ///
    /// The mirror is left untouched for that line; the fault is surfaced
    /// here (and via `tracing`) rather than silently swallowed, since a
    /// stale mirror must never masquerade as a confirmed one.
    ProtocolFault {
        /// The offending line, delimiter-stripped.
        line: String,
        /// Human-readable description of the mismatch.
        detail: String,
    },

    /// The transport was torn down; all pending replies have failed.
    Disconnected,
}
