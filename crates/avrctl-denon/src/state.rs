//! Mirrored receiver state and the per-code dispatch table.
//!
//! [`Mirror`] is the in-process snapshot of the receiver's attributes. Every
//! field starts unknown and is updated *only* by [`Mirror::apply`] processing
//! an inbound line — setters request changes and the mirror follows once the
//! receiver confirms. An attribute is therefore always either its last
//! confirmed value or `None`, never a guess.

use avrctl_core::error::{Error, Result};
use avrctl_core::events::AvrEvent;
use tracing::trace;

use crate::commands::decode_volume;

/// Best-known snapshot of the receiver's state.
///
/// Cheap to clone; [`DenonAvr::snapshot()`](crate::avr::DenonAvr::snapshot)
/// hands out copies.
#[derive(Debug, Default, Clone)]
pub struct Mirror {
    /// Main power: `true` on, `false` standby.
    pub power: Option<bool>,
    /// Master volume, 0-99.
    pub volume: Option<u8>,
    /// Volume ceiling reported by the receiver; bounds volume writes.
    pub volume_max: Option<u8>,
    /// Speaker mute.
    pub mute: Option<bool>,
    /// Main zone power.
    pub main_zone: Option<bool>,
    /// Zone-2 speaker mute.
    pub zone2_mute: Option<bool>,
    /// Last reported input source token. The receiver may report tokens
    /// outside the modeled [`InputSource`](avrctl_core::InputSource) set;
    /// they are stored as-is.
    pub input_source: Option<String>,
    /// Last reported signal source type token, stored as-is like
    /// `input_source`.
    pub source_type: Option<String>,
    /// Last reported surround mode, free-form.
    pub surround_mode: Option<String>,
    /// Speaker bank A active. Never `Some(true)` together with `speaker_b`.
    pub speaker_a: Option<bool>,
    /// Speaker bank B active.
    pub speaker_b: Option<bool>,
}

impl Mirror {
    /// Apply one decoded inbound line to the mirror.
    ///
    /// Returns the change event to broadcast, if this code announces one.
    /// Unrecognized codes are ignored without error — the receiver grows new
    /// status messages across firmware revisions. A recognized code with an
    /// unmodeled argument is a protocol error and leaves the mirror
    /// untouched.
    pub fn apply(&mut self, code: &str, arg: &str) -> Result<Option<AvrEvent>> {
        match code {
            "PW" => {
                let on = match arg {
                    "ON" => true,
                    "STANDBY" => false,
                    _ => return Err(Error::Protocol(format!("unknown PW argument: {arg:?}"))),
                };
                self.power = Some(on);
                Ok(Some(AvrEvent::PowerChanged { on }))
            }
            "MU" => {
                let on = parse_on_off("MU", arg)?;
                self.mute = Some(on);
                Ok(Some(AvrEvent::MuteChanged { on }))
            }
            "ZM" => {
                let on = parse_on_off("ZM", arg)?;
                self.main_zone = Some(on);
                Ok(Some(AvrEvent::MainZoneChanged { on }))
            }
            "Z2MU" => {
                // Only the mute-off confirmation is modeled.
                if arg != "OFF" {
                    return Err(Error::Protocol(format!("unknown Z2MU argument: {arg:?}")));
                }
                self.zone2_mute = Some(false);
                Ok(None)
            }
            "MV" => {
                if let Some(rest) = arg.strip_prefix("MAX ") {
                    let level = decode_volume(rest)
                        .map_err(|e| Error::Protocol(format!("bad MV MAX argument: {e}")))?;
                    self.volume_max = Some(level);
                    Ok(Some(AvrEvent::VolumeMaxChanged { level }))
                } else {
                    let level = decode_volume(arg)
                        .map_err(|e| Error::Protocol(format!("bad MV argument: {e}")))?;
                    self.volume = Some(level);
                    Ok(Some(AvrEvent::VolumeChanged { level }))
                }
            }
            "MS" => {
                self.surround_mode = Some(arg.to_string());
                Ok(None)
            }
            "SI" => {
                // Inbound parser is permissive: store whatever token the
                // receiver reports. Only the outbound setter validates.
                self.input_source = Some(arg.to_string());
                Ok(Some(AvrEvent::InputChanged {
                    source: arg.to_string(),
                }))
            }
            "SD" => {
                self.source_type = Some(arg.to_string());
                Ok(Some(AvrEvent::SourceTypeChanged {
                    source: arg.to_string(),
                }))
            }
            "PS" => {
                if arg != "FRONT A" {
                    return Err(Error::Protocol(format!("unknown PS argument: {arg:?}")));
                }
                self.speaker_a = Some(true);
                self.speaker_b = Some(false);
                Ok(None)
            }
            _ => {
                trace!(code, arg, "ignoring unrecognized command code");
                Ok(None)
            }
        }
    }
}

fn parse_on_off(code: &str, arg: &str) -> Result<bool> {
    match arg {
        "ON" => Ok(true),
        "OFF" => Ok(false),
        _ => Err(Error::Protocol(format!(
            "unknown {code} argument: {arg:?}"
        ))),
    }
}
