//! Outbound command builders and value transforms for the Denon protocol.
//!
//! Each `cmd_*` function returns the exact wire bytes for one command,
//! terminator included. Query commands use `?` as the argument; the reply
//! arrives asynchronously and is paired up by the reply correlator.
//!
//! # Volume encoding
//!
//! The receiver numbers volume steps with a +1/mod-100 offset: the wire
//! value is one less than the logical level, wrapped into two digits. So
//! logical 0 is wire `99`, logical 1 is wire `00`, and logical 99 is wire
//! `98`. [`encode_volume`] and [`decode_volume`] are exact inverses on the
//! logical range 0-99; a naive linear mapping is off by one everywhere and
//! turns the mute-level floor into full blast.

use avrctl_core::error::{Error, Result};
use avrctl_core::types::{InputSource, SourceType};

use crate::protocol::encode_command;

/// Encode a logical volume level (0-99) as its two-digit wire argument.
pub fn encode_volume(level: u8) -> Result<String> {
    if level > 99 {
        return Err(Error::InvalidParameter(format!(
            "volume {level} out of range 0-99"
        )));
    }
    Ok(format!("{:02}", (u16::from(level) + 99) % 100))
}

/// Decode a two-digit wire volume argument into the logical level (0-99).
pub fn decode_volume(arg: &str) -> Result<u8> {
    let wire: i32 = arg
        .trim()
        .parse()
        .map_err(|_| Error::InvalidParameter(format!("volume argument {arg:?} is not numeric")))?;
    if !(0..=99).contains(&wire) {
        return Err(Error::InvalidParameter(format!(
            "volume argument {wire} out of range 0-99"
        )));
    }
    Ok(((wire + 1) % 100) as u8)
}

/// Set main power: `PWON` / `PWSTANDBY`.
pub fn cmd_set_power(on: bool) -> Vec<u8> {
    encode_command("PW", if on { "ON" } else { "STANDBY" })
}

/// Query main power: `PW?`.
pub fn cmd_query_power() -> Vec<u8> {
    encode_command("PW", "?")
}

/// Set mute: `MUON` / `MUOFF`.
pub fn cmd_set_mute(on: bool) -> Vec<u8> {
    encode_command("MU", if on { "ON" } else { "OFF" })
}

/// Set main zone power: `ZMON` / `ZMOFF`.
pub fn cmd_set_main_zone(on: bool) -> Vec<u8> {
    encode_command("ZM", if on { "ON" } else { "OFF" })
}

/// Set zone-2 mute: `Z2MUON` / `Z2MUOFF`.
pub fn cmd_set_zone2_mute(on: bool) -> Vec<u8> {
    encode_command("Z2MU", if on { "ON" } else { "OFF" })
}

/// Set master volume to a logical level (0-99).
pub fn cmd_set_volume(level: u8) -> Result<Vec<u8>> {
    Ok(encode_command("MV", &encode_volume(level)?))
}

/// Query master volume: `MV?`.
///
/// The receiver answers with two lines: the current level (`MV51`) followed
/// by the ceiling (`MVMAX 80`).
pub fn cmd_query_volume() -> Vec<u8> {
    encode_command("MV", "?")
}

/// Set the input source: `SIPHONO`, `SISAT/CBL`, ...
pub fn cmd_set_input_source(source: InputSource) -> Vec<u8> {
    encode_command("SI", &source.to_string())
}

/// Query the input source: `SI?`.
pub fn cmd_query_input_source() -> Vec<u8> {
    encode_command("SI", "?")
}

/// Set the signal source type: `SDAUTO`, `SDHDMI`, ...
pub fn cmd_set_source_type(source: SourceType) -> Vec<u8> {
    encode_command("SD", &source.to_string())
}
