//! Denon control-protocol line codec.
//!
//! The Denon serial protocol uses carriage-return-terminated ASCII lines
//! over a 9600 baud link. Commands and status lines share one format.
//!
//! # Line format
//!
//! ```text
//! <code><argument>\r
//! ```
//!
//! - `code`: a two-character mnemonic (`PW`, `MV`, `SI`, ...) with one
//!   four-character exception, `Z2MU` (zone-2 mute). Code length is a
//!   property of the static command table, never inferred from the line.
//! - `argument`: the remainder of the line. May contain spaces
//!   (`MVMAX 80`, `PSFRONT A`).
//! - Terminator: a single `\r` (0x0D). No line feed, no checksum.
//!
//! The receiver volunteers status lines whenever state changes at the front
//! panel, so inbound traffic is a mix of replies and unsolicited reports —
//! all decoded identically here and told apart by the reply correlator.

use bytes::{BufMut, BytesMut};

/// Line terminator byte: a bare carriage return.
pub const TERMINATOR: u8 = b'\r';

/// The command codes longer than the default two characters.
///
/// Checked first when splitting a line, so `Z2MUOFF` parses as
/// (`Z2MU`, `OFF`) rather than (`Z2`, `MUOFF`).
pub const LONG_CODES: &[&str] = &["Z2MU"];

/// Result of attempting to decode one line from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete line was decoded.
    Line {
        /// The line with the terminator stripped.
        text: String,
        /// Number of bytes consumed from the input buffer (terminator
        /// included).
        consumed: usize,
    },

    /// A complete but undispatchable line: shorter than two characters
    /// (blank keepalives) or not ASCII text (line noise). The `usize` is
    /// the number of bytes to discard.
    Ignored(usize),

    /// The buffer does not yet contain a complete line. More data is needed.
    Incomplete,
}

/// Encode a command into raw bytes ready for transmission.
///
/// Concatenates the command code, argument, and the terminator `\r`.
///
/// # Example
///
/// ```
/// use avrctl_denon::protocol::encode_command;
///
/// let cmd = encode_command("PW", "?");
/// assert_eq!(cmd, b"PW?\r");
///
/// let cmd = encode_command("MV", "19");
/// assert_eq!(cmd, b"MV19\r");
/// ```
pub fn encode_command(code: &str, arg: &str) -> Vec<u8> {
    let capacity = code.len() + arg.len() + 1;
    let mut buf = BytesMut::with_capacity(capacity);
    buf.put_slice(code.as_bytes());
    buf.put_slice(arg.as_bytes());
    buf.put_u8(TERMINATOR);
    buf.to_vec()
}

/// Attempt to decode one line from a byte buffer.
///
/// Scans `buf` for a carriage-return terminator. Returns
/// [`DecodeResult::Line`] with the delimiter-stripped text and the number of
/// bytes consumed, [`DecodeResult::Ignored`] for complete lines that are not
/// dispatchable, or [`DecodeResult::Incomplete`] if no terminator is present
/// yet.
pub fn decode_line(buf: &[u8]) -> DecodeResult {
    if buf.is_empty() {
        return DecodeResult::Incomplete;
    }

    let term_pos = match buf.iter().position(|&b| b == TERMINATOR) {
        Some(pos) => pos,
        None => return DecodeResult::Incomplete,
    };

    let consumed = term_pos + 1;
    let body = &buf[..term_pos];

    // A line shorter than a command code carries nothing dispatchable;
    // the receiver emits blank lines as keepalives on some firmware.
    if body.len() < 2 || !body.is_ascii() {
        return DecodeResult::Ignored(consumed);
    }

    // ASCII was just verified, so the conversion is lossless.
    let text = String::from_utf8_lossy(body).into_owned();

    DecodeResult::Line { text, consumed }
}

/// Split a decoded line into command code and argument.
///
/// The four-character codes in [`LONG_CODES`] are matched first; everything
/// else splits after two characters. `decode_line` guarantees at least two
/// ASCII characters, so the split is always valid.
pub fn split_code(line: &str) -> (&str, &str) {
    for code in LONG_CODES {
        if let Some(rest) = line.strip_prefix(code) {
            return (code, rest);
        }
    }
    line.split_at(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---------------------------------------------------------------
    // Command encoding
    // ---------------------------------------------------------------

    #[test]
    fn encode_power_query() {
        assert_eq!(encode_command("PW", "?"), b"PW?\r");
    }

    #[test]
    fn encode_power_on() {
        assert_eq!(encode_command("PW", "ON"), b"PWON\r");
    }

    #[test]
    fn encode_power_standby() {
        assert_eq!(encode_command("PW", "STANDBY"), b"PWSTANDBY\r");
    }

    #[test]
    fn encode_volume_set() {
        assert_eq!(encode_command("MV", "19"), b"MV19\r");
    }

    #[test]
    fn encode_input_with_slash() {
        assert_eq!(encode_command("SI", "SAT/CBL"), b"SISAT/CBL\r");
    }

    #[test]
    fn encode_zone2_mute() {
        assert_eq!(encode_command("Z2MU", "OFF"), b"Z2MUOFF\r");
    }

    // ---------------------------------------------------------------
    // Line decoding
    // ---------------------------------------------------------------

    #[test]
    fn decode_power_line() {
        match decode_line(b"PWSTANDBY\r") {
            DecodeResult::Line { text, consumed } => {
                assert_eq!(text, "PWSTANDBY");
                assert_eq!(consumed, 10);
            }
            other => panic!("expected Line, got {other:?}"),
        }
    }

    #[test]
    fn decode_line_with_space() {
        match decode_line(b"MVMAX 80\r") {
            DecodeResult::Line { text, consumed } => {
                assert_eq!(text, "MVMAX 80");
                assert_eq!(consumed, 9);
            }
            other => panic!("expected Line, got {other:?}"),
        }
    }

    #[test]
    fn decode_incomplete_no_terminator() {
        assert_eq!(decode_line(b"PWSTANDBY"), DecodeResult::Incomplete);
    }

    #[test]
    fn decode_incomplete_empty() {
        assert_eq!(decode_line(b""), DecodeResult::Incomplete);
    }

    #[test]
    fn decode_blank_line_ignored() {
        assert_eq!(decode_line(b"\r"), DecodeResult::Ignored(1));
    }

    #[test]
    fn decode_one_char_line_ignored() {
        assert_eq!(decode_line(b"P\r"), DecodeResult::Ignored(2));
    }

    #[test]
    fn decode_non_ascii_line_ignored() {
        assert_eq!(decode_line(b"\xFF\xFE\xFD\r"), DecodeResult::Ignored(4));
    }

    #[test]
    fn decode_multiple_lines_in_buffer() {
        let buf = b"MV51\rMVMAX 80\r";
        match decode_line(buf) {
            DecodeResult::Line { text, consumed } => {
                assert_eq!(text, "MV51");
                assert_eq!(consumed, 5);

                match decode_line(&buf[consumed..]) {
                    DecodeResult::Line { text, consumed } => {
                        assert_eq!(text, "MVMAX 80");
                        assert_eq!(consumed, 9);
                    }
                    other => panic!("expected second Line, got {other:?}"),
                }
            }
            other => panic!("expected first Line, got {other:?}"),
        }
    }

    // ---------------------------------------------------------------
    // Code splitting
    // ---------------------------------------------------------------

    #[test]
    fn split_two_char_code() {
        assert_eq!(split_code("PWON"), ("PW", "ON"));
        assert_eq!(split_code("MV51"), ("MV", "51"));
        assert_eq!(split_code("MVMAX 80"), ("MV", "MAX 80"));
        assert_eq!(split_code("PSFRONT A"), ("PS", "FRONT A"));
    }

    #[test]
    fn split_four_char_code() {
        assert_eq!(split_code("Z2MUOFF"), ("Z2MU", "OFF"));
        assert_eq!(split_code("Z2MUON"), ("Z2MU", "ON"));
    }

    #[test]
    fn split_bare_code() {
        assert_eq!(split_code("MS"), ("MS", ""));
    }

    // ---------------------------------------------------------------
    // Round-trip: encode then decode
    // ---------------------------------------------------------------

    #[test]
    fn round_trip_set_volume() {
        let cmd = encode_command("MV", "19");
        match decode_line(&cmd) {
            DecodeResult::Line { text, .. } => {
                assert_eq!(split_code(&text), ("MV", "19"));
            }
            other => panic!("expected Line, got {other:?}"),
        }
    }

    #[test]
    fn round_trip_zone2_mute() {
        let cmd = encode_command("Z2MU", "ON");
        match decode_line(&cmd) {
            DecodeResult::Line { text, .. } => {
                assert_eq!(split_code(&text), ("Z2MU", "ON"));
            }
            other => panic!("expected Line, got {other:?}"),
        }
    }
}
