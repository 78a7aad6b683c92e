//! Core types used throughout avrctl.
//!
//! The typed enums here cover the value domains the client is allowed to
//! *request*. The receiver itself may report tokens outside these domains
//! (newer firmware adds inputs); the inbound parser stores whatever arrives,
//! while setters only accept members of these enums.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Audio input source selectable on the receiver.
///
/// The `Display` form is the exact wire token used in `SI` commands and
/// replies (e.g. `SIPHONO`, `SISAT/CBL`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    /// Phono (turntable) input.
    Phono,
    /// Built-in tuner.
    Tuner,
    /// CD player input.
    Cd,
    /// Auxiliary video input.
    VAux,
    /// DVD player input.
    Dvd,
    /// Television audio input.
    Tv,
    /// Satellite / cable box input.
    SatCbl,
    /// Digital video recorder input.
    Dvr,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InputSource::Phono => "PHONO",
            InputSource::Tuner => "TUNER",
            InputSource::Cd => "CD",
            InputSource::VAux => "V.AUX",
            InputSource::Dvd => "DVD",
            InputSource::Tv => "TV",
            InputSource::SatCbl => "SAT/CBL",
            InputSource::Dvr => "DVR",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed into an [`InputSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseInputSourceError(String);

impl fmt::Display for ParseInputSourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown input source: {}", self.0)
    }
}

impl std::error::Error for ParseInputSourceError {}

impl FromStr for InputSource {
    type Err = ParseInputSourceError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "PHONO" => Ok(InputSource::Phono),
            "TUNER" => Ok(InputSource::Tuner),
            "CD" => Ok(InputSource::Cd),
            "V.AUX" => Ok(InputSource::VAux),
            "DVD" => Ok(InputSource::Dvd),
            "TV" => Ok(InputSource::Tv),
            "SAT/CBL" => Ok(InputSource::SatCbl),
            "DVR" => Ok(InputSource::Dvr),
            _ => Err(ParseInputSourceError(s.to_string())),
        }
    }
}

impl From<ParseInputSourceError> for Error {
    fn from(e: ParseInputSourceError) -> Self {
        Error::InvalidParameter(e.to_string())
    }
}

/// Signal source type selectable on the receiver (`SD` command).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// Automatic selection between digital and analog.
    Auto,
    /// HDMI audio.
    Hdmi,
    /// Optical / coaxial digital audio.
    Digital,
    /// Analog audio.
    Analog,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SourceType::Auto => "AUTO",
            SourceType::Hdmi => "HDMI",
            SourceType::Digital => "DIGITAL",
            SourceType::Analog => "ANALOG",
        };
        write!(f, "{s}")
    }
}

/// Error returned when a string cannot be parsed into a [`SourceType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseSourceTypeError(String);

impl fmt::Display for ParseSourceTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown source type: {}", self.0)
    }
}

impl std::error::Error for ParseSourceTypeError {}

impl FromStr for SourceType {
    type Err = ParseSourceTypeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "AUTO" => Ok(SourceType::Auto),
            "HDMI" => Ok(SourceType::Hdmi),
            "DIGITAL" => Ok(SourceType::Digital),
            "ANALOG" => Ok(SourceType::Analog),
            _ => Err(ParseSourceTypeError(s.to_string())),
        }
    }
}

impl From<ParseSourceTypeError> for Error {
    fn from(e: ParseSourceTypeError) -> Self {
        Error::InvalidParameter(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_source_display_round_trip() {
        let all = [
            InputSource::Phono,
            InputSource::Tuner,
            InputSource::Cd,
            InputSource::VAux,
            InputSource::Dvd,
            InputSource::Tv,
            InputSource::SatCbl,
            InputSource::Dvr,
        ];
        for src in all {
            let token = src.to_string();
            assert_eq!(token.parse::<InputSource>(), Ok(src), "token {token}");
        }
    }

    #[test]
    fn input_source_rejects_unknown() {
        assert!("bogus".parse::<InputSource>().is_err());
        assert!("phono".parse::<InputSource>().is_err());
        assert!("".parse::<InputSource>().is_err());
    }

    #[test]
    fn input_source_parse_error_converts_to_invalid_parameter() {
        let err = "bogus".parse::<InputSource>().unwrap_err();
        let e: Error = err.into();
        assert!(matches!(e, Error::InvalidParameter(_)));
        assert!(e.to_string().contains("bogus"));
    }

    #[test]
    fn source_type_display_round_trip() {
        let all = [
            SourceType::Auto,
            SourceType::Hdmi,
            SourceType::Digital,
            SourceType::Analog,
        ];
        for ty in all {
            let token = ty.to_string();
            assert_eq!(token.parse::<SourceType>(), Ok(ty), "token {token}");
        }
    }

    #[test]
    fn source_type_rejects_unknown() {
        assert!("bogus".parse::<SourceType>().is_err());
        assert!("auto".parse::<SourceType>().is_err());
    }
}
