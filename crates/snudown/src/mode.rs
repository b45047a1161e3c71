//! Moderation modes.

use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;

/// A moderation policy selecting sanitization flags and whitelists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    /// User-submitted text: raw HTML escaped, images stripped.
    #[cfg_attr(feature = "serde", serde(rename = "usertext", alias = "plaintext"))]
    PlainText,
    /// Wiki pages: table markup whitelisted, images allowed.
    #[cfg_attr(feature = "serde", serde(rename = "wiki"))]
    Wiki,
}

impl Mode {
    /// All modes, in index order.
    pub const ALL: [Self; 2] = [Self::PlainText, Self::Wiki];

    pub(crate) const COUNT: usize = Self::ALL.len();

    /// Numeric index used by callers that pass modes as integers.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::PlainText => 0,
            Self::Wiki => 1,
        }
    }

    /// Name used in configuration files and on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PlainText => "usertext",
            Self::Wiki => "wiki",
        }
    }
}

impl TryFrom<i32> for Mode {
    type Error = RenderError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::PlainText),
            1 => Ok(Self::Wiki),
            other => Err(RenderError::InvalidMode(other)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a [`Mode`] from its name.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown mode `{0}` (expected `usertext` or `wiki`)")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usertext" | "plaintext" => Ok(Self::PlainText),
            "wiki" => Ok(Self::Wiki),
            _ => Err(ParseModeError(s.to_owned())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_from_known_indices() {
        assert_eq!(Mode::try_from(0).unwrap(), Mode::PlainText);
        assert_eq!(Mode::try_from(1).unwrap(), Mode::Wiki);
    }

    #[test]
    fn test_try_from_rejects_unknown_index() {
        let err = Mode::try_from(7).unwrap_err();
        assert!(matches!(err, RenderError::InvalidMode(7)));
        assert!(matches!(
            Mode::try_from(-1),
            Err(RenderError::InvalidMode(-1))
        ));
    }

    #[test]
    fn test_index_round_trips() {
        for mode in Mode::ALL {
            let index = i32::try_from(mode.index()).unwrap();
            assert_eq!(Mode::try_from(index).unwrap(), mode);
        }
    }

    #[test]
    fn test_from_str() {
        assert_eq!("usertext".parse::<Mode>().unwrap(), Mode::PlainText);
        assert_eq!("PlainText".parse::<Mode>().unwrap(), Mode::PlainText);
        assert_eq!("wiki".parse::<Mode>().unwrap(), Mode::Wiki);
        let err = "markdown".parse::<Mode>().unwrap_err();
        assert!(err.to_string().contains("markdown"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Mode::PlainText.to_string(), "usertext");
        assert_eq!(Mode::Wiki.to_string(), "wiki");
    }
}
