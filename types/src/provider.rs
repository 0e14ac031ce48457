//! Supported identity-verification providers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::IdvError;

/// An external identity-verification provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Didit,
    Veriff,
}

impl Provider {
    pub const ALL: [Provider; 2] = [Provider::Didit, Provider::Veriff];

    /// Lowercase identifier used in routes, config sections and store keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Didit => "didit",
            Self::Veriff => "veriff",
        }
    }

    /// Name used in human-readable provenance notes.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Didit => "Didit",
            Self::Veriff => "Veriff",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = IdvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "didit" => Ok(Self::Didit),
            "veriff" => Ok(Self::Veriff),
            _ => Err(IdvError::UnknownProvider(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Didit".parse::<Provider>().unwrap(), Provider::Didit);
        assert_eq!("VERIFF".parse::<Provider>().unwrap(), Provider::Veriff);
        assert!("onfido".parse::<Provider>().is_err());
    }

    #[test]
    fn as_str_round_trips() {
        for p in Provider::ALL {
            assert_eq!(p.as_str().parse::<Provider>().unwrap(), p);
        }
    }
}
