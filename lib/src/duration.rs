/******************************************************************************
 * Copyright Groundwork. Licensed under the "Elastic License 2.0".            *
 ******************************************************************************/

use std::{fmt::Display, str::FromStr};

use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::error::{Error, Result};

/// A whole-second duration used for retention periods, timeouts and
/// time-based alarm thresholds. Rendered in the largest unit that divides
/// the value exactly ("30s", "15m", "1h", "14d").
#[derive(
    SerializeDisplay, DeserializeFromStr, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug,
)]
pub struct Duration(u64);

impl Duration {
    pub const fn seconds(n: u64) -> Self {
        Self(n)
    }

    pub const fn minutes(n: u64) -> Self {
        Self(n * 60)
    }

    pub const fn hours(n: u64) -> Self {
        Self(n * 3600)
    }

    pub const fn days(n: u64) -> Self {
        Self(n * 86400)
    }

    pub const fn as_seconds(&self) -> u64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            n if n > 0 && n % 86400 == 0 => write!(f, "{}d", n / 86400),
            n if n > 0 && n % 3600 == 0 => write!(f, "{}h", n / 3600),
            n if n > 0 && n % 60 == 0 => write!(f, "{}m", n / 60),
            n => write!(f, "{n}s"),
        }
    }
}

impl FromStr for Duration {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let (value, unit) = s
            .char_indices()
            .last()
            .map(|(at, _)| s.split_at(at))
            .ok_or_else(|| Error::InvalidDuration(s.to_string()))?;
        let n = value
            .parse::<u64>()
            .map_err(|_| Error::InvalidDuration(s.to_string()))?;
        match unit {
            "s" => Ok(Self::seconds(n)),
            "m" => Ok(Self::minutes(n)),
            "h" => Ok(Self::hours(n)),
            "d" => Ok(Self::days(n)),
            _ => Err(Error::InvalidDuration(s.to_string())),
        }
    }
}
