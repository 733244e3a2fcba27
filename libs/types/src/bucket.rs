//! Report buckets: ranking horizon × direction
//!
//! Each bucket names the extremum of exactly one ranking axis:
//!
//! | Bucket       | Horizon | Direction | Ranked by            |
//! |--------------|---------|-----------|----------------------|
//! | `SHORT_UP`   | 12h     | Up        | `ret_short` desc     |
//! | `SHORT_DOWN` | 12h     | Down      | `ret_short` asc      |
//! | `LONG_UP`    | 24h     | Up        | `ret_long` desc      |
//! | `LONG_DOWN`  | 24h     | Down      | `ret_long` asc       |

use crate::errors::TypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Return horizon a ranking is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    /// Trailing 12 one-hour buckets
    Short,
    /// Trailing 24 one-hour buckets
    Long,
}

/// Sort direction of a ranking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Best performer first (descending)
    Up,
    /// Worst performer first (ascending)
    Down,
}

/// Labeled report slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Bucket {
    ShortUp,
    ShortDown,
    LongUp,
    LongDown,
}

impl Bucket {
    /// All buckets in report order
    pub const ALL: [Bucket; 4] = [
        Bucket::ShortUp,
        Bucket::ShortDown,
        Bucket::LongUp,
        Bucket::LongDown,
    ];

    pub fn horizon(self) -> Horizon {
        match self {
            Bucket::ShortUp | Bucket::ShortDown => Horizon::Short,
            Bucket::LongUp | Bucket::LongDown => Horizon::Long,
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Bucket::ShortUp | Bucket::LongUp => Direction::Up,
            Bucket::ShortDown | Bucket::LongDown => Direction::Down,
        }
    }

    /// Position in report order (0..4)
    pub fn order(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Bucket::ShortUp => "SHORT_UP",
            Bucket::ShortDown => "SHORT_DOWN",
            Bucket::LongUp => "LONG_UP",
            Bucket::LongDown => "LONG_DOWN",
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Bucket {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|b| b.label() == s)
            .ok_or_else(|| TypeError::UnknownBucket(s.to_string()))
    }
}
