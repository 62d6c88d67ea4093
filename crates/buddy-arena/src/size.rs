// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Human-readable arena sizes.
//!
//! An [`ArenaSize`] is the length of the address range an arena manages.
//! It parses strings like `"64K"` or `"1G"` so sizes can come from config
//! files and the command line.

use crate::ArenaError;
use std::fmt;

const KIB: usize = 1024;
const MIB: usize = 1024 * KIB;
const GIB: usize = 1024 * MIB;

/// The length, in bytes, of an arena's address range.
///
/// # Parsing
/// - `"512"` or `"512B"` → 512 bytes
/// - `"64K"` or `"64KB"` → 64 × 1024 bytes
/// - `"1M"` or `"1MB"` → 1024² bytes
/// - `"2G"` or `"2GB"` → 2 × 1024³ bytes
///
/// Suffixes are case-insensitive. Zero is rejected, since an arena must
/// span at least one byte.
///
/// # Examples
/// ```
/// use buddy_arena::ArenaSize;
///
/// let s = ArenaSize::parse("64K").unwrap();
/// assert_eq!(s.as_bytes(), 65536);
/// assert_eq!(s.to_string(), "64 KB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
pub struct ArenaSize {
    bytes: usize,
}

impl ArenaSize {
    /// Creates a size from a byte count.
    pub fn from_bytes(bytes: usize) -> Self {
        Self { bytes }
    }

    /// Creates a size from kibibytes, saturating at `usize::MAX`.
    pub fn from_kb(kb: usize) -> Self {
        Self {
            bytes: kb.saturating_mul(KIB),
        }
    }

    /// Creates a size from mebibytes, saturating at `usize::MAX`.
    pub fn from_mb(mb: usize) -> Self {
        Self {
            bytes: mb.saturating_mul(MIB),
        }
    }

    /// Returns the size in bytes.
    pub fn as_bytes(&self) -> usize {
        self.bytes
    }

    /// Returns `true` if the size is a power of two, i.e. every split
    /// down to a single byte is exact.
    pub fn is_power_of_two(&self) -> bool {
        self.bytes.is_power_of_two()
    }

    /// Parses a human-readable size string.
    pub fn parse(s: &str) -> Result<Self, ArenaError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ArenaError::InvalidSize("empty size string".into()));
        }

        let upper = s.to_uppercase();
        let (num_str, multiplier) = if let Some(rest) = strip_unit(&upper, "G") {
            (rest, GIB)
        } else if let Some(rest) = strip_unit(&upper, "M") {
            (rest, MIB)
        } else if let Some(rest) = strip_unit(&upper, "K") {
            (rest, KIB)
        } else if let Some(rest) = upper.strip_suffix('B') {
            (rest, 1)
        } else {
            (upper.as_str(), 1)
        };

        let value: usize = num_str.trim().parse().map_err(|_| {
            ArenaError::InvalidSize(format!(
                "'{s}': expected a number followed by an optional K, M or G suffix"
            ))
        })?;

        let bytes = value
            .checked_mul(multiplier)
            .ok_or_else(|| ArenaError::InvalidSize(format!("'{s}' overflows usize")))?;

        if bytes == 0 {
            return Err(ArenaError::ZeroSizedArena);
        }

        Ok(Self { bytes })
    }
}

/// Strips `unit` or `unit` + `"B"` from the end of an uppercased string.
fn strip_unit<'a>(s: &'a str, unit: &str) -> Option<&'a str> {
    s.strip_suffix('B')
        .and_then(|rest| rest.strip_suffix(unit))
        .or_else(|| s.strip_suffix(unit))
}

impl From<usize> for ArenaSize {
    fn from(bytes: usize) -> Self {
        Self::from_bytes(bytes)
    }
}

impl std::str::FromStr for ArenaSize {
    type Err = ArenaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ArenaSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.bytes >= GIB && self.bytes % GIB == 0 {
            write!(f, "{} GB", self.bytes / GIB)
        } else if self.bytes >= MIB && self.bytes % MIB == 0 {
            write!(f, "{} MB", self.bytes / MIB)
        } else if self.bytes >= KIB && self.bytes % KIB == 0 {
            write!(f, "{} KB", self.bytes / KIB)
        } else {
            write!(f, "{} B", self.bytes)
        }
    }
}
