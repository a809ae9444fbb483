#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use fxhash::FxHashMap;

use crate::error::CoreError;
use crate::grid::IMPASSABLE;

/// A mapping from symbol code to cost multiplier, used during rasterization
/// to override the default multiplier of open terrain.
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObstacleConfig {
    multipliers: FxHashMap<String, f32>,
}

impl ObstacleConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build directly from `(symbol_code, multiplier)` pairs, bypassing the
    /// text format. `-1.0` denotes impassable, matching the text format's
    /// convention.
    #[must_use]
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        let mut multipliers = FxHashMap::default();
        for (symbol, value) in pairs {
            multipliers.insert(symbol.into(), normalize_multiplier(value));
        }
        Self { multipliers }
    }

    /// Parse the text form: one mapping per line, `SYMBOL_CODE:
    /// MULTIPLIER`. Lines starting with `#` or blank lines are ignored;
    /// whitespace around the colon is insignificant.
    ///
    /// # Errors
    /// Returns [`CoreError::BadConfig`] on the first line that is neither
    /// blank, a comment, nor a valid `SYMBOL: MULTIPLIER` pair.
    pub fn parse(text: &str) -> Result<Self, CoreError> {
        let mut multipliers = FxHashMap::default();
        for (line_no, raw_line) in text.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (symbol, value) = line.split_once(':').ok_or_else(|| CoreError::BadConfig {
                line: line_no + 1,
                text: raw_line.to_string(),
            })?;
            let symbol = symbol.trim();
            let value: f32 = value.trim().parse().map_err(|_| CoreError::BadConfig {
                line: line_no + 1,
                text: raw_line.to_string(),
            })?;
            if symbol.is_empty() || (!value.is_finite() && value != -1.0) || (value <= 0.0 && value != -1.0) {
                return Err(CoreError::BadConfig {
                    line: line_no + 1,
                    text: raw_line.to_string(),
                });
            }
            multipliers.insert(symbol.to_string(), normalize_multiplier(value));
        }
        Ok(Self { multipliers })
    }

    /// Look up the cost multiplier for a symbol code, if configured.
    #[inline]
    #[must_use]
    pub fn multiplier(&self, symbol_code: &str) -> Option<f32> {
        self.multipliers.get(symbol_code).copied()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.multipliers.len()
    }
}

#[inline]
fn normalize_multiplier(value: f32) -> f32 {
    if value == -1.0 {
        IMPASSABLE
    } else {
        value
    }
}
