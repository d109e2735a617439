//! Target aspect ratios for framing guides

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::AspectError;

/// Width:height proportion of a delivery format
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AspectRatio {
    pub width: f64,
    pub height: f64,
}

impl AspectRatio {
    pub const WIDESCREEN: Self = Self::new(16.0, 9.0);
    pub const UNIVISIUM: Self = Self::new(2.0, 1.0);
    pub const ACADEMY: Self = Self::new(4.0, 3.0);
    pub const SCOPE: Self = Self::new(2.39, 1.0);
    pub const SQUARE: Self = Self::new(1.0, 1.0);
    pub const VERTICAL: Self = Self::new(9.0, 16.0);

    /// Used when a label is not in the catalog
    pub const DEFAULT: Self = Self::WIDESCREEN;

    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Selectable ratios, in menu order
    pub fn catalog() -> &'static [AspectRatio] {
        &[
            Self::WIDESCREEN,
            Self::UNIVISIUM,
            Self::ACADEMY,
            Self::SCOPE,
            Self::SQUARE,
            Self::VERTICAL,
        ]
    }

    /// Width divided by height
    pub fn value(&self) -> f64 {
        self.width / self.height
    }

    /// Label such as `16:9` or `2.39:1`
    pub fn label(&self) -> String {
        self.to_string()
    }

    /// Catalog entry for `label`, or [`AspectRatio::DEFAULT`]
    pub fn lookup_or_default(label: &str) -> Self {
        let label = label.trim();
        Self::catalog()
            .iter()
            .copied()
            .find(|ratio| ratio.label() == label)
            .unwrap_or(Self::DEFAULT)
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

fn positive(part: &str) -> Option<f64> {
    part.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

impl FromStr for AspectRatio {
    type Err = AspectError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AspectError::Invalid(s.to_string());
        match s.split_once(':') {
            Some((w, h)) => {
                let width = positive(w).ok_or_else(invalid)?;
                let height = positive(h).ok_or_else(invalid)?;
                Ok(Self::new(width, height))
            }
            None => positive(s).map(|v| Self::new(v, 1.0)).ok_or_else(invalid),
        }
    }
}
