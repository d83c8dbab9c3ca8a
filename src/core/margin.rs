use std::fmt;
use std::str::FromStr;

use crate::core::ConfigError;

/// One side of a preload margin, in pixels or as a percentage of the
/// viewport dimension along that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginValue {
    Pixels(f64),
    Percent(f64),
}

impl Default for MarginValue {
    fn default() -> Self {
        MarginValue::Pixels(0.0)
    }
}

impl MarginValue {
    pub fn to_pixels(self, reference: f64) -> f64 {
        match self {
            MarginValue::Pixels(px) => px,
            MarginValue::Percent(pct) => reference * pct / 100.0,
        }
    }

    fn parse(value: &str) -> Result<Self, String> {
        let value = value.trim();
        let (number, ctor): (&str, fn(f64) -> MarginValue) = if let Some(n) = value.strip_suffix('%') {
            (n, MarginValue::Percent)
        } else if let Some(n) = value.strip_suffix("px") {
            (n, MarginValue::Pixels)
        } else {
            (value, MarginValue::Pixels)
        };

        let parsed = number
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("{:?} is not a number", value))?;
        if !parsed.is_finite() {
            return Err(format!("{:?} is not finite", value));
        }
        Ok(ctor(parsed))
    }
}

impl fmt::Display for MarginValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarginValue::Pixels(px) => write!(f, "{}px", px),
            MarginValue::Percent(pct) => write!(f, "{}%", pct),
        }
    }
}

/// Extra distance around the viewport inside which a slot already counts as
/// visible. Uses the CSS shorthand order: top, right, bottom, left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RootMargin {
    pub top: MarginValue,
    pub right: MarginValue,
    pub bottom: MarginValue,
    pub left: MarginValue,
}

impl RootMargin {
    pub fn uniform(value: MarginValue) -> Self {
        Self {
            top: value,
            right: value,
            bottom: value,
            left: value,
        }
    }
}

impl FromStr for RootMargin {
    type Err = ConfigError;

    fn from_str(margin: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::InvalidMargin {
            margin: margin.to_string(),
            reason,
        };

        let parts = margin
            .split_whitespace()
            .map(MarginValue::parse)
            .collect::<Result<Vec<_>, _>>()
            .map_err(invalid)?;

        match parts.as_slice() {
            [] => Ok(Self::default()),
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(invalid(format!("expected 1 to 4 values, got {}", parts.len()))),
        }
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
    }
}
