//! Value normalization for ranking
//!
//! Maps a product's raw attribute value onto [0.0, 1.0] against the
//! category's [`AttributeStat`], then orients it by the caller's
//! [`Direction`].

use catrank_core::{AttributeStat, AttributeValue};

use crate::weights::Direction;

/// Normalized value for a degenerate (single point) numeric range
pub const DEGENERATE_RANGE: f64 = 0.5;

/// Normalize a raw value against its category statistic.
///
/// - numeric: position within `[min, max]`, clamped
/// - boolean: 1.0 for `true`, 0.0 for `false`
/// - categorical: 1.0 when the value was observed in the category, 0.0 otherwise
///
/// Returns `None` for absent values and for numbers the statistic holds no
/// range for.
pub fn normalize(value: &AttributeValue, stat: &AttributeStat) -> Option<f64> {
    match value {
        AttributeValue::Numeric(v) if v.is_finite() => {
            let (min, max) = (stat.min?, stat.max?);
            let range = max - min;
            if range <= 0.0 {
                Some(DEGENERATE_RANGE)
            } else {
                Some(((v - min) / range).clamp(0.0, 1.0))
            }
        }
        AttributeValue::Numeric(_) | AttributeValue::NotApplicable => None,
        AttributeValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        AttributeValue::Categorical(s) => Some(if stat.contains(s) { 1.0 } else { 0.0 }),
    }
}

/// Orient a normalized value so that 1.0 is always preferred
#[inline]
pub fn orient(normalized: f64, direction: Direction) -> f64 {
    match direction {
        Direction::HigherIsBetter => normalized,
        Direction::LowerIsBetter => 1.0 - normalized,
        Direction::IgnoreMagnitude => 0.0,
    }
}
