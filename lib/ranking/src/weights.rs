//! User-scored attributes
//!
//! A caller picks attributes out of a category's scored list and attaches a
//! signed weight to each one. The sign says which end of the range is
//! preferred; the magnitude says how much the attribute matters.

use catrank_scoring::ScoredAttribute;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which end of an attribute's range the caller prefers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Larger values (or a categorical match, or `true`) rank higher
    #[default]
    HigherIsBetter,
    /// Smaller values rank higher
    LowerIsBetter,
    /// Listed in the explanation but never moves the score
    IgnoreMagnitude,
}

impl Direction {
    /// Direction encoded by the sign of a weight. Zero means ignore.
    pub fn from_sign(weight: f64) -> Self {
        if weight > 0.0 {
            Direction::HigherIsBetter
        } else if weight < 0.0 {
            Direction::LowerIsBetter
        } else {
            Direction::IgnoreMagnitude
        }
    }
}

/// A scored attribute chosen by the caller, with its weight and direction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserScoredAttribute {
    pub attribute: ScoredAttribute,
    /// Non-negative magnitude
    pub weight: f64,
    #[serde(default)]
    pub direction: Direction,
}

impl UserScoredAttribute {
    pub fn new(attribute: ScoredAttribute, weight: f64, direction: Direction) -> Self {
        Self {
            attribute,
            weight: weight.abs(),
            direction,
        }
    }

    /// Split a signed weight into magnitude and direction
    pub fn from_signed(attribute: ScoredAttribute, signed_weight: f64) -> Self {
        Self::new(attribute, signed_weight, Direction::from_sign(signed_weight))
    }

    pub fn attribute_id(&self) -> &str {
        &self.attribute.attribute_id
    }
}

/// Errors that can occur while validating a ranking request
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum WeightError {
    #[error("Attribute '{0}' has a non-finite weight")]
    NonFiniteWeight(String),
}

/// A validated set of user-scored attributes with normalized weights
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RankingRequest {
    attributes: Vec<UserScoredAttribute>,
}

impl RankingRequest {
    /// Validate the weights and normalize their magnitudes to sum to 1.0.
    /// An all-zero request is kept as is.
    pub fn new(attributes: Vec<UserScoredAttribute>) -> Result<Self, WeightError> {
        for attribute in &attributes {
            if !attribute.weight.is_finite() {
                return Err(WeightError::NonFiniteWeight(attribute.attribute_id().to_string()));
            }
        }
        Ok(Self::normalized(attributes))
    }

    /// Like [`RankingRequest::new`], but a non-finite weight turns its
    /// attribute into an ignored, zero-weight entry instead of failing.
    pub fn lenient(mut attributes: Vec<UserScoredAttribute>) -> Self {
        for attribute in &mut attributes {
            if !attribute.weight.is_finite() {
                warn!(attribute = attribute.attribute_id(), weight = attribute.weight, "non-finite weight ignored");
                attribute.weight = 0.0;
                attribute.direction = Direction::IgnoreMagnitude;
            }
        }
        Self::normalized(attributes)
    }

    fn normalized(mut attributes: Vec<UserScoredAttribute>) -> Self {
        let weight_sum: f64 = attributes
            .iter()
            .filter(|a| a.direction != Direction::IgnoreMagnitude)
            .map(|a| a.weight)
            .sum();
        if weight_sum > 0.0 && (weight_sum - 1.0).abs() > 1e-9 {
            for attribute in &mut attributes {
                attribute.weight /= weight_sum;
            }
        }
        Self { attributes }
    }

    pub fn attributes(&self) -> &[UserScoredAttribute] {
        &self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }
}
