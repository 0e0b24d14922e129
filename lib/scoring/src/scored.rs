//! Scored attribute definitions
//!
//! A [`ScoredAttribute`] is one attribute of a category annotated with an
//! importance score and a representative mean-or-mode value.

use catrank_core::{Attribute, AttributeValue, CategoryTree};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An attribute annotated with its importance within one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredAttribute {
    /// Attribute id, or the category id for category pseudo-attributes
    pub attribute_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Category the score was computed for
    pub category_id: String,
    /// Importance score; its meaning depends on the [`SortMethod`]
    pub score: f64,
    /// Mean (numeric), majority (boolean) or mode (otherwise) value
    pub mean: AttributeValue,
    /// Number of products in the population carrying the attribute
    #[serde(default)]
    pub observed: usize,
    /// True when this entry scores category membership rather than an attribute
    #[serde(default)]
    pub is_category: bool,
}

impl ScoredAttribute {
    /// Create an unscored entry from an observed attribute
    pub fn new(attribute: &Attribute, category_id: impl Into<String>) -> Self {
        Self {
            attribute_id: attribute.id.clone(),
            name: attribute.name.clone(),
            description: attribute.description.clone(),
            category_id: category_id.into(),
            score: 0.0,
            mean: AttributeValue::not_available(),
            observed: 0,
            is_category: false,
        }
    }

    /// The default returned for an attribute a category does not have
    pub fn empty(category_id: impl Into<String>, attribute_id: impl Into<String>) -> Self {
        let attribute_id = attribute_id.into();
        Self {
            name: attribute_id.clone(),
            attribute_id,
            description: String::new(),
            category_id: category_id.into(),
            score: 0.0,
            mean: AttributeValue::not_available(),
            observed: 0,
            is_category: false,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_score(mut self, score: f64) -> Self {
        self.score = score;
        self
    }

    /// Smallest value of this attribute in its category, 0 when unknown
    pub fn min(&self, tree: &CategoryTree) -> f64 {
        self.stat(tree).and_then(|s| s.min).unwrap_or(0.0)
    }

    /// Largest value of this attribute in its category, 0 when unknown
    pub fn max(&self, tree: &CategoryTree) -> f64 {
        self.stat(tree).and_then(|s| s.max).unwrap_or(0.0)
    }

    /// Categorical values observed for this attribute in its category
    pub fn dictionary(&self, tree: &CategoryTree) -> Vec<String> {
        self.stat(tree)
            .map(|s| s.values.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn stat<'a>(&self, tree: &'a CategoryTree) -> Option<&'a catrank_core::AttributeStat> {
        tree.category(&self.category_id)
            .and_then(|c| c.attribute_stat(&self.attribute_id))
    }
}

/// Highest score first; ties go to the better observed attribute, then by id.
pub fn compare_by_score(a: &ScoredAttribute, b: &ScoredAttribute) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.observed.cmp(&a.observed))
        .then_with(|| a.attribute_id.cmp(&b.attribute_id))
}

pub fn sort_by_score(attributes: &mut [ScoredAttribute]) {
    attributes.sort_by(compare_by_score);
}

/// How attributes are ordered within a category
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortMethod {
    /// Diversity of observed values
    #[default]
    Entropy,
    /// Absolute correlation with the product's overall score
    Correlation,
    /// Scores supplied by an external importance model
    Score,
}

impl fmt::Display for SortMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SortMethod::Entropy => "entropy",
            SortMethod::Correlation => "correlation",
            SortMethod::Score => "score",
        })
    }
}

impl FromStr for SortMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "entropy" => Ok(SortMethod::Entropy),
            "correlation" => Ok(SortMethod::Correlation),
            "score" => Ok(SortMethod::Score),
            other => Err(format!("unknown sort method '{}'", other)),
        }
    }
}
