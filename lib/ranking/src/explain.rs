//! Explainability for ranking results
//!
//! Every ranked product carries the breakdown of how its composite score
//! was assembled, one record per chosen attribute the product has.

use catrank_core::AttributeValue;
use serde::Serialize;

/// One attribute's share of a product's composite score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    pub attribute_id: String,
    pub attribute_name: String,
    /// The product's raw value
    pub value: AttributeValue,
    /// Value mapped onto [0, 1] and oriented by direction
    pub normalized: f64,
    /// `normalized * weight`
    pub contribution: f64,
}

/// A ranked product with its per-attribute score breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankExplanation {
    pub product_id: String,
    pub product_name: String,
    /// Category the ranking was computed in
    pub category_id: String,
    pub score: f64,
    pub contributions: Vec<Contribution>,
}

impl RankExplanation {
    pub fn new(product_id: impl Into<String>, product_name: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            category_id: category_id.into(),
            score: 0.0,
            contributions: Vec::new(),
        }
    }

    /// Append a contribution and add it to the total
    pub fn push(&mut self, contribution: Contribution) {
        self.score += contribution.contribution;
        self.contributions.push(contribution);
    }

    /// The attribute that moved the score the most
    pub fn top_contribution(&self) -> Option<&Contribution> {
        self.contributions
            .iter()
            .filter(|c| c.contribution > 0.0)
            .max_by(|a, b| a.contribution.total_cmp(&b.contribution))
    }
}

/// Summary statistics for one ranking
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingStats {
    pub product_count: usize,
    pub mean_score: f64,
    pub best_score: f64,
    /// Attribute that contributed most to the top product
    pub top_contributing_attribute: Option<String>,
}

impl RankingStats {
    /// Compute stats from a ranking sorted best first
    pub fn compute(results: &[RankExplanation]) -> Self {
        let Some(best) = results.first() else {
            return Self {
                product_count: 0,
                mean_score: 0.0,
                best_score: 0.0,
                top_contributing_attribute: None,
            };
        };

        let mean_score = results.iter().map(|r| r.score).sum::<f64>() / results.len() as f64;
        Self {
            product_count: results.len(),
            mean_score,
            best_score: best.score,
            top_contributing_attribute: best.top_contribution().map(|c| c.attribute_id.clone()),
        }
    }
}

/// Ranking output as handed to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct RankResponse {
    pub category_id: String,
    pub stats: RankingStats,
    pub result: Vec<RankExplanation>,
}

impl RankResponse {
    pub fn new(category_id: impl Into<String>, result: Vec<RankExplanation>) -> Self {
        Self {
            category_id: category_id.into(),
            stats: RankingStats::compute(&result),
            result,
        }
    }
}
