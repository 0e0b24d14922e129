//! Attribute scorer
//!
//! Scores every attribute carried by a category's product population with a
//! pluggable [`ImportanceModel`] and attaches each attribute's representative
//! mean-or-mode value.

use catrank_core::{Attribute, AttributeValue, CategoryNode, CategoryTree, Product};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::mean::{extract_mean, mode};
use crate::model::{
    CorrelationModel, EntropyModel, ImportanceModel, ImportanceScores, PopulationMatrix, PopulationRow,
    PrecomputedScores,
};
use crate::scored::{sort_by_score, ScoredAttribute, SortMethod};

/// Configuration for attribute scoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScorerConfig {
    /// Equal-width bins used for numeric entropy
    pub numeric_bins: usize,
    /// Also score membership in child categories as a pseudo-attribute
    pub score_subcategories: bool,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            numeric_bins: 10,
            score_subcategories: false,
        }
    }
}

/// A search result handed over by the search layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub product_id: String,
    /// Absent when the search layer does not score its results
    #[serde(default)]
    pub relevance: Option<f32>,
}

impl SearchHit {
    pub fn new(product_id: impl Into<String>, relevance: f32) -> Self {
        Self {
            product_id: product_id.into(),
            relevance: Some(relevance),
        }
    }

    pub fn unscored(product_id: impl Into<String>) -> Self {
        Self {
            product_id: product_id.into(),
            relevance: None,
        }
    }

    /// Scored hits need a positive relevance; unscored hits always count.
    #[inline]
    pub fn is_relevant(&self) -> bool {
        self.relevance.map_or(true, |r| r > 0.0)
    }
}

/// Computes one [`ScoredAttribute`] per attribute of a category population
#[derive(Clone)]
pub struct AttributeScorer {
    config: ScorerConfig,
    model: Arc<dyn ImportanceModel>,
}

impl std::fmt::Debug for AttributeScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeScorer")
            .field("config", &self.config)
            .field("model", &self.model.name())
            .finish()
    }
}

impl AttributeScorer {
    pub fn new(config: ScorerConfig, model: Arc<dyn ImportanceModel>) -> Self {
        Self { config, model }
    }

    /// Scorer for a built-in ordering. [`SortMethod::Score`] without
    /// external scores leaves every attribute unscored.
    pub fn for_method(method: SortMethod, config: ScorerConfig) -> Self {
        let model: Arc<dyn ImportanceModel> = match method {
            SortMethod::Entropy => Arc::new(EntropyModel {
                bins: config.numeric_bins,
            }),
            SortMethod::Correlation => Arc::new(CorrelationModel),
            SortMethod::Score => Arc::new(PrecomputedScores::default()),
        };
        Self::new(config, model)
    }

    /// Scorer over scores produced by an external importance backend
    pub fn with_scores(config: ScorerConfig, scores: ImportanceScores) -> Self {
        Self::new(config, Arc::new(PrecomputedScores::new(scores)))
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Score every attribute of the products owned by `category`
    pub fn score(&self, tree: &CategoryTree, category: &CategoryNode) -> Vec<ScoredAttribute> {
        let population: Vec<&Product> = tree.products_of(category).collect();
        self.score_population(tree, category, &population)
    }

    /// Score over a search result list instead of the whole category.
    /// Hits with non-positive relevance, and hits outside `category`, are
    /// dropped.
    pub fn score_hits(&self, tree: &CategoryTree, category: &CategoryNode, hits: &[SearchHit]) -> Vec<ScoredAttribute> {
        let population: Vec<&Product> = hits
            .iter()
            .filter(|hit| hit.is_relevant())
            .filter_map(|hit| {
                if !category.owns_product(&hit.product_id) {
                    debug!(product = %hit.product_id, category = %category.id, "search hit outside category, dropped");
                    return None;
                }
                tree.product(&hit.product_id)
            })
            .collect();
        self.score_population(tree, category, &population)
    }

    /// Look up one attribute's score; unknown attributes yield an empty entry
    pub fn score_attribute(&self, tree: &CategoryTree, category: &CategoryNode, attribute_id: &str) -> ScoredAttribute {
        match self
            .score(tree, category)
            .into_iter()
            .find(|a| a.attribute_id == attribute_id)
        {
            Some(attribute) => attribute,
            None => {
                warn!(category = %category.id, attribute = attribute_id, "attribute not found in category");
                ScoredAttribute::empty(&category.id, attribute_id)
            }
        }
    }

    fn score_population(&self, tree: &CategoryTree, category: &CategoryNode, population: &[&Product]) -> Vec<ScoredAttribute> {
        let mut attributes: BTreeMap<&str, &Attribute> = BTreeMap::new();
        for product in population {
            for attribute in product.attributes() {
                attributes.entry(attribute.id.as_str()).or_insert(attribute);
            }
        }

        let pseudo = self.config.score_subcategories && !category.is_leaf() && !population.is_empty();
        if attributes.is_empty() && !pseudo {
            return Vec::new();
        }

        let mut columns: Vec<String> = attributes.keys().map(|id| id.to_string()).collect();
        if pseudo {
            columns.push(category.id.clone());
        }
        let mut matrix = PopulationMatrix::new(columns);
        for product in population {
            let mut values: Vec<Option<AttributeValue>> = attributes
                .keys()
                .map(|id| product.attribute(id).map(|a| a.value.clone()))
                .collect();
            if pseudo {
                values.push(
                    tree.category_of(product)
                        .map(|leaf| AttributeValue::Categorical(leaf.name.clone())),
                );
            }
            matrix.push_row(PopulationRow {
                product_id: product.id.clone(),
                overall_score: product.overall_score,
                values,
            });
        }

        let scores = match self.model.rank(&matrix) {
            Ok(scores) => scores,
            Err(e) => {
                warn!(category = %category.id, model = self.model.name(), error = %e, "importance model failed, scores degrade to N/A");
                ImportanceScores::new()
            }
        };

        let mut scored: Vec<ScoredAttribute> = attributes
            .par_iter()
            .map(|(id, attribute)| {
                let mut entry = ScoredAttribute::new(attribute, &category.id);
                entry.observed = population.iter().filter(|p| p.attribute(id).is_some()).count();
                if let Some(score) = scores.get(*id) {
                    entry.score = *score;
                    entry.mean = extract_mean(population.iter().copied(), id);
                }
                entry
            })
            .collect();

        if pseudo {
            let j = matrix.attributes().len() - 1;
            let mut entry = ScoredAttribute::empty(&category.id, &category.id);
            entry.name = category.name.clone();
            entry.description = category.description.clone();
            entry.is_category = true;
            entry.observed = matrix.column(j).count();
            if let Some(score) = scores.get(&category.id) {
                entry.score = *score;
                entry.mean = mode(matrix.column(j).map(|(_, v)| v));
            }
            scored.push(entry);
        }

        sort_by_score(&mut scored);
        scored
    }
}
