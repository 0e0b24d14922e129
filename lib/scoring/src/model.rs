//! Importance models
//!
//! An [`ImportanceModel`] turns a product-by-attribute [`PopulationMatrix`]
//! into one importance score per attribute. The scorer is agnostic of how
//! the scores are produced: the built-in entropy and correlation models,
//! scores precomputed by an external feature-selection backend, or any other
//! implementation can be plugged in.

use ahash::AHashSet;
use catrank_core::AttributeValue;
use std::collections::HashMap;
use thiserror::Error;

use crate::measures::{boolean_balance, categorical_diversity, numeric_entropy, pearson};

/// Attribute id -> importance.
pub type ImportanceScores = HashMap<String, f64>;

/// One product row of a [`PopulationMatrix`]
#[derive(Debug, Clone, PartialEq)]
pub struct PopulationRow {
    pub product_id: String,
    pub overall_score: Option<f64>,
    /// One cell per matrix column; `None` when the product lacks the attribute
    pub values: Vec<Option<AttributeValue>>,
}

/// Product-by-attribute value matrix assembled from a category's population
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PopulationMatrix {
    attributes: Vec<String>,
    rows: Vec<PopulationRow>,
}

impl PopulationMatrix {
    pub fn new(attributes: Vec<String>) -> Self {
        Self {
            attributes,
            rows: Vec::new(),
        }
    }

    /// Rows shorter than the column count are padded with missing cells.
    pub fn push_row(&mut self, mut row: PopulationRow) {
        row.values.resize(self.attributes.len(), None);
        self.rows.push(row);
    }

    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    pub fn rows(&self) -> &[PopulationRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() || self.rows.is_empty()
    }

    /// Present cells of column `j` with the row they belong to.
    pub fn column(&self, j: usize) -> impl Iterator<Item = (&PopulationRow, &AttributeValue)> + '_ {
        self.rows
            .iter()
            .filter_map(move |row| row.values.get(j).and_then(Option::as_ref).map(|v| (row, v)))
    }
}

/// Errors an importance model may report
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    #[error("Importance model '{0}' is unavailable")]
    Unavailable(String),

    #[error("Importance model '{model}' failed: {reason}")]
    Failed { model: String, reason: String },
}

/// Strategy producing one importance score per attribute
pub trait ImportanceModel: Send + Sync {
    fn name(&self) -> &str;

    fn rank(&self, matrix: &PopulationMatrix) -> Result<ImportanceScores, ModelError>;
}

/// Ranks attributes by the diversity of their observed values
#[derive(Debug, Clone, Copy)]
pub struct EntropyModel {
    pub bins: usize,
}

impl Default for EntropyModel {
    fn default() -> Self {
        Self { bins: 10 }
    }
}

impl EntropyModel {
    fn column_diversity(&self, matrix: &PopulationMatrix, j: usize) -> f64 {
        let mut numeric = Vec::new();
        let (mut trues, mut falses) = (0usize, 0usize);
        let mut categories: AHashSet<String> = AHashSet::new();
        let mut observed = 0usize;

        for (_, value) in matrix.column(j) {
            match value {
                AttributeValue::Numeric(v) => numeric.push(*v),
                AttributeValue::Boolean(true) => trues += 1,
                AttributeValue::Boolean(false) => falses += 1,
                AttributeValue::Categorical(s) => {
                    categories.insert(s.clone());
                }
                AttributeValue::NotApplicable => continue,
            }
            observed += 1;
        }

        if observed < 2 {
            return 0.0;
        }
        if numeric.len() == observed {
            numeric_entropy(&numeric, self.bins)
        } else if trues + falses == observed {
            boolean_balance(trues, falses)
        } else {
            // Mixed columns are compared on their string forms.
            let mut distinct = categories;
            distinct.extend(numeric.iter().map(|v| v.to_string()));
            if trues > 0 {
                distinct.insert(true.to_string());
            }
            if falses > 0 {
                distinct.insert(false.to_string());
            }
            categorical_diversity(distinct.len())
        }
    }
}

impl ImportanceModel for EntropyModel {
    fn name(&self) -> &str {
        "entropy"
    }

    fn rank(&self, matrix: &PopulationMatrix) -> Result<ImportanceScores, ModelError> {
        Ok(matrix
            .attributes()
            .iter()
            .enumerate()
            .map(|(j, id)| (id.clone(), self.column_diversity(matrix, j)))
            .collect())
    }
}

/// Ranks attributes by |Pearson r| against the product's overall score.
/// Categorical attributes and attributes without enough paired
/// observations score 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct CorrelationModel;

impl ImportanceModel for CorrelationModel {
    fn name(&self) -> &str {
        "correlation"
    }

    fn rank(&self, matrix: &PopulationMatrix) -> Result<ImportanceScores, ModelError> {
        let mut scores = ImportanceScores::with_capacity(matrix.attributes().len());
        for (j, id) in matrix.attributes().iter().enumerate() {
            let (xs, ys): (Vec<f64>, Vec<f64>) = matrix
                .column(j)
                .filter_map(|(row, value)| {
                    let x = match value {
                        AttributeValue::Numeric(v) => *v,
                        AttributeValue::Boolean(b) => f64::from(u8::from(*b)),
                        AttributeValue::Categorical(_) | AttributeValue::NotApplicable => return None,
                    };
                    row.overall_score.map(|y| (x, y))
                })
                .unzip();
            scores.insert(id.clone(), pearson(&xs, &ys).map_or(0.0, f64::abs));
        }
        Ok(scores)
    }
}

/// Scores handed over by an external importance backend
#[derive(Debug, Clone, Default)]
pub struct PrecomputedScores {
    scores: ImportanceScores,
}

impl PrecomputedScores {
    pub fn new(scores: ImportanceScores) -> Self {
        Self { scores }
    }
}

impl ImportanceModel for PrecomputedScores {
    fn name(&self) -> &str {
        "precomputed"
    }

    fn rank(&self, matrix: &PopulationMatrix) -> Result<ImportanceScores, ModelError> {
        Ok(matrix
            .attributes()
            .iter()
            .filter_map(|id| self.scores.get(id).map(|s| (id.clone(), *s)))
            .collect())
    }
}
