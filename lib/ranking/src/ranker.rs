//! Product ranker
//!
//! Scores every product of a category as the weighted sum of its oriented,
//! normalized attribute values and explains each term.

use catrank_core::{CategoryNode, CategoryTree, Product};
use tracing::debug;

use crate::explain::{Contribution, RankExplanation};
use crate::normalize::{normalize, orient};
use crate::weights::RankingRequest;

/// Ranks the products of a category against a [`RankingRequest`]
#[derive(Debug, Clone, Default)]
pub struct ProductRanker {
    request: RankingRequest,
}

impl ProductRanker {
    pub fn new(request: RankingRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &RankingRequest {
        &self.request
    }

    /// Rank every product owned by `category`, best first.
    ///
    /// The result always holds one entry per product. Ties break by product id.
    pub fn rank(&self, tree: &CategoryTree, category: &CategoryNode) -> Vec<RankExplanation> {
        let mut results: Vec<RankExplanation> = tree
            .products_of(category)
            .map(|product| self.explain(category, product))
            .collect();

        results.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        results
    }

    /// Build one product's explanation. Attributes the product lacks, or
    /// whose value cannot be normalized, are skipped.
    pub fn explain(&self, category: &CategoryNode, product: &Product) -> RankExplanation {
        let mut explanation = RankExplanation::new(&product.id, &product.name, &category.id);

        for chosen in self.request.attributes() {
            let attribute_id = chosen.attribute_id();
            let Some(attribute) = product.attribute(attribute_id) else {
                debug!(product = %product.id, attribute = attribute_id, "product lacks ranked attribute, skipping");
                continue;
            };
            let Some(stat) = category.attribute_stat(attribute_id) else {
                debug!(category = %category.id, attribute = attribute_id, "no statistic for ranked attribute, skipping");
                continue;
            };
            let Some(normalized) = normalize(&attribute.value, stat) else {
                debug!(product = %product.id, attribute = attribute_id, value = %attribute.value, "value cannot be normalized, skipping");
                continue;
            };

            let normalized = orient(normalized, chosen.direction);
            explanation.push(Contribution {
                attribute_id: attribute.id.clone(),
                attribute_name: chosen.attribute.name.clone(),
                value: attribute.value.clone(),
                normalized,
                contribution: normalized * chosen.weight,
            });
        }

        explanation
    }
}
