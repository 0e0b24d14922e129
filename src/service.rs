//! Consumer-facing query operations over the current catalog snapshot.

use ahash::AHashMap;
use catrank_core::{Catalog, CategoryNode, CategoryTree, Product, RawCategory, TreeBuilder};
use catrank_ranking::{ProductRanker, RankExplanation, RankingRequest, UserScoredAttribute};
use catrank_scoring::{AttributeScorer, ImportanceScores, ScoredAttribute, ScorerConfig, SearchHit, SortMethod};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// Read-only query surface for a presentation layer.
///
/// Every call takes its own snapshot of the catalog, so a concurrent
/// [`reload`](CatalogService::reload) never changes the tree a running query
/// sees.
#[derive(Debug)]
pub struct CatalogService {
    catalog: Catalog,
    config: ScorerConfig,
    /// Category id -> scores supplied by an external importance backend
    importance: RwLock<AHashMap<String, ImportanceScores>>,
}

impl CatalogService {
    pub fn new(tree: CategoryTree, config: ScorerConfig) -> Self {
        Self::with_catalog(Catalog::new(tree), config)
    }

    pub fn with_catalog(catalog: Catalog, config: ScorerConfig) -> Self {
        Self {
            catalog,
            config,
            importance: RwLock::new(AHashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn snapshot(&self) -> Arc<CategoryTree> {
        self.catalog.snapshot()
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    /// Build a new tree with the current tree's build settings and swap it
    /// in. On error the current tree stays.
    pub fn reload(&self, categories: Vec<RawCategory>, products: Vec<Product>) -> catrank_core::Result<()> {
        let config = *self.snapshot().config();
        let tree = TreeBuilder::new(config).build(categories, products)?;
        self.catalog.replace(tree);
        Ok(())
    }

    /// Register scores produced by an external importance backend for one
    /// category, used by [`SortMethod::Score`].
    pub fn set_importance_scores(&self, category_id: impl Into<String>, scores: ImportanceScores) {
        let category_id = category_id.into();
        info!(category = %category_id, attributes = scores.len(), "importance scores registered");
        self.importance.write().insert(category_id, scores);
    }

    /// Every attribute of a category, most important first.
    ///
    /// The category is widened to its equivalence class. Unknown categories
    /// yield an empty list.
    pub fn attributes_for_category(&self, category_id: &str, method: SortMethod) -> Vec<ScoredAttribute> {
        let tree = self.snapshot();
        let Some(category) = resolve(&tree, category_id) else {
            return Vec::new();
        };
        self.scorer(category, method).score(&tree, category)
    }

    /// Score a category's attributes over a search result list only.
    pub fn attributes_for_search(&self, category_id: &str, method: SortMethod, hits: &[SearchHit]) -> Vec<ScoredAttribute> {
        let tree = self.snapshot();
        let Some(category) = resolve(&tree, category_id) else {
            return Vec::new();
        };
        self.scorer(category, method).score_hits(&tree, category, hits)
    }

    /// One attribute of a category. Unknown categories or attributes yield
    /// an unscored `"N/A"` entry.
    pub fn scored_attribute_in_category(&self, category_id: &str, attribute_id: &str) -> ScoredAttribute {
        let tree = self.snapshot();
        match resolve(&tree, category_id) {
            Some(category) => self
                .scorer(category, SortMethod::default())
                .score_attribute(&tree, category, attribute_id),
            None => ScoredAttribute::empty(category_id, attribute_id),
        }
    }

    /// Rank every product of a category by the caller's weighted attributes.
    ///
    /// Unknown categories yield an empty ranking. An attribute with a
    /// non-finite weight is listed but contributes nothing.
    pub fn rank_products(&self, attributes: &[UserScoredAttribute], category_id: &str) -> Vec<RankExplanation> {
        let tree = self.snapshot();
        let Some(category) = resolve(&tree, category_id) else {
            return Vec::new();
        };
        ProductRanker::new(RankingRequest::lenient(attributes.to_vec())).rank(&tree, category)
    }

    fn scorer(&self, category: &CategoryNode, method: SortMethod) -> AttributeScorer {
        match method {
            SortMethod::Score => {
                let scores = self
                    .importance
                    .read()
                    .get(&category.id)
                    .cloned()
                    .unwrap_or_default();
                AttributeScorer::with_scores(self.config, scores)
            }
            other => AttributeScorer::for_method(other, self.config),
        }
    }
}

/// The equivalence class of a category, or the category itself when it sits
/// above every class.
fn resolve<'a>(tree: &'a CategoryTree, category_id: &str) -> Option<&'a CategoryNode> {
    let category = tree
        .equivalence_class(category_id)
        .or_else(|| tree.category(category_id));
    if category.is_none() {
        warn!(category = category_id, "category not found");
    }
    category
}
