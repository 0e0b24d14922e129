//! JSON catalog ingestion for the command-line front end.

use anyhow::Context;
use catrank_core::{Attribute, CategoryTree, Product, RawCategory};
use catrank_scoring::ImportanceScores;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// A product as it appears in a catalog file
#[derive(Debug, Clone, Deserialize)]
pub struct RawProduct {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub brand_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub overall_score: Option<f64>,
    #[serde(default)]
    pub is_tested: bool,
    #[serde(default)]
    pub is_recommended: bool,
    #[serde(default)]
    pub is_best_buy: bool,
    pub category_id: String,
    #[serde(default)]
    pub ratings: Vec<Attribute>,
    #[serde(default)]
    pub specs: Vec<Attribute>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        let mut product = Product::new(raw.id, raw.name, raw.category_id).tested(raw.is_tested);
        product.description = raw.description;
        product.brand_name = raw.brand_name;
        product.price = raw.price;
        product.overall_score = raw.overall_score;
        product.is_recommended = raw.is_recommended;
        product.is_best_buy = raw.is_best_buy;
        let product = raw.ratings.into_iter().fold(product, |p, a| p.with_rating(named(a)));
        raw.specs.into_iter().fold(product, |p, a| p.with_spec(named(a)))
    }
}

/// Attributes without a display name show their id.
fn named(mut attribute: Attribute) -> Attribute {
    if attribute.name.is_empty() {
        attribute.name = attribute.id.clone();
    }
    attribute
}

/// Contents of a catalog file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCatalog {
    #[serde(default)]
    pub categories: Vec<RawCategory>,
    #[serde(default)]
    pub products: Vec<RawProduct>,
}

impl RawCatalog {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("Failed to parse catalog JSON")
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read catalog file {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("Invalid catalog file {}", path.display()))
    }

    pub fn into_parts(self) -> (Vec<RawCategory>, Vec<Product>) {
        (self.categories, self.products.into_iter().map(Product::from).collect())
    }

    pub fn build(self) -> anyhow::Result<CategoryTree> {
        let (categories, products) = self.into_parts();
        let tree = CategoryTree::build(categories, products).context("Failed to build category tree")?;
        info!(
            categories = tree.len(),
            products = tree.product_count(),
            classes = tree.equivalence_classes().count(),
            "catalog loaded"
        );
        Ok(tree)
    }
}

/// Load an attribute-id -> score map written by an external importance backend
pub fn load_scores(path: impl AsRef<Path>) -> anyhow::Result<ImportanceScores> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read scores file {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid scores file {}", path.display()))
}
