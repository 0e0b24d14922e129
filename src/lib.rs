//! # catrank
//!
//! In-memory product catalog engine: taxonomy rollup, attribute importance
//! scoring and explainable, user-weighted product ranking.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! catrank --catalog catalog.json tree
//! catrank --catalog catalog.json attributes kettles --sort correlation
//! catrank --catalog catalog.json rank kettles --attr litres=2 --attr price=-1
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use catrank::prelude::*;
//!
//! let categories = vec![
//!     RawCategory::new("kitchen", "Kitchen"),
//!     RawCategory::new("kettles", "Kettles").with_parent("kitchen"),
//!     RawCategory::new("toasters", "Toasters").with_parent("kitchen"),
//! ];
//! let products = vec![
//!     Product::new("k1", "Quick Boil", "kettles").with_spec(Attribute::new("price", 20.0)),
//!     Product::new("k2", "Big Boil", "kettles").with_spec(Attribute::new("price", 35.0)),
//!     Product::new("t1", "Crisp", "toasters").with_spec(Attribute::new("slots", 2.0)),
//! ];
//!
//! let tree = CategoryTree::build(categories, products).unwrap();
//! let service = CatalogService::new(tree, ScorerConfig::default());
//!
//! let attributes = service.attributes_for_category("kettles", SortMethod::Entropy);
//! let cheap = UserScoredAttribute::from_signed(attributes[0].clone(), -1.0);
//! let ranked = service.rank_products(&[cheap], "kettles");
//! assert_eq!(ranked[0].product_id, "k1");
//! ```
//!
//! ## Crate Structure
//!
//! - `catrank-core` - Attribute values, products, the category tree builder
//!   and the swappable [`Catalog`] snapshot
//! - `catrank-scoring` - Attribute importance models and the [`AttributeScorer`]
//! - `catrank-ranking` - Weighted product ranking with explanations

pub mod ingest;
pub mod service;

// Re-export core types
pub use catrank_core::{
    Attribute, AttributeStat, AttributeValue, BuildConfig, Catalog, CategoryNode, CategoryTree, Error, NodeId,
    Product, RawCategory, Result, TreeBuilder,
};

// Re-export scoring
pub use catrank_scoring::{AttributeScorer, ImportanceModel, ImportanceScores, ScoredAttribute, ScorerConfig, SearchHit, SortMethod};

// Re-export ranking
pub use catrank_ranking::{
    Direction, ProductRanker, RankExplanation, RankResponse, RankingRequest, RankingStats, UserScoredAttribute,
    WeightError,
};

pub use ingest::RawCatalog;
pub use service::CatalogService;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Attribute, AttributeValue, CatalogService, CategoryTree, Direction, Product, RawCategory, RankExplanation,
        ScoredAttribute, ScorerConfig, SortMethod, UserScoredAttribute,
    };
}
