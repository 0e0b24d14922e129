//! # catrank Scoring
//!
//! Attribute importance scoring over a category's product population.
//!
//! ## Features
//!
//! - **Importance models**: entropy, correlation against overall score, or
//!   scores precomputed by an external backend behind [`ImportanceModel`]
//! - **Representative values**: mean for fully numeric attributes, majority
//!   for booleans, mode otherwise
//! - **Search-driven scoring**: score a search result list instead of the
//!   whole category
//!
//! ## Example
//!
//! ```rust
//! use catrank_core::{Attribute, CategoryTree, Product, RawCategory};
//! use catrank_scoring::{AttributeScorer, ScorerConfig, SortMethod};
//!
//! let tree = CategoryTree::build(
//!     vec![RawCategory::new("kettles", "Kettles")],
//!     vec![
//!         Product::new("k1", "Quick Boil", "kettles").with_spec(Attribute::new("litres", 1.7)),
//!         Product::new("k2", "Big Boil", "kettles").with_spec(Attribute::new("litres", 2.5)),
//!     ],
//! )
//! .unwrap();
//!
//! let scorer = AttributeScorer::for_method(SortMethod::Entropy, ScorerConfig::default());
//! let scored = scorer.score(&tree, tree.category("kettles").unwrap());
//! assert_eq!(scored[0].attribute_id, "litres");
//! ```

pub mod mean;
pub mod measures;
pub mod model;
pub mod scored;
pub mod scorer;

pub use mean::{extract_mean, mode};
pub use model::{
    CorrelationModel, EntropyModel, ImportanceModel, ImportanceScores, ModelError, PopulationMatrix, PopulationRow,
    PrecomputedScores,
};
pub use scored::{compare_by_score, sort_by_score, ScoredAttribute, SortMethod};
pub use scorer::{AttributeScorer, ScorerConfig, SearchHit};
