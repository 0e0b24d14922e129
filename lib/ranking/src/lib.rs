//! # catrank Ranking
//!
//! User-weighted product ranking within a category.
//!
//! ## Features
//!
//! - **Signed weights**: the sign of a weight picks the preferred end of an
//!   attribute's range, zero lists the attribute without scoring it
//! - **Normalization**: values are mapped onto [0, 1] against the category's
//!   attribute statistics
//! - **Explainability**: per-attribute contribution breakdown for every product
//!
//! ## Example
//!
//! ```rust
//! use catrank_core::{Attribute, CategoryTree, Product, RawCategory};
//! use catrank_ranking::{ProductRanker, RankingRequest, UserScoredAttribute};
//! use catrank_scoring::ScoredAttribute;
//!
//! let tree = CategoryTree::build(
//!     vec![RawCategory::new("kettles", "Kettles")],
//!     vec![
//!         Product::new("k1", "Quick Boil", "kettles").with_spec(Attribute::new("price", 20.0)),
//!         Product::new("k2", "Big Boil", "kettles").with_spec(Attribute::new("price", 40.0)),
//!     ],
//! )
//! .unwrap();
//!
//! // Cheaper is better.
//! let price = UserScoredAttribute::from_signed(ScoredAttribute::empty("kettles", "price"), -1.0);
//! let ranker = ProductRanker::new(RankingRequest::new(vec![price]).unwrap());
//! let ranked = ranker.rank(&tree, tree.category("kettles").unwrap());
//! assert_eq!(ranked[0].product_id, "k1");
//! ```

pub mod explain;
pub mod normalize;
pub mod ranker;
pub mod weights;

pub use explain::{Contribution, RankExplanation, RankResponse, RankingStats};
pub use normalize::{normalize, orient, DEGENERATE_RANGE};
pub use ranker::ProductRanker;
pub use weights::{Direction, RankingRequest, UserScoredAttribute, WeightError};
