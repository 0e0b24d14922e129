use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Integrity errors raised while building a [`CategoryTree`](crate::CategoryTree).
///
/// Every variant means the input dataset is internally inconsistent; the
/// build is aborted rather than producing a tree with broken rollups.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Product {product_id} references unknown category {category_id}")]
    UnresolvedCategory {
        product_id: String,
        category_id: String,
    },

    #[error("Product {product_id} is assigned to category {category_id}, which is not a leaf")]
    ProductOnInternalCategory {
        product_id: String,
        category_id: String,
    },

    #[error("Category defined more than once: {0}")]
    DuplicateCategory(String),

    #[error("Product defined more than once: {0}")]
    DuplicateProduct(String),

    #[error("Category {category_id} references unknown parent {parent_id}")]
    UnknownParent {
        category_id: String,
        parent_id: String,
    },

    #[error("Category is part of a parent cycle: {0}")]
    CyclicTaxonomy(String),
}
