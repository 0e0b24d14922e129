use parking_lot::RwLock;
use std::sync::Arc;
use tracing::info;

use crate::tree::CategoryTree;

/// Shared handle to the current category tree.
///
/// Readers take a cheap [`snapshot`](Catalog::snapshot) and keep working on
/// it for the whole request. Reloading builds a complete new tree first and
/// then swaps the reference, so readers see either the old tree or the new
/// one, never a partially built state.
#[derive(Debug, Clone)]
pub struct Catalog {
    current: Arc<RwLock<Arc<CategoryTree>>>,
}

impl Catalog {
    pub fn new(tree: CategoryTree) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(tree))),
        }
    }

    pub fn snapshot(&self) -> Arc<CategoryTree> {
        self.current.read().clone()
    }

    /// Install a freshly built tree, returning the one it replaces.
    pub fn replace(&self, tree: CategoryTree) -> Arc<CategoryTree> {
        let next = Arc::new(tree);
        info!(
            categories = next.len(),
            products = next.product_count(),
            "catalog snapshot replaced"
        );
        std::mem::replace(&mut *self.current.write(), next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Product, RawCategory};

    fn tree_with(products: usize) -> CategoryTree {
        let items = (0..products)
            .map(|i| Product::new(format!("p{}", i), "item", "leaf"))
            .collect();
        CategoryTree::build(vec![RawCategory::new("leaf", "Leaf")], items).unwrap()
    }

    #[test]
    fn test_snapshot_survives_replace() {
        let catalog = Catalog::new(tree_with(2));
        let before = catalog.snapshot();

        let old = catalog.replace(tree_with(5));

        assert_eq!(before.product_count(), 2);
        assert_eq!(old.product_count(), 2);
        assert_eq!(catalog.snapshot().product_count(), 5);
    }

    #[test]
    fn test_clones_share_state() {
        let catalog = Catalog::new(tree_with(1));
        let other = catalog.clone();
        catalog.replace(tree_with(3));
        assert_eq!(other.snapshot().product_count(), 3);
    }
}
