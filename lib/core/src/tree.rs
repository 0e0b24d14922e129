use ahash::AHashMap;

use crate::builder::{BuildConfig, TreeBuilder};
use crate::category::{CategoryNode, NodeId, RawCategory};
use crate::product::Product;
use crate::Result;

/// A fully built, rolled-up category tree.
///
/// Once returned by [`TreeBuilder::build`] a tree is never mutated; share it
/// behind an `Arc` (see [`Catalog`](crate::Catalog)) and read it from as many
/// threads as needed.
#[derive(Debug, Clone)]
pub struct CategoryTree {
    pub(crate) nodes: Vec<CategoryNode>,
    pub(crate) roots: Vec<NodeId>,
    pub(crate) index: AHashMap<String, NodeId>,
    pub(crate) equivalence_index: AHashMap<String, NodeId>,
    pub(crate) equivalence_classes: Vec<NodeId>,
    pub(crate) products: AHashMap<String, Product>,
    pub(crate) config: BuildConfig,
}

impl CategoryTree {
    /// Build with the default [`BuildConfig`].
    pub fn build(categories: Vec<RawCategory>, products: Vec<Product>) -> Result<Self> {
        TreeBuilder::new(BuildConfig::default()).build(categories, products)
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Number of live category nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn roots(&self) -> impl Iterator<Item = &CategoryNode> {
        self.roots.iter().map(|id| self.node(*id))
    }

    /// Nodes in pre-order: every parent precedes its descendants.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &CategoryNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId::from_index(i), node))
    }

    /// Node ids are only meaningful for the tree that issued them.
    #[inline]
    pub fn node(&self, id: NodeId) -> &CategoryNode {
        &self.nodes[id.index()]
    }

    pub fn node_id(&self, category_id: &str) -> Option<NodeId> {
        self.index.get(category_id).copied()
    }

    /// Any category by id, including ids of spliced-out singleton levels,
    /// which resolve to the node that replaced them.
    pub fn category(&self, category_id: &str) -> Option<&CategoryNode> {
        self.node_id(category_id).map(|id| self.node(id))
    }

    pub fn parent(&self, node: &CategoryNode) -> Option<&CategoryNode> {
        node.parent().map(|id| self.node(id))
    }

    pub fn children<'a>(&'a self, node: &'a CategoryNode) -> impl Iterator<Item = &'a CategoryNode> + 'a {
        node.children().iter().map(move |id| self.node(*id))
    }

    /// The equivalence class a category belongs to, if it sits at or below one.
    pub fn equivalence_class(&self, category_id: &str) -> Option<&CategoryNode> {
        self.equivalence_index
            .get(category_id)
            .map(|id| self.node(*id))
    }

    pub fn equivalence_classes(&self) -> impl Iterator<Item = &CategoryNode> {
        self.equivalence_classes.iter().map(|id| self.node(*id))
    }

    pub fn sub_equivalence_nodes(&self) -> impl Iterator<Item = &CategoryNode> {
        self.nodes.iter().filter(|n| n.is_sub_equivalence())
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.get(product_id)
    }

    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Products owned by `node`, ordered by product id.
    pub fn products_of<'a>(&'a self, node: &'a CategoryNode) -> impl Iterator<Item = &'a Product> + 'a {
        node.product_ids().filter_map(move |id| self.products.get(id))
    }

    /// The leaf a product was linked to.
    pub fn category_of(&self, product: &Product) -> Option<&CategoryNode> {
        product.node().map(|id| self.node(id))
    }

    /// Export the live hierarchy in parent-id form, e.g. to rebuild a fresh
    /// snapshot from an existing one.
    pub fn raw_categories(&self) -> Vec<RawCategory> {
        self.nodes
            .iter()
            .map(|node| RawCategory {
                id: node.id.clone(),
                name: node.name.clone(),
                description: node.description.clone(),
                parent_id: node.parent().map(|p| self.node(p).id.clone()),
                children: Vec::new(),
            })
            .collect()
    }
}
