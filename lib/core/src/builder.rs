//! Category tree construction.
//!
//! [`TreeBuilder::build`] runs the build pipeline in a fixed order; each stage
//! relies on what the previous one established:
//!
//! 1. construct nodes and parent/child links from raw definitions
//! 2. splice out single-child levels
//! 3. compact the arena into pre-order and index it by category id
//! 4. link products to their leaf and seed leaf statistics
//! 5. roll statistics up from the leaves and compute similarity scores
//! 6. discover equivalence classes
//! 7. index every bucketed category under its equivalence class
//!
//! All traversals use explicit stacks, so arbitrarily deep taxonomies are fine.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::category::{CategoryNode, NodeId, RawCategory};
use crate::product::Product;
use crate::stats::observe_all;
use crate::tree::CategoryTree;
use crate::{Error, Result};

/// Minimum similarity for an internal node to become an equivalence class.
pub const EQUIVALENCE_THRESHOLD: f64 = 0.8;

/// Configuration for building a category tree
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Jaccard similarity at or above which a node collapses its subtree
    pub similarity_threshold: f64,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: EQUIVALENCE_THRESHOLD,
        }
    }
}

/// Builds an immutable [`CategoryTree`] from raw taxonomy and product input.
#[derive(Debug, Clone, Default)]
pub struct TreeBuilder {
    config: BuildConfig,
}

/// Mutable arena used while the hierarchy is still being reshaped.
struct Draft {
    nodes: Vec<CategoryNode>,
    roots: Vec<NodeId>,
    /// Spliced node -> the node that took its place.
    spliced: AHashMap<NodeId, NodeId>,
}

impl TreeBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn build(&self, categories: Vec<RawCategory>, products: Vec<Product>) -> Result<CategoryTree> {
        let mut draft = Draft::construct(flatten(categories))?;
        let spliced = draft.eliminate_singletons();

        let mut tree = draft.compact(self.config);
        link_products(&mut tree, products)?;
        roll_up(&mut tree.nodes);
        let classes = mark_equivalence_classes(&mut tree.nodes, &tree.roots, self.config.similarity_threshold);
        index_equivalence_classes(&mut tree, classes);

        info!(
            categories = tree.len(),
            spliced,
            products = tree.product_count(),
            equivalence_classes = tree.equivalence_classes.len(),
            "category tree built"
        );
        Ok(tree)
    }
}

/// Turn nested definitions into parent-id form. A nested child inherits its
/// enclosing category as parent unless it names one explicitly.
fn flatten(categories: Vec<RawCategory>) -> Vec<RawCategory> {
    let mut flat = Vec::with_capacity(categories.len());
    let mut stack: Vec<RawCategory> = categories.into_iter().rev().collect();
    while let Some(mut raw) = stack.pop() {
        let children = std::mem::take(&mut raw.children);
        for mut child in children.into_iter().rev() {
            if child.parent_id.is_none() {
                child.parent_id = Some(raw.id.clone());
            }
            stack.push(child);
        }
        flat.push(raw);
    }
    flat
}

impl Draft {
    fn construct(raw: Vec<RawCategory>) -> Result<Self> {
        let mut ids: AHashMap<String, NodeId> = AHashMap::with_capacity(raw.len());
        let mut nodes = Vec::with_capacity(raw.len());
        for def in &raw {
            let id = NodeId::from_index(nodes.len());
            if ids.insert(def.id.clone(), id).is_some() {
                return Err(Error::DuplicateCategory(def.id.clone()));
            }
            nodes.push(CategoryNode::new(def));
        }

        let mut roots = Vec::new();
        for (i, def) in raw.iter().enumerate() {
            let id = NodeId::from_index(i);
            match &def.parent_id {
                None => roots.push(id),
                Some(parent_id) => {
                    let parent = ids.get(parent_id).copied().ok_or_else(|| Error::UnknownParent {
                        category_id: def.id.clone(),
                        parent_id: parent_id.clone(),
                    })?;
                    nodes[i].parent = Some(parent);
                    nodes[parent.index()].children.push(id);
                }
            }
        }

        let draft = Self {
            nodes,
            roots,
            spliced: AHashMap::new(),
        };
        draft.check_reachable()?;
        Ok(draft)
    }

    /// Nodes caught in a parent cycle are never reachable from a root.
    fn check_reachable(&self) -> Result<()> {
        let mut seen = vec![false; self.nodes.len()];
        let mut stack = self.roots.clone();
        while let Some(id) = stack.pop() {
            seen[id.index()] = true;
            stack.extend(self.nodes[id.index()].children.iter().copied());
        }
        match seen.iter().position(|s| !s) {
            Some(i) => Err(Error::CyclicTaxonomy(self.nodes[i].id.clone())),
            None => Ok(()),
        }
    }

    /// Splice every node with exactly one child out of the hierarchy. The
    /// promoted child is examined again, so chains collapse completely.
    fn eliminate_singletons(&mut self) -> usize {
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        let mut count = 0;
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id.index()];
            if node.children.len() != 1 {
                stack.extend(node.children.iter().rev().copied());
                continue;
            }

            let child = node.children[0];
            let parent = node.parent;
            debug!(
                category = %node.id,
                promoted = %self.nodes[child.index()].id,
                "spliced singleton category"
            );
            self.nodes[child.index()].parent = parent;
            let siblings = match parent {
                Some(p) => &mut self.nodes[p.index()].children[..],
                None => &mut self.roots[..],
            };
            if let Some(slot) = siblings.iter_mut().find(|slot| **slot == id) {
                *slot = child;
            }

            let node = &mut self.nodes[id.index()];
            node.children.clear();
            node.parent = None;
            self.spliced.insert(id, child);
            count += 1;
            stack.push(child);
        }
        count
    }

    fn resolve_splice(&self, mut id: NodeId) -> NodeId {
        while let Some(next) = self.spliced.get(&id) {
            id = *next;
        }
        id
    }

    /// Move live nodes into a fresh arena in pre-order and index them.
    fn compact(self, config: BuildConfig) -> CategoryTree {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.index()].children.iter().rev().copied());
        }

        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        for (new, old) in order.iter().enumerate() {
            remap[old.index()] = Some(NodeId::from_index(new));
        }
        let lookup = |old: NodeId| remap[old.index()].unwrap_or(old);

        let mut index = AHashMap::with_capacity(self.nodes.len());
        for (old, target) in &self.spliced {
            let live = lookup(self.resolve_splice(*target));
            index.insert(self.nodes[old.index()].id.clone(), live);
        }

        let mut slots: Vec<Option<CategoryNode>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        for old in &order {
            if let Some(mut node) = slots[old.index()].take() {
                node.parent = node.parent.map(lookup);
                for child in node.children.iter_mut() {
                    *child = lookup(*child);
                }
                index.insert(node.id.clone(), NodeId::from_index(nodes.len()));
                nodes.push(node);
            }
        }

        CategoryTree {
            roots: self.roots.iter().map(|id| lookup(*id)).collect(),
            nodes,
            index,
            equivalence_index: AHashMap::new(),
            equivalence_classes: Vec::new(),
            products: AHashMap::new(),
            config,
        }
    }
}

fn link_products(tree: &mut CategoryTree, products: Vec<Product>) -> Result<()> {
    tree.products.reserve(products.len());
    for mut product in products {
        let id = tree.index.get(&product.category_id).copied().ok_or_else(|| {
            Error::UnresolvedCategory {
                product_id: product.id.clone(),
                category_id: product.category_id.clone(),
            }
        })?;
        let node = &mut tree.nodes[id.index()];
        if !node.is_leaf() {
            return Err(Error::ProductOnInternalCategory {
                product_id: product.id.clone(),
                category_id: product.category_id.clone(),
            });
        }
        if tree.products.contains_key(&product.id) {
            return Err(Error::DuplicateProduct(product.id.clone()));
        }

        product.link(id);
        node.products.insert(product.id.clone());
        node.count += 1;
        if product.is_tested {
            node.tested_count += 1;
        }
        if product.rating_count() > 0 {
            node.rated_count += 1;
        }
        observe_all(&mut node.ratings, product.ratings.values());
        observe_all(&mut node.specs, product.specs.values());

        tree.products.insert(product.id.clone(), product);
    }
    Ok(())
}

/// Post-order rollup. The arena is in pre-order, so walking it backwards
/// visits every child before its parent; internal nodes are rebuilt from
/// scratch out of their children.
fn roll_up(nodes: &mut [CategoryNode]) {
    for i in (0..nodes.len()).rev() {
        let (head, tail) = nodes.split_at_mut(i + 1);
        let parent = &mut head[i];
        if parent.is_leaf() {
            parent.compute_similarity();
            continue;
        }
        parent.reset_rollup();
        let children = parent.children.clone();
        for child in &children {
            parent.absorb(&tail[child.index() - i - 1]);
        }
        parent.compute_similarity();
    }
}

/// Flag equivalence classes and sub-equivalence nodes. Returns the classes in
/// discovery order.
fn mark_equivalence_classes(nodes: &mut [CategoryNode], roots: &[NodeId], threshold: f64) -> Vec<NodeId> {
    let mut classes = Vec::new();
    let mut stack: Vec<(NodeId, bool)> = roots.iter().rev().map(|id| (*id, false)).collect();
    while let Some((id, collapsed)) = stack.pop() {
        let node = &mut nodes[id.index()];
        let collapse_children = if collapsed {
            node.sub_equivalence = true;
            true
        } else if node.is_leaf() {
            node.equivalence_class = true;
            node.sub_equivalence = true;
            classes.push(id);
            false
        } else if node.similarity.is_some_and(|s| s >= threshold) {
            node.equivalence_class = true;
            node.sub_equivalence = true;
            classes.push(id);
            true
        } else {
            false
        };
        stack.extend(node.children.iter().rev().map(|c| (*c, collapse_children)));
    }
    classes
}

fn index_equivalence_classes(tree: &mut CategoryTree, classes: Vec<NodeId>) {
    let mut mapped: AHashSet<NodeId> = AHashSet::new();
    for class in &classes {
        let mut stack = vec![*class];
        while let Some(id) = stack.pop() {
            mapped.insert(id);
            let node = &tree.nodes[id.index()];
            tree.equivalence_index.insert(node.id.clone(), *class);
            stack.extend(node.children.iter().copied());
        }
    }
    // Spliced ids follow the node that replaced them.
    let aliases: Vec<(String, NodeId)> = tree
        .index
        .iter()
        .filter(|(id, node)| tree.nodes[node.index()].id != **id && mapped.contains(*node))
        .map(|(id, node)| (id.clone(), *node))
        .collect();
    for (alias, node) in aliases {
        if let Some(class) = tree.equivalence_index.get(&tree.nodes[node.index()].id).copied() {
            tree.equivalence_index.insert(alias, class);
        }
    }
    tree.equivalence_classes = classes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::product::Attribute;

    fn product(id: &str, category: &str, attrs: &[&str]) -> Product {
        attrs
            .iter()
            .fold(Product::new(id, id, category), |p, a| p.with_spec(Attribute::new(*a, 1.0)))
    }

    #[test]
    fn test_flatten_nested_children() {
        let raw = vec![RawCategory::new("a", "A")
            .with_child(RawCategory::new("b", "B").with_child(RawCategory::new("c", "C")))
            .with_child(RawCategory::new("d", "D"))];
        let flat = flatten(raw);
        let pairs: Vec<(&str, Option<&str>)> = flat
            .iter()
            .map(|c| (c.id.as_str(), c.parent_id.as_deref()))
            .collect();
        assert_eq!(
            pairs,
            vec![("a", None), ("b", Some("a")), ("c", Some("b")), ("d", Some("a"))]
        );
    }

    #[test]
    fn test_singleton_chain_collapses() {
        // root -> a -> b -> {c, d}
        let categories = vec![
            RawCategory::new("root", "Root"),
            RawCategory::new("x", "X").with_parent("root"),
            RawCategory::new("a", "A").with_parent("x"),
            RawCategory::new("b", "B").with_parent("a"),
            RawCategory::new("c", "C").with_parent("b"),
            RawCategory::new("d", "D").with_parent("b"),
            RawCategory::new("y", "Y").with_parent("root"),
        ];
        let tree = TreeBuilder::default().build(categories, Vec::new()).unwrap();

        let root = tree.category("root").unwrap();
        let child_ids: Vec<&str> = tree.children(root).map(|c| c.id.as_str()).collect();
        assert_eq!(child_ids, vec!["b", "y"]);
        assert_eq!(tree.category("x").unwrap().id, "b");
        assert_eq!(tree.category("a").unwrap().id, "b");
        assert!(tree.nodes().all(|(_, n)| n.children().len() != 1));
    }

    #[test]
    fn test_single_child_root_is_replaced() {
        let categories = vec![
            RawCategory::new("top", "Top"),
            RawCategory::new("mid", "Mid").with_parent("top"),
            RawCategory::new("l1", "L1").with_parent("mid"),
            RawCategory::new("l2", "L2").with_parent("mid"),
        ];
        let tree = TreeBuilder::default().build(categories, Vec::new()).unwrap();
        let roots: Vec<&str> = tree.roots().map(|r| r.id.as_str()).collect();
        assert_eq!(roots, vec!["mid"]);
        assert!(tree.category("mid").unwrap().parent().is_none());
    }

    #[test]
    fn test_unresolved_product_category_aborts() {
        let categories = vec![RawCategory::new("leaf", "Leaf")];
        let products = vec![product("p1", "missing", &["a"])];
        let err = TreeBuilder::default().build(categories, products).unwrap_err();
        assert_eq!(
            err,
            Error::UnresolvedCategory {
                product_id: "p1".to_string(),
                category_id: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_product_on_internal_category_rejected() {
        let categories = vec![
            RawCategory::new("r", "R"),
            RawCategory::new("a", "A").with_parent("r"),
            RawCategory::new("b", "B").with_parent("r"),
        ];
        let err = TreeBuilder::default()
            .build(categories, vec![product("p1", "r", &[])])
            .unwrap_err();
        assert!(matches!(err, Error::ProductOnInternalCategory { .. }));
    }

    #[test]
    fn test_malformed_taxonomy_errors() {
        let dup = vec![RawCategory::new("a", "A"), RawCategory::new("a", "A2")];
        assert_eq!(
            TreeBuilder::default().build(dup, Vec::new()).unwrap_err(),
            Error::DuplicateCategory("a".to_string())
        );

        let orphan = vec![RawCategory::new("a", "A").with_parent("ghost")];
        assert!(matches!(
            TreeBuilder::default().build(orphan, Vec::new()),
            Err(Error::UnknownParent { .. })
        ));

        let cycle = vec![
            RawCategory::new("a", "A").with_parent("b"),
            RawCategory::new("b", "B").with_parent("a"),
        ];
        assert!(matches!(
            TreeBuilder::default().build(cycle, Vec::new()),
            Err(Error::CyclicTaxonomy(_))
        ));
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let categories = vec![RawCategory::new("leaf", "Leaf")];
        let products = vec![product("p1", "leaf", &[]), product("p1", "leaf", &[])];
        assert_eq!(
            TreeBuilder::default().build(categories, products).unwrap_err(),
            Error::DuplicateProduct("p1".to_string())
        );
    }

    #[test]
    fn test_rollup_counts_and_stats() {
        let categories = vec![
            RawCategory::new("r", "R"),
            RawCategory::new("a", "A").with_parent("r"),
            RawCategory::new("b", "B").with_parent("r"),
        ];
        let products = vec![
            product("p1", "a", &["x", "y"]).tested(true),
            product("p2", "a", &["x"]).with_rating(Attribute::new("score", 4.0)),
            product("p3", "b", &["x", "z"]),
        ];
        let tree = TreeBuilder::default().build(categories, products).unwrap();

        let r = tree.category("r").unwrap();
        assert_eq!(r.count(), 3);
        assert_eq!(r.tested_count(), 1);
        assert_eq!(r.rated_count(), 1);
        assert_eq!(r.specs().len(), 3);
        assert_eq!(r.ratings().len(), 1);
        // shared: {x} out of {x, y, z, score}
        assert_eq!(r.similarity(), Some(0.25));
        assert_eq!(tree.category("a").unwrap().similarity(), None);
    }

    #[test]
    fn test_equivalence_classes_above_threshold() {
        // "similar" has children with identical attributes; "mixed" does not.
        let categories = vec![
            RawCategory::new("root", "Root"),
            RawCategory::new("similar", "Similar").with_parent("root"),
            RawCategory::new("s1", "S1").with_parent("similar"),
            RawCategory::new("s2", "S2").with_parent("similar"),
            RawCategory::new("mixed", "Mixed").with_parent("root"),
            RawCategory::new("m1", "M1").with_parent("mixed"),
            RawCategory::new("m2", "M2").with_parent("mixed"),
        ];
        let products = vec![
            product("a", "s1", &["x", "y"]),
            product("b", "s2", &["x", "y"]),
            product("c", "m1", &["x"]),
            product("d", "m2", &["q"]),
        ];
        let tree = TreeBuilder::default().build(categories, products).unwrap();

        let classes: Vec<&str> = tree.equivalence_classes().map(|c| c.id.as_str()).collect();
        assert_eq!(classes, vec!["similar", "m1", "m2"]);

        assert_eq!(tree.equivalence_class("s1").unwrap().id, "similar");
        assert_eq!(tree.equivalence_class("similar").unwrap().id, "similar");
        assert_eq!(tree.equivalence_class("m2").unwrap().id, "m2");
        assert!(tree.equivalence_class("mixed").is_none());
        assert!(tree.category("s2").unwrap().is_sub_equivalence());
        assert!(!tree.category("s2").unwrap().is_equivalence_class());
        assert!(!tree.category("root").unwrap().is_sub_equivalence());
    }

    #[test]
    fn test_custom_threshold() {
        let categories = vec![
            RawCategory::new("r", "R"),
            RawCategory::new("a", "A").with_parent("r"),
            RawCategory::new("b", "B").with_parent("r"),
        ];
        let products = vec![product("p1", "a", &["x", "y"]), product("p2", "b", &["x"])];
        let builder = TreeBuilder::new(BuildConfig {
            similarity_threshold: 0.5,
        });
        let tree = builder.build(categories, products).unwrap();
        assert_eq!(tree.category("r").unwrap().similarity(), Some(0.5));
        assert!(tree.category("r").unwrap().is_equivalence_class());
    }
}
