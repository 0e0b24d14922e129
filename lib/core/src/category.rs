// Category nodes live in an arena owned by the tree; parent and child links
// are arena indices rather than pointers.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeSet, HashSet};

use crate::stats::{merge_tables, AttributeTable};

/// Stable index of a node inside a [`CategoryTree`](crate::CategoryTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }
}

/// A taxonomy entry as supplied by the ingestion layer.
///
/// Hierarchy may be expressed through `parent_id`, through nested
/// `children`, or a mix of both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCategory {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RawCategory>,
}

impl RawCategory {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    #[inline]
    #[must_use]
    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: RawCategory) -> Self {
        self.children.push(child);
        self
    }
}

/// One taxonomy node with its rolled-up statistics.
#[derive(Debug, Clone)]
pub struct CategoryNode {
    pub id: String,
    pub name: String,
    pub description: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: SmallVec<[NodeId; 4]>,
    pub(crate) products: BTreeSet<String>,
    pub(crate) ratings: AttributeTable,
    pub(crate) specs: AttributeTable,
    pub(crate) rating_intersection: Option<BTreeSet<String>>,
    pub(crate) spec_intersection: Option<BTreeSet<String>>,
    pub(crate) count: usize,
    pub(crate) rated_count: usize,
    pub(crate) tested_count: usize,
    pub(crate) similarity: Option<f64>,
    pub(crate) equivalence_class: bool,
    pub(crate) sub_equivalence: bool,
}

impl CategoryNode {
    pub(crate) fn new(raw: &RawCategory) -> Self {
        Self {
            id: raw.id.clone(),
            name: raw.name.clone(),
            description: raw.description.clone(),
            parent: None,
            children: SmallVec::new(),
            products: BTreeSet::new(),
            ratings: AttributeTable::new(),
            specs: AttributeTable::new(),
            rating_intersection: None,
            spec_intersection: None,
            count: 0,
            rated_count: 0,
            tested_count: 0,
            similarity: None,
            equivalence_class: false,
            sub_equivalence: false,
        }
    }

    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Ids of products owned directly (leaf) or through descendants.
    pub fn product_ids(&self) -> impl Iterator<Item = &str> {
        self.products.iter().map(String::as_str)
    }

    #[inline]
    pub fn owns_product(&self, product_id: &str) -> bool {
        self.products.contains(product_id)
    }

    #[inline]
    pub fn ratings(&self) -> &AttributeTable {
        &self.ratings
    }

    #[inline]
    pub fn specs(&self) -> &AttributeTable {
        &self.specs
    }

    /// Spec aggregate for `attribute_id`, falling back to the rating aggregate.
    pub fn attribute_stat(&self, attribute_id: &str) -> Option<&crate::AttributeStat> {
        self.specs
            .get(attribute_id)
            .or_else(|| self.ratings.get(attribute_id))
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn rated_count(&self) -> usize {
        self.rated_count
    }

    #[inline]
    pub fn tested_count(&self) -> usize {
        self.tested_count
    }

    /// Jaccard coefficient of attribute ids shared by all children over all
    /// attribute ids seen below this node. `None` for leaves.
    #[inline]
    pub fn similarity(&self) -> Option<f64> {
        self.similarity
    }

    #[inline]
    pub fn is_equivalence_class(&self) -> bool {
        self.equivalence_class
    }

    #[inline]
    pub fn is_sub_equivalence(&self) -> bool {
        self.sub_equivalence
    }

    pub(crate) fn reset_rollup(&mut self) {
        self.products.clear();
        self.ratings.clear();
        self.specs.clear();
        self.rating_intersection = None;
        self.spec_intersection = None;
        self.count = 0;
        self.rated_count = 0;
        self.tested_count = 0;
        self.similarity = None;
    }

    /// Fold an already rolled-up child into this node.
    pub(crate) fn absorb(&mut self, child: &CategoryNode) {
        merge_tables(&mut self.ratings, &child.ratings);
        merge_tables(&mut self.specs, &child.specs);
        intersect_keys(&mut self.rating_intersection, &child.ratings);
        intersect_keys(&mut self.spec_intersection, &child.specs);

        self.products.extend(child.products.iter().cloned());
        self.count += child.count;
        self.rated_count += child.rated_count;
        self.tested_count += child.tested_count;
    }

    pub(crate) fn compute_similarity(&mut self) {
        if self.children.is_empty() {
            self.similarity = None;
            return;
        }
        let shared = self.rating_intersection.as_ref().map_or(0, BTreeSet::len)
            + self.spec_intersection.as_ref().map_or(0, BTreeSet::len);
        let union = self.ratings.len() + self.specs.len();
        self.similarity = if union == 0 {
            None
        } else {
            Some(shared as f64 / union as f64)
        };
    }
}

/// First child seeds the set; every later child narrows it.
fn intersect_keys(acc: &mut Option<BTreeSet<String>>, table: &AttributeTable) {
    match acc {
        None => *acc = Some(table.keys().cloned().collect()),
        Some(keys) => {
            let present: HashSet<&String> = table.keys().collect();
            keys.retain(|k| present.contains(k));
        }
    }
}
