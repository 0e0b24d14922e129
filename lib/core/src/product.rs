use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::NodeId;
use crate::value::AttributeValue;

/// A single observed attribute on a product: identity, metadata and value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub value: AttributeValue,
}

impl Attribute {
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            description: String::new(),
            value: value.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An immutable snapshot of one catalog item.
///
/// Ratings hold expert test results, specs hold manufacturer specifications.
/// Both are keyed by attribute id. The only field written after construction
/// is the back-reference to the resolved category node, which the tree
/// builder sets exactly once while linking.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_score: Option<f64>,
    pub is_tested: bool,
    pub is_recommended: bool,
    pub is_best_buy: bool,
    pub category_id: String,
    pub ratings: BTreeMap<String, Attribute>,
    pub specs: BTreeMap<String, Attribute>,
    #[serde(skip)]
    node: Option<NodeId>,
}

impl Product {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            brand_name: None,
            price: None,
            overall_score: None,
            is_tested: false,
            is_recommended: false,
            is_best_buy: false,
            category_id: category_id.into(),
            ratings: BTreeMap::new(),
            specs: BTreeMap::new(),
            node: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_rating(mut self, attribute: Attribute) -> Self {
        self.ratings.insert(attribute.id.clone(), attribute);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_spec(mut self, attribute: Attribute) -> Self {
        self.specs.insert(attribute.id.clone(), attribute);
        self
    }

    #[inline]
    #[must_use]
    pub fn tested(mut self, is_tested: bool) -> Self {
        self.is_tested = is_tested;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_overall_score(mut self, score: f64) -> Self {
        self.overall_score = Some(score);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_price(mut self, price: f64) -> Self {
        self.price = Some(price);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand_name = Some(brand.into());
        self
    }

    /// Look up an attribute by id, specs first, then ratings.
    pub fn attribute(&self, attribute_id: &str) -> Option<&Attribute> {
        self.specs
            .get(attribute_id)
            .or_else(|| self.ratings.get(attribute_id))
    }

    /// All ratings followed by all specs.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.ratings.values().chain(self.specs.values())
    }

    #[inline]
    pub fn rating_count(&self) -> usize {
        self.ratings.len()
    }

    /// The category node this product was linked to, once the tree is built.
    #[inline]
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Linking happens once per build; later calls are ignored.
    pub(crate) fn link(&mut self, node: NodeId) {
        if self.node.is_none() {
            self.node = Some(node);
        }
    }
}
