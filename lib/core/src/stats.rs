//! Per-category attribute aggregates.
//!
//! An [`AttributeStat`] summarises every value a category has seen for one
//! attribute: the numeric range and the set of observed categorical (and
//! stringified boolean) values. Leaves build them from products; internal
//! nodes build them by merging their children's tables.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::product::Attribute;
use crate::value::AttributeValue;

/// Attribute id -> aggregate. Ordered so rollups iterate deterministically.
pub type AttributeTable = BTreeMap<String, AttributeStat>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeStat {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub values: BTreeSet<String>,
    /// Number of product observations folded into this aggregate.
    pub count: usize,
}

impl AttributeStat {
    pub fn new(attribute: &Attribute) -> Self {
        Self {
            id: attribute.id.clone(),
            name: attribute.name.clone(),
            description: attribute.description.clone(),
            min: None,
            max: None,
            values: BTreeSet::new(),
            count: 0,
        }
    }

    /// Fold one product's value into the aggregate.
    pub fn observe(&mut self, value: &AttributeValue) {
        self.count += 1;
        match value {
            AttributeValue::Numeric(v) if v.is_finite() => self.extend_range(*v, *v),
            AttributeValue::Numeric(_) | AttributeValue::NotApplicable => {}
            AttributeValue::Boolean(b) => {
                self.values.insert(b.to_string());
            }
            AttributeValue::Categorical(s) => {
                self.values.insert(s.clone());
            }
        }
    }

    /// Merge another aggregate for the same attribute.
    pub fn merge(&mut self, other: &AttributeStat) {
        if let (Some(min), Some(max)) = (other.min, other.max) {
            self.extend_range(min, max);
        }
        self.values.extend(other.values.iter().cloned());
        self.count += other.count;
    }

    fn extend_range(&mut self, min: f64, max: f64) {
        self.min = Some(self.min.map_or(min, |m| m.min(min)));
        self.max = Some(self.max.map_or(max, |m| m.max(max)));
    }

    /// Whether a categorical value was observed somewhere in the category.
    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }
}

/// Fold a product's attribute map into a table.
pub fn observe_all<'a>(table: &mut AttributeTable, attributes: impl IntoIterator<Item = &'a Attribute>) {
    for attribute in attributes {
        table
            .entry(attribute.id.clone())
            .or_insert_with(|| AttributeStat::new(attribute))
            .observe(&attribute.value);
    }
}

/// Union `other` into `table`, merging aggregates for shared ids.
pub fn merge_tables(table: &mut AttributeTable, other: &AttributeTable) {
    for (id, stat) in other {
        match table.get_mut(id) {
            Some(existing) => existing.merge(stat),
            None => {
                table.insert(id.clone(), stat.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observe_numeric_range() {
        let attr = Attribute::new("weight", 7.5);
        let mut stat = AttributeStat::new(&attr);
        stat.observe(&AttributeValue::Numeric(7.5));
        stat.observe(&AttributeValue::Numeric(2.0));
        stat.observe(&AttributeValue::Numeric(11.0));

        assert_eq!(stat.min, Some(2.0));
        assert_eq!(stat.max, Some(11.0));
        assert_eq!(stat.count, 3);
        assert!(stat.values.is_empty());
    }

    #[test]
    fn test_observe_categorical_and_boolean() {
        let attr = Attribute::new("finish", "matte");
        let mut stat = AttributeStat::new(&attr);
        stat.observe(&AttributeValue::from("matte"));
        stat.observe(&AttributeValue::from("gloss"));
        stat.observe(&AttributeValue::from("matte"));
        stat.observe(&AttributeValue::Boolean(true));

        assert_eq!(stat.values.len(), 3);
        assert!(stat.contains("true"));
        assert!(stat.min.is_none());
    }

    #[test]
    fn test_merge_tables() {
        let mut left = AttributeTable::new();
        observe_all(&mut left, &[Attribute::new("a", 1.0), Attribute::new("b", "x")]);
        let mut right = AttributeTable::new();
        observe_all(&mut right, &[Attribute::new("a", 9.0), Attribute::new("c", true)]);

        merge_tables(&mut left, &right);

        assert_eq!(left.len(), 3);
        assert_eq!(left["a"].min, Some(1.0));
        assert_eq!(left["a"].max, Some(9.0));
        assert_eq!(left["a"].count, 2);
        assert!(left["c"].contains("true"));
    }
}
