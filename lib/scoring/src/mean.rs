//! Representative value extraction.

use ahash::AHashMap;
use catrank_core::{AttributeValue, Product};

/// The representative value of `attribute_id` over a product population.
///
/// - every product carries the attribute and every value is numeric: the mean
/// - every product carries the attribute and every value is boolean: the
///   majority, ties going to `true`
/// - otherwise the mode of all values, stringified, first seen wins ties
///
/// Returns `"N/A"` when nothing was observed.
pub fn extract_mean<'a, I>(products: I, attribute_id: &str) -> AttributeValue
where
    I: IntoIterator<Item = &'a Product>,
{
    let mut total = 0usize;
    let mut values: Vec<&AttributeValue> = Vec::new();
    for product in products {
        total += 1;
        if let Some(attribute) = product.attribute(attribute_id) {
            values.push(&attribute.value);
        }
    }

    if values.is_empty() {
        return AttributeValue::not_available();
    }

    if values.len() == total {
        let numeric: Vec<f64> = values.iter().filter_map(|v| v.as_numeric()).collect();
        if numeric.len() == total {
            return AttributeValue::Numeric(numeric.iter().sum::<f64>() / total as f64);
        }

        let trues = values.iter().filter(|v| v.as_bool() == Some(true)).count();
        let falses = values.iter().filter(|v| v.as_bool() == Some(false)).count();
        if trues + falses == total {
            return AttributeValue::Boolean(trues >= falses);
        }
    }

    mode(values)
}

/// Most frequent value, compared by string form. Absent values are not counted.
pub fn mode<'a, I>(values: I) -> AttributeValue
where
    I: IntoIterator<Item = &'a AttributeValue>,
{
    let mut slots: AHashMap<String, usize> = AHashMap::new();
    let mut tallies: Vec<(String, usize)> = Vec::new();
    for value in values {
        if value.is_not_applicable() {
            continue;
        }
        let key = value.to_string();
        match slots.get(&key) {
            Some(&i) => tallies[i].1 += 1,
            None => {
                slots.insert(key.clone(), tallies.len());
                tallies.push((key, 1));
            }
        }
    }

    let mut best: Option<&(String, usize)> = None;
    for tally in &tallies {
        if best.map_or(true, |b| tally.1 > b.1) {
            best = Some(tally);
        }
    }
    match best {
        Some((value, _)) => AttributeValue::Categorical(value.clone()),
        None => AttributeValue::not_available(),
    }
}
