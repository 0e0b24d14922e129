// Integration tests for catrank
use catrank::ingest::RawCatalog;
use catrank::{
    Attribute, AttributeStat, AttributeValue, Catalog, CatalogService, CategoryTree, Product, RawCategory, ScoredAttribute,
    ScorerConfig, SortMethod, UserScoredAttribute,
};
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::sync::Arc;

fn categories() -> Vec<RawCategory> {
    vec![
        RawCategory::new("home", "Home"),
        RawCategory::new("kitchen", "Kitchen").with_parent("home"),
        RawCategory::new("kettles", "Kettles").with_parent("kitchen"),
        RawCategory::new("glass-kettles", "Glass kettles").with_parent("kettles"),
        RawCategory::new("steel-kettles", "Steel kettles").with_parent("kettles"),
        RawCategory::new("toasters", "Toasters").with_parent("kitchen"),
        RawCategory::new("small-appliances", "Small appliances").with_parent("kitchen"),
        RawCategory::new("blenders", "Blenders").with_parent("small-appliances"),
    ]
}

fn kettle(id: &str, category: &str, litres: f64, price: f64, speed: f64) -> Product {
    Product::new(id, id.to_uppercase(), category)
        .with_spec(Attribute::new("litres", litres))
        .with_spec(Attribute::new("price", price))
        .with_rating(Attribute::new("boil_speed", speed))
        .with_overall_score(speed * 10.0)
        .tested(true)
}

fn products() -> Vec<Product> {
    vec![
        kettle("g1", "glass-kettles", 1.0, 30.0, 6.0),
        kettle("g2", "glass-kettles", 1.7, 45.0, 8.0),
        kettle("s1", "steel-kettles", 1.5, 25.0, 7.0),
        kettle("s2", "steel-kettles", 1.2, 35.0, 5.0),
        Product::new("t1", "T1", "toasters")
            .with_spec(Attribute::new("slots", 2.0))
            .with_spec(Attribute::new("price", 20.0))
            .with_rating(Attribute::new("evenness", 7.0)),
        Product::new("t2", "T2", "toasters")
            .with_spec(Attribute::new("slots", 4.0))
            .with_spec(Attribute::new("price", 40.0))
            .with_rating(Attribute::new("evenness", 9.0)),
        // Assigned to a level that singleton elimination removes.
        Product::new("b1", "B1", "small-appliances")
            .with_spec(Attribute::new("watts", 600.0))
            .with_spec(Attribute::new("price", 50.0)),
        Product::new("b2", "B2", "blenders")
            .with_spec(Attribute::new("watts", 900.0))
            .with_spec(Attribute::new("price", 80.0)),
    ]
}

fn build() -> CategoryTree {
    CategoryTree::build(categories(), products()).unwrap()
}

#[test]
fn test_rollup_counts_and_tables() {
    let tree = build();
    let kitchen = tree.category("kitchen").unwrap();

    assert_eq!(kitchen.count(), 8);
    assert_eq!(kitchen.rated_count(), 6);
    assert_eq!(kitchen.tested_count(), 4);

    let children_total: usize = tree.children(kitchen).map(|c| c.count()).sum();
    assert_eq!(children_total, kitchen.count());

    let price = kitchen.attribute_stat("price").unwrap();
    assert_eq!(price.min, Some(20.0));
    assert_eq!(price.max, Some(80.0));
    assert_eq!(price.count, 8);
    assert_eq!(kitchen.specs().len(), 4);
    assert_eq!(kitchen.ratings().len(), 2);
}

/// Check that a parent table is exactly the merge of its children's tables.
fn assert_table_is_union(parent_id: &str, parent: &BTreeMap<String, AttributeStat>, children: &[&BTreeMap<String, AttributeStat>]) {
    let child_keys: BTreeSet<&String> = children.iter().flat_map(|t| t.keys()).collect();
    let parent_keys: BTreeSet<&String> = parent.keys().collect();
    assert_eq!(parent_keys, child_keys, "attribute ids of {}", parent_id);

    for (id, stat) in parent {
        let stats: Vec<&AttributeStat> = children.iter().filter_map(|t| t.get(id)).collect();
        let min = stats.iter().filter_map(|s| s.min).reduce(f64::min);
        let max = stats.iter().filter_map(|s| s.max).reduce(f64::max);
        let count: usize = stats.iter().map(|s| s.count).sum();
        let values: BTreeSet<String> = stats.iter().flat_map(|s| s.values.iter().cloned()).collect();

        assert_eq!(stat.min, min, "min of {} in {}", id, parent_id);
        assert_eq!(stat.max, max, "max of {} in {}", id, parent_id);
        assert_eq!(stat.count, count, "count of {} in {}", id, parent_id);
        assert_eq!(stat.values, values, "values of {} in {}", id, parent_id);
    }
}

#[test]
fn test_rollup_tables_equal_union_of_children() {
    let tree = build();
    let mut internal = 0;

    for (_, node) in tree.nodes() {
        if node.is_leaf() {
            continue;
        }
        internal += 1;
        let children: Vec<_> = tree.children(node).collect();

        let specs: Vec<_> = children.iter().map(|c| c.specs()).collect();
        assert_table_is_union(&node.id, node.specs(), &specs);
        let ratings: Vec<_> = children.iter().map(|c| c.ratings()).collect();
        assert_table_is_union(&node.id, node.ratings(), &ratings);

        let products: BTreeSet<&str> = children.iter().flat_map(|c| c.product_ids()).collect();
        assert_eq!(node.product_ids().collect::<BTreeSet<_>>(), products);
        assert_eq!(node.count(), children.iter().map(|c| c.count()).sum::<usize>());
        assert_eq!(node.rated_count(), children.iter().map(|c| c.rated_count()).sum::<usize>());
        assert_eq!(node.tested_count(), children.iter().map(|c| c.tested_count()).sum::<usize>());
    }
    // kitchen and kettles
    assert_eq!(internal, 2);
}

#[test]
fn test_singleton_elimination() {
    let tree = build();

    // home and small-appliances are spliced out.
    assert_eq!(tree.len(), 6);
    assert_eq!(tree.roots().next().unwrap().id, "kitchen");
    assert_eq!(tree.category("home").unwrap().id, "kitchen");
    assert_eq!(tree.category("small-appliances").unwrap().id, "blenders");
    assert_eq!(tree.category_of(tree.product("b1").unwrap()).unwrap().id, "blenders");
    assert!(tree
        .nodes()
        .all(|(_, node)| node.children().len() != 1));
}

#[test]
fn test_elimination_is_idempotent() {
    let tree = build();
    // Spliced ids are gone from the export, so relink b1 to its replacement.
    let relinked = products()
        .into_iter()
        .map(|mut p| {
            if p.category_id == "small-appliances" {
                p.category_id = "blenders".to_string();
            }
            p
        })
        .collect();
    let rebuilt = CategoryTree::build(tree.raw_categories(), relinked).unwrap();

    assert_eq!(rebuilt.len(), tree.len());
    let ids: Vec<&str> = tree.nodes().map(|(_, n)| n.id.as_str()).collect();
    let rebuilt_ids: Vec<&str> = rebuilt.nodes().map(|(_, n)| n.id.as_str()).collect();
    assert_eq!(ids, rebuilt_ids);
}

#[test]
fn test_equivalence_class_coverage() {
    let tree = build();

    let classes: Vec<&str> = tree.equivalence_classes().map(|c| c.id.as_str()).collect();
    assert_eq!(classes, vec!["kettles", "toasters", "blenders"]);

    for (_, node) in tree.nodes() {
        if node.is_leaf() || node.is_sub_equivalence() {
            let class = tree.equivalence_class(&node.id).unwrap();
            assert!(class.is_equivalence_class());
            assert!(class.product_ids().count() >= node.product_ids().count());
        }
    }
    assert_eq!(tree.equivalence_class("steel-kettles").unwrap().id, "kettles");
    assert_eq!(tree.equivalence_class("small-appliances").unwrap().id, "blenders");
    assert!(tree.equivalence_class("kitchen").is_none());
    assert!(!tree.category("kitchen").unwrap().is_sub_equivalence());
}

#[test]
fn test_ranking_completeness_and_determinism() {
    let service = CatalogService::new(build(), ScorerConfig::default());
    let price = UserScoredAttribute::from_signed(ScoredAttribute::empty("kitchen", "price"), -2.0);
    let litres = UserScoredAttribute::from_signed(ScoredAttribute::empty("kitchen", "litres"), 1.0);

    let first = service.rank_products(&[price.clone(), litres.clone()], "kitchen");
    let second = service.rank_products(&[price, litres], "kitchen");

    assert_eq!(first.len(), 8);
    assert_eq!(first, second);
    for pair in first.windows(2) {
        assert!(
            pair[0].score > pair[1].score
                || (pair[0].score == pair[1].score && pair[0].product_id < pair[1].product_id)
        );
    }
    // Toasters lack litres and explain only the price term.
    let t1 = first.iter().find(|r| r.product_id == "t1").unwrap();
    assert_eq!(t1.contributions.len(), 1);
}

#[test]
fn test_ranking_within_equivalence_class() {
    let service = CatalogService::new(build(), ScorerConfig::default());
    let speed = UserScoredAttribute::from_signed(ScoredAttribute::empty("kettles", "boil_speed"), 1.0);
    let ranked = service.rank_products(&[speed], "glass-kettles");

    let ids: Vec<&str> = ranked.iter().map(|r| r.product_id.as_str()).collect();
    assert_eq!(ids, vec!["g2", "s1", "g1", "s2"]);
    assert!(ranked.iter().all(|r| r.category_id == "kettles"));
}

#[test]
fn test_attribute_scoring_orders() {
    let service = CatalogService::new(build(), ScorerConfig::default());

    let by_correlation = service.attributes_for_category("kettles", SortMethod::Correlation);
    assert_eq!(by_correlation.len(), 3);
    assert_eq!(by_correlation[0].attribute_id, "boil_speed");
    assert!((by_correlation[0].score - 1.0).abs() < 1e-9);

    let by_entropy = service.attributes_for_category("kettles", SortMethod::Entropy);
    let speed = by_entropy.iter().find(|a| a.attribute_id == "boil_speed").unwrap();
    assert_eq!(speed.mean, AttributeValue::Numeric(6.5));
    assert_eq!(speed.observed, 4);
}

#[test]
fn test_unknown_category_robustness() {
    let service = CatalogService::new(build(), ScorerConfig::default());
    assert!(service.attributes_for_category("garden", SortMethod::Entropy).is_empty());
    assert!(service.rank_products(&[], "garden").is_empty());

    let attribute = service.scored_attribute_in_category("kettles", "wattage");
    assert_eq!(attribute.score, 0.0);
    assert_eq!(attribute.mean, AttributeValue::not_available());
}

#[test]
fn test_empty_population_scoring() {
    let tree = CategoryTree::build(
        vec![RawCategory::new("misc", "Misc")],
        vec![Product::new("m1", "Bare", "misc"), Product::new("m2", "Bare too", "misc")],
    )
    .unwrap();
    let service = CatalogService::new(tree, ScorerConfig::default());

    assert!(service.attributes_for_category("misc", SortMethod::Entropy).is_empty());
    let ranked = service.rank_products(
        &[UserScoredAttribute::from_signed(ScoredAttribute::empty("misc", "price"), 1.0)],
        "misc",
    );
    assert_eq!(ranked.len(), 2);
    assert!(ranked.iter().all(|r| r.score == 0.0));
}

#[test]
fn test_build_errors() {
    let err = CategoryTree::build(categories(), vec![Product::new("x", "X", "garden")]).unwrap_err();
    assert!(matches!(err, catrank::Error::UnresolvedCategory { .. }));

    let err = CategoryTree::build(categories(), vec![Product::new("x", "X", "kettles")]).unwrap_err();
    assert!(matches!(err, catrank::Error::ProductOnInternalCategory { .. }));
}

#[test]
fn test_catalog_file_ingestion() {
    let json = r#"{
        "categories": [
            { "id": "kettles", "name": "Kettles", "children": [
                { "id": "glass-kettles", "name": "Glass" },
                { "id": "steel-kettles", "name": "Steel" }
            ]}
        ],
        "products": [
            { "id": "g1", "name": "G1", "category_id": "glass-kettles", "specs": [{ "id": "litres", "value": 1.0 }] },
            { "id": "s1", "name": "S1", "category_id": "steel-kettles", "specs": [{ "id": "litres", "value": 2.0 }] }
        ]
    }"#;
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(json.as_bytes()).unwrap();

    let tree = RawCatalog::load(file.path()).unwrap().build().unwrap();
    assert_eq!(tree.len(), 3);
    assert_eq!(tree.equivalence_class("glass-kettles").unwrap().id, "kettles");

    assert!(RawCatalog::load(file.path().with_extension("missing")).is_err());
}

#[test]
fn test_concurrent_readers_during_swap() {
    let catalog = Catalog::new(build());
    let service = Arc::new(CatalogService::with_catalog(catalog, ScorerConfig::default()));

    std::thread::scope(|s| {
        for _ in 0..4 {
            let service = Arc::clone(&service);
            s.spawn(move || {
                for _ in 0..50 {
                    let tree = service.snapshot();
                    let kitchen = tree.category("kitchen");
                    // Either the original tree or the replacement, never a partial one.
                    match kitchen {
                        Some(node) => assert_eq!(node.count(), 8),
                        None => assert_eq!(tree.product_count(), 1),
                    }
                }
            });
        }
        s.spawn(|| {
            service
                .reload(
                    vec![RawCategory::new("solo", "Solo")],
                    vec![Product::new("p", "P", "solo")],
                )
                .unwrap();
        });
    });

    assert_eq!(service.snapshot().product_count(), 1);
}
