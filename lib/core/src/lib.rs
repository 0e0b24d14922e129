//! # catrank Core
//!
//! Core library for the catrank catalog engine.
//!
//! This crate provides the fundamental data structures and the tree build:
//!
//! - [`AttributeValue`] - Tagged numeric / boolean / categorical / absent value
//! - [`Product`] - Immutable catalog item with rating and spec attributes
//! - [`CategoryNode`] - Taxonomy node with rolled-up [`AttributeStat`] tables
//! - [`TreeBuilder`] - Singleton elimination, rollup and equivalence classes
//! - [`CategoryTree`] - Immutable, shareable snapshot of the built tree
//! - [`Catalog`] - Atomically swappable handle to the current snapshot
//!
//! ## Example
//!
//! ```rust
//! use catrank_core::{Attribute, CategoryTree, Product, RawCategory};
//!
//! let categories = vec![
//!     RawCategory::new("kitchen", "Kitchen"),
//!     RawCategory::new("toasters", "Toasters").with_parent("kitchen"),
//!     RawCategory::new("kettles", "Kettles").with_parent("kitchen"),
//! ];
//! let products = vec![
//!     Product::new("t1", "Two Slice", "toasters").with_spec(Attribute::new("slots", 2.0)),
//!     Product::new("k1", "Quick Boil", "kettles").with_spec(Attribute::new("litres", 1.7)),
//! ];
//!
//! let tree = CategoryTree::build(categories, products).unwrap();
//! assert_eq!(tree.category("kitchen").unwrap().count(), 2);
//! assert_eq!(tree.equivalence_class("toasters").unwrap().id, "toasters");
//! ```

pub mod builder;
pub mod catalog;
pub mod category;
pub mod error;
pub mod product;
pub mod stats;
pub mod tree;
pub mod value;

pub use builder::{BuildConfig, TreeBuilder, EQUIVALENCE_THRESHOLD};
pub use catalog::Catalog;
pub use category::{CategoryNode, NodeId, RawCategory};
pub use error::{Error, Result};
pub use product::{Attribute, Product};
pub use stats::{AttributeStat, AttributeTable};
pub use tree::CategoryTree;
pub use value::{AttributeValue, ValueKind, NOT_APPLICABLE};
