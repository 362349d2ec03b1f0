//! Products domain module: options, variant generation and variant editing.
//!
//! This crate contains the catalog's business rules, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage):
//!
//! - [`combination`]: Cartesian expansion of option lists
//! - [`sku`]: SKU synthesis per combination
//! - [`generator`]: the initial variant set of a new product
//! - [`pivot`]: grouping variants by one option for tabular editing
//! - [`editor`]: dirty-tracking bulk edits of variant rows

pub mod combination;
pub mod editor;
pub mod generator;
pub mod money;
pub mod option;
pub mod pivot;
pub mod product;
pub mod sku;

pub use combination::{Combination, Combinations, combination_at, expand, iter_combinations};
pub use editor::{VariantEditSession, VariantField};
pub use generator::VariantGenerator;
pub use money::MinorUnits;
pub use option::{
    ProductOption, VariantCountLevel, VariantLimits, combination_count, validate_options,
};
pub use pivot::{DEFAULT_BUCKET, DriftPolicy, VariantBucket, VariantGroups, group};
pub use product::{
    Attributes, NewProduct, NewVariant, Product, ProductPatch, Variant, VariantPatch, VariantUpdate,
};
pub use sku::{normalize_product_name, synthesize};
