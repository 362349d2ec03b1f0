//! SKU synthesis.
//!
//! Layout: `<NAME>-<VALUE>-<VALUE>-...-<index>`, where `<NAME>` is the product
//! name uppercased with each whitespace run replaced by one hyphen, and the
//! values are the combination's values uppercased in option order. A product
//! without options gets `<NAME>-DEFAULT`.
//!
//! Uniqueness within one generation run comes from the trailing index alone:
//! two options may share a value string. Uniqueness across products is the
//! store's job (unique index on `sku`).

use crate::combination::Combination;

/// Suffix of the single variant of a product without options.
pub const DEFAULT_SKU_SUFFIX: &str = "DEFAULT";

/// Uppercase `name` and collapse every whitespace run into a single hyphen.
///
/// Edge whitespace is kept as a hyphen; stored product names are already
/// trimmed, so generated SKUs never start or end with one.
pub fn normalize_product_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_whitespace = false;
    for ch in name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                out.push('-');
            }
            in_whitespace = true;
        } else {
            out.extend(ch.to_uppercase());
            in_whitespace = false;
        }
    }
    out
}

/// SKU for the combination at position `index` of a generation run.
pub fn synthesize(product_name: &str, combination: &Combination, index: usize) -> String {
    let name = normalize_product_name(product_name);
    if combination.is_empty() {
        return format!("{name}-{DEFAULT_SKU_SUFFIX}");
    }

    let values = combination
        .values()
        .map(str::to_uppercase)
        .collect::<Vec<_>>()
        .join("-");
    format!("{name}-{values}-{index}")
}
