//! Grouping variants by one "pivot" option for tabular editing.
//!
//! Buckets follow the pivot option's declared value order, and variants keep
//! their relative input order inside a bucket. Grouping by a different option
//! is just another call with a different pivot name.

use serde::Serialize;

use catalog_core::{DomainError, DomainResult};

use crate::option::ProductOption;
use crate::product::Variant;

/// Bucket key used when the product has no options.
pub const DEFAULT_BUCKET: &str = "Default";

/// What to do with a variant whose pivot attribute is missing or not among
/// the pivot option's declared values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DriftPolicy {
    /// Leave it out of the result entirely.
    Exclude,
    /// Keep it in [`VariantGroups::unassigned`], apart from the value buckets.
    #[default]
    Unassigned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantBucket<'a> {
    pub key: String,
    pub variants: Vec<&'a Variant>,
}

/// Ordered buckets of variants keyed by pivot value.
///
/// `buckets` holds one entry per declared pivot value and nothing else, so a
/// declared value spelled like a label ("Unassigned", "Default") is still an
/// ordinary bucket. Drifted variants are kept in `unassigned`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VariantGroups<'a> {
    /// `None` when the product has no options.
    pub pivot: Option<String>,
    pub buckets: Vec<VariantBucket<'a>>,
    /// Always empty under [`DriftPolicy::Exclude`].
    pub unassigned: Vec<&'a Variant>,
}

impl<'a> VariantGroups<'a> {
    pub fn get(&self, key: &str) -> Option<&[&'a Variant]> {
        self.buckets
            .iter()
            .find(|b| b.key == key)
            .map(|b| b.variants.as_slice())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.buckets.iter().map(|b| b.key.as_str())
    }

    /// Variants whose pivot value is missing or undeclared.
    pub fn unassigned(&self) -> &[&'a Variant] {
        &self.unassigned
    }
}

/// Partition `variants` by the value of `pivot_option_name`.
///
/// With no pivot (a product without options) every variant lands in one
/// [`DEFAULT_BUCKET`]. A pivot name that is not among `options` is rejected.
pub fn group<'a>(
    variants: &'a [Variant],
    options: &[ProductOption],
    pivot_option_name: Option<&str>,
    policy: DriftPolicy,
) -> DomainResult<VariantGroups<'a>> {
    let Some(pivot_name) = pivot_option_name else {
        return Ok(VariantGroups {
            pivot: None,
            buckets: vec![VariantBucket {
                key: DEFAULT_BUCKET.to_string(),
                variants: variants.iter().collect(),
            }],
            unassigned: Vec::new(),
        });
    };

    let pivot = options
        .iter()
        .find(|o| o.name == pivot_name)
        .ok_or_else(|| DomainError::validation(format!("unknown pivot option '{pivot_name}'")))?;

    let mut buckets: Vec<VariantBucket<'a>> = pivot
        .values
        .iter()
        .map(|value| VariantBucket {
            key: value.clone(),
            variants: Vec::new(),
        })
        .collect();
    let mut unassigned = Vec::new();

    for variant in variants {
        let slot = variant
            .attributes
            .get(pivot_name)
            .and_then(|value| pivot.values.iter().position(|v| v == value));
        match slot {
            Some(idx) => buckets[idx].variants.push(variant),
            None => unassigned.push(variant),
        }
    }

    if policy == DriftPolicy::Exclude {
        unassigned.clear();
    }

    Ok(VariantGroups {
        pivot: Some(pivot.name.clone()),
        buckets,
        unassigned,
    })
}
