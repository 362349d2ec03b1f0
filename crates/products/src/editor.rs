//! Variant editing session with dirty tracking.
//!
//! The session owns a snapshot of a product's variants plus the set of ids
//! edited since the last successful commit. Prices are held in minor units;
//! display amounts typed by the user are converted once, in [`VariantEditSession::edit`].

use std::collections::HashSet;
use std::future::Future;

use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, VariantId};

use crate::money::MinorUnits;
use crate::option::ProductOption;
use crate::pivot::{DriftPolicy, VariantGroups, group};
use crate::product::{Variant, VariantUpdate};

/// Editable variant column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantField {
    Sku,
    /// Entered in display units (e.g. dollars).
    Price,
    Stock,
}

impl VariantField {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantField::Sku => "sku",
            VariantField::Price => "price",
            VariantField::Stock => "stock",
        }
    }
}

impl core::fmt::Display for VariantField {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl core::str::FromStr for VariantField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sku" => Ok(VariantField::Sku),
            "price" => Ok(VariantField::Price),
            "stock" => Ok(VariantField::Stock),
            other => Err(DomainError::validation(format!(
                "unknown variant field '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantEditSession {
    variants: Vec<Variant>,
    dirty: HashSet<VariantId>,
}

impl VariantEditSession {
    pub fn new(variants: Vec<Variant>) -> Self {
        Self {
            variants,
            dirty: HashSet::new(),
        }
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.iter().find(|v| *v.id() == id)
    }

    pub fn is_dirty(&self, id: VariantId) -> bool {
        self.dirty.contains(&id)
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    pub fn dirty_ids(&self) -> impl Iterator<Item = VariantId> + '_ {
        self.dirty.iter().copied()
    }

    /// Set `field` of variant `id` from raw user input and mark it dirty.
    ///
    /// Numeric fields are coerced (`price` from display units, `stock` as a
    /// non-negative integer). Returns `Ok(false)` without touching anything
    /// when `id` is not part of the session; unparseable input is rejected and
    /// leaves the variant clean.
    pub fn edit(&mut self, id: VariantId, field: VariantField, raw: &str) -> DomainResult<bool> {
        let Some(variant) = self.variants.iter_mut().find(|v| *v.id() == id) else {
            return Ok(false);
        };

        match field {
            VariantField::Sku => variant.sku = raw.to_string(),
            VariantField::Price => variant.price = MinorUnits::parse_display(raw)?,
            VariantField::Stock => {
                variant.stock = raw.trim().parse::<u32>().map_err(|e| {
                    DomainError::validation(format!("invalid stock '{raw}': {e}"))
                })?;
            }
        }

        self.dirty.insert(id);
        Ok(true)
    }

    /// Full-row updates for every dirty variant, in session order.
    pub fn pending_updates(&self) -> Vec<VariantUpdate> {
        self.variants
            .iter()
            .filter(|v| self.dirty.contains(v.id()))
            .map(VariantUpdate::full)
            .collect()
    }

    /// Submit the pending updates as one batch.
    ///
    /// On success the dirty set is cleared and the number of rows sent is
    /// returned. On failure the dirty set is left as it was, so a retry sends
    /// the same rows again. Nothing is submitted when no row is dirty.
    pub async fn commit<F, Fut, E>(&mut self, submit: F) -> Result<usize, E>
    where
        F: FnOnce(Vec<VariantUpdate>) -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        if self.dirty.is_empty() {
            return Ok(0);
        }

        let updates = self.pending_updates();
        let count = updates.len();
        submit(updates).await?;
        self.dirty.clear();
        Ok(count)
    }

    /// The session's current rows grouped by `pivot_option_name`.
    pub fn grouped<'a>(
        &'a self,
        options: &[ProductOption],
        pivot_option_name: Option<&str>,
        policy: DriftPolicy,
    ) -> DomainResult<VariantGroups<'a>> {
        group(&self.variants, options, pivot_option_name, policy)
    }
}
