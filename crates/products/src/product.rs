use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use catalog_core::{DomainError, DomainResult, Entity, ProductId, VariantId};

use crate::money::MinorUnits;
use crate::option::{ProductOption, validate_options};

/// Persisted form of a combination: option name → chosen value.
pub type Attributes = BTreeMap<String, String>;

/// Label shown for the single variant of a product without options.
pub const DEFAULT_VARIANT_LABEL: &str = "Default Variant";

/// A catalog product. Owns its options by value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,
    pub options: Vec<ProductOption>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The option variants are grouped by unless the caller picks another.
    pub fn default_pivot(&self) -> Option<&ProductOption> {
        self.options.first()
    }

    pub fn option(&self, name: &str) -> Option<&ProductOption> {
        self.options.iter().find(|o| o.name == name)
    }

    pub fn apply(&mut self, patch: &ProductPatch, at: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = Some(description.clone());
        }
        self.updated_at = at;
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<ProductOption>,
}

impl NewProduct {
    /// Presence checks only: a name, and a well-formed option list.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        validate_options(&self.options)
    }

    pub fn into_product(self, id: ProductId, at: DateTime<Utc>) -> Product {
        Product {
            id,
            name: self.name.trim().to_string(),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            options: self.options,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Partial update of a product's descriptive fields.
///
/// Options are fixed after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            return Err(DomainError::validation("product name cannot be empty"));
        }
        Ok(())
    }
}

/// A purchasable unit: one combination of a product's option values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub product_id: ProductId,
    pub sku: String,
    pub price: MinorUnits,
    pub stock: u32,
    pub attributes: Attributes,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Variant {
    /// Human-readable attributes in the product's option order
    /// (`"Size: S / Color: Red"`).
    pub fn label(&self, options: &[ProductOption]) -> String {
        if self.attributes.is_empty() {
            return DEFAULT_VARIANT_LABEL.to_string();
        }

        let mut parts: Vec<String> = options
            .iter()
            .filter_map(|o| {
                self.attributes
                    .get(&o.name)
                    .map(|v| format!("{}: {}", o.name, v))
            })
            .collect();

        // Attributes no longer backed by a declared option still show up, last.
        parts.extend(
            self.attributes
                .iter()
                .filter(|(name, _)| !options.iter().any(|o| &o.name == *name))
                .map(|(name, value)| format!("{name}: {value}")),
        );

        parts.join(" / ")
    }

    pub fn apply(&mut self, patch: &VariantPatch, at: DateTime<Utc>) {
        if let Some(sku) = &patch.sku {
            self.sku = sku.clone();
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        self.updated_at = at;
    }
}

impl Entity for Variant {
    type Id = VariantId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A variant creation request produced by the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVariant {
    pub product_id: ProductId,
    pub sku: String,
    pub price: MinorUnits,
    pub stock: u32,
    pub attributes: Attributes,
}

impl NewVariant {
    pub fn into_variant(self, id: VariantId, at: DateTime<Utc>) -> Variant {
        Variant {
            id,
            product_id: self.product_id,
            sku: self.sku,
            price: self.price,
            stock: self.stock,
            attributes: self.attributes,
            created_at: at,
            updated_at: at,
        }
    }
}

/// Partial update of a variant's editable fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantPatch {
    pub sku: Option<String>,
    pub price: Option<MinorUnits>,
    pub stock: Option<u32>,
}

impl VariantPatch {
    pub fn is_empty(&self) -> bool {
        self.sku.is_none() && self.price.is_none() && self.stock.is_none()
    }

    pub fn validate(&self) -> DomainResult<()> {
        if self.sku.as_deref().is_some_and(|s| s.trim().is_empty()) {
            return Err(DomainError::validation("SKU cannot be empty"));
        }
        Ok(())
    }
}

/// One row of a bulk variant update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantUpdate {
    pub id: VariantId,
    #[serde(flatten)]
    pub patch: VariantPatch,
}

impl VariantUpdate {
    /// An update carrying every editable field of `variant`.
    pub fn full(variant: &Variant) -> Self {
        Self {
            id: variant.id,
            patch: VariantPatch {
                sku: Some(variant.sku.clone()),
                price: Some(variant.price),
                stock: Some(variant.stock),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant(attributes: &[(&str, &str)]) -> Variant {
        let now = Utc::now();
        Variant {
            id: VariantId::new(),
            product_id: ProductId::new(),
            sku: "TEE-S-RED-0".to_string(),
            price: MinorUnits::new(1000),
            stock: 5,
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            created_at: now,
            updated_at: now,
        }
    }

    fn options() -> Vec<ProductOption> {
        vec![
            ProductOption::new("Size", ["S", "M"]).unwrap(),
            ProductOption::new("Color", ["Red", "Blue"]).unwrap(),
        ]
    }

    #[test]
    fn label_follows_option_order() {
        let v = variant(&[("Color", "Red"), ("Size", "S")]);
        assert_eq!(v.label(&options()), "Size: S / Color: Red");
    }

    #[test]
    fn label_for_optionless_variant() {
        assert_eq!(variant(&[]).label(&[]), DEFAULT_VARIANT_LABEL);
    }

    #[test]
    fn label_keeps_undeclared_attributes() {
        let v = variant(&[("Size", "S"), ("Fit", "Slim")]);
        assert_eq!(v.label(&options()[..1]), "Size: S / Fit: Slim");
    }

    #[test]
    fn new_product_requires_name() {
        let input = NewProduct {
            name: "  ".to_string(),
            description: None,
            options: vec![],
        };
        assert!(matches!(input.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn into_product_trims_and_drops_blank_description() {
        let now = Utc::now();
        let product = NewProduct {
            name: " Hiking Boots ".to_string(),
            description: Some("   ".to_string()),
            options: options(),
        }
        .into_product(ProductId::new(), now);

        assert_eq!(product.name, "Hiking Boots");
        assert_eq!(product.description, None);
        assert_eq!(product.default_pivot().map(|o| o.name.as_str()), Some("Size"));
        assert_eq!(product.created_at, now);
    }

    #[test]
    fn variant_patch_applies_only_present_fields() {
        let mut v = variant(&[("Size", "S")]);
        let later = v.updated_at + chrono::Duration::seconds(5);
        v.apply(
            &VariantPatch {
                price: Some(MinorUnits::new(1299)),
                ..VariantPatch::default()
            },
            later,
        );
        assert_eq!(v.price, MinorUnits::new(1299));
        assert_eq!(v.sku, "TEE-S-RED-0");
        assert_eq!(v.stock, 5);
        assert_eq!(v.updated_at, later);
    }

    #[test]
    fn variant_patch_rejects_blank_sku() {
        let patch = VariantPatch {
            sku: Some(" ".to_string()),
            ..VariantPatch::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn full_update_carries_every_field() {
        let v = variant(&[("Size", "S")]);
        let update = VariantUpdate::full(&v);
        assert_eq!(update.id, v.id);
        assert_eq!(update.patch.sku.as_deref(), Some("TEE-S-RED-0"));
        assert_eq!(update.patch.price, Some(MinorUnits::new(1000)));
        assert_eq!(update.patch.stock, Some(5));
    }

    #[test]
    fn variant_update_deserializes_flat_rows() {
        let json = serde_json::json!({ "id": VariantId::new(), "stock": 3 });
        let update: VariantUpdate = serde_json::from_value(json).unwrap();
        assert_eq!(update.patch.stock, Some(3));
        assert!(update.patch.sku.is_none());
    }
}
