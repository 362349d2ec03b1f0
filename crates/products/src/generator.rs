//! Initial variant set of a newly created product.

use catalog_core::DomainResult;

use crate::combination::{Combination, iter_combinations};
use crate::money::MinorUnits;
use crate::option::VariantLimits;
use crate::product::{NewVariant, Product};
use crate::sku::synthesize;

/// Expands a product's options into variant creation requests.
///
/// Every request starts with the same base price and stock. The caller is
/// responsible for persisting the product and all requests as one unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VariantGenerator {
    limits: VariantLimits,
}

impl VariantGenerator {
    pub fn new(limits: VariantLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &VariantLimits {
        &self.limits
    }

    /// `base_price` is already in minor units; no currency conversion happens here.
    pub fn generate(
        &self,
        product: &Product,
        base_price: MinorUnits,
        base_stock: u32,
    ) -> DomainResult<Vec<NewVariant>> {
        let request = |combination: &Combination, index: usize| NewVariant {
            product_id: product.id,
            sku: synthesize(&product.name, combination, index),
            price: base_price,
            stock: base_stock,
            attributes: combination.to_attributes(),
        };

        if product.options.is_empty() {
            return Ok(vec![request(&Combination::empty(), 0)]);
        }

        self.limits.check(&product.options)?;
        Ok(iter_combinations(&product.options)?
            .enumerate()
            .map(|(index, combination)| request(&combination, index))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::ProductOption;
    use crate::product::Attributes;
    use catalog_core::{DomainError, ProductId};
    use chrono::Utc;

    fn product(name: &str, options: Vec<ProductOption>) -> Product {
        let now = Utc::now();
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            description: None,
            options,
            created_at: now,
            updated_at: now,
        }
    }

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn generates_full_cross_product_with_base_values() {
        let p = product(
            "Tee",
            vec![
                ProductOption::new("Size", ["S", "M"]).unwrap(),
                ProductOption::new("Color", ["Red", "Blue"]).unwrap(),
            ],
        );
        let variants = VariantGenerator::default()
            .generate(&p, MinorUnits::new(1000), 5)
            .unwrap();

        assert_eq!(variants.len(), 4);
        let expected = [
            attrs(&[("Size", "S"), ("Color", "Red")]),
            attrs(&[("Size", "S"), ("Color", "Blue")]),
            attrs(&[("Size", "M"), ("Color", "Red")]),
            attrs(&[("Size", "M"), ("Color", "Blue")]),
        ];
        for (i, (variant, attributes)) in variants.iter().zip(&expected).enumerate() {
            assert_eq!(&variant.attributes, attributes);
            assert_eq!(variant.price, MinorUnits::new(1000));
            assert_eq!(variant.stock, 5);
            assert_eq!(variant.product_id, p.id);
            assert!(variant.sku.ends_with(&format!("-{i}")), "sku {}", variant.sku);
        }
    }

    #[test]
    fn optionless_product_gets_single_default_variant() {
        let p = product("Widget", vec![]);
        let variants = VariantGenerator::default()
            .generate(&p, MinorUnits::new(250), 0)
            .unwrap();

        assert_eq!(variants.len(), 1);
        assert!(variants[0].attributes.is_empty());
        assert_eq!(variants[0].sku, "WIDGET-DEFAULT");
    }

    #[test]
    fn rejects_expansion_above_limit() {
        let p = product(
            "Tee",
            vec![
                ProductOption::new("Size", ["S", "M", "L"]).unwrap(),
                ProductOption::new("Color", ["Red", "Blue"]).unwrap(),
            ],
        );
        let generator = VariantGenerator::new(VariantLimits {
            warn_above: 2,
            flag_above: 4,
            max: 5,
        });
        let err = generator.generate(&p, MinorUnits::ZERO, 0).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn optionless_product_ignores_limits() {
        let generator = VariantGenerator::new(VariantLimits {
            warn_above: 0,
            flag_above: 0,
            max: 0,
        });
        let variants = generator
            .generate(&product("Widget", vec![]), MinorUnits::ZERO, 0)
            .unwrap();
        assert_eq!(variants.len(), 1);
    }
}
