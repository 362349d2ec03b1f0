use rust_decimal::Decimal;
use serde::Deserialize;

use catalog_core::{DomainResult, VariantId};
use catalog_infra::CreateProduct;
use catalog_products::{MinorUnits, ProductOption, VariantPatch, VariantUpdate};

// -------------------------
// Request DTOs
// -------------------------

/// Option values, either as a list or as the comma separated text a user typed.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OptionValuesInput {
    List(Vec<String>),
    Text(String),
}

#[derive(Debug, Deserialize)]
pub struct OptionInput {
    pub name: String,
    pub values: OptionValuesInput,
}

impl OptionInput {
    pub fn into_option(self) -> DomainResult<ProductOption> {
        match self.values {
            OptionValuesInput::List(values) => ProductOption::new(self.name, values),
            OptionValuesInput::Text(raw) => ProductOption::parse(&self.name, &raw),
        }
    }
}

/// Prices in requests are display amounts (e.g. `9.99`).
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<OptionInput>,
    pub base_price: Decimal,
    #[serde(default)]
    pub base_stock: u32,
}

impl CreateProductRequest {
    pub fn into_command(self) -> DomainResult<CreateProduct> {
        let options = self
            .options
            .into_iter()
            .map(OptionInput::into_option)
            .collect::<DomainResult<Vec<_>>>()?;

        Ok(CreateProduct {
            name: self.name,
            description: self.description,
            options,
            base_price: MinorUnits::from_display(self.base_price)?,
            base_stock: self.base_stock,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateVariantRequest {
    pub sku: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
}

impl UpdateVariantRequest {
    pub fn into_patch(self) -> DomainResult<VariantPatch> {
        Ok(VariantPatch {
            sku: self.sku,
            price: self.price.map(MinorUnits::from_display).transpose()?,
            stock: self.stock,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRow {
    pub id: VariantId,
    #[serde(flatten)]
    pub fields: UpdateVariantRequest,
}

#[derive(Debug, Deserialize)]
pub struct BulkUpdateRequest {
    pub updates: Vec<BulkUpdateRow>,
}

impl BulkUpdateRequest {
    pub fn into_updates(self) -> DomainResult<Vec<VariantUpdate>> {
        self.updates
            .into_iter()
            .map(|row| {
                Ok(VariantUpdate {
                    id: row.id,
                    patch: row.fields.into_patch()?,
                })
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductDetailQuery {
    pub pivot: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_converts_display_price_once() {
        let body: CreateProductRequest = serde_json::from_value(json!({
            "name": "Tee",
            "options": [
                { "name": "Size", "values": ["S", "M"] },
                { "name": "Color", "values": "Red, Blue" }
            ],
            "base_price": "10.00",
            "base_stock": 5
        }))
        .unwrap();

        let cmd = body.into_command().unwrap();
        assert_eq!(cmd.base_price, MinorUnits::new(1000));
        assert_eq!(cmd.options[1].values, vec!["Red", "Blue"]);
    }

    #[test]
    fn create_request_accepts_numeric_price() {
        let body: CreateProductRequest = serde_json::from_value(json!({
            "name": "Widget",
            "base_price": 9.99
        }))
        .unwrap();
        let cmd = body.into_command().unwrap();
        assert_eq!(cmd.base_price, MinorUnits::new(999));
        assert_eq!(cmd.base_stock, 0);
        assert!(cmd.options.is_empty());
    }

    #[test]
    fn negative_price_is_rejected() {
        let patch = UpdateVariantRequest {
            price: Some(Decimal::new(-100, 2)),
            ..UpdateVariantRequest::default()
        };
        assert!(patch.into_patch().is_err());
    }

    #[test]
    fn bulk_rows_are_flat() {
        let id = VariantId::new();
        let body: BulkUpdateRequest = serde_json::from_value(json!({
            "updates": [{ "id": id, "price": "12.50", "stock": 3 }]
        }))
        .unwrap();
        let updates = body.into_updates().unwrap();
        assert_eq!(updates[0].id, id);
        assert_eq!(updates[0].patch.price, Some(MinorUnits::new(1250)));
        assert_eq!(updates[0].patch.sku, None);
    }
}
