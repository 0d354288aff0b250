//! Product record types
//!
//! `Product` is the stored record, `ProductPatch` carries a partial update.

use serde::{Deserialize, Serialize};

/// A single product record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Caller supplied identifier (not generated, not checked for uniqueness)
    pub id: i64,
    pub title: String,
    pub sku: String,
    /// Price in the smallest currency unit
    pub price: i64,
}

impl Product {
    pub fn new(id: i64, title: impl Into<String>, sku: impl Into<String>, price: i64) -> Self {
        Self {
            id,
            title: title.into(),
            sku: sku.into(),
            price,
        }
    }
}

/// Partial update for a product
///
/// A missing (or `null`) field is left untouched; any present value,
/// including `0` or an empty string, overwrites the stored field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub price: Option<i64>,
}

impl ProductPatch {
    /// Apply every present field to `product`
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(title) = &self.title {
            product.title.clone_from(title);
        }
        if let Some(sku) = &self.sku {
            product.sku.clone_from(sku);
        }
        if let Some(price) = self.price {
            product.price = price;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_distinguishes_zero_from_missing() {
        let patch: ProductPatch = serde_json::from_str(r#"{"price":0}"#).unwrap();
        assert_eq!(patch.price, Some(0));
        assert_eq!(patch.title, None);

        let patch: ProductPatch = serde_json::from_str("{}").unwrap();
        assert_eq!(patch, ProductPatch::default());
    }

    #[test]
    fn test_patch_null_is_absent() {
        let patch: ProductPatch = serde_json::from_str(r#"{"title":null,"sku":""}"#).unwrap();
        assert_eq!(patch.title, None);
        assert_eq!(patch.sku, Some(String::new()));
    }

    #[test]
    fn test_apply_only_present_fields() {
        let mut product = Product::new(1, "Mug", "M-1", 500);
        let patch = ProductPatch {
            sku: Some("M-2".to_string()),
            ..ProductPatch::default()
        };
        patch.apply_to(&mut product);
        assert_eq!(product, Product::new(1, "Mug", "M-2", 500));
    }

    #[test]
    fn test_product_requires_all_fields() {
        let result: Result<Product, _> = serde_json::from_str(r#"{"id":1,"title":"Hat"}"#);
        assert!(result.is_err());
    }
}
