//! Products plugin for Tessera.
//!
//! Exports a site's product catalog from the `product` record collection.
//! Sites must configure a display currency before the catalog is exported:
//!
//! ```json
//! { "currency": "EUR", "include_out_of_stock": false }
//! ```
//!
//! Prices are stored as integer minor units and rendered with two decimals.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tessera_sdk::prelude::*;
use uuid::Uuid;

/// Registry and document key.
pub const SYSTEM_NAME: &str = "products";

/// Record collection the plugin reads.
pub const COLLECTION: &str = "product";

/// Site configuration for the products plugin.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductsConfig {
    /// ISO 4217 currency code, e.g. "EUR".
    pub currency: String,
    #[serde(default)]
    pub include_out_of_stock: bool,
}

impl ValidateConfig for ProductsConfig {
    fn check(&self) -> Result<(), ValidationError> {
        let valid = self.currency.len() == 3 && self.currency.bytes().all(|b| b.is_ascii_uppercase());
        if !valid {
            return Err(ValidationError::rejected(format!(
                "currency '{}' must be a three-letter uppercase ISO code",
                self.currency
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct StoredProduct {
    name: String,
    sku: String,
    /// Price in minor units (cents).
    price: i64,
    #[serde(default)]
    stock: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductEntry {
    pub id: Uuid,
    pub name: String,
    pub sku: String,
    pub price: String,
    pub in_stock: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductsContent {
    pub currency: String,
    pub products: Vec<ProductEntry>,
}

/// Content plugin exporting the product catalog.
pub struct ProductsPlugin {
    descriptor: PluginDescriptor,
    validator: RequireJsonConfig<ProductsConfig>,
    records: Arc<dyn RecordSource>,
}

impl ProductsPlugin {
    pub fn new(records: Arc<dyn RecordSource>) -> Self {
        Self {
            descriptor: PluginDescriptor::new(SYSTEM_NAME, "Products")
                .description("Product catalog with prices and availability")
                .version(env!("CARGO_PKG_VERSION")),
            validator: RequireJsonConfig::new(),
            records,
        }
    }
}

/// Render minor units as a decimal string ("1999" -> "19.99").
fn format_minor_units(amount: i64) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[async_trait]
impl ContentProvider for ProductsPlugin {
    type Content = ProductsContent;

    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    fn validator(&self) -> &dyn ConfigValidator {
        &self.validator
    }

    async fn get_content(&self, ctx: &SiteContext) -> Result<ProductsContent, ContentError> {
        let raw = ctx
            .configuration
            .as_deref()
            .ok_or_else(|| ContentError::failed("products plugin requires configuration"))?;
        let config: ProductsConfig = serde_json::from_str(raw)?;
        ctx.ensure_active()?;

        let records = self.records.list(ctx.site_id, COLLECTION).await?;
        ctx.ensure_active()?;

        let mut products = Vec::new();
        for record in records.iter().filter(|r| r.published) {
            let stored: StoredProduct = record.decode().map_err(|e| {
                RecordError::Corrupt(format!("product {}: {e}", record.id))
            })?;
            let in_stock = stored.stock > 0;
            if !in_stock && !config.include_out_of_stock {
                continue;
            }
            products.push(ProductEntry {
                id: record.id,
                name: stored.name,
                sku: stored.sku,
                price: format_minor_units(stored.price),
                in_stock,
            });
        }

        if products.is_empty() {
            return Err(ContentError::unavailable("site has no products to list"));
        }

        Ok(ProductsContent {
            currency: config.currency,
            products,
        })
    }
}
