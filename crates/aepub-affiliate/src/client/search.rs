use aepub_core::{Category, Product};
use rust_decimal::Decimal;

use super::AffiliateClient;
use crate::envelope::{decode_embedded_json, locate_result};
use crate::error::AffiliateError;
use crate::extract::extract_products;
use crate::sign::ParamValue;

pub const PRODUCT_QUERY_METHOD: &str = "aliexpress.affiliate.product.query";

impl AffiliateClient {
    /// Searches the gateway for products in `category`.
    ///
    /// Never fails: transport, gateway and parse failures are logged and
    /// yield an empty list, so a caller's retry loop keeps running.
    pub async fn search_products(
        &self,
        category: &Category,
        limit: u32,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
    ) -> Vec<Product> {
        match self
            .try_search_products(category, limit, min_price, max_price)
            .await
        {
            Ok(products) => products,
            Err(err) => {
                tracing::warn!(
                    category = %category.name,
                    error = %err,
                    "product search failed; returning no products"
                );
                Vec::new()
            }
        }
    }

    /// Like [`AffiliateClient::search_products`] but surfaces failures.
    ///
    /// Price bounds are passed to the gateway as-is. A response with zero
    /// items or an unrecognized `products` shape is `Ok(vec![])`, not an
    /// error.
    ///
    /// # Errors
    ///
    /// - [`AffiliateError::Http`], [`AffiliateError::UnexpectedStatus`] or
    ///   [`AffiliateError::Deserialize`] from the transport.
    /// - [`AffiliateError::Gateway`] if the body carries an error object.
    pub async fn try_search_products(
        &self,
        category: &Category,
        limit: u32,
        min_price: Option<Decimal>,
        max_price: Option<Decimal>,
    ) -> Result<Vec<Product>, AffiliateError> {
        if limit == 0 {
            tracing::debug!(category = %category.name, "search limit is zero; skipping call");
            return Ok(Vec::new());
        }

        let params = [
            ("keywords", Some(ParamValue::from(category.keywords.as_str()))),
            ("page_size", Some(ParamValue::from(limit))),
            ("tracking_id", Some(ParamValue::from(self.tracking_id()))),
            (
                "category_ids",
                category.category_id.as_deref().map(ParamValue::from),
            ),
            ("min_sale_price", min_price.map(ParamValue::from)),
            ("max_sale_price", max_price.map(ParamValue::from)),
        ];

        let raw = decode_embedded_json(self.request(PRODUCT_QUERY_METHOD, &params).await?);

        if let Err(err @ AffiliateError::Gateway(_)) = locate_result(&raw, PRODUCT_QUERY_METHOD) {
            return Err(err);
        }

        let products = extract_products(&raw);
        tracing::info!(
            category = %category.name,
            count = products.len(),
            "product search completed"
        );
        Ok(products)
    }
}
