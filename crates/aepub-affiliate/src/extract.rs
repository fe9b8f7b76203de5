//! Normalization of raw gateway product records into [`Product`].
//!
//! The gateway varies its payload shape between products, partial outages
//! and API versions. Each logical field is read through an ordered alias
//! table (snake_case first), and the `products` container is accepted as a
//! bare list or as `{"product": [...]}`. Items without an id, a title and a
//! resolvable URL are skipped, never defaulted.

use std::str::FromStr;

use aepub_core::Product;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::envelope::decode_embedded_json;

const ID_ALIASES: &[&str] = &["product_id", "productId"];

const TITLE_ALIASES: &[&str] = &["product_title", "productTitle"];

/// Sale price, then original price, then site price, then vendor aliases.
const PRICE_ALIASES: &[&str] = &[
    "target_sale_price",
    "targetSalePrice",
    "sale_price",
    "salePrice",
    "target_original_price",
    "targetOriginalPrice",
    "original_price",
    "originalPrice",
    "app_sale_price",
    "appSalePrice",
    "target_app_sale_price",
    "targetAppSalePrice",
    "price",
];

const IMAGE_ALIASES: &[&str] = &[
    "product_main_image_url",
    "productMainImageUrl",
    "image_url",
    "imageUrl",
    "product_small_image_urls",
    "productSmallImageUrls",
];

const PROMOTION_ALIASES: &[&str] = &[
    "promotion_link",
    "promotionLink",
    "promotion_url",
    "promotionUrl",
];

/// Longest first, so `USD` wins over `US`.
const CURRENCY_PREFIXES: &[&str] = &["USD", "EUR", "GBP", "US", "$", "€", "£", "¥"];

const DETAIL_ALIASES: &[&str] = &[
    "product_detail_url",
    "productDetailUrl",
    "detail_url",
    "detailUrl",
    "product_url",
    "productUrl",
];

/// Extracts every well-formed product from a raw gateway response.
///
/// Accepts the full `*_response` envelope, a bare `result` object, or either
/// of those encoded as a JSON string. Never fails: an unrecognized shape
/// yields an empty list.
#[must_use]
pub fn extract_products(raw: &Value) -> Vec<Product> {
    let decoded;
    let raw = if raw.is_string() {
        decoded = decode_embedded_json(raw.clone());
        &decoded
    } else {
        raw
    };

    let items = products_container(raw).map_or_else(Vec::new, product_items);
    let total = items.len();

    let products: Vec<Product> = items.into_iter().filter_map(normalize_item).collect();

    let skipped = total - products.len();
    if skipped > 0 {
        tracing::debug!(
            total,
            kept = products.len(),
            skipped,
            "dropped product records missing id, title, or url"
        );
    }

    products
}

/// Finds the `products` value, descending through `*_response`,
/// `resp_result` and `result` as far as the payload nests.
fn products_container(raw: &Value) -> Option<&Value> {
    if let Some(products) = raw.get("products") {
        return Some(products);
    }
    if let Some(result) = raw.get("result") {
        return result.get("products");
    }
    if let Some(resp_result) = raw.get("resp_result") {
        return resp_result.get("result")?.get("products");
    }
    raw.as_object()?
        .iter()
        .find(|(k, _)| k.ends_with("_response") && k.as_str() != "error_response")
        .and_then(|(_, envelope)| products_container(envelope))
}

/// Flattens `products` into item records: a list, `{"product": [...]}`, or
/// `{"product": {...}}` for a single hit.
fn product_items(container: &Value) -> Vec<&Value> {
    match container {
        Value::Array(items) => items.iter().collect(),
        Value::Object(obj) => match obj.get("product") {
            Some(Value::Array(items)) => items.iter().collect(),
            Some(single @ Value::Object(_)) => vec![single],
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

fn normalize_item(item: &Value) -> Option<Product> {
    let id = first_text(item, ID_ALIASES)?;
    let title = first_text(item, TITLE_ALIASES)?;
    let promotion_url = first_text(item, PROMOTION_ALIASES);
    let url = promotion_url
        .clone()
        .or_else(|| first_text(item, DETAIL_ALIASES))?;

    Some(Product {
        id,
        title,
        price: first_price(item),
        image_url: first_image(item),
        url,
        promotion_url,
    })
}

/// Returns the first alias holding a non-empty string or a number.
pub(crate) fn first_text(item: &Value, aliases: &[&str]) -> Option<String> {
    aliases.iter().find_map(|alias| match item.get(alias)? {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn first_price(item: &Value) -> Decimal {
    PRICE_ALIASES
        .iter()
        .find_map(|alias| item.get(alias).and_then(parse_price))
        .unwrap_or(Decimal::ZERO)
}

/// Parses a price from a string or number, leniently.
///
/// Strings may carry a currency prefix (`"US $12.50"`) or thousands
/// separators (`"1,299.00"`). Negative values are rejected so the caller
/// falls through to the next alias.
fn parse_price(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::String(s) => strip_currency(s).replace(',', ""),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    let price = Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()?;

    (!price.is_sign_negative()).then_some(price)
}

/// Removes surrounding whitespace and any leading currency markers, so
/// `"US $12.50"` becomes `"12.50"`. Other leading text is left alone and
/// fails to parse.
fn strip_currency(raw: &str) -> &str {
    let mut rest = raw.trim();
    while let Some(stripped) = CURRENCY_PREFIXES
        .iter()
        .find_map(|prefix| rest.strip_prefix(prefix))
    {
        rest = stripped.trim_start();
    }
    rest
}

fn first_image(item: &Value) -> Option<String> {
    IMAGE_ALIASES
        .iter()
        .find_map(|alias| item.get(alias).and_then(image_from))
}

/// Pulls the first image URL out of a pipe-delimited string, an array, or
/// the gateway's `{"string": [...]}` wrapper.
fn image_from(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => s
            .split('|')
            .map(str::trim)
            .find(|part| !part.is_empty())
            .map(str::to_owned),
        Value::Array(items) => items.iter().find_map(image_from),
        Value::Object(obj) => obj.get("string").and_then(image_from),
        _ => None,
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
