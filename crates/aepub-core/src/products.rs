use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product extracted from an affiliate gateway response.
///
/// Records are only built when `id`, `title` and `url` are all present and
/// non-empty; anything less is dropped during extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Gateway product ID, stored as a string to avoid precision loss.
    pub id: String,
    pub title: String,
    /// Non-negative price; `0` when no price field could be parsed.
    pub price: Decimal,
    pub image_url: Option<String>,
    /// Best purchasable URL: the promotion link when the gateway returned
    /// one, otherwise the detail-page URL.
    pub url: String,
    /// Tracking-tagged short link returned alongside the search result.
    pub promotion_url: Option<String>,
}

impl Product {
    /// Returns `true` if the gateway already returned a promotion link for
    /// this product.
    #[must_use]
    pub fn has_promotion_link(&self) -> bool {
        self.promotion_url.as_deref().is_some_and(|u| !u.is_empty())
    }
}

/// A product category to search, e.g. `"Phones"` with keywords
/// `"smartphone mobile phone"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub keywords: String,
    /// Gateway category identifier, when known.
    #[serde(default)]
    pub category_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(promotion_url: Option<&str>) -> Product {
        Product {
            id: "1".to_string(),
            title: "Phone".to_string(),
            price: Decimal::ZERO,
            image_url: None,
            url: "https://example.com/item/1".to_string(),
            promotion_url: promotion_url.map(str::to_string),
        }
    }

    #[test]
    fn has_promotion_link_requires_non_empty_value() {
        assert!(product(Some("https://s.click/abc")).has_promotion_link());
        assert!(!product(Some("")).has_promotion_link());
        assert!(!product(None).has_promotion_link());
    }

    #[test]
    fn category_id_defaults_to_none() {
        let cat: Category =
            serde_json::from_str(r#"{"name":"Phones","keywords":"smartphone"}"#).unwrap();
        assert_eq!(cat.category_id, None);
    }
}
