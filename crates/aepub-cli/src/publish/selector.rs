//! Picks one publishable product from the configured categories.

use aepub_affiliate::AffiliateClient;
use aepub_core::{AppConfig, Category, Product};
use rand::seq::{IndexedRandom, SliceRandom};
use rust_decimal::Decimal;

use super::sent::SentProductsStore;

/// Number of distinct categories tried before giving up.
const MAX_ATTEMPTS: usize = 3;

/// The final pick is random among this many best-ranked candidates.
const TOP_CANDIDATES: usize = 3;

/// Search and filtering knobs taken from [`AppConfig`].
#[derive(Debug, Clone, Copy)]
pub struct SelectionCriteria {
    pub fetch_limit: u32,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub dedup_ttl_secs: u64,
}

impl From<&AppConfig> for SelectionCriteria {
    fn from(config: &AppConfig) -> Self {
        Self {
            fetch_limit: config.fetch_limit,
            min_price: config.min_price,
            max_price: config.max_price,
            dedup_ttl_secs: config.dedup_ttl_secs,
        }
    }
}

pub struct ProductSelector<'a> {
    client: &'a AffiliateClient,
    categories: &'a [Category],
    criteria: SelectionCriteria,
}

impl<'a> ProductSelector<'a> {
    #[must_use]
    pub fn new(
        client: &'a AffiliateClient,
        categories: &'a [Category],
        criteria: SelectionCriteria,
    ) -> Self {
        Self {
            client,
            categories,
            criteria,
        }
    }

    /// Searches up to three randomly ordered categories and returns the
    /// first acceptable product, or `None` when every attempt comes up empty.
    pub async fn select(&self, store: &SentProductsStore) -> Option<(&'a Category, Product)> {
        let mut order: Vec<&'a Category> = self.categories.iter().collect();
        order.shuffle(&mut rand::rng());

        for category in order.into_iter().take(MAX_ATTEMPTS) {
            let found = self
                .client
                .search_products(
                    category,
                    self.criteria.fetch_limit,
                    self.criteria.min_price,
                    self.criteria.max_price,
                )
                .await;
            let fetched = found.len();

            let candidates = filter_candidates(found, &self.criteria, |id| {
                store.was_sent_recently(id, self.criteria.dedup_ttl_secs)
            });
            if candidates.is_empty() {
                tracing::info!(
                    category = %category.name,
                    fetched,
                    "no eligible products in category; trying another"
                );
                continue;
            }

            let ranked = rank_candidates(candidates, &self.criteria);
            let top = &ranked[..ranked.len().min(TOP_CANDIDATES)];
            let picked = top.choose(&mut rand::rng()).cloned();
            if let Some(product) = picked {
                tracing::info!(
                    category = %category.name,
                    product_id = %product.id,
                    eligible = ranked.len(),
                    "selected product"
                );
                return Some((category, product));
            }
        }

        tracing::warn!(
            attempts = self.categories.len().min(MAX_ATTEMPTS),
            "no product selected"
        );
        None
    }
}

/// Drops products outside the configured price bounds and products the
/// `recently_sent` predicate reports as already published.
fn filter_candidates<F>(
    products: Vec<Product>,
    criteria: &SelectionCriteria,
    recently_sent: F,
) -> Vec<Product>
where
    F: Fn(&str) -> bool,
{
    products
        .into_iter()
        .filter(|p| criteria.min_price.is_none_or(|min| p.price >= min))
        .filter(|p| criteria.max_price.is_none_or(|max| p.price <= max))
        .filter(|p| !recently_sent(&p.id))
        .collect()
}

/// Sorts best-first by [`score`]; ties keep gateway order.
fn rank_candidates(mut products: Vec<Product>, criteria: &SelectionCriteria) -> Vec<Product> {
    products.sort_by_key(|p| std::cmp::Reverse(score(p, criteria)));
    products
}

fn score(product: &Product, criteria: &SelectionCriteria) -> u8 {
    let mut score = 0;
    if product.has_promotion_link() {
        score += 2;
    }
    if product.image_url.is_some() {
        score += 1;
    }
    if in_sweet_spot(product.price, criteria) {
        score += 1;
    }
    score
}

/// The middle half of the configured price range. Without both bounds
/// there is no sweet spot.
fn in_sweet_spot(price: Decimal, criteria: &SelectionCriteria) -> bool {
    let (Some(min), Some(max)) = (criteria.min_price, criteria.max_price) else {
        return false;
    };
    let quarter = (max - min) / Decimal::from(4);
    price >= min + quarter && price <= max - quarter
}

#[cfg(test)]
#[path = "selector_test.rs"]
mod tests;
