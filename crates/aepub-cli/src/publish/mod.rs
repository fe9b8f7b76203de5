//! One publish cycle: pick a product, resolve its link, post it, remember it.
//!
//! Called from `main` once per `publish` invocation or once per tick in
//! loop mode. Link resolution never fails the cycle; delivery and store
//! failures do.

pub mod selector;
pub mod sent;

use aepub_affiliate::AffiliateClient;
use aepub_core::{Category, Product};

use crate::telegram::{Delivery, TelegramClient};
use selector::{ProductSelector, SelectionCriteria};
use sent::SentProductsStore;

/// Everything a cycle needs besides the mutable store.
pub struct PublishContext<'a> {
    pub client: &'a AffiliateClient,
    pub categories: &'a [Category],
    pub criteria: SelectionCriteria,
    pub post_prefix: &'a str,
    /// `None` means dry run: the post is composed and logged, not sent.
    pub telegram: Option<&'a TelegramClient>,
}

/// What a cycle published.
#[derive(Debug)]
pub struct PublishReport {
    pub category: String,
    pub product_id: String,
    pub link: String,
    pub message: String,
    /// `None` for a dry run.
    pub delivery: Option<Delivery>,
}

/// Runs one cycle. Returns `Ok(None)` when no eligible product was found.
///
/// # Errors
///
/// Returns an error if the Telegram post fails or the sent-products file
/// cannot be written. A dry run never records the product.
pub async fn publish_once(
    ctx: &PublishContext<'_>,
    store: &mut SentProductsStore,
) -> anyhow::Result<Option<PublishReport>> {
    let selector = ProductSelector::new(ctx.client, ctx.categories, ctx.criteria);
    let Some((category, product)) = selector.select(store).await else {
        return Ok(None);
    };

    let link = ctx
        .client
        .ensure_short_link(&product)
        .await
        .unwrap_or_else(|| product.url.clone());
    let message = compose_message(ctx.post_prefix, &product, &link);

    let Some(telegram) = ctx.telegram else {
        tracing::info!(product_id = %product.id, %link, "dry run; not posting");
        return Ok(Some(PublishReport {
            category: category.name.clone(),
            product_id: product.id,
            link,
            message,
            delivery: None,
        }));
    };

    let delivery = match product.image_url.as_deref() {
        Some(image_url) => telegram.send_photo(image_url, &message).await?,
        None => {
            telegram.send_text(&message).await?;
            Delivery::Text
        }
    };

    store.mark_sent(&product.id)?;
    store.cleanup_older_than(ctx.criteria.dedup_ttl_secs)?;

    tracing::info!(
        category = %category.name,
        product_id = %product.id,
        ?delivery,
        "published product"
    );

    Ok(Some(PublishReport {
        category: category.name.clone(),
        product_id: product.id,
        link,
        message,
        delivery: Some(delivery),
    }))
}

/// Plain-text post body: headline, price, link.
fn compose_message(prefix: &str, product: &Product, link: &str) -> String {
    format!(
        "{prefix}: {title}\nPrice: {price:.2} USD\n\n🛒 {link}",
        title = product.title,
        price = product.price,
    )
}

#[cfg(test)]
#[path = "publish_test.rs"]
mod tests;
