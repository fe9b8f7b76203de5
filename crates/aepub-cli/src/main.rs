mod publish;
mod telegram;

use std::time::Duration;

use aepub_affiliate::{AffiliateClient, LinkOutcome};
use aepub_core::{AppConfig, Category};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::publish::selector::SelectionCriteria;
use crate::publish::sent::SentProductsStore;
use crate::publish::{publish_once, PublishContext};
use crate::telegram::TelegramClient;

#[derive(Debug, Parser)]
#[command(name = "aepub-cli")]
#[command(about = "Affiliate product publisher")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search one category and print the normalized products
    Search {
        /// Category name from the categories file (case-insensitive)
        #[arg(long)]
        category: String,

        /// Override the configured page size
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Resolve a product URL into an affiliate tracking link
    Link {
        /// Product page URL
        url: String,
    },
    /// Select a product and post it to the Telegram channel
    Publish {
        /// Compose the post and print it without sending or recording it
        #[arg(long)]
        dry_run: bool,

        /// Keep running, publishing once every N seconds
        #[arg(long)]
        interval_secs: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = aepub_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Search { category, limit }) => run_search(&config, &category, limit).await,
        Some(Commands::Link { url }) => run_link(&config, &url).await,
        Some(Commands::Publish {
            dry_run,
            interval_secs,
        }) => run_publish(&config, dry_run, interval_secs).await,
        None => {
            println!("aepub-cli ready; see --help for commands");
            Ok(())
        }
    }
}

fn find_category<'a>(categories: &'a [Category], name: &str) -> anyhow::Result<&'a Category> {
    categories
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
            anyhow::anyhow!("category '{name}' not found; known: {}", known.join(", "))
        })
}

async fn run_search(config: &AppConfig, name: &str, limit: Option<u32>) -> anyhow::Result<()> {
    let categories = aepub_core::load_categories(&config.categories_path)?.categories;
    let category = find_category(&categories, name)?;
    let client = AffiliateClient::from_config(config)?;

    let products = client
        .try_search_products(
            category,
            limit.unwrap_or(config.fetch_limit),
            config.min_price,
            config.max_price,
        )
        .await?;

    println!("{}", serde_json::to_string_pretty(&products)?);
    Ok(())
}

async fn run_link(config: &AppConfig, url: &str) -> anyhow::Result<()> {
    let client = AffiliateClient::from_config(config)?;
    match client.resolve_link(url).await {
        LinkOutcome::Shortened(short) => println!("{short}"),
        LinkOutcome::Degraded { original, reason } => {
            eprintln!("affiliate link unavailable ({reason}); using original URL");
            println!("{original}");
        }
    }
    Ok(())
}

async fn run_publish(
    config: &AppConfig,
    dry_run: bool,
    interval_secs: Option<u64>,
) -> anyhow::Result<()> {
    let categories = aepub_core::load_categories(&config.categories_path)?.categories;
    let client = AffiliateClient::from_config(config)?;

    let telegram = if dry_run {
        None
    } else {
        let token = config
            .telegram_bot_token
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("TELEGRAM_BOT_TOKEN is required to publish"))?;
        let channel = config
            .telegram_channel_id
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("TELEGRAM_CHANNEL_ID is required to publish"))?;
        Some(TelegramClient::new(
            token,
            channel,
            config.request_timeout_secs,
        )?)
    };

    let ctx = PublishContext {
        client: &client,
        categories: &categories,
        criteria: SelectionCriteria::from(config),
        post_prefix: &config.post_prefix,
        telegram: telegram.as_ref(),
    };
    let mut store = SentProductsStore::open(&config.sent_products_path)?;
    if store.is_empty() {
        tracing::info!(path = %store.path().display(), "starting with an empty sent-products store");
    } else {
        tracing::info!(
            path = %store.path().display(),
            entries = store.len(),
            "loaded sent-products store"
        );
    }

    let Some(interval_secs) = interval_secs else {
        return publish_and_report(&ctx, &mut store).await;
    };
    if interval_secs == 0 {
        anyhow::bail!("--interval-secs must be greater than zero");
    }

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                // A failed cycle is logged; the next tick tries again.
                if let Err(err) = publish_and_report(&ctx, &mut store).await {
                    tracing::error!(error = %format!("{err:#}"), "publish cycle failed");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested; stopping publish loop");
                return Ok(());
            }
        }
    }
}

async fn publish_and_report(
    ctx: &PublishContext<'_>,
    store: &mut SentProductsStore,
) -> anyhow::Result<()> {
    match publish_once(ctx, store).await? {
        Some(report) if report.delivery.is_none() => {
            println!("{}", report.message);
            println!(
                "dry run: would publish product {} from {}",
                report.product_id, report.category
            );
        }
        Some(report) => println!(
            "published product {} from {} ({})",
            report.product_id, report.category, report.link
        ),
        None => println!("no eligible product found"),
    }
    Ok(())
}
