use aepub_core::Credentials;
use rust_decimal::Decimal;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn categories() -> Vec<Category> {
    vec![Category {
        name: "Earbuds".to_string(),
        keywords: "wireless earbuds".to_string(),
        category_id: None,
    }]
}

fn criteria() -> SelectionCriteria {
    SelectionCriteria {
        fetch_limit: 10,
        min_price: None,
        max_price: None,
        dedup_ttl_secs: 3600,
    }
}

fn affiliate_client(server: &MockServer) -> AffiliateClient {
    let credentials = Credentials::new("k", "s", "trk", "t").unwrap();
    AffiliateClient::with_base_url(&credentials, 5, &format!("{}/sync", server.uri())).unwrap()
}

async fn mount_single_product(server: &MockServer, item: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/sync"))
        .and(query_param("method", "aliexpress.affiliate.product.query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aliexpress_affiliate_product_query_response": {
                "resp_result": { "resp_code": 200, "result": { "products": [item] } }
            }
        })))
        .mount(server)
        .await;
}

#[test]
fn compose_message_formats_price_with_two_decimals() {
    let product = Product {
        id: "1".to_string(),
        title: "Earbuds Pro".to_string(),
        price: Decimal::new(1999, 1),
        image_url: None,
        url: "https://x.com/item/1.html".to_string(),
        promotion_url: None,
    };

    let message = compose_message("Deal", &product, "https://s.click/1");
    assert_eq!(
        message,
        "Deal: Earbuds Pro\nPrice: 199.90 USD\n\n🛒 https://s.click/1"
    );
}

#[tokio::test]
async fn dry_run_composes_post_without_touching_store() {
    let server = MockServer::start().await;
    mount_single_product(
        &server,
        json!({
            "product_id": "7",
            "product_title": "Earbuds",
            "target_sale_price": "12.5",
            "promotion_link": "https://s.click/7"
        }),
    )
    .await;

    let client = affiliate_client(&server);
    let categories = categories();
    let ctx = PublishContext {
        client: &client,
        categories: &categories,
        criteria: criteria(),
        post_prefix: "Deal",
        telegram: None,
    };
    let dir = tempfile::tempdir().unwrap();
    let mut store = SentProductsStore::open(dir.path().join("sent.json")).unwrap();

    let report = publish_once(&ctx, &mut store)
        .await
        .unwrap()
        .expect("a product is published");

    assert_eq!(report.product_id, "7");
    assert_eq!(report.link, "https://s.click/7");
    assert!(report.delivery.is_none());
    assert!(store.is_empty());
}

#[tokio::test]
async fn publish_posts_photo_and_records_product() {
    let server = MockServer::start().await;
    mount_single_product(
        &server,
        json!({
            "product_id": "8",
            "product_title": "Power Bank",
            "target_sale_price": "20",
            "product_main_image_url": "https://img.example/8.jpg",
            "product_detail_url": "https://x.com/item/8.html"
        }),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/sync"))
        .and(query_param("method", "aliexpress.affiliate.link.generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "aliexpress_affiliate_link_generate_response": {
                "resp_result": {
                    "resp_code": 200,
                    "result": {
                        "promotion_links": {
                            "promotion_link": [{ "promotion_link": "https://s.click/8" }]
                        }
                    }
                }
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot1:tok/sendPhoto"))
        .and(body_partial_json(json!({ "photo": "https://img.example/8.jpg" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = affiliate_client(&server);
    let telegram = TelegramClient::with_api_base("1:tok", "@deals", 5, &server.uri()).unwrap();
    let categories = categories();
    let ctx = PublishContext {
        client: &client,
        categories: &categories,
        criteria: criteria(),
        post_prefix: "Deal",
        telegram: Some(&telegram),
    };
    let dir = tempfile::tempdir().unwrap();
    let mut store = SentProductsStore::open(dir.path().join("sent.json")).unwrap();

    let report = publish_once(&ctx, &mut store).await.unwrap().unwrap();

    assert_eq!(report.link, "https://s.click/8");
    assert_eq!(report.delivery, Some(Delivery::Photo));
    assert!(report.message.ends_with("🛒 https://s.click/8"));
    assert!(store.was_sent_recently("8", 3600));
}

#[tokio::test]
async fn publish_returns_none_when_nothing_is_eligible() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = affiliate_client(&server);
    let categories = categories();
    let ctx = PublishContext {
        client: &client,
        categories: &categories,
        criteria: criteria(),
        post_prefix: "Deal",
        telegram: None,
    };
    let dir = tempfile::tempdir().unwrap();
    let mut store = SentProductsStore::open(dir.path().join("sent.json")).unwrap();

    assert!(publish_once(&ctx, &mut store).await.unwrap().is_none());
}
