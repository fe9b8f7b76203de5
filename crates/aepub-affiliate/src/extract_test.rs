use serde_json::json;

use super::*;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn wrap(products: &Value) -> Value {
    json!({
        "aliexpress_affiliate_product_query_response": {
            "resp_result": {
                "resp_code": 200,
                "result": { "current_record_count": 1, "products": products }
            }
        }
    })
}

#[test]
fn mixed_alias_item_extracts_expected_product() {
    let raw = json!({
        "products": [{
            "product_id": "100",
            "productTitle": "Phone X",
            "target_sale_price": "199.99",
            "promotion_link": "https://s.click/abc"
        }]
    });

    let products = extract_products(&raw);

    assert_eq!(
        products,
        vec![Product {
            id: "100".to_string(),
            title: "Phone X".to_string(),
            price: dec("199.99"),
            image_url: None,
            url: "https://s.click/abc".to_string(),
            promotion_url: Some("https://s.click/abc".to_string()),
        }]
    );
}

#[test]
fn bare_list_and_wrapped_product_list_are_equivalent() {
    let item = json!({
        "product_id": 7,
        "product_title": "Watch",
        "sale_price": 25.5,
        "product_detail_url": "https://x.com/item/7"
    });

    let bare = extract_products(&wrap(&json!([item.clone()])));
    let wrapped = extract_products(&wrap(&json!({ "product": [item] })));

    assert_eq!(bare.len(), 1);
    assert_eq!(bare, wrapped);
    assert_eq!(bare[0].id, "7");
    assert_eq!(bare[0].price, dec("25.5"));
    assert_eq!(bare[0].url, "https://x.com/item/7");
    assert_eq!(bare[0].promotion_url, None);
}

#[test]
fn single_wrapped_product_object_is_accepted() {
    let raw = wrap(&json!({
        "product": {
            "product_id": "1",
            "product_title": "Solo",
            "product_detail_url": "https://x.com/item/1"
        }
    }));
    assert_eq!(extract_products(&raw).len(), 1);
}

#[test]
fn camel_case_only_item_is_extracted() {
    let raw = json!({
        "products": [{
            "productId": "200",
            "productTitle": "Earbuds",
            "targetSalePrice": "12.00",
            "productMainImageUrl": "https://img.example/200.jpg",
            "productDetailUrl": "https://x.com/item/200",
            "promotionLink": "https://s.click/200"
        }]
    });

    let products = extract_products(&raw);
    assert_eq!(products.len(), 1);
    let p = &products[0];
    assert_eq!(p.id, "200");
    assert_eq!(p.title, "Earbuds");
    assert_eq!(p.price, dec("12"));
    assert_eq!(p.image_url.as_deref(), Some("https://img.example/200.jpg"));
    assert_eq!(p.url, "https://s.click/200");
}

#[test]
fn snake_case_only_item_is_extracted() {
    let raw = json!({
        "products": [{
            "product_id": "300",
            "product_title": "Power Bank",
            "target_original_price": "30.10",
            "product_main_image_url": "https://img.example/300.jpg",
            "product_detail_url": "https://x.com/item/300"
        }]
    });

    let products = extract_products(&raw);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].price, dec("30.10"));
    assert_eq!(products[0].url, "https://x.com/item/300");
}

#[test]
fn snake_case_wins_when_both_spellings_present() {
    let raw = json!({
        "products": [{
            "product_id": "snake",
            "productId": "camel",
            "product_title": "Snake Title",
            "productTitle": "Camel Title",
            "product_detail_url": "https://x.com/snake",
            "productDetailUrl": "https://x.com/camel"
        }]
    });

    let p = &extract_products(&raw)[0];
    assert_eq!(p.id, "snake");
    assert_eq!(p.title, "Snake Title");
    assert_eq!(p.url, "https://x.com/snake");
}

#[test]
fn promotion_link_outranks_detail_url() {
    let raw = json!({
        "products": [{
            "product_id": "1",
            "product_title": "T",
            "product_detail_url": "https://x.com/item/1",
            "promotion_url": "https://s.click/short"
        }]
    });
    let p = &extract_products(&raw)[0];
    assert_eq!(p.url, "https://s.click/short");
    assert_eq!(p.promotion_url.as_deref(), Some("https://s.click/short"));
}

#[test]
fn items_missing_required_fields_are_dropped() {
    let raw = json!({
        "products": [
            { "product_title": "No id", "product_detail_url": "https://x.com/a" },
            { "product_id": "2", "product_detail_url": "https://x.com/b" },
            { "product_id": "3", "product_title": "No url" },
            { "product_id": "", "product_title": "Blank id", "product_detail_url": "https://x.com/c" },
            { "product_id": "5", "product_title": "   ", "product_detail_url": "https://x.com/d" },
            { "product_id": "6", "product_title": "Kept", "product_detail_url": "https://x.com/e" },
            "not an object",
            null
        ]
    });

    let products = extract_products(&raw);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "6");
    for p in &products {
        assert!(!p.id.is_empty() && !p.title.is_empty() && !p.url.is_empty());
    }
}

#[test]
fn malformed_inputs_yield_empty_lists() {
    for raw in [
        json!({}),
        json!([]),
        json!(null),
        json!("not json at all"),
        json!({ "products": null }),
        json!({ "products": "oops" }),
        json!({ "products": { "product": "oops" } }),
        json!({ "error_response": { "msg": "bad" } }),
        wrap(&json!([])),
    ] {
        assert!(
            extract_products(&raw).is_empty(),
            "expected no products for {raw}"
        );
    }
}

#[test]
fn price_falls_back_through_candidates() {
    let raw = json!({
        "products": [{
            "product_id": "1",
            "product_title": "T",
            "product_detail_url": "https://x.com/1",
            "target_sale_price": "",
            "sale_price": "n/a",
            "original_price": "45.00"
        }]
    });
    assert_eq!(extract_products(&raw)[0].price, dec("45.00"));
}

#[test]
fn negative_price_is_skipped_in_favor_of_next_candidate() {
    let raw = json!({
        "products": [{
            "product_id": "1",
            "product_title": "T",
            "product_detail_url": "https://x.com/1",
            "target_sale_price": "-1",
            "app_sale_price": 9.99
        }]
    });
    assert_eq!(extract_products(&raw)[0].price, dec("9.99"));
}

#[test]
fn unparseable_price_defaults_to_zero() {
    let raw = json!({
        "products": [{
            "product_id": "1",
            "product_title": "T",
            "product_detail_url": "https://x.com/1",
            "target_sale_price": { "amount": 1 }
        }]
    });
    assert_eq!(extract_products(&raw)[0].price, Decimal::ZERO);
}

#[test]
fn price_strings_with_currency_prefix_and_separators_parse() {
    assert_eq!(parse_price(&json!("US $12.50")), Some(dec("12.50")));
    assert_eq!(parse_price(&json!("1,299.00")), Some(dec("1299.00")));
    assert_eq!(parse_price(&json!(" 7 ")), Some(dec("7")));
    assert_eq!(parse_price(&json!(3)), Some(dec("3")));
    assert_eq!(parse_price(&json!("")), None);
    assert_eq!(parse_price(&json!(true)), None);
    assert_eq!(parse_price(&json!("USD 40")), Some(dec("40")));
    assert_eq!(parse_price(&json!("€ 15")), Some(dec("15")));
}

#[test]
fn image_takes_first_entry_of_pipe_delimited_string() {
    let raw = json!({
        "products": [{
            "product_id": "1",
            "product_title": "T",
            "product_detail_url": "https://x.com/1",
            "product_small_image_urls": "https://img/a.jpg|https://img/b.jpg"
        }]
    });
    assert_eq!(
        extract_products(&raw)[0].image_url.as_deref(),
        Some("https://img/a.jpg")
    );
}

#[test]
fn image_accepts_string_wrapper_object() {
    let value = json!({ "string": ["https://img/first.jpg", "https://img/second.jpg"] });
    assert_eq!(image_from(&value).as_deref(), Some("https://img/first.jpg"));
}

#[test]
fn string_encoded_body_is_reparsed() {
    let inner = wrap(&json!([{
        "product_id": "9",
        "product_title": "Encoded",
        "product_detail_url": "https://x.com/9"
    }]));
    let raw = Value::String(inner.to_string());

    let products = extract_products(&raw);
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "9");
}

#[test]
fn bare_result_object_is_accepted() {
    let raw = json!({
        "result": {
            "products": [{
                "product_id": "4",
                "product_title": "T",
                "product_detail_url": "https://x.com/4"
            }]
        }
    });
    assert_eq!(extract_products(&raw).len(), 1);
}

#[test]
fn price_with_leading_letters_is_rejected() {
    assert_eq!(parse_price(&json!("e5")), None);
    assert_eq!(parse_price(&json!("abc12")), None);
    assert_eq!(parse_price(&json!("n/a")), None);
}

#[test]
fn junk_price_falls_through_to_next_alias() {
    let raw = json!({
        "products": [{
            "product_id": "1",
            "product_title": "T",
            "product_detail_url": "https://x.com/item/1.html",
            "target_sale_price": "e5",
            "sale_price": "US $8.00"
        }]
    });
    assert_eq!(extract_products(&raw)[0].price, dec("8.00"));
}
