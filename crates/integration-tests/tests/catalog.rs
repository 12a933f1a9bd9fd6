//! Integration tests for the product catalog.

#![allow(clippy::unwrap_used)]

use serde_json::json;
use shopfront_client::http::MultipartForm;
use shopfront_core::catalog::{NewProduct, VariantMatch};
use shopfront_core::{CategoryId, ProductId};
use shopfront_integration_tests::TestContext;
use wiremock::matchers::{body_json, header, header_regex, method, path};
use wiremock::{Mock, ResponseTemplate};

fn shirt_skus() -> serde_json::Value {
    json!([
        { "skuCode": "SHIRT-S-RED", "price": 19.99 },
        { "skuCode": "SHIRT-M-RED", "price": 19.99 },
        { "skuCode": "SHIRT-S-BLUE", "price": 21.5 },
        { "skuCode": "LEGACY", "price": 5 }
    ])
}

#[tokio::test]
async fn test_product_view_derives_facets() {
    let ctx = TestContext::new("/").await;
    Mock::given(method("GET"))
        .and(path("/api/product/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 7,
            "skus": shirt_skus()
        })))
        .mount(&ctx.server)
        .await;

    let view = ctx
        .state
        .products()
        .get_product_view(ProductId::new(7))
        .await
        .unwrap();

    assert_eq!(view.facets.title.as_deref(), Some("SHIRT"));
    assert_eq!(view.facets.sizes, ["S", "M"]);
    assert_eq!(view.facets.colors, ["RED", "BLUE"]);
    assert_eq!(view.detail.skus.len(), 4);
    assert_eq!(view.selection.size(), Some("S"));
    assert_eq!(view.selection.color(), Some("RED"));

    let mut selection = view.selection.clone();
    selection.choose_size("M");
    selection.choose_color("BLUE");
    assert_eq!(selection.resolve(&view.detail.skus), VariantMatch::NoMatch);

    selection.choose_size("S");
    let sku = selection.resolve(&view.detail.skus).sku().unwrap();
    assert_eq!(sku.sku_code, "SHIRT-S-BLUE");
}

#[tokio::test]
async fn test_product_view_accepts_bare_sku_list() {
    let ctx = TestContext::new("/").await;
    Mock::given(method("GET"))
        .and(path("/api/product/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(shirt_skus()))
        .mount(&ctx.server)
        .await;

    let view = ctx
        .state
        .products()
        .get_product_view(ProductId::new(7))
        .await
        .unwrap();

    assert_eq!(view.facets.sizes, ["S", "M"]);
}

#[tokio::test]
async fn test_create_product_sends_json() {
    let ctx = TestContext::new("/admin/products").await;
    Mock::given(method("POST"))
        .and(path("/api/admin/product"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "name": "Shirt",
            "categoryId": 3,
            "optionGroupIds": []
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 11, "name": "Shirt" })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let product = NewProduct {
        name: "Shirt".to_owned(),
        description: None,
        category_id: CategoryId::new(3),
        option_group_ids: Vec::new(),
    };
    let created = ctx.state.admin_products().create_product(product).await.unwrap();

    assert_eq!(created.id, ProductId::new(11));
}

#[tokio::test]
async fn test_create_product_with_images_sends_multipart() {
    let ctx = TestContext::new("/admin/products").await;
    Mock::given(method("POST"))
        .and(path("/api/admin/product"))
        .and(header_regex("content-type", "^multipart/form-data; boundary="))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": 12, "name": "Mug" })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let form = MultipartForm::new()
        .text("name", "Mug")
        .text("categoryId", "4")
        .file("images", "mug.png", "image/png", vec![0x89, b'P', b'N', b'G']);
    let created = ctx.state.admin_products().create_product(form).await.unwrap();

    assert_eq!(created.name, "Mug");
}
