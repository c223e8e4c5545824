//! Admin writes against a live mock API, seen from the storefront.

use reqwest::StatusCode;
use reqwest::header::LOCATION;
use serde_json::Value;

use shopfront_integration_tests::TestContext;

#[tokio::test]
async fn test_guard_redirects_anonymous_browser() {
    let ctx = TestContext::start().await;

    let response = TestContext::browser()
        .get(ctx.admin("/products"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/auth/login");
}

#[tokio::test]
async fn test_dashboard_counts() {
    let ctx = TestContext::start().await;
    let admin = ctx.admin_browser("a@example.com").await;

    let body = admin.get(ctx.admin("/")).send().await.unwrap().text().await.unwrap();
    assert!(body.contains("<span class=\"stat-value\">12</span>"));
    assert!(body.contains("<span class=\"stat-value\">2</span>"));
}

#[tokio::test]
async fn test_created_product_reaches_storefront() {
    let ctx = TestContext::start().await;
    let admin = ctx.admin_browser("a@example.com").await;

    let response = admin
        .post(ctx.admin("/products"))
        .form(&[
            ("name", "Cốc sứ"),
            ("price", "95000"),
            ("image", ""),
            ("description", "Cốc uống cà phê"),
        ])
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()[LOCATION], "/products");
    assert_eq!(ctx.api.counts().await.0, 13);

    let body = reqwest::get(ctx.storefront("/products/13"))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Cốc sứ"));
    assert!(body.contains("95.000₫"));

    let flash = admin
        .get(ctx.admin("/products"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(flash.contains("Created Cốc sứ"));
}

#[tokio::test]
async fn test_update_and_delete_product() {
    let ctx = TestContext::start().await;
    let admin = ctx.admin_browser("a@example.com").await;

    admin
        .post(ctx.admin("/products/4"))
        .form(&[("name", "Mũ bucket"), ("price", ""), ("image", ""), ("description", "")])
        .send()
        .await
        .unwrap();
    let product: Value = reqwest::get(ctx.api("/products/4"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(product["name"], "Mũ bucket");
    assert!(product.get("price").is_none());

    admin
        .post(ctx.admin("/products/4/delete"))
        .send()
        .await
        .unwrap();
    let response = reqwest::get(ctx.api("/products/4")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_products_table_fragment_filters() {
    let ctx = TestContext::start().await;
    let admin = ctx.admin_browser("a@example.com").await;

    let body = admin
        .get(ctx.admin("/products/table?min_price=1000000&per_page=9"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Tai nghe Bluetooth"));
    assert!(body.contains("Đồng hồ dây da"));
    assert!(!body.contains("Ví da nam"));
    assert!(body.contains("2 products"));
}

#[tokio::test]
async fn test_invalid_user_is_rerendered() {
    let ctx = TestContext::start().await;
    let admin = ctx.admin_browser("a@example.com").await;

    let response = admin
        .post(ctx.admin("/users"))
        .form(&[("name", "Lan"), ("email", "not-an-email")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(ctx.api.counts().await.1, 2);
}

#[tokio::test]
async fn test_create_user_then_search() {
    let ctx = TestContext::start().await;
    let admin = ctx.admin_browser("a@example.com").await;

    admin
        .post(ctx.admin("/users"))
        .form(&[("name", "Trần Lan"), ("email", "lan@example.com")])
        .send()
        .await
        .unwrap();

    let body = admin
        .get(ctx.admin("/users?q=lan"))
        .header("hx-request", "true")
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("Trần Lan"));
    assert!(!body.contains("Người dùng A"));
}
