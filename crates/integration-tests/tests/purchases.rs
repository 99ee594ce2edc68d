//! Checkout: the purchase form and recording purchases.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use sqlx::PgPool;

use shopkeep_core::UserId;
use shopkeep_integration_tests::{ADMIN, TestApp, USER, assert_redirect, body_text};
use shopkeep_storefront::db::PurchaseRepository;

const ADDRESS: [(&str, &str); 5] = [
    ("street_1", "1 Main St"),
    ("street_2", ""),
    ("city", "Springfield"),
    ("state", "IL"),
    ("zip", "62701"),
];

#[tokio::test]
async fn test_purchase_requires_login() {
    let app = TestApp::without_database();

    assert_redirect(&app.get("/1/purchase", None).await, "/auth/login");
    assert_redirect(
        &app.post_form("/1/purchase", &ADDRESS, None).await,
        "/auth/login",
    );
}

#[sqlx::test(migrator = "shopkeep_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_purchase_page(pool: PgPool) {
    let app = TestApp::seeded(pool).await;
    let cookie = app.login(USER).await;

    let response = app.get("/2/purchase", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_text(response).await;
    assert!(body.contains("Example Product 2"));
    assert!(body.contains("name=\"street_1\""));

    assert_eq!(
        app.get("/4/purchase", Some(&cookie)).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[sqlx::test(migrator = "shopkeep_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_purchase_recorded(pool: PgPool) {
    let app = TestApp::seeded(pool).await;
    let cookie = app.login(USER).await;

    let response = app.post_form("/2/purchase", &ADDRESS, Some(&cookie)).await;
    assert_redirect(&response, "/");

    let purchases = PurchaseRepository::new(&app.pool);
    assert_eq!(purchases.count().await.unwrap(), 2);

    let (product_id, city, street_2): (i32, String, Option<String>) = sqlx::query_as(
        r"
        SELECT product_id, city, street_2
        FROM purchases
        WHERE buyer_id = $1
        ORDER BY id DESC
        LIMIT 1
        ",
    )
    .bind(UserId::new(2))
    .fetch_one(&app.pool)
    .await
    .unwrap();
    assert_eq!(product_id, 2);
    assert_eq!(city, "Springfield");
    assert_eq!(street_2, None);
}

#[sqlx::test(migrator = "shopkeep_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_seller_can_buy_own_product(pool: PgPool) {
    let app = TestApp::seeded(pool).await;
    let cookie = app.login(ADMIN).await;

    assert_redirect(
        &app.post_form("/1/purchase", &ADDRESS, Some(&cookie)).await,
        "/",
    );
}

#[sqlx::test(migrator = "shopkeep_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_purchase_validation(pool: PgPool) {
    let app = TestApp::seeded(pool).await;
    let cookie = app.login(USER).await;

    let cases = [
        ("street_1", "Street is required."),
        ("city", "City is required."),
        ("state", "State is required."),
        ("zip", "Zip is required."),
    ];
    for (blank, message) in cases {
        let form: Vec<(&str, &str)> = ADDRESS
            .iter()
            .map(|&(name, value)| (name, if name == blank { "" } else { value }))
            .collect();
        let response = app.post_form("/1/purchase", &form, Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains(message), "expected {message:?}");
        assert!(body.contains("Example Product 1"));
    }

    let purchases = PurchaseRepository::new(&app.pool);
    assert_eq!(purchases.count().await.unwrap(), 1);
}

#[sqlx::test(migrator = "shopkeep_storefront::db::MIGRATOR")]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_purchase_missing_product(pool: PgPool) {
    let app = TestApp::seeded(pool).await;
    let cookie = app.login(USER).await;

    let response = app.post_form("/4/purchase", &ADDRESS, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
