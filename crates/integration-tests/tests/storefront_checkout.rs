//! End-to-end tests for the cart and checkout flow.

use reqwest::{Method, StatusCode};
use sabad_integration_tests::{FIRST_ORDER_ID, PAYMENT_URL, TestContext, TestOptions, valid_form};
use serde_json::json;

#[tokio::test]
async fn test_cart_totals_across_products_and_variations() {
    let ctx = TestContext::start(TestOptions::default()).await;

    let (status, _) = ctx
        .post("/api/cart/items", json!({"product_id": 10, "quantity": 2}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, cart) = ctx
        .post(
            "/api/cart/items",
            json!({"product_id": 20, "attributes": {"size": "بزرگ"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["total"], "250000");
    assert_eq!(cart["item_count"], 3);
    assert_eq!(cart["items"][1]["variation_id"], 201);
    assert_eq!(cart["items"][1]["unit_price"], "50000");

    // Same pair again merges into the existing line
    let (_, cart) = ctx
        .post(
            "/api/cart/items",
            json!({"product_id": 20, "variation_id": 201, "quantity": 1}),
        )
        .await;
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(2));
    assert_eq!(cart["items"][1]["quantity"], 2);
    assert_eq!(cart["total"], "300000");
}

#[tokio::test]
async fn test_unmatched_attributes_add_the_product_itself() {
    let ctx = TestContext::start(TestOptions::default()).await;

    let (status, cart) = ctx
        .post(
            "/api/cart/items",
            json!({"product_id": 20, "attributes": {"size": "کوچک"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 1);
    assert!(cart["items"][0]["variation_id"].is_null());
    assert_eq!(cart["items"][0]["selected_attributes"]["size"], "کوچک");
    assert_eq!(cart["items"][0]["unit_price"], "50000");
}

#[tokio::test]
async fn test_unknown_variation_id_is_rejected() {
    let ctx = TestContext::start(TestOptions::default()).await;

    let (status, _) = ctx
        .post("/api/cart/items", json!({"product_id": 20, "variation_id": 999}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["item_count"], 0);
}

#[tokio::test]
async fn test_add_to_cart_survives_variation_failure() {
    let ctx = TestContext::start(TestOptions {
        fail_variations: true,
        ..TestOptions::default()
    })
    .await;

    let (status, cart) = ctx
        .post(
            "/api/cart/items",
            json!({"product_id": 20, "attributes": {"Size": "بزرگ"}}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 1);
    assert!(cart["items"][0]["variation_id"].is_null());
    assert_eq!(cart["items"][0]["unit_price"], "50000");
    assert_eq!(cart["total"], "50000");

    // An explicit id cannot be checked either; the product is added as is
    let (status, cart) = ctx
        .post("/api/cart/items", json!({"product_id": 20, "variation_id": 201}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().map(Vec::len), Some(1));
    assert_eq!(cart["items"][0]["quantity"], 2);
}

#[tokio::test]
async fn test_out_of_stock_product_cannot_be_added() {
    let ctx = TestContext::start(TestOptions {
        out_of_stock: vec![10],
        ..TestOptions::default()
    })
    .await;

    let (status, body) = ctx.post("/api/cart/items", json!({"product_id": 10})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Product 10 is out of stock");

    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["item_count"], 0);

    let (status, _) = ctx.post("/api/cart/items", json!({"product_id": 20})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cart_update_clamps_and_remove() {
    let ctx = TestContext::start(TestOptions::default()).await;
    ctx.post("/api/cart/items", json!({"product_id": 10, "quantity": 0}))
        .await;

    let (_, cart) = ctx.get("/api/cart").await;
    assert_eq!(cart["item_count"], 1);

    let (_, cart) = ctx
        .request(
            Method::PATCH,
            "/api/cart/items",
            Some(json!({"product_id": 10, "quantity": 0})),
        )
        .await;
    assert_eq!(cart["items"][0]["quantity"], 1);

    let (_, cart) = ctx
        .request(
            Method::PATCH,
            "/api/cart/items",
            Some(json!({"product_id": 10, "quantity": 5})),
        )
        .await;
    assert_eq!(cart["total"], "500000");

    let (status, cart) = ctx
        .request(
            Method::DELETE,
            "/api/cart/items",
            Some(json!({"product_id": 10})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 0);
    assert!(cart["total"].is_string());
}

#[tokio::test]
async fn test_cart_panel_toggle() {
    let ctx = TestContext::start(TestOptions::default()).await;

    let (_, toggled) = ctx.post("/api/cart/toggle", json!({})).await;
    assert_eq!(toggled["open"], true);
    let (_, view) = ctx.get("/api/view").await;
    assert_eq!(view["cart_open"], true);

    let (_, toggled) = ctx.post("/api/cart/toggle", json!({})).await;
    assert_eq!(toggled["open"], false);
}

#[tokio::test]
async fn test_carts_are_per_shopper() {
    let ctx = TestContext::start(TestOptions::default()).await;
    ctx.post("/api/cart/items", json!({"product_id": 10})).await;

    let stranger = reqwest::get(ctx.url("/api/cart"))
        .await
        .expect("Request failed")
        .json::<serde_json::Value>()
        .await
        .expect("Body is not JSON");
    assert_eq!(stranger["item_count"], 0);
}

#[tokio::test]
async fn test_checkout_requires_items() {
    let ctx = TestContext::start(TestOptions::default()).await;

    let (status, body) = ctx.post("/api/checkout", json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Cannot check out with an empty cart");
}

#[tokio::test]
async fn test_checkout_summary() {
    let ctx = TestContext::start(TestOptions::default()).await;
    ctx.checkout_with_coffee().await;

    let (status, summary) = ctx.get("/api/checkout").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["view"], "checkout");
    let gateways: Vec<_> = summary["gateways"]
        .as_array()
        .expect("gateways")
        .iter()
        .filter_map(|g| g["id"].as_str())
        .collect();
    assert_eq!(gateways, vec!["cod", "zarinpal"]);
    assert_eq!(summary["payment_method"], "cod");
    assert_eq!(summary["currency"], "IRT");
    assert_eq!(summary["cart"]["total"], "100000");
}

#[tokio::test]
async fn test_cash_on_delivery_order_completes() {
    let ctx = TestContext::start(TestOptions::default()).await;
    ctx.checkout_with_coffee().await;

    let (status, result) = ctx.post("/api/checkout/submit", valid_form("cod")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["outcome"], "completed");
    assert_eq!(result["order"]["id"], FIRST_ORDER_ID);
    assert_eq!(result["order"]["synthetic"], false);

    let orders = ctx.woocommerce.orders();
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order["payment_method"], "cod");
    assert_eq!(order["payment_method_title"], "پرداخت در محل");
    assert_eq!(order["set_paid"], false);
    assert_eq!(order["currency"], "IRT");
    assert_eq!(order["billing"]["country"], "IR");
    assert_eq!(order["billing"]["city"], "N/A");
    assert_eq!(order["billing"], order["shipping"]);
    assert_eq!(order["line_items"][0]["product_id"], 10);
    assert_eq!(order["line_items"][0]["total"], "100000");

    let (_, view) = ctx.get("/api/view").await;
    assert_eq!(view["view"], "thankyou");
    assert_eq!(view["item_count"], 0);
    assert_eq!(view["last_order"]["number"], FIRST_ORDER_ID.to_string());

    let (_, view) = ctx.post("/api/shop", json!({})).await;
    assert_eq!(view["view"], "shop");
    assert!(view["last_order"].is_null());
}

#[tokio::test]
async fn test_failed_submission_completes_with_synthetic_order() {
    let ctx = TestContext::start(TestOptions {
        fail_orders: true,
        ..TestOptions::default()
    })
    .await;
    ctx.checkout_with_coffee().await;

    let (status, result) = ctx.post("/api/checkout/submit", valid_form("cod")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["outcome"], "completed");
    assert_eq!(result["order"]["synthetic"], true);
    assert_eq!(result["order"]["status"], "processing");
    assert_eq!(result["order"]["total"], "100000");
    // Epoch milliseconds
    assert!(result["order"]["id"].as_i64().expect("id") > 1_600_000_000_000);

    let (_, view) = ctx.get("/api/view").await;
    assert_eq!(view["view"], "thankyou");
    assert_eq!(view["item_count"], 0);
}

#[tokio::test]
async fn test_failed_submission_without_masking_keeps_checkout() {
    let ctx = TestContext::start(TestOptions {
        fail_orders: true,
        mask_failures: false,
        ..TestOptions::default()
    })
    .await;
    ctx.checkout_with_coffee().await;

    let (status, body) = ctx.post("/api/checkout/submit", valid_form("cod")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "External service error");

    let (_, view) = ctx.get("/api/view").await;
    assert_eq!(view["view"], "checkout");
    assert_eq!(view["item_count"], 1);
}

#[tokio::test]
async fn test_invalid_form_lists_missing_fields() {
    let ctx = TestContext::start(TestOptions::default()).await;
    ctx.checkout_with_coffee().await;

    let (status, body) = ctx
        .post("/api/checkout/submit", json!({"first_name": "   "}))
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["fields"]["first_name"].is_string());
    assert!(body["fields"]["last_name"].is_string());
    assert!(body["fields"]["phone"].is_string());
    assert!(ctx.woocommerce.orders().is_empty());
}

#[tokio::test]
async fn test_online_gateway_redirects_to_payment() {
    let ctx = TestContext::start(TestOptions::default()).await;
    ctx.checkout_with_coffee().await;

    let (status, result) = ctx
        .post("/api/checkout/submit", valid_form("zarinpal"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(result["outcome"], "redirect");
    assert_eq!(result["payment_url"], PAYMENT_URL);
    assert_eq!(result["order_id"], FIRST_ORDER_ID);

    let (_, view) = ctx.get("/api/view").await;
    assert_eq!(view["view"], "checkout");
    assert_eq!(view["payment_url"], PAYMENT_URL);
}

#[tokio::test]
async fn test_submit_outside_checkout_is_rejected() {
    let ctx = TestContext::start(TestOptions::default()).await;
    ctx.post("/api/cart/items", json!({"product_id": 10})).await;

    let (status, _) = ctx.post("/api/checkout/submit", valid_form("cod")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(ctx.woocommerce.orders().is_empty());
}
