//! End-to-end test harness for the Sabad storefront.
//!
//! [`TestContext::start`] runs a fake WooCommerce REST API and a storefront
//! wired to it, both on `127.0.0.1:0`, and hands back a cookie-enabled
//! client so each context behaves like one shopper.
//!
//! # Fake catalog
//!
//! - product 10, "قهوه", simple, price `100000`, category 1
//! - product 20, "چای", variable, category 2, variation 201 (`Size` =
//!   `بزرگ`, price `50000`)
//! - categories 1, 2 and 3 (3 has no products)
//! - gateways `cod` and `zarinpal` enabled, `bacs` disabled

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use reqwest::{Client, Method};
use sabad_storefront::config::{
    CheckoutConfig, DocumentsConfig, StorefrontConfig, WooCommerceConfig,
};
use sabad_storefront::documents::DocumentSource;
use sabad_storefront::routes;
use sabad_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};
use tempfile::TempDir;

/// Order id the fake assigns to the first order.
pub const FIRST_ORDER_ID: i64 = 5001;

/// Payment page the fake returns for online gateways.
pub const PAYMENT_URL: &str = "https://pay.example.ir/start/5001";

/// How the fake WooCommerce and the storefront behave.
#[derive(Debug, Clone)]
pub struct TestOptions {
    /// `GET /products` answers 500.
    pub fail_products: bool,
    /// `GET /products/categories` answers 500.
    pub fail_categories: bool,
    /// `GET /products/{id}/variations` answers 500.
    pub fail_variations: bool,
    /// Ids of products reported as `outofstock`.
    pub out_of_stock: Vec<i64>,
    /// `POST /orders` answers 500.
    pub fail_orders: bool,
    /// Storefront completes checkout with a synthetic order on failure.
    pub mask_failures: bool,
    /// Site settings document; `None` serves it with HTTP 500.
    pub site_settings: Option<Value>,
}

impl Default for TestOptions {
    fn default() -> Self {
        Self {
            fail_products: false,
            fail_categories: false,
            fail_variations: false,
            out_of_stock: Vec::new(),
            fail_orders: false,
            mask_failures: true,
            site_settings: None,
        }
    }
}

// =============================================================================
// Fake WooCommerce
// =============================================================================

struct FakeState {
    fail_products: AtomicBool,
    fail_categories: AtomicBool,
    fail_variations: AtomicBool,
    out_of_stock: Vec<i64>,
    fail_orders: AtomicBool,
    next_order_id: AtomicI64,
    orders: Mutex<Vec<Value>>,
}

/// Handle to the fake WooCommerce server.
#[derive(Clone)]
pub struct FakeWooCommerce {
    addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakeWooCommerce {
    async fn start(options: &TestOptions) -> Self {
        let state = Arc::new(FakeState {
            fail_products: AtomicBool::new(options.fail_products),
            fail_categories: AtomicBool::new(options.fail_categories),
            fail_variations: AtomicBool::new(options.fail_variations),
            out_of_stock: options.out_of_stock.clone(),
            fail_orders: AtomicBool::new(options.fail_orders),
            next_order_id: AtomicI64::new(FIRST_ORDER_ID),
            orders: Mutex::new(Vec::new()),
        });

        let api = Router::new()
            .route("/products", get(fake_products))
            .route("/products/categories", get(fake_categories))
            .route("/products/{id}", get(fake_product))
            .route("/products/{id}/variations", get(fake_variations))
            .route("/orders", post(fake_create_order))
            .route("/settings/general", get(fake_general_settings))
            .route("/payment_gateways", get(fake_payment_gateways));
        let router = Router::new()
            .nest("/wp-json/wc/v3", api)
            .route(
                "/site-settings.json",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "unavailable") }),
            )
            .with_state(Arc::clone(&state));

        let addr = serve(router).await;
        Self { addr, state }
    }

    /// Root URL, e.g. `http://127.0.0.1:41234`.
    #[must_use]
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_fail_products(&self, fail: bool) {
        self.state.fail_products.store(fail, Ordering::SeqCst);
    }

    /// Order payloads received so far.
    ///
    /// # Panics
    ///
    /// Panics if the order log lock is poisoned.
    #[must_use]
    pub fn orders(&self) -> Vec<Value> {
        self.state.orders.lock().expect("order log poisoned").clone()
    }
}

fn fake_product_list(out_of_stock: &[i64]) -> Value {
    let mut products = json!([
        {
            "id": 10,
            "name": "قهوه",
            "price": "100000",
            "regular_price": "100000",
            "type": "simple",
            "stock_status": "instock",
            "categories": [{"id": 1, "name": "نوشیدنی", "slug": "drinks"}],
            "images": [{"id": 1, "src": "https://cdn.example.ir/coffee.jpg", "alt": "قهوه"}]
        },
        {
            "id": 20,
            "name": "چای",
            "price": "50000",
            "type": "variable",
            "stock_status": "instock",
            "categories": [{"id": 2, "name": "چای و دمنوش", "slug": "tea"}],
            "attributes": [{"id": 1, "name": "Size", "options": ["کوچک", "بزرگ"], "variation": true, "visible": true}],
            "variations": [201]
        }
    ]);
    if let Some(list) = products.as_array_mut() {
        for product in list {
            if product["id"].as_i64().is_some_and(|id| out_of_stock.contains(&id)) {
                product["stock_status"] = json!("outofstock");
            }
        }
    }
    products
}

fn error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"code": "internal_error", "message": "Database unavailable"})),
    )
        .into_response()
}

async fn fake_products(State(state): State<Arc<FakeState>>) -> Response {
    if state.fail_products.load(Ordering::SeqCst) {
        return error_response();
    }
    Json(fake_product_list(&state.out_of_stock)).into_response()
}

async fn fake_categories(State(state): State<Arc<FakeState>>) -> Response {
    if state.fail_categories.load(Ordering::SeqCst) {
        return error_response();
    }
    Json(json!([
        {"id": 1, "name": "نوشیدنی", "slug": "drinks"},
        {"id": 2, "name": "چای و دمنوش", "slug": "tea"},
        {"id": 3, "name": "شیرینی", "slug": "sweets"}
    ]))
    .into_response()
}

async fn fake_product(State(state): State<Arc<FakeState>>, Path(id): Path<i64>) -> Response {
    let products = fake_product_list(&state.out_of_stock);
    products
        .as_array()
        .and_then(|list| list.iter().find(|p| p["id"] == id))
        .map_or_else(
            || {
                (
                    StatusCode::NOT_FOUND,
                    Json(json!({
                        "code": "woocommerce_rest_product_invalid_id",
                        "message": "Invalid ID."
                    })),
                )
                    .into_response()
            },
            |product| Json(product.clone()).into_response(),
        )
}

async fn fake_variations(State(state): State<Arc<FakeState>>, Path(id): Path<i64>) -> Response {
    if state.fail_variations.load(Ordering::SeqCst) {
        return error_response();
    }
    if id != 20 {
        return Json(json!([])).into_response();
    }
    Json(json!([
        {
            "id": 201,
            "price": "50000",
            "regular_price": "60000",
            "sale_price": "50000",
            "stock_status": "instock",
            "attributes": [{"id": 1, "name": "Size", "option": "بزرگ"}]
        }
    ]))
    .into_response()
}

async fn fake_create_order(
    State(state): State<Arc<FakeState>>,
    Json(order): Json<Value>,
) -> Response {
    if let Ok(mut orders) = state.orders.lock() {
        orders.push(order.clone());
    }
    if state.fail_orders.load(Ordering::SeqCst) {
        return error_response();
    }

    let id = state.next_order_id.fetch_add(1, Ordering::SeqCst);
    let method = order["payment_method"].as_str().unwrap_or_default();
    let payment_url = if method == "cod" { "" } else { PAYMENT_URL };
    let total: i64 = order["line_items"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item["total"].as_str()?.parse::<i64>().ok())
                .sum()
        })
        .unwrap_or_default();

    (
        StatusCode::CREATED,
        Json(json!({
            "id": id,
            "number": id.to_string(),
            "status": if method == "cod" { "processing" } else { "pending" },
            "total": total.to_string(),
            "currency": order["currency"],
            "payment_method": method,
            "payment_url": payment_url
        })),
    )
        .into_response()
}

async fn fake_general_settings() -> Json<Value> {
    Json(json!([
        {"id": "woocommerce_default_country", "value": "IR:THR"},
        {"id": "woocommerce_currency", "value": "IRT"}
    ]))
}

async fn fake_payment_gateways() -> Json<Value> {
    Json(json!([
        {"id": "cod", "title": "پرداخت در محل", "description": "", "enabled": true},
        {"id": "bacs", "title": "کارت به کارت", "description": "", "enabled": false},
        {"id": "zarinpal", "title": "زرین‌پال", "description": "", "enabled": true}
    ]))
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Test server error");
    });
    addr
}

// =============================================================================
// Storefront
// =============================================================================

/// A running storefront plus one shopper's HTTP client.
pub struct TestContext {
    pub client: Client,
    pub storefront_url: String,
    pub woocommerce: FakeWooCommerce,
    /// Documents served to the storefront; removed when the context drops.
    pub public_dir: TempDir,
}

fn write_public_dir(options: &TestOptions) -> TempDir {
    let dir = TempDir::new().expect("Failed to create public dir");

    let files = [
        ("config.json", json!({"sliderDataUrl": "/slider-data.json"})),
        (
            "slider-data.json",
            json!([{
                "desktopImage": "/static/slides/autumn-desktop.jpg",
                "mobileImage": "/static/slides/autumn-mobile.jpg",
                "link": "/?category=2",
                "alt": "حراج پاییزه"
            }]),
        ),
    ];
    for (name, body) in files {
        std::fs::write(dir.path().join(name), body.to_string())
            .expect("Failed to write document");
    }
    if let Some(settings) = &options.site_settings {
        std::fs::write(dir.path().join("site-settings.json"), settings.to_string())
            .expect("Failed to write site settings");
    }
    dir
}

impl TestContext {
    /// Start a fake WooCommerce and a storefront using it.
    ///
    /// # Panics
    ///
    /// Panics if a server cannot be started.
    pub async fn start(options: TestOptions) -> Self {
        let woocommerce = FakeWooCommerce::start(&options).await;
        let public_dir = write_public_dir(&options);

        let site_settings = if options.site_settings.is_some() {
            DocumentSource::Local(public_dir.path().join("site-settings.json"))
        } else {
            let url = url::Url::parse(&format!("{}/site-settings.json", woocommerce.base_url()))
                .expect("Invalid fake URL");
            DocumentSource::Remote(url)
        };

        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            public_dir: public_dir.path().to_path_buf(),
            woocommerce: WooCommerceConfig {
                base_url: woocommerce.base_url(),
                api_version: "wc/v3".to_string(),
                consumer_key: SecretString::from("ck_4f8a1c2e9b7d6053a1e8f4c2b9d7e6a5"),
                consumer_secret: SecretString::from("cs_9e2b7d4a1f6c8e3b5a7d9f1c4e6b8a2d"),
            },
            documents: DocumentsConfig {
                site_settings,
                slider_config: DocumentSource::Local(public_dir.path().join("config.json")),
            },
            checkout: CheckoutConfig {
                mask_submission_failures: options.mask_failures,
            },
            sentry_dsn: None,
            sentry_environment: None,
        };

        let state = AppState::load(config)
            .await
            .expect("Failed to initialize application state");
        let addr = serve(routes::app(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            storefront_url: format!("http://{addr}"),
            woocommerce,
            public_dir,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.storefront_url)
    }

    /// Send a request and decode the JSON answer (`Null` for an empty body).
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = self.client.request(method, self.url(path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.expect("Request failed");
        let status = response.status();
        let bytes = response.bytes().await.expect("Failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Body is not JSON")
        };
        (status, value)
    }

    /// `GET` a JSON endpoint.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        self.request(Method::GET, path, None).await
    }

    /// `POST` a JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Put one coffee (product 10) in the cart and move to checkout.
    ///
    /// # Panics
    ///
    /// Panics if either step is rejected.
    pub async fn checkout_with_coffee(&self) {
        let (status, _) = self
            .post("/api/cart/items", json!({"product_id": 10, "quantity": 1}))
            .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = self.post("/api/checkout", json!({})).await;
        assert_eq!(status, StatusCode::OK);
    }
}

/// Checkout form with every required field filled in.
#[must_use]
pub fn valid_form(payment_method: &str) -> Value {
    json!({
        "first_name": "مریم",
        "last_name": "احمدی",
        "phone": "09121234567",
        "address_1": "تهران، خیابان انقلاب، پلاک ۴",
        "payment_method": payment_method
    })
}
