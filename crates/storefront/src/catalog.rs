//! Product catalog.
//!
//! Products and categories are fetched concurrently at startup. Either list
//! falls back to the built-in fixtures when the API is unreachable. A product
//! failure is surfaced to shoppers with a retry affordance; a category
//! failure is only logged and retried once after a short delay.

use std::sync::Arc;
use std::time::Duration;

use sabad_core::{CategoryId, ProductId, format_toman};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::fallback::{Loaded, Source, with_fallback};
use crate::fixtures;
use crate::woocommerce::{Product, ProductCategory, WooCommerceClient};

/// Page of the product list shown in the storefront.
pub const PRODUCTS_PAGE: u32 = 1;

/// Number of products shown in the storefront.
pub const PRODUCTS_PER_PAGE: u32 = 20;

/// Message shown when products could not be loaded.
pub const PRODUCTS_ERROR_MESSAGE: &str = "خطا در بارگذاری محصولات";

/// Delay before the single category retry.
pub const CATEGORY_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Products and categories currently offered.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
    products_source: Source,
    categories: Vec<ProductCategory>,
    categories_source: Source,
}

/// A product plus the display fields of its card and details modal.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub on_sale: bool,
    /// First image, or the placeholder.
    pub main_image: String,
    /// Only in-stock products offer add-to-cart.
    pub in_stock: bool,
    pub stock_label: &'static str,
    /// `None` when the price is missing or malformed.
    pub price_display: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            on_sale: product.is_on_sale(),
            main_image: product.main_image_url().to_string(),
            in_stock: product.stock_status.is_in_stock(),
            stock_label: product.stock_status.label(),
            price_display: product.unit_price().ok().map(format_toman),
            product: product.clone(),
        }
    }
}

/// What the shop page shows for one category selection.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub selected_category: Option<CategoryId>,
    pub products: Vec<ProductView>,
    /// Categories that have at least one product, for the filter bar.
    pub categories: Vec<ProductCategory>,
    /// Set when the product list is built-in data; the shopper may retry.
    pub error: Option<&'static str>,
    pub source: Source,
}

impl Catalog {
    #[must_use]
    pub fn new(products: Loaded<Vec<Product>>, categories: Loaded<Vec<ProductCategory>>) -> Self {
        Self {
            products_source: products.source,
            products: products.value,
            categories_source: categories.source,
            categories: categories.value,
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn categories(&self) -> &[ProductCategory] {
        &self.categories
    }

    #[must_use]
    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Error to show in place of the product grid, if any.
    #[must_use]
    pub fn error(&self) -> Option<&'static str> {
        (self.products_source == Source::Fallback).then_some(PRODUCTS_ERROR_MESSAGE)
    }

    #[must_use]
    pub fn categories_are_fallback(&self) -> bool {
        self.categories_source == Source::Fallback
    }

    /// Products in `category`, or every product for `None`.
    pub fn filter(&self, category: Option<CategoryId>) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(move |p| category.is_none_or(|id| p.in_category(id)))
    }

    /// Categories that contain at least one product.
    pub fn categories_with_products(&self) -> impl Iterator<Item = &ProductCategory> {
        self.categories
            .iter()
            .filter(|c| self.products.iter().any(|p| p.in_category(c.id)))
    }

    /// Build the shop listing for a category selection.
    #[must_use]
    pub fn listing(&self, category: Option<CategoryId>) -> Listing {
        Listing {
            selected_category: category,
            products: self.filter(category).map(ProductView::from).collect(),
            categories: self.categories_with_products().cloned().collect(),
            error: self.error(),
            source: self.products_source,
        }
    }

    pub fn set_products(&mut self, products: Loaded<Vec<Product>>) {
        self.products_source = products.source;
        self.products = products.value;
    }

    pub fn set_categories(&mut self, categories: Loaded<Vec<ProductCategory>>) {
        self.categories_source = categories.source;
        self.categories = categories.value;
    }
}

/// Fetch the storefront's product page, or the fixtures.
pub async fn load_products(client: &WooCommerceClient) -> Loaded<Vec<Product>> {
    with_fallback(
        "products",
        client.get_products(PRODUCTS_PAGE, PRODUCTS_PER_PAGE),
        fixtures::products,
    )
    .await
}

/// Fetch the top-level categories, or the fixtures.
pub async fn load_categories(client: &WooCommerceClient) -> Loaded<Vec<ProductCategory>> {
    with_fallback("categories", client.get_categories(), fixtures::categories).await
}

/// Fetch products and categories concurrently.
#[instrument(skip(client))]
pub async fn load_catalog(client: &WooCommerceClient) -> Catalog {
    let (products, categories) = tokio::join!(load_products(client), load_categories(client));
    let catalog = Catalog::new(products, categories);
    info!(
        products = catalog.products().len(),
        categories = catalog.categories().len(),
        products_live = catalog.error().is_none(),
        categories_live = !catalog.categories_are_fallback(),
        "Catalog loaded"
    );
    catalog
}

/// Reload the product list into `catalog`. Returns whether it is live data.
#[instrument(skip_all)]
pub async fn reload_products(client: &WooCommerceClient, catalog: &RwLock<Catalog>) -> bool {
    let products = load_products(client).await;
    let live = !products.is_fallback();
    catalog.write().await.set_products(products);
    live
}

/// Retry the category fetch once after `delay`, keeping the fixtures if it
/// fails again.
pub fn retry_categories_after(
    client: WooCommerceClient,
    catalog: Arc<RwLock<Catalog>>,
    delay: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let categories = load_categories(&client).await;
        if categories.is_fallback() {
            return;
        }
        info!(count = categories.value.len(), "Categories loaded on retry");
        catalog.write().await.set_categories(categories);
    })
}
