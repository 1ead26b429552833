//! Application state shared across handlers.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::catalog::{CATEGORY_RETRY_DELAY, Catalog, load_catalog, retry_categories_after};
use crate::config::StorefrontConfig;
use crate::documents::{DocumentError, DocumentLoader};
use crate::settings::{CssTheme, SiteSettings, load_site_settings};
use crate::slides::{Slide, load_slides};
use crate::woocommerce::{WooCommerceClient, WooCommerceError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("woocommerce client: {0}")]
    WooCommerce(#[from] WooCommerceError),
    #[error("document loader: {0}")]
    Documents(#[from] DocumentError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Settings, theme and slides
/// are fixed after startup; the catalog can be reloaded.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    woocommerce: WooCommerceClient,
    settings: SiteSettings,
    theme_css: String,
    slides: Vec<Slide>,
    catalog: Arc<RwLock<Catalog>>,
}

impl AppState {
    /// Build the state, loading settings, slides and the catalog
    /// concurrently.
    ///
    /// Data that cannot be fetched is replaced by built-in values, so only
    /// client construction can fail. When the categories fall back, a single
    /// delayed retry is spawned.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub async fn load(config: StorefrontConfig) -> Result<Self, StateError> {
        let woocommerce = WooCommerceClient::new(&config.woocommerce)?;
        let loader = DocumentLoader::new()?;

        let (settings, slides, catalog) = tokio::join!(
            load_site_settings(&loader, &config.documents.site_settings),
            load_slides(&loader, &config.documents.slider_config),
            load_catalog(&woocommerce),
        );

        let settings = settings.into_value();
        let theme = CssTheme::from_settings(&settings);
        info!(
            site_name = %settings.site_name,
            theme_properties = theme.properties().len(),
            slides = slides.value.len(),
            "Storefront data loaded"
        );

        let retry_categories = catalog.categories_are_fallback();
        let catalog = Arc::new(RwLock::new(catalog));
        if retry_categories {
            retry_categories_after(
                woocommerce.clone(),
                Arc::clone(&catalog),
                CATEGORY_RETRY_DELAY,
            );
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                woocommerce,
                theme_css: theme.to_stylesheet(),
                settings,
                slides: slides.into_value(),
                catalog,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the WooCommerce API client.
    #[must_use]
    pub fn woocommerce(&self) -> &WooCommerceClient {
        &self.inner.woocommerce
    }

    #[must_use]
    pub fn settings(&self) -> &SiteSettings {
        &self.inner.settings
    }

    /// Stylesheet served at `/theme.css`.
    #[must_use]
    pub fn theme_css(&self) -> &str {
        &self.inner.theme_css
    }

    #[must_use]
    pub fn slides(&self) -> &[Slide] {
        &self.inner.slides
    }

    #[must_use]
    pub fn catalog(&self) -> &RwLock<Catalog> {
        &self.inner.catalog
    }
}
