//! Session middleware configuration.
//!
//! Shopper state lives in an in-memory tower-sessions store, keyed by the
//! session cookie. The [`Shopper`] extractor loads it for a request and
//! writes it back on [`Shopper::save`].

use std::ops::{Deref, DerefMut};

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::{Expiry, MemoryStore, Session, SessionManagerLayer};

use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::view::ShopperSession;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "sabad_session";

/// Session key holding the [`ShopperSession`].
pub const SHOPPER_KEY: &str = "shopper";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &StorefrontConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

/// Extractor for the requesting shopper's state.
///
/// A shopper without a stored state starts from the default (shop view,
/// empty cart). Changes are kept only after [`Shopper::save`].
///
/// # Example
///
/// ```rust,ignore
/// async fn toggle(mut shopper: Shopper) -> Result<Json<bool>> {
///     let open = shopper.toggle_cart();
///     shopper.save().await?;
///     Ok(Json(open))
/// }
/// ```
pub struct Shopper {
    session: Session,
    state: ShopperSession,
}

impl Shopper {
    /// Write the state back to the session store.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(SHOPPER_KEY, &self.state).await
    }
}

impl Deref for Shopper {
    type Target = ShopperSession;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl DerefMut for Shopper {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.state
    }
}

impl<S> FromRequestParts<S> for Shopper
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let state = session
            .get::<ShopperSession>(SHOPPER_KEY)
            .await?
            .unwrap_or_default();

        Ok(Self { session, state })
    }
}
