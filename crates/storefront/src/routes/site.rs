//! Site-wide display data: settings, slides and the theme stylesheet.

use axum::{
    Json,
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::settings::SiteSettings;
use crate::slides::Slide;
use crate::state::AppState;

/// Site name, contact details, trust seal and footer.
pub async fn settings(State(state): State<AppState>) -> Json<SiteSettings> {
    Json(state.settings().clone())
}

pub async fn slides(State(state): State<AppState>) -> Json<Vec<Slide>> {
    Json(state.slides().to_vec())
}

/// `--color-primary-*` properties for the configured palette.
pub async fn theme_css(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=300"),
        ],
        state.theme_css().to_string(),
    )
}
