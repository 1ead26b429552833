//! Home page slide show.
//!
//! Loaded in two steps: a pointer document (`{"sliderDataUrl": ...}`) names
//! the slide data, which is resolved relative to the pointer and fetched.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::documents::{DocumentError, DocumentLoader, DocumentSource};
use crate::fallback::{Loaded, with_fallback};
use crate::fixtures;

/// One slide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    pub desktop_image: String,
    pub mobile_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SliderPointer {
    slider_data_url: String,
}

async fn fetch_slides(
    loader: &DocumentLoader,
    pointer: &DocumentSource,
) -> Result<Vec<Slide>, DocumentError> {
    let SliderPointer { slider_data_url } = loader.fetch_json(pointer).await?;
    let data = pointer.resolve(&slider_data_url)?;
    loader.fetch_json(&data).await
}

/// Load the slide show, falling back to the built-in slides on any failure.
#[instrument(skip(loader), fields(pointer = %pointer))]
pub async fn load_slides(loader: &DocumentLoader, pointer: &DocumentSource) -> Loaded<Vec<Slide>> {
    with_fallback("slides", fetch_slides(loader, pointer), fixtures::slides).await
}
