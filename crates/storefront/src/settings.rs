//! Site settings and theme.
//!
//! Settings come from a JSON document read once at startup. Top-level keys
//! present in the document replace the defaults; missing keys keep them. A
//! document that cannot be read or parsed leaves the defaults in place.
//!
//! The theme is applied through a [`ThemeSink`]. The storefront renders it
//! into the `/theme.css` stylesheet as `--color-primary-<shade>` custom
//! properties.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::documents::{DocumentError, DocumentLoader, DocumentSource};
use crate::fallback::{Loaded, with_fallback};

// =============================================================================
// Settings
// =============================================================================

/// Display configuration for the whole storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub site_name: String,
    pub site_slogan: String,
    pub contact: ContactInfo,
    /// Trust seal shown in the footer.
    pub enamad: EnamadSettings,
    pub theme: ThemeSettings,
    pub footer: FooterSettings,
}

/// Contact block. Fields missing from a loaded block are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub address: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnamadSettings {
    pub enabled: bool,
    pub url: String,
    pub show_logo: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ThemeSettings {
    /// Palette name, e.g. `emerald`.
    pub primary_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterSettings {
    pub copyright: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "فروشگاه آنلاین".to_string(),
            site_slogan: "بهترین قیمت محصولات غذایی را با ما تجربه کنید".to_string(),
            contact: ContactInfo {
                phone: "09123456789".to_string(),
                email: "info@shop.com".to_string(),
                address: "تهران، خیابان ولیعصر، پلاک ۱۲۳".to_string(),
            },
            enamad: EnamadSettings {
                enabled: true,
                url: "https://enamad.com".to_string(),
                show_logo: false,
            },
            theme: ThemeSettings {
                primary_color: "emerald".to_string(),
            },
            footer: FooterSettings {
                copyright: "© ۱۴۰۴ تمامی حقوق محفوظ است | طراحی و توسعه".to_string(),
            },
        }
    }
}

impl SiteSettings {
    /// Overlay a loaded document on the defaults, one top-level key at a time.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a JSON object or a replaced
    /// key has the wrong shape.
    pub fn merged_over_defaults(document: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(loaded) = document else {
            return Err(serde::de::Error::custom("site settings must be a JSON object"));
        };

        let mut merged = match serde_json::to_value(Self::default())? {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        merged.extend(loaded);

        serde_json::from_value(Value::Object(merged))
    }
}

/// Load site settings, falling back to the defaults on any failure.
#[instrument(skip(loader), fields(source = %source))]
pub async fn load_site_settings(
    loader: &DocumentLoader,
    source: &DocumentSource,
) -> Loaded<SiteSettings> {
    with_fallback(
        "site settings",
        async {
            let document: Value = loader.fetch_json(source).await?;
            SiteSettings::merged_over_defaults(document).map_err(DocumentError::from)
        },
        SiteSettings::default,
    )
    .await
}

// =============================================================================
// Theme
// =============================================================================

/// A named color palette, shades 50 through 900.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: &'static str,
    pub shades: [(u16, &'static str); 10],
}

/// Palettes selectable with `theme.primaryColor`.
pub const PALETTES: [Palette; 8] = [
    Palette {
        name: "emerald",
        shades: [
            (50, "#ecfdf5"),
            (100, "#d1fae5"),
            (200, "#a7f3d0"),
            (300, "#6ee7b7"),
            (400, "#34d399"),
            (500, "#10b981"),
            (600, "#059669"),
            (700, "#047857"),
            (800, "#065f46"),
            (900, "#064e3b"),
        ],
    },
    Palette {
        name: "blue",
        shades: [
            (50, "#eff6ff"),
            (100, "#dbeafe"),
            (200, "#bfdbfe"),
            (300, "#93c5fd"),
            (400, "#60a5fa"),
            (500, "#3b82f6"),
            (600, "#2563eb"),
            (700, "#1d4ed8"),
            (800, "#1e40af"),
            (900, "#1e3a8a"),
        ],
    },
    Palette {
        name: "red",
        shades: [
            (50, "#fef2f2"),
            (100, "#fee2e2"),
            (200, "#fecaca"),
            (300, "#fca5a5"),
            (400, "#f87171"),
            (500, "#ef4444"),
            (600, "#dc2626"),
            (700, "#b91c1c"),
            (800, "#991b1b"),
            (900, "#7f1d1d"),
        ],
    },
    Palette {
        name: "purple",
        shades: [
            (50, "#faf5ff"),
            (100, "#f3e8ff"),
            (200, "#e9d5ff"),
            (300, "#d8b4fe"),
            (400, "#c084fc"),
            (500, "#a855f7"),
            (600, "#9333ea"),
            (700, "#7c3aed"),
            (800, "#6b21a8"),
            (900, "#581c87"),
        ],
    },
    Palette {
        name: "orange",
        shades: [
            (50, "#fff7ed"),
            (100, "#ffedd5"),
            (200, "#fed7aa"),
            (300, "#fdba74"),
            (400, "#fb923c"),
            (500, "#f97316"),
            (600, "#ea580c"),
            (700, "#c2410c"),
            (800, "#9a3412"),
            (900, "#7c2d12"),
        ],
    },
    Palette {
        name: "pink",
        shades: [
            (50, "#fdf2f8"),
            (100, "#fce7f3"),
            (200, "#fbcfe8"),
            (300, "#f9a8d4"),
            (400, "#f472b6"),
            (500, "#ec4899"),
            (600, "#db2777"),
            (700, "#be185d"),
            (800, "#9d174d"),
            (900, "#831843"),
        ],
    },
    Palette {
        name: "indigo",
        shades: [
            (50, "#eef2ff"),
            (100, "#e0e7ff"),
            (200, "#c7d2fe"),
            (300, "#a5b4fc"),
            (400, "#818cf8"),
            (500, "#6366f1"),
            (600, "#4f46e5"),
            (700, "#4338ca"),
            (800, "#3730a3"),
            (900, "#312e81"),
        ],
    },
    Palette {
        name: "teal",
        shades: [
            (50, "#f0fdfa"),
            (100, "#ccfbf1"),
            (200, "#99f6e4"),
            (300, "#5eead4"),
            (400, "#2dd4bf"),
            (500, "#14b8a6"),
            (600, "#0d9488"),
            (700, "#0f766e"),
            (800, "#115e59"),
            (900, "#134e4a"),
        ],
    },
];

/// Look up a palette by name.
#[must_use]
pub fn palette(name: &str) -> Option<&'static Palette> {
    PALETTES.iter().find(|p| p.name == name)
}

/// Receives resolved theme values.
pub trait ThemeSink {
    /// Set one custom property, e.g. `--color-primary-500`.
    fn set_property(&mut self, name: &str, value: &str);
}

/// Write the palette named in `settings` to `sink`.
///
/// Returns `false` without touching the sink when no palette is named or the
/// name is unknown.
pub fn apply_theme(settings: &SiteSettings, sink: &mut impl ThemeSink) -> bool {
    let name = settings.theme.primary_color.as_str();
    if name.is_empty() {
        return false;
    }
    let Some(palette) = palette(name) else {
        warn!(palette = %name, "Unknown color palette, theme not applied");
        return false;
    };

    for (shade, color) in palette.shades {
        sink.set_property(&format!("--color-primary-{shade}"), color);
    }
    info!(palette = %name, "Theme applied");
    true
}

/// Theme collected into a `:root` stylesheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CssTheme {
    properties: Vec<(String, String)>,
}

impl ThemeSink for CssTheme {
    fn set_property(&mut self, name: &str, value: &str) {
        if let Some(existing) = self.properties.iter_mut().find(|(n, _)| n == name) {
            existing.1 = value.to_string();
        } else {
            self.properties.push((name.to_string(), value.to_string()));
        }
    }
}

impl CssTheme {
    /// Build the stylesheet for resolved settings.
    #[must_use]
    pub fn from_settings(settings: &SiteSettings) -> Self {
        let mut theme = Self::default();
        apply_theme(settings, &mut theme);
        theme
    }

    #[must_use]
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Render as CSS.
    #[must_use]
    pub fn to_stylesheet(&self) -> String {
        let mut css = String::from(":root {\n");
        for (name, value) in &self.properties {
            css.push_str("  ");
            css.push_str(name);
            css.push_str(": ");
            css.push_str(value);
            css.push_str(";\n");
        }
        css.push_str("}\n");
        css
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_merge_replaces_top_level_keys() {
        let settings = SiteSettings::merged_over_defaults(json!({
            "siteName": "سبد",
            "theme": {"primaryColor": "teal"},
            "unknownKey": 1
        }))
        .unwrap();

        assert_eq!(settings.site_name, "سبد");
        assert_eq!(settings.theme.primary_color, "teal");
        assert_eq!(settings.contact, SiteSettings::default().contact);
    }

    #[test]
    fn test_merge_is_shallow() {
        let settings =
            SiteSettings::merged_over_defaults(json!({"contact": {"phone": "021-555"}})).unwrap();
        assert_eq!(settings.contact.phone, "021-555");
        assert_eq!(settings.contact.email, "");
    }

    #[test]
    fn test_merge_rejects_non_object() {
        assert!(SiteSettings::merged_over_defaults(json!([1, 2])).is_err());
        assert!(SiteSettings::merged_over_defaults(json!({"siteName": 5})).is_err());
    }

    #[test]
    fn test_apply_known_palette() {
        let settings = SiteSettings::default();
        let theme = CssTheme::from_settings(&settings);

        assert_eq!(theme.properties().len(), 10);
        assert_eq!(
            theme.properties()[0],
            ("--color-primary-50".to_string(), "#ecfdf5".to_string())
        );
        let css = theme.to_stylesheet();
        assert!(css.starts_with(":root {\n"));
        assert!(css.contains("  --color-primary-900: #064e3b;\n"));
    }

    #[test]
    fn test_apply_unknown_palette_is_ignored() {
        let mut settings = SiteSettings::default();
        settings.theme.primary_color = "chartreuse".to_string();

        let mut theme = CssTheme::default();
        assert!(!apply_theme(&settings, &mut theme));
        assert!(theme.properties().is_empty());
        assert_eq!(theme.to_stylesheet(), ":root {\n}\n");
    }

    #[test]
    fn test_every_palette_has_ten_shades() {
        for p in &PALETTES {
            assert_eq!(p.shades[0].0, 50);
            assert_eq!(p.shades[9].0, 900);
            assert!(p.shades.iter().all(|(_, color)| color.len() == 7));
        }
        assert_eq!(palette("purple").unwrap().shades[6].1, "#7c3aed");
    }

    #[tokio::test]
    async fn test_load_settings_http_500_uses_defaults() {
        let router = Router::new().route(
            "/site-settings.json",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "oops") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let loader = DocumentLoader::new().unwrap();
        let source = format!("http://{addr}/site-settings.json").parse().unwrap();
        let loaded = load_site_settings(&loader, &source).await;

        assert!(loaded.is_fallback());
        assert_eq!(loaded.value, SiteSettings::default());
    }

    #[tokio::test]
    async fn test_load_settings_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("site-settings.json");
        tokio::fs::write(&path, r#"{"siteName": "فروشگاه نمونه"}"#)
            .await
            .unwrap();

        let loader = DocumentLoader::new().unwrap();
        let loaded = load_site_settings(&loader, &DocumentSource::Local(path)).await;

        assert!(!loaded.is_fallback());
        assert_eq!(loaded.value.site_name, "فروشگاه نمونه");
        assert_eq!(loaded.value.footer, SiteSettings::default().footer);
    }
}
