//! Built-in catalog data used when the live sources are unreachable.

use sabad_core::{CategoryId, ImageId, ProductId, ProductType, StockStatus};

use crate::slides::Slide;
use crate::woocommerce::{Product, ProductCategory, ProductImage};

fn category(id: i64, name: &str, slug: &str) -> ProductCategory {
    ProductCategory {
        id: CategoryId::new(id),
        name: name.to_string(),
        slug: slug.to_string(),
    }
}

fn pexels(photo: u32, size: &str) -> String {
    format!(
        "https://images.pexels.com/photos/{photo}/pexels-photo-{photo}.jpeg?auto=compress&cs=tinysrgb&{size}"
    )
}

struct FixtureProduct {
    id: i64,
    name: &'static str,
    description: &'static str,
    short_description: &'static str,
    price: &'static str,
    regular_price: &'static str,
    sale_price: &'static str,
    photo: u32,
    category: (i64, &'static str, &'static str),
}

impl From<FixtureProduct> for Product {
    fn from(f: FixtureProduct) -> Self {
        Self {
            id: ProductId::new(f.id),
            name: f.name.to_string(),
            description: f.description.to_string(),
            short_description: f.short_description.to_string(),
            price: f.price.to_string(),
            regular_price: f.regular_price.to_string(),
            sale_price: f.sale_price.to_string(),
            images: vec![ProductImage {
                id: ImageId::new(f.id),
                src: pexels(f.photo, "w=400"),
                name: String::new(),
                alt: String::new(),
            }],
            categories: vec![category(f.category.0, f.category.1, f.category.2)],
            attributes: Vec::new(),
            variations: Vec::new(),
            kind: ProductType::Simple,
            stock_status: StockStatus::InStock,
            manage_stock: false,
            stock_quantity: None,
        }
    }
}

/// Products shown when the product list cannot be fetched.
#[must_use]
pub fn products() -> Vec<Product> {
    [
        FixtureProduct {
            id: 1,
            name: "تی‌شرت کلاسیک",
            description: "تی‌شرت با کیفیت عالی",
            short_description: "راحت و شیک",
            price: "250000",
            regular_price: "300000",
            sale_price: "250000",
            photo: 8_532_616,
            category: (1, "پوشاک", "clothing"),
        },
        FixtureProduct {
            id: 2,
            name: "شلوار جین",
            description: "شلوار جین با طراحی مدرن",
            short_description: "مناسب برای روزمره",
            price: "450000",
            regular_price: "450000",
            sale_price: "",
            photo: 1_598_505,
            category: (1, "پوشاک", "clothing"),
        },
        FixtureProduct {
            id: 3,
            name: "کفش ورزشی",
            description: "کفش ورزشی راحت و با کیفیت",
            short_description: "مناسب برای ورزش و پیاده‌روی",
            price: "680000",
            regular_price: "750000",
            sale_price: "680000",
            photo: 2_529_148,
            category: (2, "کفش", "shoes"),
        },
        FixtureProduct {
            id: 4,
            name: "ساعت هوشمند",
            description: "ساعت هوشمند با امکانات پیشرفته",
            short_description: "مانیتورینگ سلامت و فیتنس",
            price: "1200000",
            regular_price: "1200000",
            sale_price: "",
            photo: 437_037,
            category: (3, "الکترونیک", "electronics"),
        },
    ]
    .into_iter()
    .map(Product::from)
    .collect()
}

/// Categories shown when the category list cannot be fetched.
#[must_use]
pub fn categories() -> Vec<ProductCategory> {
    vec![
        category(1, "پوشاک", "clothing"),
        category(2, "کفش", "shoes"),
        category(3, "الکترونیک", "electronics"),
        category(4, "لوازم خانگی", "home"),
        category(5, "کتاب", "books"),
        category(6, "ورزش", "sports"),
    ]
}

/// Slides shown when the slider data cannot be fetched.
#[must_use]
pub fn slides() -> Vec<Slide> {
    vec![
        Slide {
            desktop_image: pexels(1_640_777, "w=1200&h=250"),
            mobile_image: pexels(1_640_777, "w=600&h=300"),
            link: Some("https://example.com/offer1".to_string()),
            alt: Some("پیشنهاد ویژه ۱".to_string()),
        },
        Slide {
            desktop_image: pexels(264_636, "w=1200&h=250"),
            mobile_image: pexels(264_636, "w=600&h=300"),
            link: None,
            alt: Some("بنر تبلیغاتی ۲".to_string()),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_products_are_in_fixture_categories() {
        let categories = categories();
        for product in products() {
            assert!(
                product
                    .categories
                    .iter()
                    .all(|c| categories.iter().any(|known| known.id == c.id)),
                "product {} has an unknown category",
                product.id
            );
            assert!(product.unit_price().is_ok());
        }
    }

    #[test]
    fn test_fixture_sale_flags() {
        let products = products();
        assert!(products[0].is_on_sale());
        assert!(!products[1].is_on_sale());
        assert_eq!(
            products[0].main_image_url(),
            "https://images.pexels.com/photos/8532616/pexels-photo-8532616.jpeg?auto=compress&cs=tinysrgb&w=400"
        );
    }

    #[test]
    fn test_fixture_slides() {
        let slides = slides();
        assert_eq!(slides.len(), 2);
        assert!(slides[0].desktop_image.ends_with("w=1200&h=250"));
        assert!(slides[1].link.is_none());
    }
}
