// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    Az,
    En,
    Ru,
}

impl Locale {
    pub const ALL: [Self; 3] = [Self::Az, Self::En, Self::Ru];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Az => "az",
            Self::En => "en",
            Self::Ru => "ru",
        }
    }
}

/// Records carrying one display name per supported locale.
pub trait LocalizedNames {
    fn name(&self, locale: Locale) -> &str;

    fn names(&self) -> [&str; 3] {
        Locale::ALL.map(|locale| self.name(locale))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    #[serde(default)]
    pub img: Vec<String>,
}

impl Category {
    pub fn to_payload(&self) -> CategoryPayload {
        CategoryPayload {
            name_az: self.name_az.clone(),
            name_en: self.name_en.clone(),
            name_ru: self.name_ru.clone(),
            img: self.img.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
}

impl Subcategory {
    pub fn to_payload(&self) -> SubcategoryPayload {
        SubcategoryPayload {
            name_az: self.name_az.clone(),
            name_en: self.name_en.clone(),
            name_ru: self.name_ru.clone(),
            category_id: self.category_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    #[serde(default)]
    pub description_az: String,
    #[serde(default)]
    pub description_en: String,
    #[serde(default)]
    pub description_ru: String,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
    #[serde(rename = "subcategoryId")]
    pub subcategory_id: SubcategoryId,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "ingridients", default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    pub status: bool,
    #[serde(rename = "isStok", default)]
    pub in_stock: bool,
    #[serde(default)]
    pub img: Vec<String>,
}

impl Product {
    /// Full replacement body for this product. The remote API has no partial
    /// updates, so every field is carried even when only one changes.
    pub fn to_payload(&self) -> ProductPayload {
        ProductPayload {
            name_az: self.name_az.clone(),
            name_en: self.name_en.clone(),
            name_ru: self.name_ru.clone(),
            description_az: self.description_az.clone(),
            description_en: self.description_en.clone(),
            description_ru: self.description_ru.clone(),
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            price: self.price,
            ingredients: self.ingredients.clone(),
            sizes: self.sizes.clone(),
            status: self.status,
            in_stock: self.in_stock,
            img: self.img.clone(),
        }
    }
}

macro_rules! localized_names {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl LocalizedNames for $ty {
                fn name(&self, locale: Locale) -> &str {
                    match locale {
                        Locale::Az => &self.name_az,
                        Locale::En => &self.name_en,
                        Locale::Ru => &self.name_ru,
                    }
                }
            }
        )+
    };
}

localized_names!(
    Category,
    Subcategory,
    Product,
    CategoryPayload,
    SubcategoryPayload,
    ProductPayload,
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryPayload {
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    pub img: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryPayload {
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPayload {
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    pub description_az: String,
    pub description_en: String,
    pub description_ru: String,
    #[serde(rename = "categoryId")]
    pub category_id: CategoryId,
    #[serde(rename = "subcategoryId")]
    pub subcategory_id: SubcategoryId,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(rename = "ingridients")]
    pub ingredients: Vec<String>,
    pub sizes: Vec<String>,
    pub status: bool,
    #[serde(rename = "isStok")]
    pub in_stock: bool,
    pub img: Vec<String>,
}

impl ProductPayload {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name_az: self.name_az,
            name_en: self.name_en,
            name_ru: self.name_ru,
            description_az: self.description_az,
            description_en: self.description_en,
            description_ru: self.description_ru,
            category_id: self.category_id,
            subcategory_id: self.subcategory_id,
            price: self.price,
            ingredients: self.ingredients,
            sizes: self.sizes,
            status: self.status,
            in_stock: self.in_stock,
            img: self.img,
        }
    }
}

impl CategoryPayload {
    pub fn into_category(self, id: CategoryId) -> Category {
        Category {
            id,
            name_az: self.name_az,
            name_en: self.name_en,
            name_ru: self.name_ru,
            img: self.img,
        }
    }
}

impl SubcategoryPayload {
    pub fn into_subcategory(self, id: SubcategoryId) -> Subcategory {
        Subcategory {
            id,
            name_az: self.name_az,
            name_en: self.name_en,
            name_ru: self.name_ru,
            category_id: self.category_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityPayload {
    Category(CategoryPayload),
    Subcategory(SubcategoryPayload),
    Product(ProductPayload),
}

impl EntityPayload {
    pub fn images(&self) -> &[String] {
        match self {
            Self::Category(category) => &category.img,
            Self::Subcategory(_) => &[],
            Self::Product(product) => &product.img,
        }
    }

    /// Subcategories carry no images, so this is a no-op for them.
    pub fn set_images(&mut self, images: Vec<String>) {
        match self {
            Self::Category(category) => category.img = images,
            Self::Subcategory(_) => {}
            Self::Product(product) => product.img = images,
        }
    }

    pub const fn view(&self) -> AdminView {
        match self {
            Self::Category(_) => AdminView::Categories,
            Self::Subcategory(_) => AdminView::Subcategories,
            Self::Product(_) => AdminView::Products,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminView {
    Products,
    Categories,
    Subcategories,
}

impl AdminView {
    pub const ALL: [Self; 3] = [Self::Products, Self::Categories, Self::Subcategories];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Subcategories => "subcategories",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "products" => Some(Self::Products),
            "categories" => Some(Self::Categories),
            "subcategories" => Some(Self::Subcategories),
            _ => None,
        }
    }

    /// Only the product list is filtered server-side; the other two views
    /// narrow their full collections locally.
    pub const fn fetches_on_filter_change(self) -> bool {
        matches!(self, Self::Products)
    }
}

/// Parameters of one `GET /products` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: u32,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            category_id: None,
            subcategory_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProductPage {
    pub items: Vec<Product>,
    pub total_pages: u32,
}

/// A local image file about to be sent to the upload endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_type_for(&file_name).to_owned();
        Self {
            file_name,
            mime_type,
            data,
        }
    }
}

pub fn mime_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::{
        AdminView, Category, CategoryId, LocalizedNames, Product, ProductId, SubcategoryId,
        mime_type_for,
    };
    use rust_decimal::Decimal;

    #[test]
    fn product_decodes_api_field_names() {
        let raw = r#"{
            "id": 7,
            "name_az": "Kofe", "name_en": "Coffee", "name_ru": "Кофе",
            "description_az": "", "description_en": "", "description_ru": "",
            "categoryId": 1, "subcategoryId": 3,
            "price": 4.5,
            "ingridients": ["kofe"],
            "sizes": ["S", "M"],
            "status": true,
            "isStok": false,
            "img": ["https://cdn.example/a.png"]
        }"#;
        let product: Product = serde_json::from_str(raw).expect("decode product");
        assert_eq!(product.id, ProductId::new(7));
        assert_eq!(product.subcategory_id, SubcategoryId::new(3));
        assert_eq!(product.price, Decimal::new(45, 1));
        assert_eq!(product.ingredients, vec!["kofe".to_owned()]);
        assert!(!product.in_stock);
    }

    #[test]
    fn product_payload_encodes_price_as_number() {
        let raw = r#"{"id":1,"name_az":"a","name_en":"b","name_ru":"c","categoryId":1,
            "subcategoryId":2,"price":12,"status":false}"#;
        let product: Product = serde_json::from_str(raw).expect("decode product");
        let encoded = serde_json::to_value(product.to_payload()).expect("encode payload");
        assert!(encoded["price"].is_number());
        assert_eq!(encoded["isStok"], serde_json::json!(false));
        assert_eq!(encoded["ingridients"], serde_json::json!([]));
        assert!(encoded.get("id").is_none());
    }

    #[test]
    fn category_without_images_decodes_to_empty_list() {
        let body = r#"{"id":2,"name_az":"Şirniyyat","name_en":"Sweets","name_ru":"Сладости"}"#;
        let category: Category = serde_json::from_str(body).expect("decode category");
        assert_eq!(category.id, CategoryId::new(2));
        assert!(category.img.is_empty());
        assert_eq!(category.names(), ["Şirniyyat", "Sweets", "Сладости"]);
    }

    #[test]
    fn view_labels_parse_back() {
        for view in AdminView::ALL {
            assert_eq!(AdminView::parse(view.label()), Some(view));
        }
        assert!(AdminView::parse("orders").is_none());
    }

    #[test]
    fn mime_type_is_inferred_from_extension() {
        assert_eq!(mime_type_for("photo.JPG"), "image/jpeg");
        assert_eq!(mime_type_for("logo.svg"), "image/svg+xml");
        assert_eq!(mime_type_for("README"), "application/octet-stream");
    }
}
