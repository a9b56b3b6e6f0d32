// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    Category, CategoryId, CategoryPayload, ImageUpload, ProductId, ProductPage, ProductPayload,
    ProductQuery, Subcategory, SubcategoryId, SubcategoryPayload,
};

/// Remote catalog operations the console depends on. The server is the source
/// of truth; implementations perform no caching.
pub trait CatalogBackend {
    fn list_categories(&self) -> Result<Vec<Category>>;
    fn list_subcategories(&self) -> Result<Vec<Subcategory>>;
    fn create_category(&self, payload: &CategoryPayload) -> Result<()>;
    fn update_category(&self, id: CategoryId, payload: &CategoryPayload) -> Result<()>;
    fn delete_category(&self, id: CategoryId) -> Result<()>;
    fn create_subcategory(&self, payload: &SubcategoryPayload) -> Result<()>;
    fn update_subcategory(&self, id: SubcategoryId, payload: &SubcategoryPayload) -> Result<()>;
    fn delete_subcategory(&self, id: SubcategoryId) -> Result<()>;
    fn list_products(&self, query: &ProductQuery) -> Result<ProductPage>;
    fn create_product(&self, payload: &ProductPayload) -> Result<()>;
    fn update_product(&self, id: ProductId, payload: &ProductPayload) -> Result<()>;
    fn delete_product(&self, id: ProductId) -> Result<()>;
    /// Stores an image and returns its server-relative path.
    fn upload_image(&self, image: &ImageUpload) -> Result<String>;
    fn delete_image(&self, file_name: &str) -> Result<()>;
}
