// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::listing::Pagination;
use crate::{Category, CategoryId, Product, ProductId, Subcategory, SubcategoryId};

/// Last-fetched collections. Records reference each other by id only; lookups
/// scan the collections.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntityStore {
    pub categories: Vec<Category>,
    pub subcategories: Vec<Subcategory>,
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

impl EntityStore {
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|category| category.id == id)
    }

    pub fn subcategory(&self, id: SubcategoryId) -> Option<&Subcategory> {
        self.subcategories.iter().find(|sub| sub.id == id)
    }

    pub fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    pub fn replace_categories(&mut self, categories: Vec<Category>) {
        self.categories = categories;
    }

    pub fn replace_subcategories(&mut self, subcategories: Vec<Subcategory>) {
        self.subcategories = subcategories;
    }

    pub fn replace_products(&mut self, products: Vec<Product>, pagination: Pagination) {
        self.products = products;
        self.pagination = pagination;
    }
}
