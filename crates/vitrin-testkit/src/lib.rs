// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;
use vitrin_app::{
    CatalogBackend, Category, CategoryId, CategoryPayload, ImageUpload, Product, ProductId,
    ProductPage, ProductPayload, ProductQuery, Subcategory, SubcategoryId, SubcategoryPayload,
};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEMO_IMAGE_ORIGIN: &str = "https://demo.vitrin.local";

const DEMO_CATEGORIES: [(&str, &str, &str); 4] = [
    ("Kofe", "Coffee", "Кофе"),
    ("Çay", "Tea", "Чай"),
    ("Desertlər", "Desserts", "Десерты"),
    ("Sərinləşdirici", "Cold drinks", "Прохладительные"),
];

const DEMO_SUBCATEGORIES: [(usize, &str, &str, &str); 8] = [
    (0, "İsti kofe", "Hot coffee", "Горячий кофе"),
    (0, "Soyuq kofe", "Iced coffee", "Холодный кофе"),
    (1, "Qara çay", "Black tea", "Чёрный чай"),
    (1, "Yaşıl çay", "Green tea", "Зелёный чай"),
    (2, "Tortlar", "Cakes", "Торты"),
    (2, "Peçenyelər", "Cookies", "Печенье"),
    (3, "Limonadlar", "Lemonades", "Лимонады"),
    (3, "Kokteyllər", "Smoothies", "Смузи"),
];

const DEMO_PRODUCTS: [(usize, &str, &str, &str); 24] = [
    (0, "Amerikano", "Americano", "Американо"),
    (0, "Kapuçino", "Cappuccino", "Капучино"),
    (0, "Kofe latte", "Latte", "Латте"),
    (0, "Espresso", "Espresso", "Эспрессо"),
    (1, "Soyuq latte", "Iced latte", "Айс латте"),
    (1, "Frappe kofe", "Frappe", "Фраппе"),
    (1, "Soyuq dəmləmə", "Cold brew", "Колд брю"),
    (2, "Erl Qrey", "Earl Grey", "Эрл Грей"),
    (2, "Azərbaycan çayı", "Azerbaijani tea", "Азербайджанский чай"),
    (2, "Limonlu çay", "Lemon tea", "Чай с лимоном"),
    (3, "Sencha", "Sencha", "Сенча"),
    (3, "Matça", "Matcha", "Матча"),
    (4, "Şokoladlı tort", "Chocolate cake", "Шоколадный торт"),
    (4, "Çizkeyk", "Cheesecake", "Чизкейк"),
    (4, "Tiramisu", "Tiramisu", "Тирамису"),
    (4, "Medovik", "Honey cake", "Медовик"),
    (5, "Şəkərbura", "Shakarbura", "Шекербура"),
    (5, "Paxlava", "Baklava", "Пахлава"),
    (5, "Kofe peçenyesi", "Coffee cookie", "Кофейное печенье"),
    (6, "Nanəli limonad", "Mint lemonade", "Мятный лимонад"),
    (6, "Çiyələk limonadı", "Strawberry lemonade", "Клубничный лимонад"),
    (7, "Banan kokteyli", "Banana smoothie", "Банановый смузи"),
    (7, "Meşə meyvələri", "Berry smoothie", "Ягодный смузи"),
    (7, "Manqo kokteyli", "Mango smoothie", "Манговый смузи"),
];

const DEMO_SIZES: [&[&str]; 3] = [&["S", "M", "L"], &["250ml", "400ml"], &[]];

/// Remote call kinds recorded by [`MemoryCatalog`] and used to target
/// injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListCategories,
    ListSubcategories,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    CreateSubcategory,
    UpdateSubcategory,
    DeleteSubcategory,
    ListProducts,
    CreateProduct,
    UpdateProduct,
    DeleteProduct,
    UploadImage,
    DeleteImage,
}

#[derive(Debug, Default)]
struct CatalogState {
    categories: BTreeMap<CategoryId, Category>,
    subcategories: BTreeMap<SubcategoryId, Subcategory>,
    products: BTreeMap<ProductId, Product>,
    images: BTreeMap<String, ImageUpload>,
    next_id: i64,
    page_size: usize,
    journal: Vec<Operation>,
    product_queries: Vec<ProductQuery>,
    failures: HashMap<Operation, String>,
    keep_upload_names: bool,
}

impl CatalogState {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn record(&mut self, operation: Operation) -> Result<()> {
        self.journal.push(operation);
        if let Some(message) = self.failures.remove(&operation) {
            bail!("server error (500): {message}");
        }
        Ok(())
    }

    fn ensure_placement(
        &self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
    ) -> Result<()> {
        if !self.categories.contains_key(&category_id) {
            bail!("server error (400): category {category_id} does not exist");
        }
        let Some(subcategory) = self.subcategories.get(&subcategory_id) else {
            bail!("server error (400): subcategory {subcategory_id} does not exist");
        };
        if subcategory.category_id != category_id {
            bail!(
                "server error (400): subcategory {subcategory_id} is not in category {category_id}"
            );
        }
        Ok(())
    }
}

/// In-process catalog server. Clones share one store, so a test can keep a
/// handle while the console owns another.
#[derive(Debug, Clone)]
pub struct MemoryCatalog {
    state: Arc<Mutex<CatalogState>>,
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl MemoryCatalog {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(CatalogState {
                page_size: page_size.max(1),
                ..CatalogState::default()
            })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, CatalogState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory catalog lock poisoned"))
    }

    pub fn insert_category(&self, names: [&str; 3]) -> Result<CategoryId> {
        let mut state = self.lock()?;
        let id = CategoryId::new(state.allocate_id());
        let [name_az, name_en, name_ru] = names.map(str::to_owned);
        state.categories.insert(
            id,
            Category {
                id,
                name_az,
                name_en,
                name_ru,
                img: Vec::new(),
            },
        );
        Ok(id)
    }

    pub fn insert_subcategory(
        &self,
        category_id: CategoryId,
        names: [&str; 3],
    ) -> Result<SubcategoryId> {
        let mut state = self.lock()?;
        let id = SubcategoryId::new(state.allocate_id());
        let [name_az, name_en, name_ru] = names.map(str::to_owned);
        state.subcategories.insert(
            id,
            Subcategory {
                id,
                name_az,
                name_en,
                name_ru,
                category_id,
            },
        );
        Ok(id)
    }

    /// Stores `payload` as-is under a fresh id, skipping placement checks.
    pub fn insert_product(&self, payload: ProductPayload) -> Result<ProductId> {
        let mut state = self.lock()?;
        let id = ProductId::new(state.allocate_id());
        state.products.insert(id, payload.into_product(id));
        Ok(id)
    }

    pub fn product(&self, id: ProductId) -> Result<Option<Product>> {
        Ok(self.lock()?.products.get(&id).cloned())
    }

    pub fn category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.lock()?.categories.get(&id).cloned())
    }

    pub fn product_count(&self) -> Result<usize> {
        Ok(self.lock()?.products.len())
    }

    pub fn image_paths(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.images.keys().cloned().collect())
    }

    pub fn journal(&self) -> Result<Vec<Operation>> {
        Ok(self.lock()?.journal.clone())
    }

    pub fn product_queries(&self) -> Result<Vec<ProductQuery>> {
        Ok(self.lock()?.product_queries.clone())
    }

    pub fn clear_journal(&self) -> Result<()> {
        let mut state = self.lock()?;
        state.journal.clear();
        state.product_queries.clear();
        Ok(())
    }

    /// Makes the next call of `operation` fail with `message`.
    pub fn fail_next(&self, operation: Operation, message: &str) -> Result<()> {
        self.lock()?.failures.insert(operation, message.to_owned());
        Ok(())
    }

    /// Stores later uploads under their original file name, so uploading the
    /// same name twice returns the same path.
    pub fn keep_upload_names(&self) -> Result<()> {
        self.lock()?.keep_upload_names = true;
        Ok(())
    }
}

impl CatalogBackend for MemoryCatalog {
    fn list_categories(&self) -> Result<Vec<Category>> {
        let mut state = self.lock()?;
        state.record(Operation::ListCategories)?;
        Ok(state.categories.values().cloned().collect())
    }

    fn list_subcategories(&self) -> Result<Vec<Subcategory>> {
        let mut state = self.lock()?;
        state.record(Operation::ListSubcategories)?;
        Ok(state.subcategories.values().cloned().collect())
    }

    fn create_category(&self, payload: &CategoryPayload) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::CreateCategory)?;
        let id = CategoryId::new(state.allocate_id());
        state.categories.insert(id, payload.clone().into_category(id));
        debug!(id = id.get(), "memory catalog created category");
        Ok(())
    }

    fn update_category(&self, id: CategoryId, payload: &CategoryPayload) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::UpdateCategory)?;
        let Some(slot) = state.categories.get_mut(&id) else {
            bail!("server error (404): category {id} not found");
        };
        *slot = payload.clone().into_category(id);
        Ok(())
    }

    fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::DeleteCategory)?;
        state
            .categories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("server error (404): category {id} not found"))
    }

    fn create_subcategory(&self, payload: &SubcategoryPayload) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::CreateSubcategory)?;
        if !state.categories.contains_key(&payload.category_id) {
            bail!(
                "server error (400): category {} does not exist",
                payload.category_id
            );
        }
        let id = SubcategoryId::new(state.allocate_id());
        state
            .subcategories
            .insert(id, payload.clone().into_subcategory(id));
        Ok(())
    }

    fn update_subcategory(&self, id: SubcategoryId, payload: &SubcategoryPayload) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::UpdateSubcategory)?;
        let Some(slot) = state.subcategories.get_mut(&id) else {
            bail!("server error (404): subcategory {id} not found");
        };
        *slot = payload.clone().into_subcategory(id);
        Ok(())
    }

    fn delete_subcategory(&self, id: SubcategoryId) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::DeleteSubcategory)?;
        state
            .subcategories
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("server error (404): subcategory {id} not found"))
    }

    fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let mut state = self.lock()?;
        state.record(Operation::ListProducts)?;
        state.product_queries.push(*query);
        let matching: Vec<&Product> = state
            .products
            .values()
            .filter(|product| {
                query
                    .category_id
                    .is_none_or(|category_id| product.category_id == category_id)
            })
            .filter(|product| {
                query
                    .subcategory_id
                    .is_none_or(|subcategory_id| product.subcategory_id == subcategory_id)
            })
            .collect();
        let total_pages = matching.len().div_ceil(state.page_size);
        let skip = (query.page.max(1) as usize - 1) * state.page_size;
        let items = matching
            .into_iter()
            .skip(skip)
            .take(state.page_size)
            .cloned()
            .collect();
        Ok(ProductPage {
            items,
            total_pages: u32::try_from(total_pages).context("page count overflow")?,
        })
    }

    fn create_product(&self, payload: &ProductPayload) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::CreateProduct)?;
        state.ensure_placement(payload.category_id, payload.subcategory_id)?;
        let id = ProductId::new(state.allocate_id());
        state.products.insert(id, payload.clone().into_product(id));
        debug!(id = id.get(), "memory catalog created product");
        Ok(())
    }

    fn update_product(&self, id: ProductId, payload: &ProductPayload) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::UpdateProduct)?;
        if !state.products.contains_key(&id) {
            bail!("server error (404): product {id} not found");
        }
        state.ensure_placement(payload.category_id, payload.subcategory_id)?;
        state.products.insert(id, payload.clone().into_product(id));
        Ok(())
    }

    fn delete_product(&self, id: ProductId) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::DeleteProduct)?;
        state
            .products
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| anyhow!("server error (404): product {id} not found"))
    }

    fn upload_image(&self, image: &ImageUpload) -> Result<String> {
        let mut state = self.lock()?;
        state.record(Operation::UploadImage)?;
        let path = if state.keep_upload_names {
            format!("/uploads/{}", image.file_name)
        } else {
            let id = state.allocate_id();
            format!("/uploads/{id}-{}", image.file_name)
        };
        state.images.insert(path.clone(), image.clone());
        Ok(path)
    }

    fn delete_image(&self, file_name: &str) -> Result<()> {
        let mut state = self.lock()?;
        state.record(Operation::DeleteImage)?;
        let Some(path) = state
            .images
            .keys()
            .find(|path| path.rsplit('/').next() == Some(file_name))
            .cloned()
        else {
            bail!("server error (404): image {file_name} not found");
        };
        state.images.remove(&path);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Generates reproducible product records for the demo catalog.
#[derive(Debug, Clone)]
pub struct CatalogFaker {
    rng: DeterministicRng,
}

impl CatalogFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    /// A price between 1.50 and 14.95 in steps of 0.05.
    pub fn price(&mut self) -> Decimal {
        let steps = self.rng.int_n(270) as i64;
        Decimal::new(150 + steps * 5, 2)
    }

    pub fn product(
        &mut self,
        names: [&str; 3],
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
    ) -> ProductPayload {
        let [name_az, name_en, name_ru] = names.map(str::to_owned);
        let sizes = DEMO_SIZES[self.rng.int_n(DEMO_SIZES.len())]
            .iter()
            .map(|size| (*size).to_owned())
            .collect();
        ProductPayload {
            description_az: format!("{name_az} təzə hazırlanır"),
            description_en: format!("{name_en}, freshly made"),
            description_ru: format!("{name_ru}, свежее приготовление"),
            name_az,
            name_en,
            name_ru,
            category_id,
            subcategory_id,
            price: self.price(),
            ingredients: vec!["kofe".to_owned()],
            sizes,
            status: self.rng.int_n(5) != 0,
            in_stock: self.rng.int_n(4) != 0,
            img: Vec::new(),
        }
    }
}

/// A catalog seeded with the fixed demo menu: four categories with two
/// subcategories each, plus 37 products paged at `page_size`.
pub fn demo_catalog(page_size: usize) -> Result<MemoryCatalog> {
    let catalog = MemoryCatalog::with_page_size(page_size);
    let mut faker = CatalogFaker::new(42);

    let mut categories = Vec::with_capacity(DEMO_CATEGORIES.len());
    for (az, en, ru) in DEMO_CATEGORIES {
        categories.push(catalog.insert_category([az, en, ru])?);
    }

    let mut placements = Vec::with_capacity(DEMO_SUBCATEGORIES.len());
    for (category_index, az, en, ru) in DEMO_SUBCATEGORIES {
        let category_id = categories[category_index];
        let subcategory_id = catalog.insert_subcategory(category_id, [az, en, ru])?;
        placements.push((category_id, subcategory_id));
    }

    let variants = [("", "", ""), (" (böyük)", " (large)", " (большой)")];
    for (round, (az_suffix, en_suffix, ru_suffix)) in variants.into_iter().enumerate() {
        for (subcategory_index, az, en, ru) in DEMO_PRODUCTS {
            // Every other subcategory gets a large variant.
            if round == 1 && subcategory_index % 2 == 1 {
                continue;
            }
            let (category_id, subcategory_id) = placements[subcategory_index];
            let name_az = format!("{az}{az_suffix}");
            let name_en = format!("{en}{en_suffix}");
            let name_ru = format!("{ru}{ru_suffix}");
            let payload =
                faker.product([&name_az, &name_en, &name_ru], category_id, subcategory_id);
            catalog.insert_product(payload)?;
        }
    }
    catalog.clear_journal()?;
    Ok(catalog)
}

/// Writes `data` to a file named `file_name` inside a fresh temp directory.
pub fn temp_image_file(file_name: &str, data: &[u8]) -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join(file_name);
    std::fs::write(&path, data).with_context(|| format!("write {}", path.display()))?;
    Ok((dir, path))
}

#[cfg(test)]
mod tests {
    use super::{CatalogFaker, MemoryCatalog, Operation, demo_catalog};
    use rust_decimal::Decimal;
    use vitrin_app::{CatalogBackend, ProductQuery};

    #[test]
    fn faker_is_deterministic() {
        let mut left = CatalogFaker::new(7);
        let mut right = CatalogFaker::new(7);
        assert_eq!(left.price(), right.price());
    }

    #[test]
    fn faker_prices_stay_in_range() {
        let mut faker = CatalogFaker::new(3);
        for _ in 0..200 {
            let price = faker.price();
            assert!(price >= Decimal::new(150, 2));
            assert!(price <= Decimal::new(1495, 2));
        }
    }

    #[test]
    fn demo_catalog_pages_products() {
        let catalog = demo_catalog(10).expect("demo catalog");
        assert_eq!(catalog.product_count().expect("count"), 37);

        let first = catalog
            .list_products(&ProductQuery::default())
            .expect("first page");
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 4);

        let last = catalog
            .list_products(&ProductQuery {
                page: 4,
                ..ProductQuery::default()
            })
            .expect("last page");
        assert_eq!(last.items.len(), 7);
    }

    #[test]
    fn demo_subcategories_belong_to_their_categories() {
        let catalog = demo_catalog(10).expect("demo catalog");
        let subcategories = catalog.list_subcategories().expect("subcategories");
        let categories = catalog.list_categories().expect("categories");
        assert_eq!(categories.len(), 4);
        assert_eq!(subcategories.len(), 8);
        for sub in &subcategories {
            assert!(categories.iter().any(|category| category.id == sub.category_id));
        }
    }

    #[test]
    fn injected_failure_fires_once() {
        let catalog = MemoryCatalog::default();
        catalog
            .fail_next(Operation::ListCategories, "boom")
            .expect("inject failure");

        let error = catalog.list_categories().expect_err("first call fails");
        assert_eq!(error.to_string(), "server error (500): boom");
        assert!(catalog.list_categories().expect("second call").is_empty());
        assert_eq!(
            catalog.journal().expect("journal"),
            vec![Operation::ListCategories, Operation::ListCategories]
        );
    }
}
