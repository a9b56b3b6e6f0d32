// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::cascade::{belongs_to, reconcile, subcategories_for};
use crate::{
    AdminView, Category, CategoryId, CategoryPayload, EntityPayload, Locale, Product,
    ProductPayload, Subcategory, SubcategoryId, SubcategoryPayload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Category,
    Subcategory,
    Product,
}

impl FormKind {
    pub const fn for_view(view: AdminView) -> Self {
        match view {
            AdminView::Products => Self::Product,
            AdminView::Categories => Self::Category,
            AdminView::Subcategories => Self::Subcategory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CategoryFormInput {
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    pub images: Vec<String>,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubcategoryFormInput {
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    pub category_id: Option<CategoryId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFormInput {
    pub name_az: String,
    pub name_en: String,
    pub name_ru: String,
    pub description_az: String,
    pub description_en: String,
    pub description_ru: String,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub price: String,
    /// Not editable in the form; carried through so updates send the full
    /// record.
    pub ingredients: Vec<String>,
    pub sizes: String,
    pub status: bool,
    pub in_stock: bool,
    pub images: Vec<String>,
    pub image_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPayload {
    Category(CategoryFormInput),
    Subcategory(SubcategoryFormInput),
    Product(ProductFormInput),
}

impl FormPayload {
    pub fn kind(&self) -> FormKind {
        match self {
            Self::Category(_) => FormKind::Category,
            Self::Subcategory(_) => FormKind::Subcategory,
            Self::Product(_) => FormKind::Product,
        }
    }

    pub fn blank_for(kind: FormKind, default_ingredients: &[String]) -> Self {
        match kind {
            FormKind::Category => Self::Category(CategoryFormInput::default()),
            FormKind::Subcategory => Self::Subcategory(SubcategoryFormInput::default()),
            FormKind::Product => Self::Product(ProductFormInput {
                name_az: String::new(),
                name_en: String::new(),
                name_ru: String::new(),
                description_az: String::new(),
                description_en: String::new(),
                description_ru: String::new(),
                category_id: None,
                subcategory_id: None,
                price: String::new(),
                ingredients: default_ingredients.to_vec(),
                sizes: String::new(),
                status: true,
                in_stock: false,
                images: Vec::new(),
                image_path: String::new(),
            }),
        }
    }

    pub fn from_category(category: &Category) -> Self {
        Self::Category(CategoryFormInput {
            name_az: category.name_az.clone(),
            name_en: category.name_en.clone(),
            name_ru: category.name_ru.clone(),
            images: category.img.clone(),
            image_path: String::new(),
        })
    }

    pub fn from_subcategory(subcategory: &Subcategory) -> Self {
        Self::Subcategory(SubcategoryFormInput {
            name_az: subcategory.name_az.clone(),
            name_en: subcategory.name_en.clone(),
            name_ru: subcategory.name_ru.clone(),
            category_id: Some(subcategory.category_id),
        })
    }

    pub fn from_product(product: &Product) -> Self {
        Self::Product(ProductFormInput {
            name_az: product.name_az.clone(),
            name_en: product.name_en.clone(),
            name_ru: product.name_ru.clone(),
            description_az: product.description_az.clone(),
            description_en: product.description_en.clone(),
            description_ru: product.description_ru.clone(),
            category_id: Some(product.category_id),
            subcategory_id: Some(product.subcategory_id),
            price: product.price.normalize().to_string(),
            ingredients: product.ingredients.clone(),
            sizes: product.sizes.join(","),
            status: product.status,
            in_stock: product.in_stock,
            images: product.img.clone(),
            image_path: String::new(),
        })
    }

    /// Local path of a newly chosen image, if any.
    pub fn image_path(&self) -> Option<&str> {
        let path = match self {
            Self::Category(category) => category.image_path.trim(),
            Self::Subcategory(_) => "",
            Self::Product(product) => product.image_path.trim(),
        };
        (!path.is_empty()).then_some(path)
    }

    pub fn validate(&self) -> Result<()> {
        self.to_entity_payload().map(|_| ())
    }

    /// Validates the form and builds the complete request body.
    pub fn to_entity_payload(&self) -> Result<EntityPayload> {
        match self {
            Self::Category(category) => category.to_payload().map(EntityPayload::Category),
            Self::Subcategory(subcategory) => {
                subcategory.to_payload().map(EntityPayload::Subcategory)
            }
            Self::Product(product) => product.to_payload().map(EntityPayload::Product),
        }
    }
}

fn require_names(entity: &str, names: [&str; 3]) -> Result<()> {
    for (locale, name) in Locale::ALL.iter().zip(names) {
        if name.trim().is_empty() {
            bail!(
                "{entity} name ({}) is required -- enter a name and retry",
                locale.as_str()
            );
        }
    }
    Ok(())
}

impl CategoryFormInput {
    pub fn to_payload(&self) -> Result<CategoryPayload> {
        require_names("category", [&self.name_az, &self.name_en, &self.name_ru])?;
        Ok(CategoryPayload {
            name_az: self.name_az.trim().to_owned(),
            name_en: self.name_en.trim().to_owned(),
            name_ru: self.name_ru.trim().to_owned(),
            img: self.images.clone(),
        })
    }
}

impl SubcategoryFormInput {
    pub fn to_payload(&self) -> Result<SubcategoryPayload> {
        require_names("subcategory", [&self.name_az, &self.name_en, &self.name_ru])?;
        let Some(category_id) = self.category_id else {
            bail!("subcategory category is required -- choose a category and retry");
        };
        Ok(SubcategoryPayload {
            name_az: self.name_az.trim().to_owned(),
            name_en: self.name_en.trim().to_owned(),
            name_ru: self.name_ru.trim().to_owned(),
            category_id,
        })
    }
}

impl ProductFormInput {
    /// Changes the form's category and drops a subcategory that no longer
    /// belongs to it.
    pub fn select_category(&mut self, category_id: Option<CategoryId>, all: &[Subcategory]) {
        self.category_id = category_id;
        let options = subcategories_for(category_id, all);
        self.subcategory_id = reconcile(self.subcategory_id, &options);
    }

    pub fn subcategory_options<'a>(&self, all: &'a [Subcategory]) -> Vec<&'a Subcategory> {
        subcategories_for(self.category_id, all)
    }

    /// Checks the subcategory/category pairing against the known collection.
    pub fn validate_against(&self, all: &[Subcategory]) -> Result<()> {
        if let (Some(category_id), Some(subcategory_id)) = (self.category_id, self.subcategory_id)
            && !belongs_to(subcategory_id, category_id, all)
        {
            bail!(
                "subcategory {subcategory_id} does not belong to category {category_id} -- \
                 choose a subcategory from the list"
            );
        }
        Ok(())
    }

    pub fn parsed_sizes(&self) -> Vec<String> {
        self.sizes
            .split(',')
            .map(str::trim)
            .filter(|size| !size.is_empty())
            .map(str::to_owned)
            .collect()
    }

    pub fn to_payload(&self) -> Result<ProductPayload> {
        require_names("product", [&self.name_az, &self.name_en, &self.name_ru])?;
        let Some(category_id) = self.category_id else {
            bail!("product category is required -- choose a category and retry");
        };
        let Some(subcategory_id) = self.subcategory_id else {
            bail!("product subcategory is required -- choose a subcategory and retry");
        };
        let raw_price = self.price.trim();
        if raw_price.is_empty() {
            bail!("product price is required -- enter a price and retry");
        }
        let price = Decimal::from_str(raw_price)
            .with_context(|| format!("product price {raw_price:?} is not a number"))?;
        if price.is_sign_negative() {
            bail!("product price cannot be negative");
        }

        Ok(ProductPayload {
            name_az: self.name_az.trim().to_owned(),
            name_en: self.name_en.trim().to_owned(),
            name_ru: self.name_ru.trim().to_owned(),
            description_az: self.description_az.clone(),
            description_en: self.description_en.clone(),
            description_ru: self.description_ru.clone(),
            category_id,
            subcategory_id,
            price,
            ingredients: self.ingredients.clone(),
            sizes: self.parsed_sizes(),
            status: self.status,
            in_stock: self.in_stock,
            img: self.images.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{FormKind, FormPayload, ProductFormInput, SubcategoryFormInput};
    use crate::{
        CategoryId, EntityPayload, Product, ProductId, Subcategory, SubcategoryId,
    };
    use rust_decimal::Decimal;

    fn sub(id: i64, category_id: i64) -> Subcategory {
        Subcategory {
            id: SubcategoryId::new(id),
            name_az: format!("alt {id}"),
            name_en: format!("sub {id}"),
            name_ru: format!("под {id}"),
            category_id: CategoryId::new(category_id),
        }
    }

    fn filled_product_form() -> ProductFormInput {
        let FormPayload::Product(mut form) =
            FormPayload::blank_for(FormKind::Product, &["kofe".to_owned()])
        else {
            panic!("product form expected");
        };
        form.name_az = "Latte".to_owned();
        form.name_en = "Latte".to_owned();
        form.name_ru = "Латте".to_owned();
        form.category_id = Some(CategoryId::new(1));
        form.subcategory_id = Some(SubcategoryId::new(1));
        form.price = "4.50".to_owned();
        form.sizes = " S, M ,,L".to_owned();
        form
    }

    #[test]
    fn blank_product_form_carries_default_ingredients() {
        let form = filled_product_form();
        assert_eq!(form.ingredients, vec!["kofe".to_owned()]);
        assert!(form.status);
        assert!(!form.in_stock);
    }

    #[test]
    fn product_payload_parses_price_and_sizes() {
        let payload = filled_product_form().to_payload().expect("valid form");
        assert_eq!(payload.price, Decimal::new(450, 2));
        assert_eq!(payload.sizes, vec!["S", "M", "L"]);
        assert_eq!(payload.ingredients, vec!["kofe".to_owned()]);
    }

    #[test]
    fn product_validation_rejects_missing_name_and_bad_price() {
        let mut form = filled_product_form();
        form.name_ru = "  ".to_owned();
        let error = form.to_payload().expect_err("blank ru name");
        assert!(error.to_string().contains("(ru)"));

        let mut form = filled_product_form();
        form.price = "abc".to_owned();
        assert!(form.to_payload().is_err());

        let mut form = filled_product_form();
        form.price = "-1".to_owned();
        let error = form.to_payload().expect_err("negative price");
        assert!(error.to_string().contains("negative"));
    }

    #[test]
    fn subcategory_without_category_is_rejected() {
        let payload = FormPayload::Subcategory(SubcategoryFormInput {
            name_az: "Isti".to_owned(),
            name_en: "Hot".to_owned(),
            name_ru: "Горячие".to_owned(),
            category_id: None,
        });
        let error = payload.validate().expect_err("category required");
        assert!(error.to_string().contains("choose a category"));
    }

    #[test]
    fn category_change_in_form_reconciles_subcategory() {
        let all = vec![sub(1, 1), sub(2, 2), sub(3, 1)];
        let mut form = filled_product_form();
        form.select_category(Some(CategoryId::new(1)), &all);
        assert_eq!(form.subcategory_id, Some(SubcategoryId::new(1)));
        form.select_category(Some(CategoryId::new(2)), &all);
        assert_eq!(form.subcategory_id, None);
        assert_eq!(form.subcategory_options(&all).len(), 1);
    }

    #[test]
    fn editing_keeps_current_subcategory_in_options() {
        let all = vec![sub(1, 1), sub(4, 2)];
        let product = Product {
            id: ProductId::new(9),
            name_az: "Mocha".to_owned(),
            name_en: "Mocha".to_owned(),
            name_ru: "Мокко".to_owned(),
            description_az: String::new(),
            description_en: String::new(),
            description_ru: String::new(),
            category_id: CategoryId::new(2),
            subcategory_id: SubcategoryId::new(4),
            price: Decimal::new(55, 1),
            ingredients: vec!["kofe".to_owned(), "şokolad".to_owned()],
            sizes: vec!["M".to_owned()],
            status: false,
            in_stock: true,
            img: vec!["https://cdn.example/mocha.png".to_owned()],
        };
        let FormPayload::Product(form) = FormPayload::from_product(&product) else {
            panic!("product form expected");
        };
        let options = form.subcategory_options(&all);
        assert!(options.iter().any(|option| option.id == product.subcategory_id));
        assert!(form.validate_against(&all).is_ok());

        let EntityPayload::Product(payload) = FormPayload::Product(form)
            .to_entity_payload()
            .expect("unchanged form is valid")
        else {
            panic!("product payload expected");
        };
        assert_eq!(payload, product.to_payload());
    }

    #[test]
    fn cross_entity_pairing_is_checked() {
        let all = vec![sub(1, 1), sub(2, 2)];
        let mut form = filled_product_form();
        form.subcategory_id = Some(SubcategoryId::new(2));
        assert!(form.validate_against(&all).is_err());
    }

    #[test]
    fn image_path_is_only_reported_when_set() {
        let mut payload = FormPayload::blank_for(FormKind::Category, &[]);
        assert_eq!(payload.image_path(), None);
        if let FormPayload::Category(category) = &mut payload {
            category.image_path = " /tmp/cat.png ".to_owned();
        }
        assert_eq!(payload.image_path(), Some("/tmp/cat.png"));
    }
}
