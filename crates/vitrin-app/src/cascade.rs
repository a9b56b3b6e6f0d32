// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Parent/child option derivation between categories and subcategories.

use crate::{Category, CategoryId, LocalizedNames, Locale, Subcategory, SubcategoryId};

/// Subcategories whose parent is `category_id`, in collection order. No
/// category means no options.
pub fn subcategories_for(
    category_id: Option<CategoryId>,
    all_subcategories: &[Subcategory],
) -> Vec<&Subcategory> {
    let Some(category_id) = category_id else {
        return Vec::new();
    };
    all_subcategories
        .iter()
        .filter(|sub| sub.category_id == category_id)
        .collect()
}

/// Keeps `previous` only while it is still one of `options`.
pub fn reconcile(
    previous: Option<SubcategoryId>,
    options: &[&Subcategory],
) -> Option<SubcategoryId> {
    let previous = previous?;
    options
        .iter()
        .any(|sub| sub.id == previous)
        .then_some(previous)
}

/// True when `subcategory_id` names a subcategory under `category_id`.
pub fn belongs_to(
    subcategory_id: SubcategoryId,
    category_id: CategoryId,
    all_subcategories: &[Subcategory],
) -> bool {
    all_subcategories
        .iter()
        .any(|sub| sub.id == subcategory_id && sub.category_id == category_id)
}

/// Display name of a referenced category, found by scanning the collection.
pub fn category_label(category_id: CategoryId, categories: &[Category]) -> String {
    categories
        .iter()
        .find(|category| category.id == category_id)
        .map(|category| category.name(Locale::Az).to_owned())
        .unwrap_or_else(|| format!("#{category_id}"))
}

pub fn subcategory_label(subcategory_id: SubcategoryId, subcategories: &[Subcategory]) -> String {
    subcategories
        .iter()
        .find(|sub| sub.id == subcategory_id)
        .map(|sub| sub.name(Locale::Az).to_owned())
        .unwrap_or_else(|| format!("#{subcategory_id}"))
}

#[cfg(test)]
mod tests {
    use super::{belongs_to, category_label, reconcile, subcategories_for};
    use crate::{Category, CategoryId, Subcategory, SubcategoryId};

    fn sub(id: i64, category_id: i64) -> Subcategory {
        Subcategory {
            id: SubcategoryId::new(id),
            name_az: format!("alt {id}"),
            name_en: format!("sub {id}"),
            name_ru: format!("под {id}"),
            category_id: CategoryId::new(category_id),
        }
    }

    #[test]
    fn options_contain_exactly_the_children_of_the_category() {
        let all = vec![sub(1, 1), sub(2, 2), sub(3, 1), sub(4, 3)];
        for category in 1..=3 {
            let options = subcategories_for(Some(CategoryId::new(category)), &all);
            for candidate in &all {
                let listed = options.iter().any(|option| option.id == candidate.id);
                assert_eq!(listed, candidate.category_id.get() == category);
            }
        }
        let ids: Vec<i64> = subcategories_for(Some(CategoryId::new(1)), &all)
            .iter()
            .map(|option| option.id.get())
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn no_category_yields_no_options() {
        let all = vec![sub(1, 1)];
        assert!(subcategories_for(None, &all).is_empty());
    }

    #[test]
    fn reconcile_keeps_only_listed_selection() {
        let all = vec![sub(1, 1), sub(2, 2), sub(3, 1)];
        let options = subcategories_for(Some(CategoryId::new(1)), &all);
        assert_eq!(
            reconcile(Some(SubcategoryId::new(3)), &options),
            Some(SubcategoryId::new(3))
        );
        assert_eq!(reconcile(Some(SubcategoryId::new(2)), &options), None);
        assert_eq!(reconcile(None, &options), None);
    }

    #[test]
    fn belongs_to_checks_parent() {
        let all = vec![sub(1, 1), sub(2, 2)];
        assert!(belongs_to(SubcategoryId::new(1), CategoryId::new(1), &all));
        assert!(!belongs_to(SubcategoryId::new(2), CategoryId::new(1), &all));
        assert!(!belongs_to(SubcategoryId::new(9), CategoryId::new(1), &all));
    }

    #[test]
    fn category_label_falls_back_to_id() {
        let categories = vec![Category {
            id: CategoryId::new(1),
            name_az: "İçkilər".to_owned(),
            name_en: "Drinks".to_owned(),
            name_ru: "Напитки".to_owned(),
            img: Vec::new(),
        }];
        assert_eq!(category_label(CategoryId::new(1), &categories), "İçkilər");
        assert_eq!(category_label(CategoryId::new(5), &categories), "#5");
    }
}
