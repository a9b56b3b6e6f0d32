// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::cascade::{reconcile, subcategories_for};
use crate::{
    Category, CategoryId, LocalizedNames, Product, Subcategory, SubcategoryId,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub search: String,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub page: u32,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            category_id: None,
            subcategory_id: None,
            search: String::new(),
            min_price: None,
            max_price: None,
            page: 1,
        }
    }
}

/// Why a list is being fetched. Variant order is the precedence used when
/// several filter fields change in one action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RefetchReason {
    CategoryChanged,
    SubcategoryChanged,
    PageChanged,
    MutationApplied,
    Refresh,
    ViewOpened,
}

impl RefetchReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CategoryChanged => "category_changed",
            Self::SubcategoryChanged => "subcategory_changed",
            Self::PageChanged => "page_changed",
            Self::MutationApplied => "mutation_applied",
            Self::Refresh => "refresh",
            Self::ViewOpened => "view_opened",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterCommand {
    SelectCategory(Option<CategoryId>),
    SelectSubcategory(Option<SubcategoryId>),
    SetSearch(String),
    SetMinPrice(Option<Decimal>),
    SetMaxPrice(Option<Decimal>),
    NextPage { total_pages: u32 },
    PrevPage,
    Reset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChange {
    pub state: FilterState,
    pub refetch: Option<RefetchReason>,
}

/// Derives the filter state that results from a user moving `previous` to
/// `next`, and whether the server-side list must be fetched again.
///
/// A category change always clears the subcategory and returns to page 1. A
/// subcategory that does not belong to the selected category is dropped, and
/// a subcategory change also returns to page 1.
pub fn on_filter_changed(
    previous: &FilterState,
    next: FilterState,
    subcategories: &[Subcategory],
) -> FilterChange {
    let mut state = next;
    let category_changed = state.category_id != previous.category_id;
    if category_changed {
        state.subcategory_id = None;
        state.page = 1;
    } else {
        let options = subcategories_for(state.category_id, subcategories);
        state.subcategory_id = reconcile(state.subcategory_id, &options);
        if state.subcategory_id != previous.subcategory_id {
            state.page = 1;
        }
    }
    state.page = state.page.max(1);

    let refetch = if category_changed {
        Some(RefetchReason::CategoryChanged)
    } else if state.subcategory_id != previous.subcategory_id {
        Some(RefetchReason::SubcategoryChanged)
    } else if state.page != previous.page {
        Some(RefetchReason::PageChanged)
    } else {
        None
    };

    FilterChange { state, refetch }
}

impl FilterState {
    pub fn apply(&self, command: FilterCommand, subcategories: &[Subcategory]) -> FilterChange {
        let mut next = self.clone();
        match command {
            FilterCommand::SelectCategory(category_id) => next.category_id = category_id,
            FilterCommand::SelectSubcategory(subcategory_id) => {
                next.subcategory_id = subcategory_id;
            }
            FilterCommand::SetSearch(search) => next.search = search,
            FilterCommand::SetMinPrice(price) => next.min_price = price,
            FilterCommand::SetMaxPrice(price) => next.max_price = price,
            FilterCommand::NextPage { total_pages } => {
                if self.page < total_pages {
                    next.page = self.page + 1;
                }
            }
            FilterCommand::PrevPage => {
                if self.page > 1 {
                    next.page = self.page - 1;
                }
            }
            FilterCommand::Reset => next = Self::default(),
        }
        on_filter_changed(self, next, subcategories)
    }

    pub fn has_local_refinement(&self) -> bool {
        !self.search.trim().is_empty() || self.min_price.is_some() || self.max_price.is_some()
    }
}

/// Case-insensitive substring match against every locale name. A blank query
/// matches everything.
pub fn matches_search<T: LocalizedNames>(item: &T, search: &str) -> bool {
    let query = search.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    item.names()
        .iter()
        .any(|name| name.to_lowercase().contains(&query))
}

pub fn price_in_range(price: Decimal, min: Option<Decimal>, max: Option<Decimal>) -> bool {
    if let Some(min) = min
        && price < min
    {
        return false;
    }
    if let Some(max) = max
        && price > max
    {
        return false;
    }
    true
}

/// Narrows one fetched product page: category and subcategory guards first,
/// then search, then price range. Never looks beyond `items`.
pub fn visible_products<'a>(items: &'a [Product], filters: &FilterState) -> Vec<&'a Product> {
    items
        .iter()
        .filter(|product| {
            filters
                .category_id
                .is_none_or(|category_id| product.category_id == category_id)
        })
        .filter(|product| {
            filters
                .subcategory_id
                .is_none_or(|subcategory_id| product.subcategory_id == subcategory_id)
        })
        .filter(|product| matches_search(*product, &filters.search))
        .filter(|product| price_in_range(product.price, filters.min_price, filters.max_price))
        .collect()
}

pub fn visible_categories<'a>(items: &'a [Category], filters: &FilterState) -> Vec<&'a Category> {
    items
        .iter()
        .filter(|category| matches_search(*category, &filters.search))
        .collect()
}

pub fn visible_subcategories<'a>(
    items: &'a [Subcategory],
    filters: &FilterState,
) -> Vec<&'a Subcategory> {
    items
        .iter()
        .filter(|sub| {
            filters
                .category_id
                .is_none_or(|category_id| sub.category_id == category_id)
        })
        .filter(|sub| matches_search(*sub, &filters.search))
        .collect()
}

/// Parses a typed price bound; blank input clears the bound.
pub fn parse_price_bound(raw: &str) -> Result<Option<Decimal>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let value = Decimal::from_str(trimmed)
        .with_context(|| format!("invalid price {trimmed:?} -- enter a number like 12.50"))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::{
        FilterCommand, FilterState, RefetchReason, matches_search, on_filter_changed,
        parse_price_bound, visible_products, visible_subcategories,
    };
    use crate::{CategoryId, Product, ProductId, Subcategory, SubcategoryId};
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

    fn product(id: i64, names: [&str; 3], price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name_az: names[0].to_owned(),
            name_en: names[1].to_owned(),
            name_ru: names[2].to_owned(),
            description_az: String::new(),
            description_en: String::new(),
            description_ru: String::new(),
            category_id: CategoryId::new(1),
            subcategory_id: SubcategoryId::new(1),
            price: Decimal::from(price),
            ingredients: vec!["kofe".to_owned()],
            sizes: Vec::new(),
            status: true,
            in_stock: true,
            img: Vec::new(),
        }
    }

    #[test]
    fn category_change_always_clears_subcategory_and_page() {
        let subs = vec![sub(1, 1), sub(2, 2), sub(3, 2)];
        let starting_points = [
            FilterState::default(),
            FilterState {
                category_id: Some(CategoryId::new(1)),
                subcategory_id: Some(SubcategoryId::new(1)),
                page: 4,
                ..FilterState::default()
            },
        ];
        for previous in starting_points {
            let change = previous.apply(
                FilterCommand::SelectCategory(Some(CategoryId::new(2))),
                &subs,
            );
            assert_eq!(change.state.subcategory_id, None);
            assert_eq!(change.state.page, 1);
            assert_eq!(change.refetch, Some(RefetchReason::CategoryChanged));
        }
    }

    #[test]
    fn category_change_wins_over_simultaneous_subcategory_change() {
        let subs = vec![sub(1, 1), sub(2, 2)];
        let previous = FilterState {
            page: 3,
            ..FilterState::default()
        };
        let next = FilterState {
            category_id: Some(CategoryId::new(2)),
            subcategory_id: Some(SubcategoryId::new(2)),
            page: 3,
            ..FilterState::default()
        };
        let change = on_filter_changed(&previous, next, &subs);
        assert_eq!(change.refetch, Some(RefetchReason::CategoryChanged));
        assert_eq!(change.state.subcategory_id, None);
    }

    #[test]
    fn subcategory_change_resets_page_and_requests_fetch() {
        let subs = vec![sub(1, 1), sub(3, 1)];
        let previous = FilterState {
            category_id: Some(CategoryId::new(1)),
            page: 2,
            ..FilterState::default()
        };
        let change = previous.apply(
            FilterCommand::SelectSubcategory(Some(SubcategoryId::new(3))),
            &subs,
        );
        assert_eq!(change.state.subcategory_id, Some(SubcategoryId::new(3)));
        assert_eq!(change.state.page, 1);
        assert_eq!(change.refetch, Some(RefetchReason::SubcategoryChanged));
    }

    #[test]
    fn foreign_subcategory_is_rejected() {
        let subs = vec![sub(1, 1), sub(2, 2)];
        let previous = FilterState {
            category_id: Some(CategoryId::new(1)),
            ..FilterState::default()
        };
        let change = previous.apply(
            FilterCommand::SelectSubcategory(Some(SubcategoryId::new(2))),
            &subs,
        );
        assert_eq!(change.state.subcategory_id, None);
        assert_eq!(change.refetch, None);
    }

    #[test]
    fn paging_is_clamped_at_both_ends() {
        let first = FilterState::default();
        let change = first.apply(FilterCommand::PrevPage, &[]);
        assert_eq!(change.state.page, 1);
        assert_eq!(change.refetch, None);

        let last = FilterState {
            page: 3,
            ..FilterState::default()
        };
        let change = last.apply(FilterCommand::NextPage { total_pages: 3 }, &[]);
        assert_eq!(change.state.page, 3);
        assert_eq!(change.refetch, None);

        let change = first.apply(FilterCommand::NextPage { total_pages: 3 }, &[]);
        assert_eq!(change.state.page, 2);
        assert_eq!(change.refetch, Some(RefetchReason::PageChanged));
    }

    #[test]
    fn search_and_price_never_refetch() {
        let state = FilterState::default();
        let change = state.apply(FilterCommand::SetSearch("kofe".to_owned()), &[]);
        assert_eq!(change.refetch, None);
        let change = change
            .state
            .apply(FilterCommand::SetMinPrice(Some(Decimal::from(3))), &[]);
        assert_eq!(change.refetch, None);
        assert!(change.state.has_local_refinement());
    }

    #[test]
    fn price_range_keeps_only_matching_rows() {
        let items = vec![
            product(1, ["a", "a", "a"], 5),
            product(2, ["b", "b", "b"], 12),
            product(3, ["c", "c", "c"], 20),
        ];
        let filters = FilterState {
            min_price: Some(Decimal::from(10)),
            max_price: Some(Decimal::from(15)),
            ..FilterState::default()
        };
        let visible = visible_products(&items, &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].price, Decimal::from(12));
    }

    #[test]
    fn inverted_price_range_hides_everything() {
        let items = vec![product(1, ["a", "a", "a"], 12)];
        let filters = FilterState {
            min_price: Some(Decimal::from(15)),
            max_price: Some(Decimal::from(10)),
            ..FilterState::default()
        };
        assert!(visible_products(&items, &filters).is_empty());
    }

    #[test]
    fn search_is_case_insensitive_across_locales() {
        let az = product(1, ["Soyuq KOFE", "Iced", "Холодный"], 4);
        let en = product(2, ["Çay", "Kofe latte", "Латте"], 4);
        let ru = product(3, ["Su", "Water", "kOfE по-русски"], 4);
        let miss = product(4, ["Çay", "Tea", "Чай"], 4);
        for hit in [&az, &en, &ru] {
            assert!(matches_search(hit, "kofe"));
        }
        assert!(!matches_search(&miss, "kofe"));
        assert!(matches_search(&miss, "   "));
    }

    #[test]
    fn subcategory_view_filters_by_category_and_search() {
        let subs = vec![sub(1, 1), sub(2, 2), sub(3, 1)];
        let filters = FilterState {
            category_id: Some(CategoryId::new(1)),
            search: "SUB 3".to_owned(),
            ..FilterState::default()
        };
        let visible = visible_subcategories(&subs, &filters);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, SubcategoryId::new(3));
    }

    #[test]
    fn price_bound_parsing() {
        assert_eq!(parse_price_bound("  ").expect("blank bound"), None);
        assert_eq!(
            parse_price_bound("12.5").expect("decimal bound"),
            Some(Decimal::new(125, 1))
        );
        assert!(parse_price_bound("twelve").is_err());
    }
}
