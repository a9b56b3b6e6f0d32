// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use tracing::debug;

use crate::{
    AdminView, CatalogBackend, CatalogError, Category, EntityStore, FilterState, ProductPage,
    ProductQuery, RefetchReason, Subcategory,
};

/// Page position as last reported by the server. `page` is the page that was
/// requested; it is not clamped when the server later reports fewer pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            total_pages: 1,
        }
    }
}

impl Pagination {
    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn label(&self) -> String {
        format!("{} / {}", self.page, self.total_pages.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadTarget {
    /// Every category and subcategory, used for dropdown options and the
    /// subcategory view.
    FilterOptions,
    Categories,
    Products(ProductQuery),
}

impl LoadTarget {
    const fn slot(self) -> usize {
        match self {
            Self::FilterOptions => 0,
            Self::Categories => 1,
            Self::Products(_) => 2,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::FilterOptions => "filter options",
            Self::Categories => "categories",
            Self::Products(_) => "products",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    pub generation: u64,
    pub view: AdminView,
    pub target: LoadTarget,
    pub reason: RefetchReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadResult {
    FilterOptions {
        categories: Vec<Category>,
        subcategories: Vec<Subcategory>,
    },
    Categories(Vec<Category>),
    Products(ProductPage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer request for the same collection was issued after this one.
    Stale,
}

/// Issues list fetches and applies their responses. Each collection keeps its
/// own generation counter so a slow response can never overwrite newer data.
#[derive(Debug, Clone, Default)]
pub struct ListController {
    next_generation: u64,
    latest: [u64; 3],
}

impl ListController {
    pub fn begin(
        &mut self,
        view: AdminView,
        target: LoadTarget,
        reason: RefetchReason,
    ) -> LoadTicket {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.latest[target.slot()] = generation;
        debug!(
            generation,
            view = view.label(),
            load = target.label(),
            reason = reason.as_str(),
            "list load issued"
        );
        LoadTicket {
            generation,
            view,
            target,
            reason,
        }
    }

    /// Tickets needed to bring `view` up to date under `filters`.
    pub fn plan(
        &mut self,
        view: AdminView,
        filters: &FilterState,
        reason: RefetchReason,
    ) -> Vec<LoadTicket> {
        match view {
            AdminView::Products => {
                let mut tickets = Vec::with_capacity(2);
                if reason == RefetchReason::ViewOpened {
                    tickets.push(self.begin(view, LoadTarget::FilterOptions, reason));
                }
                let query = ProductQuery {
                    page: filters.page.max(1),
                    category_id: filters.category_id,
                    subcategory_id: filters.subcategory_id,
                };
                tickets.push(self.begin(view, LoadTarget::Products(query), reason));
                tickets
            }
            AdminView::Categories => vec![self.begin(view, LoadTarget::Categories, reason)],
            AdminView::Subcategories => {
                vec![self.begin(view, LoadTarget::FilterOptions, reason)]
            }
        }
    }

    pub fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.latest[ticket.target.slot()] == ticket.generation
    }

    /// Applies a response to `store`, replacing the matching collection and,
    /// for products, the pagination metadata. Stale responses are dropped
    /// whether they succeeded or not.
    pub fn finish(
        &mut self,
        ticket: &LoadTicket,
        result: Result<LoadResult>,
        store: &mut EntityStore,
    ) -> Result<LoadOutcome, CatalogError> {
        if !self.is_current(ticket) {
            debug!(
                generation = ticket.generation,
                load = ticket.target.label(),
                "stale list response discarded"
            );
            return Ok(LoadOutcome::Stale);
        }

        let result = result.map_err(CatalogError::Load)?;
        match (ticket.target, result) {
            (
                LoadTarget::FilterOptions,
                LoadResult::FilterOptions {
                    categories,
                    subcategories,
                },
            ) => {
                store.replace_categories(categories);
                store.replace_subcategories(subcategories);
            }
            (LoadTarget::Categories, LoadResult::Categories(categories)) => {
                store.replace_categories(categories);
            }
            (LoadTarget::Products(query), LoadResult::Products(page)) => {
                store.replace_products(
                    page.items,
                    Pagination {
                        page: query.page,
                        total_pages: page.total_pages,
                    },
                );
            }
            (target, _) => {
                return Err(CatalogError::Load(anyhow::anyhow!(
                    "response does not match the {} request",
                    target.label()
                )));
            }
        }
        debug!(generation = ticket.generation, load = ticket.target.label(), "list load applied");
        Ok(LoadOutcome::Applied)
    }

    /// Issues, performs and applies every load for `view` in one call. A
    /// failed load does not stop the ones after it; the first error is
    /// returned once all of them ran.
    pub fn load<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        view: AdminView,
        filters: &FilterState,
        reason: RefetchReason,
        store: &mut EntityStore,
    ) -> Result<(), CatalogError> {
        let mut first_error = None;
        for ticket in self.plan(view, filters, reason) {
            let result = execute_load(backend, &ticket);
            if let Err(error) = self.finish(&ticket, result, store) {
                first_error.get_or_insert(error);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Performs the remote request described by `ticket`. Safe to run off the UI
/// thread; it touches no console state.
pub fn execute_load<B: CatalogBackend + ?Sized>(
    backend: &B,
    ticket: &LoadTicket,
) -> Result<LoadResult> {
    match ticket.target {
        LoadTarget::FilterOptions => {
            let categories = backend.list_categories()?;
            let subcategories = backend.list_subcategories()?;
            Ok(LoadResult::FilterOptions {
                categories,
                subcategories,
            })
        }
        LoadTarget::Categories => Ok(LoadResult::Categories(backend.list_categories()?)),
        LoadTarget::Products(query) => {
            if query.page == 0 {
                bail!("product pages are 1-indexed");
            }
            Ok(LoadResult::Products(backend.list_products(&query)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ListController, LoadOutcome, LoadResult, LoadTarget, Pagination};
    use crate::{
        AdminView, CatalogError, EntityStore, FilterState, ProductPage, ProductQuery,
        RefetchReason,
    };

    #[test]
    fn products_view_opens_with_options_and_first_page() {
        let mut list = ListController::default();
        let tickets = list.plan(
            AdminView::Products,
            &FilterState::default(),
            RefetchReason::ViewOpened,
        );
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].target, LoadTarget::FilterOptions);
        assert_eq!(
            tickets[1].target,
            LoadTarget::Products(ProductQuery::default())
        );
        assert!(tickets.iter().all(|ticket| list.is_current(ticket)));
    }

    #[test]
    fn older_response_is_discarded() {
        let mut list = ListController::default();
        let mut store = EntityStore::default();
        let filters = FilterState::default();
        let first = list.plan(AdminView::Products, &filters, RefetchReason::PageChanged)[0];
        let second = list.plan(AdminView::Products, &filters, RefetchReason::PageChanged)[0];

        let applied = list
            .finish(
                &second,
                Ok(LoadResult::Products(ProductPage {
                    items: Vec::new(),
                    total_pages: 4,
                })),
                &mut store,
            )
            .expect("newest response applies");
        assert_eq!(applied, LoadOutcome::Applied);

        let stale = list
            .finish(
                &first,
                Ok(LoadResult::Products(ProductPage {
                    items: Vec::new(),
                    total_pages: 9,
                })),
                &mut store,
            )
            .expect("stale response is not an error");
        assert_eq!(stale, LoadOutcome::Stale);
        assert_eq!(store.pagination.total_pages, 4);
    }

    #[test]
    fn failed_load_leaves_store_untouched() {
        let mut list = ListController::default();
        let mut store = EntityStore::default();
        store.pagination = Pagination {
            page: 2,
            total_pages: 5,
        };
        let ticket = list.plan(
            AdminView::Categories,
            &FilterState::default(),
            RefetchReason::Refresh,
        )[0];
        let error = list
            .finish(&ticket, Err(anyhow::anyhow!("boom")), &mut store)
            .expect_err("failure surfaces");
        assert!(matches!(error, CatalogError::Load(_)));
        assert_eq!(store.pagination.total_pages, 5);
    }

    #[test]
    fn mismatched_response_is_a_load_error() {
        let mut list = ListController::default();
        let mut store = EntityStore::default();
        let ticket = list.plan(
            AdminView::Categories,
            &FilterState::default(),
            RefetchReason::Refresh,
        )[0];
        let error = list
            .finish(
                &ticket,
                Ok(LoadResult::Products(ProductPage::default())),
                &mut store,
            )
            .expect_err("mismatch fails");
        assert!(error.to_string().contains("categories"));
    }

    #[test]
    fn pagination_bounds() {
        let first = Pagination {
            page: 1,
            total_pages: 3,
        };
        assert!(!first.has_prev());
        assert!(first.has_next());
        let last = Pagination {
            page: 3,
            total_pages: 3,
        };
        assert!(!last.has_next());
        assert_eq!(
            Pagination {
                page: 1,
                total_pages: 0
            }
            .label(),
            "1 / 1"
        );
    }
}
