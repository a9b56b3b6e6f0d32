// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;

use crate::{
    AdminView, CatalogBackend, CatalogError, Category, CategoryId, EntityId, EntityStore,
    FilterCommand, FilterState, FormKind, FormPayload, ImageUpload, ListController, LoadOutcome,
    LoadResult, LoadTicket, MutationAction, MutationCoordinator, MutationRequest, MutationTicket,
    Pagination, Popup, PopupState, Product, ProductId, RefetchReason, Subcategory, ToggleMode,
    execute_load, execute_mutation, visible_categories, visible_products, visible_subcategories,
};

/// Everything the admin console shows, with every transition going through
/// `dispatch` or one of the `apply_*` methods. Remote calls are described by
/// tickets and performed by the caller.
#[derive(Debug, Clone)]
pub struct AdminConsole {
    pub view: AdminView,
    pub filters: FilterState,
    pub store: EntityStore,
    pub status_line: Option<String>,
    popup: PopupState,
    form: Option<FormPayload>,
    list: ListController,
    mutations: MutationCoordinator,
    default_ingredients: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    SwitchView(AdminView),
    NextView,
    PrevView,
    Filter(FilterCommand),
    NextPage,
    PrevPage,
    OpenCreate,
    OpenEdit(EntityId),
    OpenDelete(EntityId),
    OpenToggle(ProductId),
    ClosePopup,
    Refresh,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    ViewChanged(AdminView),
    FiltersChanged(FilterState),
    LoadRequested(LoadTicket),
    PopupChanged(Popup),
    StatusUpdated(String),
    StatusCleared,
}

impl AdminConsole {
    pub fn new(view: AdminView, image_origin: &str, default_ingredients: Vec<String>) -> Self {
        Self {
            view,
            filters: FilterState::default(),
            store: EntityStore::default(),
            status_line: None,
            popup: PopupState::default(),
            form: None,
            list: ListController::default(),
            mutations: MutationCoordinator::new(image_origin),
            default_ingredients,
        }
    }

    /// Initial loads for the starting view.
    pub fn open(&mut self) -> Vec<ConsoleEvent> {
        self.request_loads(RefetchReason::ViewOpened)
    }

    pub fn dispatch(&mut self, command: ConsoleCommand) -> Vec<ConsoleEvent> {
        match command {
            ConsoleCommand::SwitchView(view) => self.switch_view(view),
            ConsoleCommand::NextView => self.rotate_view(1),
            ConsoleCommand::PrevView => self.rotate_view(-1),
            ConsoleCommand::Filter(filter) => self.apply_filter(filter),
            ConsoleCommand::NextPage => {
                let total_pages = self.pagination().total_pages;
                self.apply_filter(FilterCommand::NextPage { total_pages })
            }
            ConsoleCommand::PrevPage => self.apply_filter(FilterCommand::PrevPage),
            ConsoleCommand::OpenCreate => {
                let form = FormPayload::blank_for(
                    FormKind::for_view(self.view),
                    &self.default_ingredients,
                );
                self.open_popup(Popup::Creating, Some(form))
            }
            ConsoleCommand::OpenEdit(id) => match self.form_for(id) {
                Some(form) => self.open_popup(Popup::Editing(id), Some(form)),
                None => vec![self.set_status(&missing_entity(id))],
            },
            ConsoleCommand::OpenDelete(id) => self.open_popup(Popup::ConfirmingDelete(id), None),
            ConsoleCommand::OpenToggle(id) => match self.store.product(id) {
                Some(product) => {
                    let mode = ToggleMode::for_current(product.status);
                    self.open_popup(Popup::ConfirmingToggle { id, mode }, None)
                }
                None => vec![self.set_status(&missing_entity(EntityId::Product(id)))],
            },
            ConsoleCommand::ClosePopup => {
                self.popup.cancel();
                self.form = None;
                vec![ConsoleEvent::PopupChanged(Popup::Closed)]
            }
            ConsoleCommand::Refresh => self.request_loads(RefetchReason::Refresh),
            ConsoleCommand::SetStatus(message) => vec![self.set_status(&message)],
            ConsoleCommand::ClearStatus => {
                self.status_line = None;
                vec![ConsoleEvent::StatusCleared]
            }
        }
    }

    pub const fn popup(&self) -> Popup {
        self.popup.current()
    }

    pub const fn form(&self) -> Option<&FormPayload> {
        self.form.as_ref()
    }

    pub fn form_mut(&mut self) -> Option<&mut FormPayload> {
        self.form.as_mut()
    }

    pub const fn is_loading(&self) -> bool {
        self.mutations.is_loading()
    }

    pub fn image_origin(&self) -> &str {
        self.mutations.image_origin()
    }

    /// Changes the category of the open form. A product form also drops a
    /// subcategory that no longer belongs to the new category.
    pub fn set_form_category(&mut self, category_id: Option<CategoryId>) {
        match self.form.as_mut() {
            Some(FormPayload::Product(product)) => {
                product.select_category(category_id, &self.store.subcategories);
            }
            Some(FormPayload::Subcategory(subcategory)) => subcategory.category_id = category_id,
            Some(FormPayload::Category(_)) | None => {}
        }
    }

    /// Pagination of the active view. Only products are paged.
    pub fn pagination(&self) -> Pagination {
        match self.view {
            AdminView::Products => self.store.pagination,
            AdminView::Categories | AdminView::Subcategories => Pagination::default(),
        }
    }

    pub fn visible_products(&self) -> Vec<&Product> {
        visible_products(&self.store.products, &self.filters)
    }

    pub fn visible_categories(&self) -> Vec<&Category> {
        visible_categories(&self.store.categories, &self.filters)
    }

    pub fn visible_subcategories(&self) -> Vec<&Subcategory> {
        visible_subcategories(&self.store.subcategories, &self.filters)
    }

    /// Row counts of the active view when local filters hide some rows.
    pub fn visibility_summary(&self) -> Option<String> {
        let (shown, total) = match self.view {
            AdminView::Products => (self.visible_products().len(), self.store.products.len()),
            AdminView::Categories => {
                (self.visible_categories().len(), self.store.categories.len())
            }
            AdminView::Subcategories => (
                self.visible_subcategories().len(),
                self.store.subcategories.len(),
            ),
        };
        if shown == total {
            return None;
        }
        Some(match self.view {
            AdminView::Products => format!("showing {shown} of {total} on this page"),
            AdminView::Categories | AdminView::Subcategories => {
                format!("showing {shown} of {total}")
            }
        })
    }

    pub fn apply_load(
        &mut self,
        ticket: &LoadTicket,
        result: Result<LoadResult>,
    ) -> Vec<ConsoleEvent> {
        match self.list.finish(ticket, result, &mut self.store) {
            Ok(LoadOutcome::Applied | LoadOutcome::Stale) => Vec::new(),
            Err(error) => vec![self.set_status(&error.to_string())],
        }
    }

    /// Builds the write for the open create or edit form.
    pub fn begin_submit(
        &mut self,
        image: Option<ImageUpload>,
    ) -> Result<MutationTicket, CatalogError> {
        let Some(form) = self.form.as_ref() else {
            return Err(CatalogError::Validation("no form is open".to_owned()));
        };
        let popup = self.popup.current();
        let ticket = match popup {
            Popup::Creating => self.mutations.begin_create(form, image, &self.store)?,
            Popup::Editing(id) => self.mutations.begin_update(id, form, image, &self.store)?,
            _ => return Err(CatalogError::Validation("no form is open".to_owned())),
        };
        Ok(MutationTicket { popup, ..ticket })
    }

    /// Builds the write for the open delete or toggle confirmation.
    pub fn begin_confirm(&mut self) -> Result<MutationTicket, CatalogError> {
        let popup = self.popup.current();
        let ticket = match popup {
            Popup::ConfirmingDelete(id) => self.mutations.begin_delete(id)?,
            Popup::ConfirmingToggle { id, mode } => {
                self.mutations.begin_toggle(id, mode, &self.store)?
            }
            _ => {
                return Err(CatalogError::Validation(
                    "nothing is waiting for confirmation".to_owned(),
                ));
            }
        };
        Ok(MutationTicket { popup, ..ticket })
    }

    /// On success the popup that submitted the write closes and the active
    /// view reloads with the current filters and page. A popup opened after
    /// the submit is left alone. On failure the popup stays open.
    pub fn apply_mutation(
        &mut self,
        ticket: &MutationTicket,
        result: Result<()>,
    ) -> Vec<ConsoleEvent> {
        match self.mutations.finish(ticket, result) {
            Ok(action) => {
                let mut events = Vec::new();
                if self.popup.succeed(ticket.popup) {
                    self.form = None;
                    events.push(ConsoleEvent::PopupChanged(Popup::Closed));
                }
                events.push(self.set_status(&describe(ticket, action)));
                events.extend(self.request_loads(RefetchReason::MutationApplied));
                events
            }
            Err(error) => vec![self.report(&error)],
        }
    }

    pub fn report(&mut self, error: &CatalogError) -> ConsoleEvent {
        self.set_status(&error.to_string())
    }

    /// Performs every load among `events` against `backend` before returning.
    pub fn run_loads<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        events: &[ConsoleEvent],
    ) -> Vec<ConsoleEvent> {
        let mut applied = Vec::new();
        for event in events {
            if let ConsoleEvent::LoadRequested(ticket) = event {
                let result = execute_load(backend, ticket);
                applied.extend(self.apply_load(ticket, result));
            }
        }
        applied
    }

    /// Dispatches `command` and performs the loads it requests.
    pub fn execute<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        command: ConsoleCommand,
    ) -> Vec<ConsoleEvent> {
        let mut events = self.dispatch(command);
        let applied = self.run_loads(backend, &events);
        events.extend(applied);
        events
    }

    pub fn submit<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        image: Option<ImageUpload>,
    ) -> Vec<ConsoleEvent> {
        match self.begin_submit(image) {
            Ok(ticket) => self.complete_mutation(backend, &ticket),
            Err(error) => vec![self.report(&error)],
        }
    }

    pub fn confirm<B: CatalogBackend + ?Sized>(&mut self, backend: &B) -> Vec<ConsoleEvent> {
        match self.begin_confirm() {
            Ok(ticket) => self.complete_mutation(backend, &ticket),
            Err(error) => vec![self.report(&error)],
        }
    }

    fn complete_mutation<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        ticket: &MutationTicket,
    ) -> Vec<ConsoleEvent> {
        let result = execute_mutation(backend, ticket);
        let mut events = self.apply_mutation(ticket, result);
        let applied = self.run_loads(backend, &events);
        events.extend(applied);
        events
    }

    fn switch_view(&mut self, view: AdminView) -> Vec<ConsoleEvent> {
        self.view = view;
        self.filters = FilterState::default();
        self.popup.cancel();
        self.form = None;
        let mut events = vec![
            ConsoleEvent::ViewChanged(view),
            ConsoleEvent::FiltersChanged(self.filters.clone()),
            ConsoleEvent::PopupChanged(Popup::Closed),
        ];
        events.extend(self.request_loads(RefetchReason::ViewOpened));
        events
    }

    fn rotate_view(&mut self, delta: isize) -> Vec<ConsoleEvent> {
        let views = AdminView::ALL;
        let current = views
            .iter()
            .position(|view| *view == self.view)
            .unwrap_or(0) as isize;
        let len = views.len() as isize;
        let next = (current + delta).rem_euclid(len) as usize;
        self.switch_view(views[next])
    }

    fn apply_filter(&mut self, command: FilterCommand) -> Vec<ConsoleEvent> {
        let change = self.filters.apply(command, &self.store.subcategories);
        if change.state == self.filters {
            return Vec::new();
        }
        self.filters = change.state;
        let mut events = vec![ConsoleEvent::FiltersChanged(self.filters.clone())];
        if let Some(reason) = change.refetch
            && self.view.fetches_on_filter_change()
        {
            events.extend(self.request_loads(reason));
        }
        events
    }

    fn open_popup(&mut self, popup: Popup, form: Option<FormPayload>) -> Vec<ConsoleEvent> {
        if !self.popup.open(popup) {
            return Vec::new();
        }
        self.form = form;
        vec![ConsoleEvent::PopupChanged(popup)]
    }

    fn form_for(&self, id: EntityId) -> Option<FormPayload> {
        match id {
            EntityId::Category(id) => self.store.category(id).map(FormPayload::from_category),
            EntityId::Subcategory(id) => {
                self.store.subcategory(id).map(FormPayload::from_subcategory)
            }
            EntityId::Product(id) => self.store.product(id).map(FormPayload::from_product),
        }
    }

    fn request_loads(&mut self, reason: RefetchReason) -> Vec<ConsoleEvent> {
        self.list
            .plan(self.view, &self.filters, reason)
            .into_iter()
            .map(ConsoleEvent::LoadRequested)
            .collect()
    }

    fn set_status(&mut self, message: &str) -> ConsoleEvent {
        self.status_line = Some(message.to_owned());
        ConsoleEvent::StatusUpdated(message.to_owned())
    }
}

fn missing_entity(id: EntityId) -> String {
    format!("{id} is not in the current list -- reload and retry")
}

fn describe(ticket: &MutationTicket, action: MutationAction) -> String {
    let subject = match &ticket.request {
        MutationRequest::Create { payload, .. } => match payload.view() {
            AdminView::Products => "product".to_owned(),
            AdminView::Categories => "category".to_owned(),
            AdminView::Subcategories => "subcategory".to_owned(),
        },
        MutationRequest::Update { id, .. } | MutationRequest::Delete { id } => id.to_string(),
    };
    format!("{subject} {}", action.past_tense())
}
