// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, bail};
use tracing::{info, warn};

use crate::{
    AdminView, CatalogBackend, CatalogError, EntityId, EntityPayload, EntityStore, FormPayload,
    ImageUpload, Popup, ProductId, ToggleMode,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationAction {
    Create,
    Update,
    Delete,
    Activate,
    Deactivate,
}

impl MutationAction {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
        }
    }

    pub const fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
            Self::Activate => "activated",
            Self::Deactivate => "deactivated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationRequest {
    Create {
        payload: EntityPayload,
        image: Option<ImageUpload>,
    },
    Update {
        id: EntityId,
        payload: EntityPayload,
        image: Option<ImageUpload>,
    },
    Delete {
        id: EntityId,
    },
}

/// One fully reconstructed write, ready to be sent from any thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    pub sequence: u64,
    pub action: MutationAction,
    pub view: AdminView,
    pub image_origin: String,
    pub request: MutationRequest,
    /// Popup the write was submitted from. Only that popup closes when the
    /// write succeeds; `Closed` for writes made outside a popup.
    pub popup: Popup,
}

/// Builds complete write requests and gates duplicate submissions. The list
/// is never edited locally; callers reload it after a successful write.
#[derive(Debug, Clone)]
pub struct MutationCoordinator {
    image_origin: String,
    next_sequence: u64,
    in_flight: Option<u64>,
}

impl MutationCoordinator {
    pub fn new(image_origin: &str) -> Self {
        Self {
            image_origin: image_origin.trim_end_matches('/').to_owned(),
            next_sequence: 0,
            in_flight: None,
        }
    }

    pub fn image_origin(&self) -> &str {
        &self.image_origin
    }

    pub const fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn begin_create(
        &mut self,
        form: &FormPayload,
        image: Option<ImageUpload>,
        store: &EntityStore,
    ) -> Result<MutationTicket, CatalogError> {
        self.ensure_idle()?;
        let payload = validated_payload(form, store)?;
        let view = payload.view();
        Ok(self.issue(
            MutationAction::Create,
            view,
            MutationRequest::Create { payload, image },
        ))
    }

    pub fn begin_update(
        &mut self,
        id: EntityId,
        form: &FormPayload,
        image: Option<ImageUpload>,
        store: &EntityStore,
    ) -> Result<MutationTicket, CatalogError> {
        self.ensure_idle()?;
        let payload = validated_payload(form, store)?;
        let matches = matches!(
            (id, &payload),
            (EntityId::Category(_), EntityPayload::Category(_))
                | (EntityId::Subcategory(_), EntityPayload::Subcategory(_))
                | (EntityId::Product(_), EntityPayload::Product(_))
        );
        if !matches {
            return Err(CatalogError::Validation(format!(
                "{id} cannot be updated from a {} form",
                payload.view().label()
            )));
        }
        let view = payload.view();
        Ok(self.issue(
            MutationAction::Update,
            view,
            MutationRequest::Update { id, payload, image },
        ))
    }

    pub fn begin_delete(&mut self, id: EntityId) -> Result<MutationTicket, CatalogError> {
        self.ensure_idle()?;
        let view = match id {
            EntityId::Category(_) => AdminView::Categories,
            EntityId::Subcategory(_) => AdminView::Subcategories,
            EntityId::Product(_) => AdminView::Products,
        };
        Ok(self.issue(MutationAction::Delete, view, MutationRequest::Delete { id }))
    }

    /// Read-modify-write of a product's status: the current record is read
    /// from the in-memory page, only `status` changes, and the full record is
    /// sent as an update.
    pub fn begin_toggle(
        &mut self,
        id: ProductId,
        mode: ToggleMode,
        store: &EntityStore,
    ) -> Result<MutationTicket, CatalogError> {
        self.ensure_idle()?;
        let product = store.product(id).ok_or(CatalogError::StaleEntity(id))?;
        let mut payload = product.to_payload();
        payload.status = mode.target_status();
        let action = match mode {
            ToggleMode::Activate => MutationAction::Activate,
            ToggleMode::Deactivate => MutationAction::Deactivate,
        };
        Ok(self.issue(
            action,
            AdminView::Products,
            MutationRequest::Update {
                id: EntityId::Product(id),
                payload: EntityPayload::Product(payload),
                image: None,
            },
        ))
    }

    /// Releases the submission gate and maps the remote result.
    pub fn finish(
        &mut self,
        ticket: &MutationTicket,
        result: Result<()>,
    ) -> Result<MutationAction, CatalogError> {
        if self.in_flight == Some(ticket.sequence) {
            self.in_flight = None;
        }
        match result {
            Ok(()) => {
                info!(
                    sequence = ticket.sequence,
                    action = ticket.action.label(),
                    view = ticket.view.label(),
                    "mutation applied"
                );
                Ok(ticket.action)
            }
            Err(error) => {
                warn!(
                    sequence = ticket.sequence,
                    action = ticket.action.label(),
                    error = %format!("{error:#}"),
                    "mutation failed"
                );
                Err(CatalogError::Mutation {
                    action: ticket.action,
                    error,
                })
            }
        }
    }

    pub fn create<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        form: &FormPayload,
        image: Option<ImageUpload>,
        store: &EntityStore,
    ) -> Result<MutationAction, CatalogError> {
        let ticket = self.begin_create(form, image, store)?;
        let result = execute_mutation(backend, &ticket);
        self.finish(&ticket, result)
    }

    pub fn update<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: EntityId,
        form: &FormPayload,
        image: Option<ImageUpload>,
        store: &EntityStore,
    ) -> Result<MutationAction, CatalogError> {
        let ticket = self.begin_update(id, form, image, store)?;
        let result = execute_mutation(backend, &ticket);
        self.finish(&ticket, result)
    }

    pub fn delete<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: EntityId,
    ) -> Result<MutationAction, CatalogError> {
        let ticket = self.begin_delete(id)?;
        let result = execute_mutation(backend, &ticket);
        self.finish(&ticket, result)
    }

    pub fn toggle_status<B: CatalogBackend + ?Sized>(
        &mut self,
        backend: &B,
        id: ProductId,
        status: bool,
        store: &EntityStore,
    ) -> Result<MutationAction, CatalogError> {
        let ticket = self.begin_toggle(id, ToggleMode::for_target(status), store)?;
        let result = execute_mutation(backend, &ticket);
        self.finish(&ticket, result)
    }

    fn ensure_idle(&self) -> Result<(), CatalogError> {
        if self.is_loading() {
            return Err(CatalogError::Busy);
        }
        Ok(())
    }

    fn issue(
        &mut self,
        action: MutationAction,
        view: AdminView,
        request: MutationRequest,
    ) -> MutationTicket {
        self.next_sequence += 1;
        self.in_flight = Some(self.next_sequence);
        MutationTicket {
            sequence: self.next_sequence,
            action,
            view,
            image_origin: self.image_origin.clone(),
            request,
            popup: Popup::Closed,
        }
    }
}

fn validated_payload(
    form: &FormPayload,
    store: &EntityStore,
) -> Result<EntityPayload, CatalogError> {
    let payload = form
        .to_entity_payload()
        .map_err(|error| CatalogError::Validation(format!("{error:#}")))?;
    if let FormPayload::Product(product) = form
        && !store.subcategories.is_empty()
    {
        product
            .validate_against(&store.subcategories)
            .map_err(|error| CatalogError::Validation(format!("{error:#}")))?;
    }
    Ok(payload)
}

/// Joins the fixed image origin and a server-relative upload path.
pub fn absolute_image_url(origin: &str, relative_path: &str) -> String {
    let origin = origin.trim_end_matches('/');
    if relative_path.starts_with('/') {
        format!("{origin}{relative_path}")
    } else {
        format!("{origin}/{relative_path}")
    }
}

/// Sends the write described by `ticket`. A new image is uploaded first and
/// replaces the entity's image list with its single absolute URL; without one
/// the existing list passes through unchanged.
pub fn execute_mutation<B: CatalogBackend + ?Sized>(
    backend: &B,
    ticket: &MutationTicket,
) -> Result<()> {
    match &ticket.request {
        MutationRequest::Create { payload, image } => {
            let payload =
                with_uploaded_image(backend, payload, image.as_ref(), &ticket.image_origin)?;
            match &payload {
                EntityPayload::Category(body) => backend.create_category(body),
                EntityPayload::Subcategory(body) => backend.create_subcategory(body),
                EntityPayload::Product(body) => backend.create_product(body),
            }
        }
        MutationRequest::Update { id, payload, image } => {
            let updated =
                with_uploaded_image(backend, payload, image.as_ref(), &ticket.image_origin)?;
            match (id, &updated) {
                (EntityId::Category(id), EntityPayload::Category(body)) => {
                    backend.update_category(*id, body)?;
                }
                (EntityId::Subcategory(id), EntityPayload::Subcategory(body)) => {
                    backend.update_subcategory(*id, body)?;
                }
                (EntityId::Product(id), EntityPayload::Product(body)) => {
                    backend.update_product(*id, body)?;
                }
                _ => bail!("{id} cannot be updated with a {} payload", updated.view().label()),
            }
            if image.is_some() {
                remove_replaced_images(
                    backend,
                    payload.images(),
                    updated.images(),
                    &ticket.image_origin,
                );
            }
            Ok(())
        }
        MutationRequest::Delete { id } => match id {
            EntityId::Category(id) => backend.delete_category(*id),
            EntityId::Subcategory(id) => backend.delete_subcategory(*id),
            EntityId::Product(id) => backend.delete_product(*id),
        },
    }
}

fn with_uploaded_image<B: CatalogBackend + ?Sized>(
    backend: &B,
    payload: &EntityPayload,
    image: Option<&ImageUpload>,
    origin: &str,
) -> Result<EntityPayload> {
    let mut payload = payload.clone();
    if let Some(image) = image {
        let relative = backend.upload_image(image)?;
        let url = absolute_image_url(origin, &relative);
        info!(file = %image.file_name, url = %url, "image uploaded");
        payload.set_images(vec![url]);
    }
    Ok(payload)
}

/// Deletes uploads on `origin` that the update dropped. An upload stored
/// under its original name comes back with the same URL and is kept.
fn remove_replaced_images<B: CatalogBackend + ?Sized>(
    backend: &B,
    previous: &[String],
    current: &[String],
    origin: &str,
) {
    for url in previous {
        if current.contains(url) {
            continue;
        }
        let Some(path) = url.strip_prefix(origin).filter(|path| path.starts_with('/')) else {
            continue;
        };
        let Some(file_name) = path.rsplit('/').next().filter(|name| !name.is_empty()) else {
            continue;
        };
        if let Err(error) = backend.delete_image(file_name) {
            warn!(file = file_name, error = %format!("{error:#}"), "stale image not removed");
        }
    }
}
