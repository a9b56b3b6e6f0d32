// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{EntityId, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleMode {
    Activate,
    Deactivate,
}

impl ToggleMode {
    /// The mode offered for a product whose status is `active`.
    pub const fn for_current(active: bool) -> Self {
        if active { Self::Deactivate } else { Self::Activate }
    }

    pub const fn for_target(status: bool) -> Self {
        if status { Self::Activate } else { Self::Deactivate }
    }

    pub const fn target_status(self) -> bool {
        matches!(self, Self::Activate)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Activate => "activate",
            Self::Deactivate => "deactivate",
        }
    }
}

/// The single active modal. Every popup carries the identity it acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Popup {
    #[default]
    Closed,
    Creating,
    Editing(EntityId),
    ConfirmingDelete(EntityId),
    ConfirmingToggle { id: ProductId, mode: ToggleMode },
}

impl Popup {
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::Closed)
    }

    pub const fn is_form(self) -> bool {
        matches!(self, Self::Creating | Self::Editing(_))
    }

    pub const fn is_confirmation(self) -> bool {
        matches!(self, Self::ConfirmingDelete(_) | Self::ConfirmingToggle { .. })
    }

    pub fn title(self) -> String {
        match self {
            Self::Closed => String::new(),
            Self::Creating => "new".to_owned(),
            Self::Editing(id) => format!("edit {id}"),
            Self::ConfirmingDelete(id) => format!("delete {id}?"),
            Self::ConfirmingToggle { id, mode } => format!("{} product {id}?", mode.label()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PopupState {
    current: Popup,
}

impl PopupState {
    pub const fn current(&self) -> Popup {
        self.current
    }

    /// Opens `popup` from `Closed`. Returns false and leaves the state alone
    /// when another popup is already active or `popup` is `Closed`.
    pub fn open(&mut self, popup: Popup) -> bool {
        if self.current.is_open() || !popup.is_open() {
            return false;
        }
        self.current = popup;
        true
    }

    pub fn cancel(&mut self) {
        self.current = Popup::Closed;
    }

    /// Closes `owner` after its submit or confirm succeeded. A popup opened
    /// while the request was in flight belongs to someone else and stays.
    pub fn succeed(&mut self, owner: Popup) -> bool {
        if !self.current.is_open() || self.current != owner {
            return false;
        }
        self.current = Popup::Closed;
        true
    }
}
