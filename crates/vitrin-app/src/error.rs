// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use thiserror::Error;

use crate::{MutationAction, ProductId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Load,
    Mutation,
    Validation,
}

/// Failures the console reports to the operator. None of them is fatal.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),
    #[error("another change is still being saved -- wait for it to finish")]
    Busy,
    #[error("load failed: {0:#}")]
    Load(anyhow::Error),
    #[error("{} failed: {error:#}", action.label())]
    Mutation {
        action: MutationAction,
        error: anyhow::Error,
    },
    #[error("product {0} is not in the current list -- reload and retry")]
    StaleEntity(ProductId),
}

impl CatalogError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Load(_) => FailureKind::Load,
            Self::Mutation { .. } | Self::StaleEntity(_) => FailureKind::Mutation,
            Self::Validation(_) | Self::Busy => FailureKind::Validation,
        }
    }
}
