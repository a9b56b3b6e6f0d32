// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(CategoryId);
entity_id!(SubcategoryId);
entity_id!(ProductId);

/// Identity of any catalog record, used where a popup or mutation can target
/// more than one entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityId {
    Category(CategoryId),
    Subcategory(SubcategoryId),
    Product(ProductId),
}

impl EntityId {
    pub const fn raw(self) -> i64 {
        match self {
            Self::Category(id) => id.get(),
            Self::Subcategory(id) => id.get(),
            Self::Product(id) => id.get(),
        }
    }

    pub const fn kind_label(self) -> &'static str {
        match self {
            Self::Category(_) => "category",
            Self::Subcategory(_) => "subcategory",
            Self::Product(_) => "product",
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind_label(), self.raw())
    }
}
