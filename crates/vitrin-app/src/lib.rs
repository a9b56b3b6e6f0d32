// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod backend;
pub mod cascade;
pub mod error;
pub mod filters;
pub mod forms;
pub mod ids;
pub mod listing;
pub mod model;
pub mod mutation;
pub mod popup;
pub mod state;
pub mod store;

pub use backend::*;
pub use error::*;
pub use filters::*;
pub use forms::*;
pub use ids::*;
pub use listing::*;
pub use model::*;
pub use mutation::*;
pub use popup::*;
pub use state::*;
pub use store::*;
