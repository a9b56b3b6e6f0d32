// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use std::sync::mpsc::Sender;
use std::thread;
use vitrin_app::{
    CatalogBackend, LoadResult, LoadTicket, MutationTicket, execute_load, execute_mutation,
};
use vitrin_tui::InternalEvent;

/// Runs console tickets against a catalog backend on worker threads so the
/// terminal keeps drawing while requests are in flight.
pub struct BackendRuntime<B> {
    backend: B,
}

impl<B> BackendRuntime<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B> vitrin_tui::AdminRuntime for BackendRuntime<B>
where
    B: CatalogBackend + Clone + Send + 'static,
{
    fn load(&mut self, ticket: &LoadTicket) -> Result<LoadResult> {
        execute_load(&self.backend, ticket)
    }

    fn mutate(&mut self, ticket: &MutationTicket) -> Result<()> {
        execute_mutation(&self.backend, ticket)
    }

    fn spawn_load(&mut self, ticket: LoadTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let backend = self.backend.clone();
        thread::Builder::new()
            .name(format!("vitrin-load-{}", ticket.generation))
            .spawn(move || {
                let result = execute_load(&backend, &ticket).map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::Loaded { ticket, result });
            })
            .context("spawn load worker")?;
        Ok(())
    }

    fn spawn_mutation(&mut self, ticket: MutationTicket, tx: Sender<InternalEvent>) -> Result<()> {
        let backend = self.backend.clone();
        thread::Builder::new()
            .name(format!("vitrin-mutation-{}", ticket.sequence))
            .spawn(move || {
                let result =
                    execute_mutation(&backend, &ticket).map_err(|error| format!("{error:#}"));
                let _ = tx.send(InternalEvent::Mutated { ticket, result });
            })
            .context("spawn mutation worker")?;
        Ok(())
    }
}
