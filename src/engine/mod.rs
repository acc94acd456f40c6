//! Process dispatch module
//!
//! Maps process names to an endpoint, an optional flattening step and a
//! load target, then runs fetch -> flatten -> load.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Dispatcher` - Resolves and runs processes, one at a time
//! - `ProcessKind` - The closed set of processes
//! - `ProcessParams` / `ProcessDescriptor` - Load parameters per run
//! - `ProcessOutcome` / `BatchSummary` - Uniform results; errors never escape

mod types;

pub use types::{
    BatchSummary, LookupKind, ProcessDescriptor, ProcessError, ProcessKind, ProcessOutcome,
    ProcessParams, RunStats,
};

use crate::error::{Error, Result};
use crate::load::{LoadTarget, Loader};
use crate::pagination::{EndpointSpec, RecordSource};
use crate::schema::ColumnTypeMap;
use crate::settings::IntegrationSettings;
use crate::types::JsonObject;
use std::time::Instant;
use tracing::{debug, error, info};

/// A process checked against settings and load parameters, ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProcess {
    pub kind: ProcessKind,
    pub endpoint: EndpointSpec,
    pub target: LoadTarget,
}

/// Runs processes against one integration
pub struct Dispatcher {
    /// Paginating client
    source: Box<dyn RecordSource>,
    /// Integration settings (endpoint map)
    settings: IntegrationSettings,
    /// Destination writer
    loader: Loader,
    /// Declared column types, loaded once per run
    column_types: ColumnTypeMap,
    /// Statistics
    stats: RunStats,
}

impl Dispatcher {
    /// Create a dispatcher
    pub fn new(
        source: impl RecordSource + 'static,
        settings: IntegrationSettings,
        loader: Loader,
        column_types: ColumnTypeMap,
    ) -> Self {
        Self {
            source: Box::new(source),
            settings,
            loader,
            column_types,
            stats: RunStats::default(),
        }
    }

    /// Get statistics
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Get the loader
    pub fn loader(&self) -> &Loader {
        &self.loader
    }

    /// Get the declared column types
    pub fn column_types(&self) -> &ColumnTypeMap {
        &self.column_types
    }

    /// Validate a descriptor without any I/O
    ///
    /// Rejects unknown process names, unconfigured endpoints and invalid
    /// load parameters.
    pub fn resolve(&self, descriptor: &ProcessDescriptor) -> Result<ResolvedProcess> {
        let kind: ProcessKind = descriptor.process.parse()?;
        let endpoint = self.settings.endpoint_spec(kind.endpoint_key(), kind.mode())?;
        let target = descriptor.params.load_target()?;

        if matches!(target, LoadTarget::Table { .. }) && !self.loader.has_database() {
            return Err(Error::load_target(format!(
                "{kind} writes table '{target}' but no database is configured"
            )));
        }

        Ok(ResolvedProcess {
            kind,
            endpoint,
            target,
        })
    }

    /// Run one process, propagating the first error
    pub async fn run_process(
        &mut self,
        descriptor: &ProcessDescriptor,
        outcome: &mut ProcessOutcome,
    ) -> Result<()> {
        let resolved = self.resolve(descriptor)?;
        outcome.target = Some(resolved.target.to_string());
        debug!("Parameters for {}: {:?}", resolved.kind, descriptor.params);

        let fetched = self.source.fetch_all(&resolved.endpoint).await;
        self.stats.add_fetch(fetched.page_count, fetched.records.len());
        outcome.records_fetched = fetched.records.len();

        let records = fetched.into_records(&resolved.endpoint.key).map_err(|e| {
            error!("Failed to fetch {} data", resolved.kind.resource());
            e
        })?;

        let records = match resolved.kind.flattener() {
            Some(flattener) => flattener.flatten(records),
            None => records,
        };

        let report = self
            .loader
            .load(&records, &resolved.target, &self.column_types)?;
        outcome.rows_written = report.rows_written;
        outcome.substituted = report.coercion.total_substituted();
        self.stats.add_rows(report.rows_written);

        Ok(())
    }

    /// Run one process and convert every error into a failed outcome
    pub async fn dispatch(&mut self, descriptor: &ProcessDescriptor) -> ProcessOutcome {
        let start = Instant::now();
        let mut outcome = ProcessOutcome::new(&descriptor.process);
        info!("Starting process {}", descriptor.process);

        match self.run_process(descriptor, &mut outcome).await {
            Ok(()) => {
                self.stats.add_completed();
                info!(
                    "{} completed: {} records written to {}",
                    descriptor.process,
                    outcome.rows_written,
                    outcome.target.as_deref().unwrap_or("-")
                );
            }
            Err(e) => {
                self.stats.add_error();
                error!(
                    "Error during {} ({}): {}",
                    descriptor.process,
                    outcome.target.as_deref().unwrap_or("no target"),
                    e
                );
                outcome.fail(&e);
            }
        }

        self.stats.add_duration(start.elapsed().as_millis() as u64);
        outcome
    }

    /// Run descriptors in order; a failure never stops the rest
    pub async fn run_batch(&mut self, descriptors: &[ProcessDescriptor]) -> BatchSummary {
        let mut summary = BatchSummary::default();
        for descriptor in descriptors {
            let outcome = self.dispatch(descriptor).await;
            summary.outcomes.push(outcome);
        }
        info!(
            "Batch finished: {} succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        summary
    }

    /// Fetch a single item by id, keeping only its non-list fields
    pub async fn lookup(&self, kind: LookupKind, id: &str) -> Result<JsonObject> {
        let key = kind.endpoint_key();
        let def = self
            .settings
            .endpoint(key)
            .ok_or_else(|| Error::config(format!("Endpoint '{key}' is not configured")))?;

        info!("Fetching data for {} ID: {}", key, id);
        let item = self
            .source
            .fetch_item(def.path(), kind.placeholder(), id)
            .await
            .map_err(|e| {
                error!("Failed to retrieve data for {} ID {}: {}", key, id, e);
                e
            })?;
        info!("Data retrieved for {} ID {}", key, id);
        Ok(item)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("base_url", &self.settings.base_url)
            .field("loader", &self.loader)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
