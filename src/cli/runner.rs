//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::database::DatabaseEngine;
use crate::engine::{
    BatchSummary, Dispatcher, LookupKind, ProcessDescriptor, ProcessKind, ProcessOutcome,
    ProcessParams,
};
use crate::error::{Error, Result, ResultExt};
use crate::http::{HttpClient, HttpClientConfig};
use crate::load::Loader;
use crate::pagination::Paginator;
use crate::schema::ColumnTypeMap;
use crate::settings::{load_batch, load_settings, IntegrationSettings};
use serde_json::{json, Value};
use std::path::Path;
use tracing::{error, info, warn};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Run {
                batch,
                process,
                csv,
                append,
            } => {
                self.run_processes(batch.as_deref(), process, csv.as_deref(), *append)
                    .await
            }
            Commands::Get { kind, id } => self.get(*kind, id).await,
            Commands::Processes => {
                self.processes();
                Ok(())
            }
            Commands::Validate => self.validate(),
        }
    }

    // ========================================================================
    // Setup
    // ========================================================================

    /// Load integration settings
    fn load_settings(&self) -> Result<IntegrationSettings> {
        load_settings(self.cli.settings.as_deref(), &self.cli.integration)
    }

    /// Load the column type map once for the whole run
    fn load_column_types(&self, settings: &IntegrationSettings) -> Result<ColumnTypeMap> {
        let path = self.cli.schema.as_ref().or(settings.schema_file.as_ref());
        match path {
            Some(path) => {
                let map = ColumnTypeMap::from_file(path)?;
                info!("Loaded column types for {} tables", map.len());
                Ok(map)
            }
            None => {
                warn!("No schema file configured, columns are loaded without coercion");
                Ok(ColumnTypeMap::new())
            }
        }
    }

    /// Build the paginating client
    fn build_source(settings: &IntegrationSettings) -> Result<Paginator> {
        let config = HttpClientConfig::builder()
            .base_url(&settings.base_url)
            .api_key(&settings.api_key)
            .timeout(settings.timeout())
            .build();
        let client = HttpClient::with_config(config).context("Failed to build HTTP client")?;

        Ok(Paginator::new(client)
            .with_default_page_size(settings.page_size)
            .with_method(settings.method))
    }

    /// Build the loader, opening the database only when a table target needs it
    ///
    /// An unreachable database never stops the run: the loader is built
    /// without one, table targets fail one by one and CSV targets still run.
    pub(crate) fn build_loader(settings: &IntegrationSettings, needs_database: bool) -> Loader {
        if !needs_database {
            return Loader::new();
        }
        if !settings.database.is_configured() {
            warn!("No database configured, table targets will fail");
            return Loader::new();
        }

        let engine = DatabaseEngine::open(&settings.database).and_then(|engine| {
            engine.check_connection()?;
            Ok(engine)
        });
        match engine {
            Ok(engine) => Loader::with_database(engine),
            Err(e) => {
                error!("Destination unavailable, table targets will fail: {}", e);
                Loader::new()
            }
        }
    }

    /// Build the descriptors of a run
    ///
    /// A batch file is used as written. Otherwise the named processes (or
    /// all of them) run with their default parameters, adjusted by the CSV
    /// directory and append flag.
    pub(crate) fn descriptors(
        batch: Option<&Path>,
        processes: &[String],
        csv_dir: Option<&Path>,
        append: bool,
    ) -> Result<Vec<ProcessDescriptor>> {
        if let Some(path) = batch {
            return load_batch(path)
                .with_context(|| format!("Failed to load batch file {}", path.display()));
        }

        let names: Vec<String> = if processes.is_empty() {
            ProcessKind::all().iter().map(|k| k.name().to_string()).collect()
        } else {
            processes.to_vec()
        };

        Ok(names
            .into_iter()
            .map(|name| {
                // Unknown names keep empty params and fail at dispatch
                let mut params = name
                    .parse::<ProcessKind>()
                    .map(ProcessKind::default_params)
                    .unwrap_or_else(|_| ProcessParams::default());

                if let Some(dir) = csv_dir {
                    params.use_csv = true;
                    params.file_name = params
                        .file_name
                        .map(|file| dir.join(file).to_string_lossy().into_owned());
                }
                params.replace = !append;
                ProcessDescriptor::new(name, params)
            })
            .collect())
    }

    // ========================================================================
    // Commands
    // ========================================================================

    /// Run processes and report each outcome
    async fn run_processes(
        &self,
        batch: Option<&Path>,
        processes: &[String],
        csv_dir: Option<&Path>,
        append: bool,
    ) -> Result<()> {
        let settings = self.load_settings()?;
        let descriptors = Self::descriptors(batch, processes, csv_dir, append)?;
        if descriptors.is_empty() {
            warn!("Nothing to run");
            return Ok(());
        }

        let column_types = self.load_column_types(&settings)?;
        let source = Self::build_source(&settings)?;
        let needs_database = descriptors.iter().any(|d| !d.params.use_csv);
        let loader = Self::build_loader(&settings, needs_database);

        let mut dispatcher = Dispatcher::new(source, settings, loader, column_types);
        let summary = dispatcher.run_batch(&descriptors).await;
        for outcome in &summary.outcomes {
            self.output_message(&outcome_message(outcome));
        }

        let stats = dispatcher.stats();
        info!(
            "Run finished in {}ms: {} pages, {} records fetched, {} rows written",
            stats.duration_ms, stats.pages_fetched, stats.records_fetched, stats.rows_written
        );

        check_summary(&summary)
    }

    /// Fetch a single item and print it
    async fn get(&self, kind: LookupKind, id: &str) -> Result<()> {
        let settings = self.load_settings()?;
        let source = Self::build_source(&settings)?;
        let dispatcher = Dispatcher::new(source, settings, Loader::new(), ColumnTypeMap::new());

        let item = dispatcher.lookup(kind, id).await?;
        self.output_message(&Value::Object(item));
        Ok(())
    }

    /// List processes with their default targets
    fn processes(&self) {
        for kind in ProcessKind::all() {
            let params = kind.default_params();
            self.output_message(&json!({
                "process": kind.name(),
                "endpoint": kind.endpoint_key(),
                "mode": kind.mode(),
                "table_name": params.table_name,
                "file_name": params.file_name,
            }));
        }
    }

    /// Validate settings and the schema file
    fn validate(&self) -> Result<()> {
        let settings = self.load_settings()?;
        let column_types = self.load_column_types(&settings)?;

        let missing: Vec<&str> = ProcessKind::all()
            .iter()
            .map(|kind| kind.endpoint_key())
            .filter(|key| settings.endpoint(key).is_none())
            .collect();
        for key in &missing {
            warn!("Endpoint {} is not configured", key);
        }

        self.output_message(&json!({
            "integration": self.cli.integration,
            "base_url": settings.base_url,
            "endpoints": settings.endpoints.len(),
            "missing_endpoints": missing,
            "schema_tables": column_types.len(),
            "database": settings.database.engine.to_string(),
            "database_configured": settings.database.is_configured(),
            "status": "VALID",
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        if self.cli.verbose {
            println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
        } else {
            println!("{}", serde_json::to_string(msg).unwrap_or_default());
        }
    }
}

/// JSON line describing one process outcome
fn outcome_message(outcome: &ProcessOutcome) -> Value {
    match &outcome.error {
        None => json!({
            "process": outcome.process,
            "status": "SUCCEEDED",
            "target": outcome.target,
            "records": outcome.records_fetched,
            "rows_written": outcome.rows_written,
            "substituted": outcome.substituted,
            "warning": outcome.warning_kind().map(|kind| kind.to_string()),
        }),
        Some(e) => json!({
            "process": outcome.process,
            "status": "FAILED",
            "target": outcome.target,
            "error_kind": e.kind.to_string(),
            "message": e.message,
            "retryable": e.retryable,
        }),
    }
}

/// Turn failed processes into an error so the binary exits non-zero
fn check_summary(summary: &BatchSummary) -> Result<()> {
    if summary.all_succeeded() {
        return Ok(());
    }
    let failed: Vec<&str> = summary
        .outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.process.as_str())
        .collect();
    Err(Error::Other(format!(
        "{} of {} processes failed: {}",
        failed.len(),
        summary.outcomes.len(),
        failed.join(", ")
    )))
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner").field("cli", &self.cli).finish()
    }
}
