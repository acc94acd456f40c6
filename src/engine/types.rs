//! Engine types
//!
//! Process identities, load parameters and run outcomes.

use crate::error::{Error, ErrorKind, Result};
use crate::flatten::Flattener;
use crate::load::{LoadTarget, TableName, WriteMode};
use crate::pagination::PaginationMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

// ============================================================================
// Processes
// ============================================================================

/// The closed set of extract-and-load processes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessKind {
    Users,
    Courses,
    Groups,
    Branches,
    RateLimit,
    Categories,
    Registration,
    CourseFields,
}

impl ProcessKind {
    /// Every process, in default batch order
    pub fn all() -> [ProcessKind; 8] {
        [
            ProcessKind::Users,
            ProcessKind::Courses,
            ProcessKind::Groups,
            ProcessKind::Branches,
            ProcessKind::RateLimit,
            ProcessKind::Categories,
            ProcessKind::Registration,
            ProcessKind::CourseFields,
        ]
    }

    /// Process name (`get_<resource>`)
    pub fn name(self) -> &'static str {
        match self {
            ProcessKind::Users => "get_users",
            ProcessKind::Courses => "get_courses",
            ProcessKind::Groups => "get_groups",
            ProcessKind::Branches => "get_branches",
            ProcessKind::RateLimit => "get_ratelimit",
            ProcessKind::Categories => "get_categories",
            ProcessKind::Registration => "get_registration",
            ProcessKind::CourseFields => "get_course_fields",
        }
    }

    /// Resource name, also the default table name
    pub fn resource(self) -> &'static str {
        self.name().trim_start_matches("get_")
    }

    /// Key of the endpoint in the settings' endpoint map
    pub fn endpoint_key(self) -> &'static str {
        match self {
            ProcessKind::Users => "USERS",
            ProcessKind::Courses => "COURSES",
            ProcessKind::Groups => "GROUPS",
            ProcessKind::Branches => "BRANCHES",
            ProcessKind::RateLimit => "RATELIMIT",
            ProcessKind::Categories => "CATEGORIES",
            ProcessKind::Registration => "REGISTRATION",
            ProcessKind::CourseFields => "COURSE_FIELDS",
        }
    }

    /// Pagination mode of the endpoint
    pub fn mode(self) -> PaginationMode {
        match self {
            ProcessKind::RateLimit => PaginationMode::Singleton,
            _ => PaginationMode::List,
        }
    }

    /// Flattening applied before loading, if any
    pub fn flattener(self) -> Option<Flattener> {
        match self {
            ProcessKind::Registration => Some(Flattener::registration()),
            _ => None,
        }
    }

    /// Default load parameters
    pub fn default_params(self) -> ProcessParams {
        ProcessParams {
            table_name: Some(self.resource().to_string()),
            file_name: Some(format!("{}_data.csv", self.resource())),
            use_csv: false,
            replace: true,
        }
    }
}

impl FromStr for ProcessKind {
    type Err = Error;

    /// Parse a process name; the `get_` prefix is optional
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        let resource = normalized.strip_prefix("get_").unwrap_or(&normalized);
        ProcessKind::all()
            .into_iter()
            .find(|kind| kind.resource() == resource)
            .ok_or_else(|| Error::UnknownProcess {
                name: s.to_string(),
            })
    }
}

impl std::fmt::Display for ProcessKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Load Parameters
// ============================================================================

/// Load parameters of one process run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessParams {
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub use_csv: bool,
    #[serde(default = "default_replace")]
    pub replace: bool,
}

fn default_replace() -> bool {
    true
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self {
            table_name: None,
            file_name: None,
            use_csv: false,
            replace: default_replace(),
        }
    }
}

impl ProcessParams {
    /// Validate and convert into a load target
    ///
    /// DB mode needs a table name, CSV mode needs a file name. In CSV mode
    /// the table name, when given, selects the declared column types.
    pub fn load_target(&self) -> Result<LoadTarget> {
        let table = self
            .table_name
            .as_deref()
            .map(TableName::new)
            .filter(|name| !name.is_empty());

        if self.use_csv {
            let file = self
                .file_name
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .ok_or_else(|| Error::load_target("No file given for process"))?;
            let target = LoadTarget::csv(PathBuf::from(file));
            Ok(match table {
                Some(name) => target.with_schema_table(name),
                None => target,
            })
        } else {
            let name = table.ok_or_else(|| Error::load_target("No table name given for process"))?;
            Ok(LoadTarget::table(name, WriteMode::from_replace(self.replace)))
        }
    }
}

/// One entry of a batch: a process name plus its load parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDescriptor {
    pub process: String,
    #[serde(flatten)]
    pub params: ProcessParams,
}

impl ProcessDescriptor {
    /// Descriptor with explicit parameters
    pub fn new(process: impl Into<String>, params: ProcessParams) -> Self {
        Self {
            process: process.into(),
            params,
        }
    }

    /// Descriptor using the process's default parameters
    pub fn with_defaults(kind: ProcessKind) -> Self {
        Self::new(kind.name(), kind.default_params())
    }
}

// ============================================================================
// Single-Item Lookup
// ============================================================================

/// Resources that can be fetched one item at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum LookupKind {
    User,
    Course,
    Category,
    Group,
    Branch,
}

impl LookupKind {
    /// Key of the endpoint in the settings' endpoint map
    pub fn endpoint_key(self) -> &'static str {
        match self {
            LookupKind::User => "GET_USER",
            LookupKind::Course => "GET_COURSES",
            LookupKind::Category => "GET_CATEGORIES",
            LookupKind::Group => "GET_GROUPS",
            LookupKind::Branch => "GET_BRANCHES",
        }
    }

    /// Placeholder replaced by the id in the endpoint path
    pub fn placeholder(self) -> &'static str {
        match self {
            LookupKind::User => "{userId}",
            LookupKind::Course => "{courseId}",
            LookupKind::Category => "{categoryId}",
            LookupKind::Group => "{groupId}",
            LookupKind::Branch => "{branchId}",
        }
    }
}

// ============================================================================
// Outcomes
// ============================================================================

/// Result of one dispatched process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    /// Process name as requested
    pub process: String,
    /// Table or file written (when the target was valid)
    pub target: Option<String>,
    /// Records fetched
    pub records_fetched: usize,
    /// Rows written
    pub rows_written: usize,
    /// Values replaced during coercion
    pub substituted: usize,
    /// Set when the process failed
    pub error: Option<ProcessError>,
}

/// Failure of one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessError {
    pub kind: ErrorKind,
    pub message: String,
    /// Whether running the process again may succeed
    pub retryable: bool,
}

impl ProcessOutcome {
    /// Create an outcome with nothing done yet
    pub fn new(process: impl Into<String>) -> Self {
        Self {
            process: process.into(),
            target: None,
            records_fetched: 0,
            rows_written: 0,
            substituted: 0,
            error: None,
        }
    }

    /// Check if the process succeeded
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Error kind of a failed process
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(|e| e.kind)
    }

    /// Kind of a non-fatal problem on a successful process
    ///
    /// Coercion substitutions are the only such problem.
    pub fn warning_kind(&self) -> Option<ErrorKind> {
        (self.is_success() && self.substituted > 0).then_some(ErrorKind::Coercion)
    }

    /// Mark as failed
    pub fn fail(&mut self, error: &Error) {
        self.error = Some(ProcessError {
            kind: error.kind(),
            message: error.to_string(),
            retryable: error.is_retryable(),
        });
    }
}

/// Outcomes of a batch run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub outcomes: Vec<ProcessOutcome>,
}

impl BatchSummary {
    /// Number of successful processes
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Number of failed processes
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Check if every process succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Statistics across a run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Total records fetched
    pub records_fetched: usize,
    /// Total pages fetched
    pub pages_fetched: usize,
    /// Total rows written
    pub rows_written: usize,
    /// Processes that completed
    pub processes_completed: usize,
    /// Processes that failed
    pub errors: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl RunStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add fetched pages and records
    pub fn add_fetch(&mut self, pages: u32, records: usize) {
        self.pages_fetched += pages as usize;
        self.records_fetched += records;
    }

    /// Add written rows
    pub fn add_rows(&mut self, rows: usize) {
        self.rows_written += rows;
    }

    /// Add a completed process
    pub fn add_completed(&mut self) {
        self.processes_completed += 1;
    }

    /// Add an error
    pub fn add_error(&mut self) {
        self.errors += 1;
    }

    /// Add elapsed time
    pub fn add_duration(&mut self, ms: u64) {
        self.duration_ms += ms;
    }
}
