use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use crate::error::IngestionError;
use crate::types::DatasetType;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IngestionSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal, e.g. a skipped sheet or page).
    Warning,
    /// Error-level event (ingestion failed).
    Error,
    /// Critical error (typically I/O failures).
    Critical,
}

/// A recoverable problem that was skipped during decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestionWarning {
    /// A workbook sheet produced no rows and was left out of the payload.
    EmptySheet { sheet: String },
    /// A workbook sheet could not be read and was left out of the payload.
    UnreadableSheet { sheet: String, message: String },
    /// Text extraction failed for a page; the page is missing from the payload.
    PageSkipped { page: u32, message: String },
    /// A delimited-text row had more fields than the header; the extra fields were dropped.
    ExtraFields { line: u64, fields: usize, columns: usize },
}

impl IngestionWarning {
    /// Severity of a warning (always [`IngestionSeverity::Warning`]).
    pub fn severity(&self) -> IngestionSeverity {
        IngestionSeverity::Warning
    }
}

impl fmt::Display for IngestionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptySheet { sheet } => write!(f, "sheet '{sheet}' is empty"),
            Self::UnreadableSheet { sheet, message } => {
                write!(f, "sheet '{sheet}' could not be read: {message}")
            }
            Self::PageSkipped { page, message } => {
                write!(f, "page {page} skipped: {message}")
            }
            Self::ExtraFields { line, fields, columns } => write!(
                f,
                "line {line} has {fields} fields but the header has {columns}; extra fields dropped"
            ),
        }
    }
}

/// Context about an ingestion attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestionContext {
    /// File name as given by the caller.
    pub name: String,
    /// Resolved format, once known.
    pub format: Option<DatasetType>,
    /// File size in bytes, once known.
    pub size: Option<u64>,
}

impl IngestionContext {
    fn format_label(&self) -> &'static str {
        self.format.map(|f| f.as_str()).unwrap_or("unknown")
    }
}

/// Minimal stats reported on successful ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestionStats {
    /// Rows (or pages) in the resulting dataset.
    pub records: usize,
    /// Number of warnings raised while decoding.
    pub warnings: usize,
}

/// Observer interface for ingestion outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait IngestionObserver: Send + Sync {
    /// Called when ingestion succeeds.
    fn on_success(&self, _ctx: &IngestionContext, _stats: IngestionStats) {}

    /// Called once per skipped sheet or page, before the final outcome is reported.
    fn on_warning(&self, _ctx: &IngestionContext, _warning: &IngestionWarning) {}

    /// Called when ingestion fails.
    fn on_failure(&self, _ctx: &IngestionContext, _severity: IngestionSeverity, _error: &IngestionError) {}

    /// Called when an ingestion failure meets an alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn IngestionObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn IngestionObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl IngestionObserver for CompositeObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        for o in &self.observers {
            o.on_warning(ctx, warning);
        }
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs ingestion events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl IngestionObserver for StdErrObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        eprintln!(
            "[ingest][ok] format={} name={} records={} warnings={}",
            ctx.format_label(),
            ctx.name,
            stats.records,
            stats.warnings
        );
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        eprintln!(
            "[ingest][Warning] format={} name={} {}",
            ctx.format_label(),
            ctx.name,
            warning
        );
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!(
            "[ingest][{:?}] format={} name={} err={}",
            severity,
            ctx.format_label(),
            ctx.name,
            error
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        eprintln!(
            "[ALERT][ingest][{:?}] format={} name={} err={}",
            severity,
            ctx.format_label(),
            ctx.name,
            error
        );
    }
}

/// Forwards ingestion events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl IngestionObserver for TracingObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        tracing::info!(
            name = %ctx.name,
            format = ctx.format_label(),
            records = stats.records,
            warnings = stats.warnings,
            "ingested file"
        );
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        tracing::warn!(name = %ctx.name, format = ctx.format_label(), "{warning}");
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            name = %ctx.name,
            format = ctx.format_label(),
            severity = ?severity,
            "{error}"
        );
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        tracing::error!(
            name = %ctx.name,
            format = ctx.format_label(),
            severity = ?severity,
            alert = true,
            "{error}"
        );
    }
}

/// Appends ingestion events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{} {line}", Utc::now().to_rfc3339());
        }
    }
}

impl IngestionObserver for FileObserver {
    fn on_success(&self, ctx: &IngestionContext, stats: IngestionStats) {
        self.append_line(&format!(
            "ok format={} name={} records={} warnings={}",
            ctx.format_label(),
            ctx.name,
            stats.records,
            stats.warnings
        ));
    }

    fn on_warning(&self, ctx: &IngestionContext, warning: &IngestionWarning) {
        self.append_line(&format!(
            "warn format={} name={} {}",
            ctx.format_label(),
            ctx.name,
            warning
        ));
    }

    fn on_failure(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!(
            "fail severity={:?} format={} name={} err={}",
            severity,
            ctx.format_label(),
            ctx.name,
            error
        ));
    }

    fn on_alert(&self, ctx: &IngestionContext, severity: IngestionSeverity, error: &IngestionError) {
        self.append_line(&format!(
            "ALERT severity={:?} format={} name={} err={}",
            severity,
            ctx.format_label(),
            ctx.name,
            error
        ));
    }
}
