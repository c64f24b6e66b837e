//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest`] (in-memory upload) or [`ingest_from_path`], which turn a
//! file into a [`crate::types::Dataset`]:
//!
//! - The size ceiling is enforced first, before the format is resolved or anything is decoded.
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file extension.
//! - Decoder and read failures are wrapped into [`IngestionError::IngestionFailed`].
//! - If an [`super::observability::IngestionObserver`] is provided, warnings, success,
//!   failure and alerts are reported to it.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;

use crate::error::{DecodeResult, FailureCause, IngestionError, IngestionResult};
use crate::types::{Dataset, DatasetData, DatasetType, MAX_FILE_SIZE};

use super::assemble::assemble;
use super::observability::{
    IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats, IngestionWarning,
};
use super::{csv, excel, json, pdf};

/// An uploaded file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    name: String,
    content: Vec<u8>,
}

impl UploadedFile {
    /// Create an upload from its file name and raw content.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// File name as uploaded.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw content.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

/// Options controlling unified ingestion behavior.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct IngestionOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<DatasetType>,
    /// Largest accepted file, in bytes.
    pub max_file_size: u64,
    /// Field delimiter for delimited text.
    pub csv_delimiter: u8,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn IngestionObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: IngestionSeverity,
}

impl fmt::Debug for IngestionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IngestionOptions")
            .field("format", &self.format)
            .field("max_file_size", &self.max_file_size)
            .field("csv_delimiter", &char::from(self.csv_delimiter))
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for IngestionOptions {
    fn default() -> Self {
        Self {
            format: None,
            max_file_size: MAX_FILE_SIZE,
            csv_delimiter: b',',
            observer: None,
            alert_at_or_above: IngestionSeverity::Critical,
        }
    }
}

/// Ingest an in-memory upload into a [`Dataset`].
///
/// # Examples
///
/// ```rust
/// use dataset_ingest::ingestion::{ingest, IngestionOptions, UploadedFile};
/// use dataset_ingest::types::{DatasetData, DatasetType};
///
/// # fn main() -> Result<(), dataset_ingest::IngestionError> {
/// let file = UploadedFile::new("sales.csv", "date,amount\n2024-01-01,100\n,\n2024-01-02,200\n");
/// let ds = ingest(&file, &IngestionOptions::default())?;
///
/// assert_eq!(ds.dataset_type(), DatasetType::Csv);
/// let DatasetData::Csv(rows) = ds.data() else { unreachable!() };
/// assert_eq!(rows.len(), 2);
/// # Ok(())
/// # }
/// ```
///
/// ## Observability
///
/// ```no_run
/// use std::sync::Arc;
///
/// use dataset_ingest::ingestion::{
///     ingest, IngestionOptions, IngestionSeverity, StdErrObserver, UploadedFile,
/// };
///
/// let opts = IngestionOptions {
///     observer: Some(Arc::new(StdErrObserver::default())),
///     alert_at_or_above: IngestionSeverity::Error,
///     ..Default::default()
/// };
///
/// // Malformed JSON is an Error-severity failure and triggers `on_alert` at this threshold.
/// let _err = ingest(&UploadedFile::new("broken.json", "{"), &opts).unwrap_err();
/// ```
pub fn ingest(file: &UploadedFile, options: &IngestionOptions) -> IngestionResult<Dataset> {
    run(file.name(), || Ok(file.size()), || Ok(file.content()), options)
}

/// Ingest a file from disk.
///
/// The file's metadata size is checked against the ceiling before its content is read. The
/// dataset name is the path's final component.
pub fn ingest_from_path(path: impl AsRef<Path>, options: &IngestionOptions) -> IngestionResult<Dataset> {
    let path = path.as_ref();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    run(
        &name,
        || fs::metadata(path).map(|m| m.len()),
        || fs::read(path),
        options,
    )
}

/// Ingest several files independently and in parallel.
///
/// Returns one result per input, in input order. A failing file does not affect the others.
pub fn ingest_batch<P>(paths: &[P], options: &IngestionOptions) -> Vec<IngestionResult<Dataset>>
where
    P: AsRef<Path> + Sync,
{
    paths
        .par_iter()
        .map(|path| ingest_from_path(path, options))
        .collect()
}

fn run<S, R, B>(name: &str, size: S, read: R, options: &IngestionOptions) -> IngestionResult<Dataset>
where
    S: FnOnce() -> io::Result<u64>,
    R: FnOnce() -> io::Result<B>,
    B: AsRef<[u8]>,
{
    let mut ctx = IngestionContext {
        name: name.to_string(),
        format: None,
        size: None,
    };
    let mut warnings = Vec::new();

    let result = pipeline(&mut ctx, &mut warnings, size, read, options);

    if let Some(obs) = options.observer.as_ref() {
        for warning in &warnings {
            obs.on_warning(&ctx, warning);
        }
        match &result {
            Ok(ds) => obs.on_success(
                &ctx,
                IngestionStats {
                    records: ds.record_count(),
                    warnings: warnings.len(),
                },
            ),
            Err(e) => {
                let sev = severity_for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    result
}

fn pipeline<S, R, B>(
    ctx: &mut IngestionContext,
    warnings: &mut Vec<IngestionWarning>,
    size: S,
    read: R,
    options: &IngestionOptions,
) -> IngestionResult<Dataset>
where
    S: FnOnce() -> io::Result<u64>,
    R: FnOnce() -> io::Result<B>,
    B: AsRef<[u8]>,
{
    let name = ctx.name.clone();

    let declared = size().map_err(|e| IngestionError::failed(&name, e))?;
    ctx.size = Some(declared);
    check_size(&name, declared, options.max_file_size)?;

    let format = match options.format {
        Some(f) => f,
        None => infer_format(&name)?,
    };
    ctx.format = Some(format);

    let content = read().map_err(|e| IngestionError::failed(&name, e))?;
    let content = content.as_ref();
    // The file may have grown between the metadata check and the read.
    check_size(&name, content.len() as u64, options.max_file_size)?;

    tracing::debug!(name = %name, format = %format, size = content.len(), "decoding file");
    let data = decode(format, content, options, warnings).map_err(|e| IngestionError::failed(&name, e))?;
    Ok(assemble(name, data))
}

fn decode(
    format: DatasetType,
    content: &[u8],
    options: &IngestionOptions,
    warnings: &mut Vec<IngestionWarning>,
) -> DecodeResult<DatasetData> {
    Ok(match format {
        DatasetType::Csv => DatasetData::Csv(csv::decode_csv(content, options.csv_delimiter, warnings)?),
        DatasetType::Excel => DatasetData::Excel(excel::decode_excel(content, warnings)?),
        DatasetType::Json => DatasetData::Json(json::decode_json(content)?),
        DatasetType::Pdf => DatasetData::Pdf(pdf::decode_pdf(content, warnings)?),
    })
}

fn check_size(name: &str, size: u64, limit: u64) -> IngestionResult<()> {
    if size > limit {
        return Err(IngestionError::SizeLimitExceeded {
            name: name.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

fn severity_for_error(e: &IngestionError) -> IngestionSeverity {
    match e {
        IngestionError::IngestionFailed {
            cause: FailureCause::Io(_),
            ..
        } => IngestionSeverity::Critical,
        IngestionError::IngestionFailed {
            cause: FailureCause::Parse(_),
            ..
        } => IngestionSeverity::Error,
        IngestionError::UnsupportedFormat { .. } => IngestionSeverity::Error,
        IngestionError::SizeLimitExceeded { .. } => IngestionSeverity::Error,
    }
}

fn infer_format(name: &str) -> IngestionResult<DatasetType> {
    let ext = extension_of(name).ok_or_else(|| IngestionError::UnsupportedFormat {
        name: name.to_string(),
        extension: None,
    })?;

    DatasetType::from_extension(ext).ok_or_else(|| IngestionError::UnsupportedFormat {
        name: name.to_string(),
        extension: Some(ext.to_string()),
    })
}

/// Text after the last `.` of the name, if non-empty.
fn extension_of(name: &str) -> Option<&str> {
    name.rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}
