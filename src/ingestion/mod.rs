//! Ingestion entrypoints and implementations.
//!
//! Most callers should use [`ingest`] or [`ingest_from_path`] (from [`unified`]) which:
//!
//! - enforce the size ceiling before anything else
//! - resolve the format from the file extension (or an override in [`IngestionOptions`])
//! - run exactly one decoder and assemble the result into a [`crate::types::Dataset`]
//! - optionally report warnings/success/failure/alerts to an [`IngestionObserver`]
//!
//! Format-specific decoders are also available under:
//! - [`csv`]
//! - [`excel`]
//! - [`json`]
//! - [`pdf`]

pub mod assemble;
mod columns;
pub mod csv;
pub mod excel;
pub mod json;
pub mod observability;
pub mod pdf;
pub mod unified;

pub use assemble::assemble;
pub use observability::{
    CompositeObserver, FileObserver, IngestionContext, IngestionObserver, IngestionSeverity, IngestionStats,
    IngestionWarning, StdErrObserver, TracingObserver,
};
pub use pdf::{LopdfSource, PageSource};
pub use unified::{ingest, ingest_batch, ingest_from_path, IngestionOptions, UploadedFile};
