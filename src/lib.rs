//! `dataset-ingest` turns an uploaded data file into a single normalized, in-memory
//! [`types::Dataset`] that charting and question-answering features can consume without caring
//! which format the file came in.
//!
//! The primary entrypoints are [`ingestion::ingest`] (in-memory upload) and
//! [`ingestion::ingest_from_path`]. Both enforce a size ceiling, pick the decoder from the file
//! extension, and assemble the decoded payload into a dataset with a fresh id and timestamp.
//!
//! ## What you can ingest
//!
//! | Extension       | Dataset type | Payload                                     |
//! |-----------------|--------------|---------------------------------------------|
//! | `.csv`          | `csv`        | rows: column -> string                      |
//! | `.xlsx`, `.xls` | `excel`      | sheet name -> rows: column -> scalar        |
//! | `.json`         | `json`       | array elements (a single value is wrapped)  |
//! | `.pdf`          | `pdf`        | one text string per page                    |
//!
//! Files larger than [`types::MAX_FILE_SIZE`] (10 MiB) are rejected before decoding.
//!
//! ## Quick example
//!
//! ```rust
//! use dataset_ingest::ingestion::{ingest, IngestionOptions, UploadedFile};
//! use dataset_ingest::types::DatasetData;
//!
//! # fn main() -> Result<(), dataset_ingest::IngestionError> {
//! let file = UploadedFile::new("data.json", r#"{"a":1}"#);
//! let ds = ingest(&file, &IngestionOptions::default())?;
//!
//! match ds.data() {
//!     DatasetData::Json(items) => assert_eq!(items.len(), 1),
//!     other => panic!("unexpected payload {other:?}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Errors
//!
//! Decoders fail with [`error::ParseError`]. The entrypoints only ever return
//! [`IngestionError`]: `UnsupportedFormat`, `SizeLimitExceeded`, or `IngestionFailed` wrapping
//! the original cause. Two failures are tolerated instead of aborting: an empty or unreadable
//! workbook sheet, and a PDF page whose text cannot be extracted. Both are left out of the
//! payload and reported as [`ingestion::IngestionWarning`]s.
//!
//! ## Modules
//!
//! - [`ingestion`]: unified entrypoints, format-specific decoders, observers
//! - [`types`]: the dataset record and its payload
//! - [`error`]: error types used across ingestion

pub mod error;
pub mod ingestion;
pub mod types;

pub use error::{IngestionError, IngestionResult, ParseError};
