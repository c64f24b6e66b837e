//! Core data model for ingested files.
//!
//! Every successful ingestion produces exactly one [`Dataset`]. Its payload is a [`DatasetData`]
//! whose variant *is* the dataset type, so the declared type and the payload shape cannot drift
//! apart and consumers match on the payload exhaustively.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

/// Largest accepted upload, in bytes (10 MiB). A file of exactly this size is accepted.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// One row of tabular data: column name -> scalar value, in column order.
pub type Row = serde_json::Map<String, Value>;

/// Declared type of a [`Dataset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetType {
    /// Delimited text (`.csv`).
    Csv,
    /// Spreadsheet workbook (`.xlsx`, `.xls`).
    Excel,
    /// Page-oriented document (`.pdf`).
    Pdf,
    /// Structured text (`.json`).
    Json,
}

impl DatasetType {
    /// Resolve a dataset type from a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            "xlsx" | "xls" => Some(Self::Excel),
            "pdf" => Some(Self::Pdf),
            _ => None,
        }
    }

    /// Wire name of the type tag.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Pdf => "pdf",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for DatasetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded payload of a [`Dataset`], tagged by dataset type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum DatasetData {
    /// Rows of a delimited-text file. Every value is a string.
    Csv(Vec<Row>),
    /// Sheet name -> rows. Sheets without rows are never present.
    Excel(BTreeMap<String, Vec<Row>>),
    /// Extracted text, one entry per page, in page order.
    Pdf(Vec<String>),
    /// Elements of a JSON document. Usually objects, but any JSON value is kept as-is.
    Json(Vec<Value>),
}

impl DatasetData {
    /// The type tag matching this payload.
    pub fn dataset_type(&self) -> DatasetType {
        match self {
            Self::Csv(_) => DatasetType::Csv,
            Self::Excel(_) => DatasetType::Excel,
            Self::Pdf(_) => DatasetType::Pdf,
            Self::Json(_) => DatasetType::Json,
        }
    }

    /// Number of records: rows for tables (summed across sheets), pages for documents.
    pub fn record_count(&self) -> usize {
        match self {
            Self::Csv(rows) => rows.len(),
            Self::Excel(sheets) => sheets.values().map(Vec::len).sum(),
            Self::Pdf(pages) => pages.len(),
            Self::Json(items) => items.len(),
        }
    }
}

/// The canonical, immutable result of ingesting one file.
///
/// Serializes as `{ "id", "name", "type", "data", "uploadedAt" }` with `uploadedAt` in epoch
/// milliseconds. Deserializing rejects payloads ingestion never produces, such as an `excel`
/// sheet with no rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "DatasetRecord")]
pub struct Dataset {
    id: Uuid,
    name: String,
    #[serde(flatten)]
    data: DatasetData,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    uploaded_at: DateTime<Utc>,
}

/// A serialized [`Dataset`] whose payload breaks a dataset invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidDataset {
    #[error("excel sheet '{0}' has no rows")]
    EmptySheet(String),
}

/// Wire form of a [`Dataset`], checked before it becomes one.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DatasetRecord {
    id: Uuid,
    name: String,
    #[serde(flatten)]
    data: DatasetData,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    uploaded_at: DateTime<Utc>,
}

impl TryFrom<DatasetRecord> for Dataset {
    type Error = InvalidDataset;

    fn try_from(record: DatasetRecord) -> Result<Self, Self::Error> {
        if let DatasetData::Excel(sheets) = &record.data {
            if let Some((sheet, _)) = sheets.iter().find(|(_, rows)| rows.is_empty()) {
                return Err(InvalidDataset::EmptySheet(sheet.clone()));
            }
        }
        Ok(Self::new(record.id, record.name, record.data, record.uploaded_at))
    }
}

impl Dataset {
    pub(crate) fn new(id: Uuid, name: String, data: DatasetData, uploaded_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            data,
            uploaded_at,
        }
    }

    /// Unique identifier assigned at creation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Original file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared dataset type.
    pub fn dataset_type(&self) -> DatasetType {
        self.data.dataset_type()
    }

    /// Decoded payload.
    pub fn data(&self) -> &DatasetData {
        &self.data
    }

    /// Consume the dataset and return its payload.
    pub fn into_data(self) -> DatasetData {
        self.data
    }

    /// Creation timestamp.
    pub fn uploaded_at(&self) -> DateTime<Utc> {
        self.uploaded_at
    }

    /// Number of rows (or pages) in the payload.
    pub fn record_count(&self) -> usize {
        self.data.record_count()
    }

    /// Sheet names of an `excel` dataset, sorted. Empty for every other type.
    pub fn sheet_names(&self) -> Vec<&str> {
        match &self.data {
            DatasetData::Excel(sheets) => sheets.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// Column names of the first row of the first table, as a preview would show them.
    ///
    /// For `json` this is only populated when the first element is an object; `pdf` has no
    /// columns.
    pub fn column_names(&self) -> Vec<String> {
        self.first_row()
            .map(|row| row.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Columns whose value in the first row is a JSON number.
    ///
    /// This is the only type detection charting needs: CSV values are always strings, so CSV
    /// datasets never report numeric columns.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.first_row()
            .map(|row| {
                row.iter()
                    .filter(|(_, v)| v.is_number())
                    .map(|(k, _)| k.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every record as a JSON value, with sheets flattened in sheet-name order.
    ///
    /// This is the shape handed to the question-answering service.
    pub fn to_records(&self) -> Vec<Value> {
        match &self.data {
            DatasetData::Csv(rows) => rows.iter().cloned().map(Value::Object).collect(),
            DatasetData::Excel(sheets) => sheets
                .values()
                .flatten()
                .cloned()
                .map(Value::Object)
                .collect(),
            DatasetData::Pdf(pages) => pages.iter().cloned().map(Value::String).collect(),
            DatasetData::Json(items) => items.clone(),
        }
    }

    fn first_row(&self) -> Option<&Row> {
        match &self.data {
            DatasetData::Csv(rows) => rows.first(),
            DatasetData::Excel(sheets) => sheets.values().find_map(|rows| rows.first()),
            DatasetData::Json(items) => items.first().and_then(Value::as_object),
            DatasetData::Pdf(_) => None,
        }
    }
}
