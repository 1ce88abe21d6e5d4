// src/process/mod.rs
use arrow::{
    array::{Array, ArrayRef, Date32Array, Int32Array, StringArray},
    compute::concat_batches,
    csv::{reader::Format, ReaderBuilder},
    datatypes::{DataType, Field, Schema},
    error::ArrowError,
    record_batch::RecordBatch,
};
use std::{
    fs,
    io::{self, Cursor},
    path::{Path, PathBuf},
    sync::Arc,
};
use thiserror::Error;
use tracing::{debug, info};

pub mod convert;
pub mod date_parser;
pub mod preview;
pub mod schema;
pub mod utils;

use utils::clean_str;

const READ_BATCH_SIZE: usize = 8192;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("file '{}' not found, please check the file path", path.display())]
    NotFound { path: PathBuf },

    #[error("file '{}' is not valid UTF-8 text: {source}", path.display())]
    Encoding {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("'{}' has no header row", path.display())]
    NoHeader { path: PathBuf },

    #[error("malformed delimited data in '{}': {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: ArrowError,
    },
}

/// The in-memory table of loaded rows.
///
/// Every input column is nullable UTF-8, with empty fields as nulls. Date derivation later
/// swaps the registration date column for `Date32` and appends `year`/`month`.
#[derive(Debug, Clone)]
pub struct RecordSet {
    batch: RecordBatch,
}

impl RecordSet {
    pub fn from_batch(batch: RecordBatch) -> Self {
        Self { batch }
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.batch
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.batch.schema().index_of(name).is_ok()
    }

    pub fn column(&self, name: &str) -> Option<&ArrayRef> {
        self.batch.column_by_name(name)
    }

    pub fn string_column(&self, name: &str) -> Option<&StringArray> {
        self.column(name)?.as_any().downcast_ref::<StringArray>()
    }

    pub fn date_column(&self, name: &str) -> Option<&Date32Array> {
        self.column(name)?.as_any().downcast_ref::<Date32Array>()
    }

    pub fn int_column(&self, name: &str) -> Option<&Int32Array> {
        self.column(name)?.as_any().downcast_ref::<Int32Array>()
    }

    pub(crate) fn replace_batch(&mut self, batch: RecordBatch) {
        self.batch = batch;
    }
}

/// Read the delimited file at `path` into a [`RecordSet`].
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_records<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<RecordSet, LoadError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        io::ErrorKind::InvalidData => LoadError::Encoding {
            path: path.to_path_buf(),
            source,
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let records = parse_records(&text, delimiter).map_err(|e| e.at(path))?;
    info!(
        rows = records.num_rows(),
        columns = records.batch().num_columns(),
        "Dataset loaded successfully"
    );
    Ok(records)
}

/// Failure while parsing in-memory text, before a path is attached.
#[derive(Debug)]
pub enum ParseFailure {
    NoHeader,
    Malformed(ArrowError),
}

impl ParseFailure {
    fn at(self, path: &Path) -> LoadError {
        match self {
            ParseFailure::NoHeader => LoadError::NoHeader {
                path: path.to_path_buf(),
            },
            ParseFailure::Malformed(source) => LoadError::Malformed {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Parse delimited text with a header row into an all-Utf8 record set.
pub fn parse_records(text: &str, delimiter: u8) -> Result<RecordSet, ParseFailure> {
    // 1) header only; the inferred types are discarded
    let (header_schema, _) = Format::default()
        .with_header(true)
        .with_delimiter(delimiter)
        .infer_schema(Cursor::new(text.as_bytes()), Some(0))
        .map_err(ParseFailure::Malformed)?;

    let headers: Vec<String> = header_schema
        .fields()
        .iter()
        .map(|f| clean_str(f.name()))
        .collect();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ParseFailure::NoHeader);
    }
    debug!(?headers, "parsed header");

    // 2) every column as nullable Utf8; short rows are padded with nulls
    let fields: Vec<Field> = headers
        .iter()
        .map(|n| Field::new(n, DataType::Utf8, true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_delimiter(delimiter)
        .with_quote(b'"')
        .with_truncated_rows(true)
        .with_batch_size(READ_BATCH_SIZE)
        .build(Cursor::new(text.as_bytes()))
        .map_err(ParseFailure::Malformed)?;

    let batches = reader
        .collect::<Result<Vec<RecordBatch>, ArrowError>>()
        .map_err(ParseFailure::Malformed)?;

    let batch = concat_batches(&schema, &batches).map_err(ParseFailure::Malformed)?;
    Ok(RecordSet::from_batch(batch))
}
