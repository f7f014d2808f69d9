use rosteract_layout::{ImportError, LayoutError};
use thiserror::Error;

/// Adapter failure.
#[derive(Error, Debug)]
pub enum XlsxIoError {
    /// Source bytes could not be read as a spreadsheet or data frame.
    #[error("decode error: {0}")]
    Decode(String),
    /// Document could not be written as xlsx.
    #[error("xlsx write error: {0}")]
    Encode(String),
    /// Archive could not be packed.
    #[error("archive error: {0}")]
    Archive(String),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// Packed export: archive bytes plus the names of its entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecExportArtifact {
    pub archive_name: String,
    pub v_archive: Vec<u8>,
    /// Entry names in archive order.
    pub file_names: Vec<String>,
}
