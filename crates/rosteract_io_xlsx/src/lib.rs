//! `rosteract_io_xlsx` v1:
//! Spreadsheet adapters around the act layout kernel.
//!
//! - `spec`    : adapter errors and export artifact
//! - `reader`  : xlsx/xls and Polars IPC grid decoders
//! - `writer`  : document model to xlsx bytes
//! - `archive` : zip packaging
//! - `export`  : one-call layout, encode and pack
pub mod archive;
pub mod export;
pub mod reader;
pub mod spec;
pub mod writer;

pub use archive::pack_archive;
pub use export::{encode_bundle, export_reports};
pub use reader::{
    decode_grid_from_ipc_bytes, decode_grid_from_xlsx_bytes, import_roster_from_ipc_bytes,
    import_roster_from_xlsx_bytes,
};
pub use spec::{SpecExportArtifact, XlsxIoError};
pub use writer::encode_document;
