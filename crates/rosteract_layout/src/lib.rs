//! `rosteract_layout` v1:
//! Roster selection and act layout kernel.
//!
//! Modules, leaf first:
//! - `conf`     : labels, column catalogs and default presets
//! - `spec`     : records, selection state, document model, errors
//! - `util`     : row heights, dates, text templates, merge checks
//! - `import`   : header-matching roster importer
//! - `select`   : selection state reducers
//! - `derive`   : counts and selection-dependent texts
//! - `layout`   : declarative row-block renderer
//! - `shape`    : the receiving and commission act definitions
//! - `assemble` : three acts per export, with file names
pub mod assemble;
pub mod conf;
pub mod derive;
pub mod import;
pub mod layout;
pub mod select;
pub mod shape;
pub mod spec;
pub mod util;

pub use assemble::{assemble_reports, derive_archive_name, derive_file_name};
pub use derive::derive_fields;
pub use import::{SpecImportResult, import_records, match_source_columns};
pub use layout::{
    EnumCellBinding, EnumRowBlock, EnumRowHeightRule, SpecCellSpec, SpecRecordRowSpec,
    SpecRowSpec, SpecShapeDefinition, layout, render_document,
};
pub use select::reduce_selection_state;
pub use shape::derive_shape_definition;
pub use spec::{
    EnumActShape, EnumCellValue, EnumColumnKey, EnumRecordField, EnumSelectionAction,
    ImportError, LayoutError, SelectionError, SpecCell, SpecCellFormat, SpecCellGrid,
    SpecColumn, SpecDerivedFields, SpecDerivedRecord, SpecDocumentModel, SpecMergeRegion,
    SpecPageMargins, SpecPageSetup, SpecRecord, SpecReportBundle, SpecReportFile,
    SpecReportMetadata, SpecRow, SpecSelectionState, SpecSelectionStore, SpecSignatory,
    SpecSourceColumn,
};
