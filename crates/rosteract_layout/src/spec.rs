//! Shared roster, selection and document models.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use thiserror::Error;

use crate::conf::{C_APPROVER_NAME, C_APPROVER_POSITION, C_APPROVER_RANK};

////////////////////////////////////////////////////////////////////////////////
// #region CellValues

/// Scalar cell value carried verbatim from the source grid into the document.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EnumCellValue {
    /// Missing/blank value.
    #[default]
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Calendar date value.
    Date(NaiveDate),
}

impl EnumCellValue {
    /// Whether the value is blank.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    /// Display text used for header matching and text measurement.
    pub fn to_text(&self) -> String {
        match self {
            Self::None => String::new(),
            Self::String(val) => val.clone(),
            Self::Number(val) => {
                if val.is_finite() && val.fract() == 0.0 && val.abs() < 1e15 {
                    format!("{}", *val as i64)
                } else {
                    val.to_string()
                }
            }
            Self::Date(val) => val.format("%d.%m.%Y").to_string(),
        }
    }
}

impl From<&str> for EnumCellValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for EnumCellValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<f64> for EnumCellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// Decoded spreadsheet grid, 1-indexed, holding non-empty rows only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCellGrid {
    rows: BTreeMap<u32, BTreeMap<u32, EnumCellValue>>,
}

impl SpecCellGrid {
    /// Create an empty grid.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one cell. Blank values are dropped so that only non-empty rows exist.
    pub fn insert(&mut self, row: u32, col: u32, value: EnumCellValue) {
        if value.is_none() {
            return;
        }
        self.rows.entry(row).or_default().insert(col, value);
    }

    /// Cell value at `(row, col)`.
    pub fn get(&self, row: u32, col: u32) -> Option<&EnumCellValue> {
        self.rows.get(&row).and_then(|cells| cells.get(&col))
    }

    /// Cells of one row keyed by column.
    pub fn row(&self, row: u32) -> Option<&BTreeMap<u32, EnumCellValue>> {
        self.rows.get(&row)
    }

    /// Number of non-empty rows, header included.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Non-empty row numbers in top-to-bottom order.
    pub fn row_numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region RosterRecords

/// Record fields recognized in the source roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumRecordField {
    Index,
    Rank,
    Name,
    Birthday,
    Age,
    MedicalCommission,
    MobilizationUnit,
}

impl EnumRecordField {
    /// All fields in source catalog order.
    pub const ALL: [Self; 7] = [
        Self::Index,
        Self::Rank,
        Self::Name,
        Self::Birthday,
        Self::Age,
        Self::MedicalCommission,
        Self::MobilizationUnit,
    ];

    /// Stable field key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Rank => "rank",
            Self::Name => "name",
            Self::Birthday => "birthday",
            Self::Age => "age",
            Self::MedicalCommission => "medicalCommission",
            Self::MobilizationUnit => "mobilizationUnit",
        }
    }
}

/// Source column matched by the importer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSourceColumn {
    /// Bound record field.
    pub field: EnumRecordField,
    /// Header text as found in the grid.
    pub label: String,
    /// 1-based grid column.
    pub col_idx: u32,
}

/// One roster entry. Identity is its 0-based position in the import.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRecord {
    /// 0-based import position.
    pub id: usize,
    /// Values of the matched fields.
    pub values: BTreeMap<EnumRecordField, EnumCellValue>,
}

impl SpecRecord {
    /// Create an empty record with identity `id`.
    pub fn new(id: usize) -> Self {
        Self {
            id,
            values: BTreeMap::new(),
        }
    }

    /// Set one field value (builder style).
    pub fn with_(mut self, field: EnumRecordField, value: impl Into<EnumCellValue>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Field value, blank when the field was not imported.
    pub fn value(&self, field: EnumRecordField) -> EnumCellValue {
        self.values.get(&field).cloned().unwrap_or_default()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SelectionState

/// Per-record selection flag and rejection note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSelectionState {
    /// Whether the record is selected.
    pub selected: bool,
    /// Rejection note. Suppressed while `selected` is true.
    pub note: String,
    /// Whether the operator typed the note.
    pub if_note_edited: bool,
}

/// Operator actions on one selection entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnumSelectionAction {
    /// Flip the selected flag.
    Toggle,
    /// Replace the note text.
    SetNote(String),
}

/// Immutable snapshot of all selection states, indexed by record id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSelectionStore {
    pub(crate) states: Vec<SpecSelectionState>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportMetadata

/// Position/rank/name triple of one responsible person.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecSignatory {
    pub position: String,
    pub rank: String,
    pub name: String,
}

/// Operator-entered metadata shared by all three acts of one export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportMetadata {
    /// Destination military unit.
    pub destination_unit: String,
    /// Distribution order number.
    pub order_number: String,
    /// Distribution order date.
    pub order_date: Option<NaiveDate>,
    /// Commander approving the acts.
    pub approver: SpecSignatory,
    /// Battalion representative.
    pub responsible: SpecSignatory,
    /// Distribution (receiving unit) representative.
    pub distribution_responsible: SpecSignatory,
}

impl Default for SpecReportMetadata {
    fn default() -> Self {
        Self {
            destination_unit: String::new(),
            order_number: String::new(),
            order_date: None,
            approver: SpecSignatory {
                position: C_APPROVER_POSITION.to_string(),
                rank: C_APPROVER_RANK.to_string(),
                name: C_APPROVER_NAME.to_string(),
            },
            responsible: SpecSignatory::default(),
            distribution_responsible: SpecSignatory::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DerivedFields

/// Selection-dependent texts of one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDerivedRecord {
    /// Assessment phrase.
    pub assessment_text: String,
    /// Rejection note, blank when selected.
    pub note_text: String,
    /// Receiving-act note: default label when selected, rejection note otherwise.
    pub selection_text: String,
}

/// Values computed once per export and consumed by every shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDerivedFields {
    pub n_total: usize,
    pub n_selected: usize,
    pub n_rejected: usize,
    /// Per-record texts in import order.
    pub records: Vec<SpecDerivedRecord>,
    /// Long-form order date, or the blank placeholder.
    pub order_date_text: String,
    /// Long-form export date.
    pub today_text: String,
    /// Export date.
    pub today: NaiveDate,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format overlay. `None` fields inherit from the layer below.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,
    /// Italic style.
    pub italic: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,
    /// Text wrap.
    pub text_wrap: Option<bool>,

    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_name: other.font_name.clone().or_else(|| self.font_name.clone()),
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            italic: other.italic.or(self.italic),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            text_wrap: other.text_wrap.or(self.text_wrap),
            top: other.top.or(self.top),
            bottom: other.bottom.or(self.bottom),
            left: other.left.or(self.left),
            right: other.right.or(self.right),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
        }
    }

    /// Whether no property is set.
    pub fn is_empty(&self) -> bool {
        *self == SpecCellFormat::default()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DocumentModel

/// Logical column slot of a report shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EnumColumnKey {
    Index,
    Rank,
    Name,
    Birthday,
    Age,
    MedicalCommission,
    Mps,
    MobilizationUnit,
    Assessment,
    Note,
    Signature,
}

impl EnumColumnKey {
    /// Stable column key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Rank => "rank",
            Self::Name => "name",
            Self::Birthday => "birthday",
            Self::Age => "age",
            Self::MedicalCommission => "medicalCommission",
            Self::Mps => "mps",
            Self::MobilizationUnit => "mobilizationUnit",
            Self::Assessment => "assessment",
            Self::Note => "note",
            Self::Signature => "signature",
        }
    }
}

impl From<EnumRecordField> for EnumColumnKey {
    fn from(field: EnumRecordField) -> Self {
        match field {
            EnumRecordField::Index => Self::Index,
            EnumRecordField::Rank => Self::Rank,
            EnumRecordField::Name => Self::Name,
            EnumRecordField::Birthday => Self::Birthday,
            EnumRecordField::Age => Self::Age,
            EnumRecordField::MedicalCommission => Self::MedicalCommission,
            EnumRecordField::MobilizationUnit => Self::MobilizationUnit,
        }
    }
}

/// Fixed report layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumActShape {
    /// Receiving act.
    Receiving,
    /// Qualification-commission act.
    Commission,
    /// Qualification-commission act, file copy.
    CommissionCopy,
}

impl EnumActShape {
    /// Shapes in export order.
    pub const ALL: [Self; 3] = [Self::Receiving, Self::Commission, Self::CommissionCopy];

    /// Whether this is the copy variant.
    pub fn if_copy(self) -> bool {
        matches!(self, Self::CommissionCopy)
    }
}

/// Column of a laid-out document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecColumn {
    /// Logical key.
    pub key: EnumColumnKey,
    /// Header label.
    pub label: String,
    /// Width in Excel character units.
    pub width: f64,
    /// 1-based position.
    pub position: u32,
}

/// One cell: value plus format overrides on top of row/column defaults.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecCell {
    pub value: EnumCellValue,
    pub format: SpecCellFormat,
}

/// One document row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRow {
    /// Cells keyed by column.
    pub cells: BTreeMap<EnumColumnKey, SpecCell>,
    /// Row-level format applied under cell overrides.
    pub format: SpecCellFormat,
    /// Explicit height in points.
    pub height: Option<f64>,
    /// Force a page break after this row.
    pub if_page_break: bool,
}

impl SpecRow {
    /// Cell at column `key`.
    pub fn cell(&self, key: EnumColumnKey) -> Option<&SpecCell> {
        self.cells.get(&key)
    }

    /// Cell text at column `key`, blank when absent.
    pub fn text(&self, key: EnumColumnKey) -> String {
        self.cell(key)
            .map(|cell| cell.value.to_text())
            .unwrap_or_default()
    }
}

/// Rectangular merge, 1-indexed and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpecMergeRegion {
    pub row_start: u32,
    pub col_start: u32,
    pub row_end: u32,
    pub col_end: u32,
}

impl SpecMergeRegion {
    /// Merge spanning columns `col_start..=col_end` of one row.
    pub fn horizontal(row: u32, col_start: u32, col_end: u32) -> Self {
        Self {
            row_start: row,
            col_start,
            row_end: row,
            col_end,
        }
    }

    /// Non-inverted, 1-indexed, covering more than one cell.
    pub fn is_valid(&self) -> bool {
        self.row_start >= 1
            && self.col_start >= 1
            && self.row_start <= self.row_end
            && self.col_start <= self.col_end
            && (self.row_start, self.col_start) != (self.row_end, self.col_end)
    }

    /// Whether `(row, col)` lies in the region.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        (self.row_start..=self.row_end).contains(&row)
            && (self.col_start..=self.col_end).contains(&col)
    }

    /// Whether the two regions share at least one cell.
    pub fn overlaps(&self, other: &SpecMergeRegion) -> bool {
        self.row_start <= other.row_end
            && other.row_start <= self.row_end
            && self.col_start <= other.col_end
            && other.col_start <= self.col_end
    }
}

/// Page margins in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecPageMargins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

/// Print setup emitted once per document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecPageSetup {
    /// Excel paper size code (9 = A4).
    pub paper_size: u8,
    /// Landscape orientation.
    pub if_landscape: bool,
    /// Pages wide when fitting to page.
    pub fit_to_width: u16,
    /// Pages tall when fitting to page (0 = unlimited).
    pub fit_to_height: u16,
    /// Page margins.
    pub margins: SpecPageMargins,
    /// Sheet view zoom percentage.
    pub zoom: u16,
    /// Open in page break preview.
    pub if_page_break_preview: bool,
}

/// Fully laid-out grid document.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecDocumentModel {
    /// Worksheet name.
    pub sheet_name: String,
    /// Columns in position order.
    pub columns: Vec<SpecColumn>,
    /// Default format for every column.
    pub fmt_column: SpecCellFormat,
    /// Rows in order; row `n` of the sheet is `rows[n - 1]`.
    pub rows: Vec<SpecRow>,
    /// Merge regions.
    pub merges: Vec<SpecMergeRegion>,
    /// Print setup.
    pub page_setup: SpecPageSetup,
}

impl SpecDocumentModel {
    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// Row by 1-based number.
    pub fn row(&self, row_1based: u32) -> Option<&SpecRow> {
        let idx = usize::try_from(row_1based).ok()?.checked_sub(1)?;
        self.rows.get(idx)
    }

    /// Column by key.
    pub fn column(&self, key: EnumColumnKey) -> Option<&SpecColumn> {
        self.columns.iter().find(|col| col.key == key)
    }

    /// 1-based numbers of rows followed by a forced page break.
    pub fn page_breaks(&self) -> Vec<u32> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.if_page_break)
            .map(|(idx, _)| idx as u32 + 1)
            .collect()
    }
}

/// Laid-out document plus its suggested file name.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecReportFile {
    pub shape: EnumActShape,
    pub file_name: String,
    pub document: SpecDocumentModel,
}

/// The three acts of one export.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecReportBundle {
    /// Suggested archive name.
    pub archive_name: String,
    /// Acts in export order.
    pub files: Vec<SpecReportFile>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Roster import failure. Prior session state stays untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("no recognizable roster columns in header row ({n_headers_seen} header cells scanned)")]
    NoRecognizedColumns { n_headers_seen: usize },
}

/// Selection edit failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("unknown record id {id} (store holds {n_records} records)")]
    UnknownRecord { id: usize, n_records: usize },
}

/// Layout failure. Only raised for malformed shape definitions.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("layout precondition violated: {0}")]
    Precondition(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
