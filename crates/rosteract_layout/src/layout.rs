//! Declarative row-block renderer.
//!
//! A shape is a list of [`EnumRowBlock`]s. Fixed rows carry their own cells and
//! merges; the header block expands to the column labels and the record block
//! expands to one row per record. Merges are written against column keys and
//! resolved to 1-based coordinates once the row number is known.

use std::collections::BTreeMap;

use tracing::debug;

use crate::conf::N_FONT_SIZE;
use crate::shape::derive_shape_definition;
use crate::spec::{
    EnumActShape, EnumCellValue, EnumColumnKey, EnumRecordField, LayoutError, SpecCell,
    SpecCellFormat, SpecColumn, SpecDerivedFields, SpecDerivedRecord, SpecDocumentModel,
    SpecMergeRegion, SpecPageSetup, SpecRecord, SpecReportMetadata, SpecRow, SpecSelectionStore,
};
use crate::util::{calculate_merged_row_height, derive_total_width, validate_merge_regions};

////////////////////////////////////////////////////////////////////////////////
// #region RowSpecification

/// How a fixed row gets its height.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum EnumRowHeightRule {
    /// Left to the spreadsheet application.
    #[default]
    Auto,
    /// Wrapped text of this column measured across the full column span.
    WrappedText(EnumColumnKey),
}

/// One cell of a fixed row.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCellSpec {
    pub col: EnumColumnKey,
    pub value: EnumCellValue,
    pub format: SpecCellFormat,
}

/// Fixed row: literal cells, horizontal merges and row options.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRowSpec {
    pub cells: Vec<SpecCellSpec>,
    pub format: SpecCellFormat,
    /// Inclusive `(first, last)` column pairs merged within this row.
    pub merges: Vec<(EnumColumnKey, EnumColumnKey)>,
    pub height: EnumRowHeightRule,
    pub if_page_break: bool,
}

impl SpecRowSpec {
    /// Row without cells.
    pub fn blank() -> Self {
        Self::default()
    }

    /// Add a text cell. Empty text leaves the cell blank.
    pub fn with_text(self, col: EnumColumnKey, text: impl Into<String>) -> Self {
        self.with_text_fmt(col, text, SpecCellFormat::default())
    }

    /// Add a text cell with format overrides.
    pub fn with_text_fmt(
        mut self,
        col: EnumColumnKey,
        text: impl Into<String>,
        format: SpecCellFormat,
    ) -> Self {
        let text: String = text.into();
        let value = if text.is_empty() {
            EnumCellValue::None
        } else {
            EnumCellValue::String(text)
        };
        self.cells.push(SpecCellSpec { col, value, format });
        self
    }

    /// Merge columns `first..=last` of this row.
    pub fn with_merge(mut self, first: EnumColumnKey, last: EnumColumnKey) -> Self {
        self.merges.push((first, last));
        self
    }

    pub fn with_format(mut self, format: SpecCellFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_height(mut self, height: EnumRowHeightRule) -> Self {
        self.height = height;
        self
    }

    /// Force a page break after this row.
    pub fn with_page_break(mut self) -> Self {
        self.if_page_break = true;
        self
    }
}

/// Source of one data-row cell.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellBinding {
    /// Record field, copied verbatim.
    Field(EnumRecordField),
    /// Constant text.
    Text(String),
    /// Derived assessment phrase.
    Assessment,
    /// Derived rejection note, blank when selected.
    RejectionNote,
    /// Derived receiving-act note.
    SelectionNote,
    /// Present but empty.
    Blank,
}

/// Template of the per-record data row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRecordRowSpec {
    pub bindings: Vec<(EnumColumnKey, EnumCellBinding)>,
    /// Columns aligned center on top of `fmt_cell`.
    pub cols_center: Vec<EnumColumnKey>,
    pub format: SpecCellFormat,
    /// Applied to every bound cell.
    pub fmt_cell: SpecCellFormat,
}

/// One block of a shape definition.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumRowBlock {
    /// A single fixed row.
    Row(SpecRowSpec),
    /// Column labels in catalog order.
    Header {
        format: SpecCellFormat,
        fmt_cell: SpecCellFormat,
    },
    /// One row per record, never filtered.
    Records(SpecRecordRowSpec),
}

/// Everything needed to render one act.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecShapeDefinition {
    pub shape: EnumActShape,
    pub sheet_name: String,
    pub columns: Vec<SpecColumn>,
    pub fmt_column: SpecCellFormat,
    pub page_setup: SpecPageSetup,
    pub blocks: Vec<EnumRowBlock>,
}

impl SpecShapeDefinition {
    /// Number of rows the definition renders for `n_records` records.
    pub fn n_rows(&self, n_records: usize) -> usize {
        self.blocks
            .iter()
            .map(|block| match block {
                EnumRowBlock::Row(_) | EnumRowBlock::Header { .. } => 1,
                EnumRowBlock::Records(_) => n_records,
            })
            .sum()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Renderer

struct RowRenderer<'a> {
    dict_col_pos: BTreeMap<EnumColumnKey, u32>,
    columns: &'a [SpecColumn],
    width_total: f64,
    font_size: f64,
}

impl<'a> RowRenderer<'a> {
    fn new(def: &'a SpecShapeDefinition) -> Result<Self, LayoutError> {
        let mut dict_col_pos = BTreeMap::new();
        for col in &def.columns {
            if dict_col_pos.insert(col.key, col.position).is_some() {
                return Err(LayoutError::Precondition(format!(
                    "Column `{}` is declared twice.",
                    col.key.key()
                )));
            }
        }
        Ok(Self {
            dict_col_pos,
            columns: &def.columns,
            width_total: derive_total_width(&def.columns),
            font_size: def.fmt_column.font_size.unwrap_or(N_FONT_SIZE) as f64,
        })
    }

    fn position(&self, col: EnumColumnKey) -> Result<u32, LayoutError> {
        self.dict_col_pos.get(&col).copied().ok_or_else(|| {
            LayoutError::Precondition(format!("Column `{}` is not part of this shape.", col.key()))
        })
    }

    fn render_fixed_row(
        &self,
        spec: &SpecRowSpec,
        n_row: u32,
        merges: &mut Vec<SpecMergeRegion>,
    ) -> Result<SpecRow, LayoutError> {
        let mut row = SpecRow {
            format: spec.format.clone(),
            if_page_break: spec.if_page_break,
            ..Default::default()
        };
        for cell in &spec.cells {
            self.position(cell.col)?;
            row.cells.insert(
                cell.col,
                SpecCell {
                    value: cell.value.clone(),
                    format: cell.format.clone(),
                },
            );
        }
        for (first, last) in &spec.merges {
            merges.push(SpecMergeRegion::horizontal(
                n_row,
                self.position(*first)?,
                self.position(*last)?,
            ));
        }

        row.height = match spec.height {
            EnumRowHeightRule::Auto => None,
            EnumRowHeightRule::WrappedText(col) => {
                self.position(col)?;
                Some(calculate_merged_row_height(
                    &row.text(col),
                    self.width_total,
                    self.font_size,
                ))
            }
        };
        Ok(row)
    }

    fn render_header_row(&self, format: &SpecCellFormat, fmt_cell: &SpecCellFormat) -> SpecRow {
        SpecRow {
            cells: self
                .columns
                .iter()
                .map(|col| {
                    (
                        col.key,
                        SpecCell {
                            value: EnumCellValue::String(col.label.clone()),
                            format: fmt_cell.clone(),
                        },
                    )
                })
                .collect(),
            format: format.clone(),
            ..Default::default()
        }
    }

    fn render_record_row(
        &self,
        spec: &SpecRecordRowSpec,
        record: &SpecRecord,
        derived: &SpecDerivedRecord,
    ) -> Result<SpecRow, LayoutError> {
        let fmt_center = spec.fmt_cell.with_(SpecCellFormat {
            align: Some("center".to_string()),
            ..Default::default()
        });

        let mut row = SpecRow {
            format: spec.format.clone(),
            ..Default::default()
        };
        for (col, binding) in &spec.bindings {
            self.position(*col)?;
            let value = match binding {
                EnumCellBinding::Field(field) => record.value(*field),
                EnumCellBinding::Text(text) => EnumCellValue::String(text.clone()),
                EnumCellBinding::Assessment => {
                    EnumCellValue::String(derived.assessment_text.clone())
                }
                EnumCellBinding::RejectionNote => text_or_none(&derived.note_text),
                EnumCellBinding::SelectionNote => text_or_none(&derived.selection_text),
                EnumCellBinding::Blank => EnumCellValue::None,
            };
            let format = if spec.cols_center.contains(col) {
                fmt_center.clone()
            } else {
                spec.fmt_cell.clone()
            };
            row.cells.insert(*col, SpecCell { value, format });
        }
        Ok(row)
    }
}

fn text_or_none(text: &str) -> EnumCellValue {
    if text.is_empty() {
        EnumCellValue::None
    } else {
        EnumCellValue::String(text.to_string())
    }
}

/// Evaluate a shape definition against one records snapshot.
///
/// `derived.records` must hold one entry per record. Fails with
/// [`LayoutError::Precondition`] on unknown columns and on merges that are
/// inverted, single-cell, out of bounds or overlapping.
pub fn render_document(
    def: &SpecShapeDefinition,
    records: &[SpecRecord],
    derived: &SpecDerivedFields,
) -> Result<SpecDocumentModel, LayoutError> {
    if derived.records.len() != records.len() {
        return Err(LayoutError::Precondition(format!(
            "Derived fields cover {} records, expected {}.",
            derived.records.len(),
            records.len()
        )));
    }

    let renderer = RowRenderer::new(def)?;
    let mut l_rows: Vec<SpecRow> = Vec::with_capacity(def.n_rows(records.len()));
    let mut l_merges: Vec<SpecMergeRegion> = Vec::new();

    for block in &def.blocks {
        match block {
            EnumRowBlock::Row(spec) => {
                let n_row = l_rows.len() as u32 + 1;
                l_rows.push(renderer.render_fixed_row(spec, n_row, &mut l_merges)?);
            }
            EnumRowBlock::Header { format, fmt_cell } => {
                l_rows.push(renderer.render_header_row(format, fmt_cell));
            }
            EnumRowBlock::Records(spec) => {
                for (record, derived_record) in records.iter().zip(&derived.records) {
                    l_rows.push(renderer.render_record_row(spec, record, derived_record)?);
                }
            }
        }
    }

    validate_merge_regions(&l_merges, l_rows.len(), def.columns.len())
        .map_err(LayoutError::Precondition)?;

    debug!(
        shape = ?def.shape,
        n_rows = l_rows.len(),
        n_merges = l_merges.len(),
        "document laid out"
    );

    Ok(SpecDocumentModel {
        sheet_name: def.sheet_name.clone(),
        columns: def.columns.clone(),
        fmt_column: def.fmt_column.clone(),
        rows: l_rows,
        merges: l_merges,
        page_setup: def.page_setup,
    })
}

/// Lay out one act from a consistent snapshot.
///
/// The selection store and the derived fields must both cover every record, and
/// the derived counts must agree with the store. Cells are rendered from `derived`.
pub fn layout(
    shape: EnumActShape,
    records: &[SpecRecord],
    selection: &SpecSelectionStore,
    derived: &SpecDerivedFields,
    metadata: &SpecReportMetadata,
) -> Result<SpecDocumentModel, LayoutError> {
    if selection.len() != records.len() {
        return Err(LayoutError::Precondition(format!(
            "Selection store holds {} states for {} records.",
            selection.len(),
            records.len()
        )));
    }
    if derived.n_total != records.len() {
        return Err(LayoutError::Precondition(format!(
            "Derived fields were computed for {} records, got {}.",
            derived.n_total,
            records.len()
        )));
    }
    if derived.n_selected != selection.n_selected() {
        return Err(LayoutError::Precondition(format!(
            "Derived fields count {} selected records, the selection store counts {}.",
            derived.n_selected,
            selection.n_selected()
        )));
    }

    let def = derive_shape_definition(shape, derived, metadata);
    render_document(&def, records, derived)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{derive_default_column_format, derive_default_page_setup};
    use crate::derive::derive_fields;
    use chrono::NaiveDate;

    fn build_columns() -> Vec<SpecColumn> {
        [(EnumColumnKey::Index, 10.0), (EnumColumnKey::Name, 20.0), (EnumColumnKey::Note, 10.0)]
            .into_iter()
            .enumerate()
            .map(|(n_idx, (key, width))| SpecColumn {
                key,
                label: key.key().to_string(),
                width,
                position: n_idx as u32 + 1,
            })
            .collect()
    }

    fn build_definition(blocks: Vec<EnumRowBlock>) -> SpecShapeDefinition {
        SpecShapeDefinition {
            shape: EnumActShape::Receiving,
            sheet_name: "Аркуш".to_string(),
            columns: build_columns(),
            fmt_column: derive_default_column_format(),
            page_setup: derive_default_page_setup(EnumActShape::Receiving),
            blocks,
        }
    }

    fn build_inputs(n: usize) -> (Vec<SpecRecord>, SpecDerivedFields) {
        let records: Vec<SpecRecord> = (0..n)
            .map(|id| SpecRecord::new(id).with_(EnumRecordField::Name, format!("Особа {id}")))
            .collect();
        let selection = SpecSelectionStore::seeded(n);
        let today = NaiveDate::from_ymd_opt(2025, 6, 2).expect("date");
        let derived = derive_fields(&records, &selection, &SpecReportMetadata::default(), today);
        (records, derived)
    }

    fn build_record_block() -> EnumRowBlock {
        EnumRowBlock::Records(SpecRecordRowSpec {
            bindings: vec![
                (EnumColumnKey::Index, EnumCellBinding::Blank),
                (EnumColumnKey::Name, EnumCellBinding::Field(EnumRecordField::Name)),
                (EnumColumnKey::Note, EnumCellBinding::SelectionNote),
            ],
            cols_center: vec![EnumColumnKey::Note],
            ..Default::default()
        })
    }

    #[test]
    fn render_expands_blocks_in_order() {
        let (records, derived) = build_inputs(2);
        let def = build_definition(vec![
            EnumRowBlock::Row(
                SpecRowSpec::blank()
                    .with_text(EnumColumnKey::Index, "АКТ")
                    .with_merge(EnumColumnKey::Index, EnumColumnKey::Note),
            ),
            EnumRowBlock::Header {
                format: SpecCellFormat::default(),
                fmt_cell: SpecCellFormat::default(),
            },
            build_record_block(),
            EnumRowBlock::Row(SpecRowSpec::blank().with_page_break()),
        ]);

        let doc = render_document(&def, &records, &derived).expect("render");
        assert_eq!(doc.n_rows(), def.n_rows(records.len()));
        assert_eq!(doc.n_rows(), 5);
        assert_eq!(doc.merges, vec![SpecMergeRegion::horizontal(1, 1, 3)]);
        assert_eq!(doc.row(2).expect("header").text(EnumColumnKey::Name), "name");
        assert_eq!(doc.row(4).expect("record").text(EnumColumnKey::Name), "Особа 1");
        let cell_note = doc.row(3).expect("record").cell(EnumColumnKey::Note).expect("note");
        assert_eq!(cell_note.format.align.as_deref(), Some("center"));
        assert_eq!(doc.page_breaks(), vec![5]);
    }

    #[test]
    fn wrapped_height_uses_full_width() {
        let (records, derived) = build_inputs(0);
        // 40 width units -> 48 chars per line; 60 chars + one short segment = 3 lines.
        let c_text = format!("{}\nкінець", "б".repeat(60));
        let def = build_definition(vec![EnumRowBlock::Row(
            SpecRowSpec::blank()
                .with_text(EnumColumnKey::Index, c_text)
                .with_height(EnumRowHeightRule::WrappedText(EnumColumnKey::Index)),
        )]);
        let doc = render_document(&def, &records, &derived).expect("render");
        assert_eq!(doc.rows[0].height, Some(48.0));
    }

    #[test]
    fn unknown_column_is_a_precondition_error() {
        let (records, derived) = build_inputs(1);
        let def = build_definition(vec![EnumRowBlock::Row(
            SpecRowSpec::blank().with_text(EnumColumnKey::Signature, "x"),
        )]);
        assert!(matches!(
            render_document(&def, &records, &derived),
            Err(LayoutError::Precondition(_))
        ));
    }

    #[test]
    fn overlapping_or_single_cell_merges_are_rejected() {
        let (records, derived) = build_inputs(0);
        let def = build_definition(vec![EnumRowBlock::Row(
            SpecRowSpec::blank()
                .with_merge(EnumColumnKey::Index, EnumColumnKey::Name)
                .with_merge(EnumColumnKey::Name, EnumColumnKey::Note),
        )]);
        assert!(render_document(&def, &records, &derived).is_err());

        let def = build_definition(vec![EnumRowBlock::Row(
            SpecRowSpec::blank().with_merge(EnumColumnKey::Name, EnumColumnKey::Name),
        )]);
        assert!(render_document(&def, &records, &derived).is_err());
    }

    #[test]
    fn layout_rejects_inconsistent_snapshot() {
        let (records, derived) = build_inputs(2);
        let result = layout(
            EnumActShape::Commission,
            &records,
            &SpecSelectionStore::seeded(1),
            &derived,
            &SpecReportMetadata::default(),
        );
        assert!(matches!(result, Err(LayoutError::Precondition(_))));
    }

    #[test]
    fn layout_rejects_fields_derived_from_another_store() {
        let (records, derived) = build_inputs(2);
        let selection = SpecSelectionStore::seeded(2).toggle(0).expect("toggle");
        let result = layout(
            EnumActShape::Commission,
            &records,
            &selection,
            &derived,
            &SpecReportMetadata::default(),
        );
        assert!(matches!(result, Err(LayoutError::Precondition(_))));
    }
}
