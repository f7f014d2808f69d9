//! Document encoder: lays a [`SpecDocumentModel`] onto one worksheet.

use chrono::{Datelike, NaiveDate};
use rosteract_layout::{
    EnumCellValue, SpecCellFormat, SpecDocumentModel, SpecMergeRegion, SpecPageSetup,
};
use rust_xlsxwriter::{
    ExcelDateTime, Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError,
};
use tracing::debug;

use crate::spec::XlsxIoError;

/// Number format applied to date cells without an explicit one.
pub const C_NUM_FORMAT_DATE: &str = "dd.mm.yyyy";

/// Encode one document as a single-sheet workbook.
///
/// Effective cell format is column default, then row format, then cell overrides.
/// Merged regions take the value and format of their top-left cell.
pub fn encode_document(doc: &SpecDocumentModel) -> Result<Vec<u8>, XlsxIoError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name(&doc.sheet_name)
        .map_err(derive_xlsx_error)?;

    apply_page_setup(worksheet, &doc.page_setup);

    let fmt_column = derive_rust_xlsx_format(&doc.fmt_column);
    for col in &doc.columns {
        let col_idx = cast_col_num(col.position)?;
        worksheet
            .set_column_width(col_idx, col.width)
            .map_err(derive_xlsx_error)?;
        worksheet
            .set_column_format(col_idx, &fmt_column)
            .map_err(derive_xlsx_error)?;
    }

    for (row_idx, row) in doc.rows.iter().enumerate() {
        let n_row = cast_row_num(row_idx + 1)?;
        if let Some(height) = row.height {
            worksheet
                .set_row_height(n_row - 1, height)
                .map_err(derive_xlsx_error)?;
        }

        let fmt_row = doc.fmt_column.merge(&row.format);
        for (key, cell) in &row.cells {
            let Some(col) = doc.column(*key) else {
                return Err(XlsxIoError::Encode(format!(
                    "Row {n_row} holds a cell for unknown column `{}`.",
                    key.key()
                )));
            };
            if let Some(merge) = find_merge(&doc.merges, n_row, col.position)
                && (merge.row_start, merge.col_start) != (n_row, col.position)
            {
                continue;
            }

            let spec_fmt = derive_value_format(&fmt_row.merge(&cell.format), &cell.value);
            let format = derive_rust_xlsx_format(&spec_fmt);
            match find_merge(&doc.merges, n_row, col.position) {
                Some(merge) => write_merge_with_format(worksheet, merge, &cell.value, &format)?,
                None => write_cell_with_format(
                    worksheet,
                    n_row - 1,
                    cast_col_num(col.position)?,
                    &cell.value,
                    &format,
                )?,
            }
        }
    }

    for merge in &doc.merges {
        let if_anchor_written = doc
            .row(merge.row_start)
            .and_then(|row| {
                doc.columns
                    .iter()
                    .find(|col| col.position == merge.col_start)
                    .and_then(|col| row.cell(col.key))
            })
            .is_some();
        if if_anchor_written {
            continue;
        }
        let spec_fmt = doc.row(merge.row_start).map_or_else(
            || doc.fmt_column.clone(),
            |row| doc.fmt_column.merge(&row.format),
        );
        write_merge_with_format(
            worksheet,
            merge,
            &EnumCellValue::None,
            &derive_rust_xlsx_format(&spec_fmt),
        )?;
    }

    let l_breaks = doc.page_breaks();
    if !l_breaks.is_empty() {
        worksheet
            .set_page_breaks(&l_breaks)
            .map_err(derive_xlsx_error)?;
    }

    debug!(
        sheet = %doc.sheet_name,
        n_rows = doc.n_rows(),
        n_merges = doc.merges.len(),
        "document encoded"
    );
    workbook.save_to_buffer().map_err(derive_xlsx_error)
}

fn apply_page_setup(worksheet: &mut Worksheet, page_setup: &SpecPageSetup) {
    let margins = &page_setup.margins;
    worksheet.set_paper_size(page_setup.paper_size);
    if page_setup.if_landscape {
        worksheet.set_landscape();
    } else {
        worksheet.set_portrait();
    }
    worksheet.set_print_fit_to_pages(page_setup.fit_to_width, page_setup.fit_to_height);
    worksheet.set_margins(
        margins.left,
        margins.right,
        margins.top,
        margins.bottom,
        margins.header,
        margins.footer,
    );
    worksheet.set_zoom(page_setup.zoom);
    if page_setup.if_page_break_preview {
        worksheet.set_view_page_break_preview();
    }
}

fn find_merge(merges: &[SpecMergeRegion], row: u32, col: u32) -> Option<&SpecMergeRegion> {
    merges.iter().find(|merge| merge.contains(row, col))
}

fn derive_value_format(spec: &SpecCellFormat, value: &EnumCellValue) -> SpecCellFormat {
    match value {
        EnumCellValue::Date(_) if spec.num_format.is_none() => spec.with_(SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_DATE.to_string()),
            ..Default::default()
        }),
        _ => spec.clone(),
    }
}

fn write_merge_with_format(
    worksheet: &mut Worksheet,
    merge: &SpecMergeRegion,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxIoError> {
    let c_text = match value {
        EnumCellValue::String(val) => val.as_str(),
        _ => "",
    };
    let (n_row, n_col) = (merge.row_start - 1, cast_col_num(merge.col_start)?);
    worksheet
        .merge_range(
            n_row,
            n_col,
            merge.row_end - 1,
            cast_col_num(merge.col_end)?,
            c_text,
            format,
        )
        .map_err(derive_xlsx_error)?;

    // Non-text anchors are rewritten in place over the merged blank.
    if matches!(value, EnumCellValue::Number(_) | EnumCellValue::Date(_)) {
        write_cell_with_format(worksheet, n_row, n_col, value, format)?;
    }
    Ok(())
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: u32,
    col_idx: u16,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), XlsxIoError> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(row_idx, col_idx, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(row_idx, col_idx, val, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(row_idx, col_idx, *val, format)
                .map_err(derive_xlsx_error)?;
        }
        EnumCellValue::Date(val) => {
            let datetime = derive_excel_date(*val)?;
            worksheet
                .write_datetime_with_format(row_idx, col_idx, &datetime, format)
                .map_err(derive_xlsx_error)?;
        }
    }
    Ok(())
}

fn derive_excel_date(date: NaiveDate) -> Result<ExcelDateTime, XlsxIoError> {
    let n_year = u16::try_from(date.year())
        .map_err(|_| XlsxIoError::Encode(format!("year out of range: {date}")))?;
    ExcelDateTime::from_ymd(n_year, date.month() as u8, date.day() as u8).map_err(derive_xlsx_error)
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.clone());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    if spec.italic.unwrap_or(false) {
        format = format.set_italic();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    if spec.text_wrap.unwrap_or(false) {
        format = format.set_text_wrap();
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    let value = align.trim().to_ascii_lowercase();
    match value.as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "justify" => Some(FormatAlign::Justify),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, XlsxIoError> {
    u32::try_from(value).map_err(|_| XlsxIoError::Encode(format!("row index overflow: {value}")))
}

/// 1-based column position to the writer's 0-based `u16`.
fn cast_col_num(position: u32) -> Result<u16, XlsxIoError> {
    position
        .checked_sub(1)
        .and_then(|idx| u16::try_from(idx).ok())
        .ok_or_else(|| XlsxIoError::Encode(format!("column position out of range: {position}")))
}

fn derive_xlsx_error(err: XlsxError) -> XlsxIoError {
    XlsxIoError::Encode(err.to_string())
}
