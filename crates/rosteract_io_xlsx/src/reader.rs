//! Spreadsheet and data frame decoders producing a 1-indexed cell grid.

use std::io::Cursor;

use calamine::{Data, DataType, Reader, open_workbook_auto_from_rs};
use chrono::NaiveDate;
use polars::prelude::{AnyValue, DataFrame, IpcReader, SerReader};
use rosteract_layout::{EnumCellValue, SpecCellGrid, SpecImportResult, import_records};
use tracing::debug;

use crate::spec::XlsxIoError;

/// Decode the first worksheet of an `.xlsx`/`.xls` payload.
///
/// Grid coordinates are absolute sheet positions, so a sheet whose used range
/// starts below row 1 keeps its header on the row where it was typed.
pub fn decode_grid_from_xlsx_bytes(v_xlsx: &[u8]) -> Result<SpecCellGrid, XlsxIoError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(v_xlsx))
        .map_err(|err| XlsxIoError::Decode(format!("Failed to open workbook: {err}")))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| XlsxIoError::Decode("Workbook has no worksheets.".to_string()))?
        .map_err(|err| XlsxIoError::Decode(format!("Failed to read first worksheet: {err}")))?;

    let mut grid = SpecCellGrid::new();
    let Some((n_row_start, n_col_start)) = range.start() else {
        return Ok(grid);
    };
    for (row_idx, col_idx, cell) in range.used_cells() {
        grid.insert(
            n_row_start + row_idx as u32 + 1,
            n_col_start + col_idx as u32 + 1,
            derive_cell_value_from_data(cell),
        );
    }

    debug!(n_rows = grid.n_rows(), "xlsx grid decoded");
    Ok(grid)
}

/// Decode Polars IPC bytes; column names form row 1.
pub fn decode_grid_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<SpecCellGrid, XlsxIoError> {
    let df = derive_dataframe_from_ipc_bytes(v_ipc_df)?;
    let mut grid = SpecCellGrid::new();

    for (col_idx, colname) in df.get_column_names_str().into_iter().enumerate() {
        grid.insert(1, col_idx as u32 + 1, EnumCellValue::from(colname));
    }
    for (col_idx, col) in df.get_columns().iter().enumerate() {
        for row_idx in 0..df.height() {
            let value = col
                .get(row_idx)
                .map_err(|err| XlsxIoError::Decode(format!("Failed to read cell value: {err}")))?;
            grid.insert(
                row_idx as u32 + 2,
                col_idx as u32 + 1,
                derive_cell_value_from_any_value(value),
            );
        }
    }

    debug!(n_rows = grid.n_rows(), "ipc grid decoded");
    Ok(grid)
}

/// Decode an uploaded workbook and import its roster.
pub fn import_roster_from_xlsx_bytes(v_xlsx: &[u8]) -> Result<SpecImportResult, XlsxIoError> {
    let grid = decode_grid_from_xlsx_bytes(v_xlsx)?;
    Ok(import_records(&grid)?)
}

/// Decode a data frame handed over as IPC bytes and import its roster.
pub fn import_roster_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<SpecImportResult, XlsxIoError> {
    let grid = decode_grid_from_ipc_bytes(v_ipc_df)?;
    Ok(import_records(&grid)?)
}

fn derive_dataframe_from_ipc_bytes(v_ipc_df: &[u8]) -> Result<DataFrame, XlsxIoError> {
    IpcReader::new(Cursor::new(v_ipc_df))
        .finish()
        .map_err(|err| XlsxIoError::Decode(format!("Failed to read IPC DataFrame bytes: {err}")))
}

fn derive_cell_value_from_data(cell: &Data) -> EnumCellValue {
    match cell {
        Data::Empty => EnumCellValue::None,
        Data::String(val) => EnumCellValue::String(val.clone()),
        Data::Int(val) => EnumCellValue::Number(*val as f64),
        Data::Float(val) => EnumCellValue::Number(*val),
        Data::Bool(val) => EnumCellValue::String(val.to_string()),
        Data::DateTime(_) => match cell.as_date() {
            Some(date) => EnumCellValue::Date(date),
            None => EnumCellValue::String(cell.to_string()),
        },
        Data::DateTimeIso(val) => match NaiveDate::parse_from_str(val, "%Y-%m-%d") {
            Ok(date) => EnumCellValue::Date(date),
            Err(_) => EnumCellValue::String(val.clone()),
        },
        Data::DurationIso(val) => EnumCellValue::String(val.clone()),
        Data::Error(err) => EnumCellValue::String(err.to_string()),
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => EnumCellValue::String(val.to_string()),
        AnyValue::UInt8(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt16(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt32(val) => EnumCellValue::Number(val as f64),
        AnyValue::UInt64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int8(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int16(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int64(val) => EnumCellValue::Number(val as f64),
        AnyValue::Int128(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float32(val) => EnumCellValue::Number(val as f64),
        AnyValue::Float64(val) => EnumCellValue::Number(val),
        _ => EnumCellValue::String(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use polars::prelude::{IpcWriter, SerWriter};
    use rosteract_layout::{EnumRecordField, ImportError};
    use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

    fn build_roster_xlsx() -> Vec<u8> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        let fmt_date = Format::new().set_num_format("dd.mm.yyyy");

        for (col_idx, label) in ["№ з/п", "Примітка", "Прізвище, ім'я та по-батькові", "ДН"]
            .into_iter()
            .enumerate()
        {
            worksheet
                .write_string(0, col_idx as u16, label)
                .expect("header");
        }
        worksheet.write_number(1, 0, 1).expect("index");
        worksheet.write_string(1, 2, "Петренко Іван").expect("name");
        let birthday = ExcelDateTime::from_ymd(1990, 3, 7).expect("date");
        worksheet
            .write_datetime_with_format(1, 3, &birthday, &fmt_date)
            .expect("birthday");
        worksheet.write_number(3, 0, 2).expect("index");
        worksheet.write_string(3, 2, "Коваль Олег").expect("name");

        workbook.save_to_buffer().expect("save")
    }

    #[test]
    fn xlsx_roster_imports_verbatim() {
        let result = import_roster_from_xlsx_bytes(&build_roster_xlsx()).expect("import");
        assert_eq!(result.columns.len(), 3);
        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0].value(EnumRecordField::Birthday),
            EnumCellValue::Date(NaiveDate::from_ymd_opt(1990, 3, 7).expect("date"))
        );
        assert_eq!(
            result.records[1].value(EnumRecordField::Name),
            EnumCellValue::from("Коваль Олег")
        );
        assert_eq!(result.records[1].value(EnumRecordField::Index).to_text(), "2");
    }

    #[test]
    fn xlsx_without_known_headers_is_an_import_error() {
        let mut workbook = Workbook::new();
        workbook
            .add_worksheet()
            .write_string(0, 0, "Колонка")
            .expect("header");
        let v_xlsx = workbook.save_to_buffer().expect("save");
        assert!(matches!(
            import_roster_from_xlsx_bytes(&v_xlsx),
            Err(XlsxIoError::Import(ImportError::NoRecognizedColumns { .. }))
        ));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        assert!(matches!(
            decode_grid_from_xlsx_bytes(b"not a workbook"),
            Err(XlsxIoError::Decode(_))
        ));
    }

    #[test]
    fn ipc_roster_uses_column_names_as_header() {
        let mut df = df!(
            "Вік" => [31i64, 44],
            "В/звання" => [Some("солдат"), None],
        )
        .expect("frame");
        let mut v_ipc: Vec<u8> = Vec::new();
        IpcWriter::new(&mut v_ipc).finish(&mut df).expect("ipc");

        let result = import_roster_from_ipc_bytes(&v_ipc).expect("import");
        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0].value(EnumRecordField::Age),
            EnumCellValue::Number(31.0)
        );
        assert_eq!(result.records[1].value(EnumRecordField::Rank), EnumCellValue::None);
    }
}
