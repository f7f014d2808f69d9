//! Header-matching roster importer.

use tracing::{debug, warn};

use crate::conf::{N_SOURCE_HEADER_ROW, TUP_SOURCE_COLUMNS};
use crate::spec::{
    ImportError, SpecCellGrid, SpecRecord, SpecSelectionStore, SpecSourceColumn,
};

/// Import result: matched columns, records and the seeded selection store.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecImportResult {
    /// Matched source columns in grid order.
    pub columns: Vec<SpecSourceColumn>,
    /// Records in grid order.
    pub records: Vec<SpecRecord>,
    /// One seeded state per record.
    pub selection: SpecSelectionStore,
}

/// Match header cells against the source catalog by exact text.
///
/// A label seen twice keeps its first position but binds to its last column.
pub fn match_source_columns(grid: &SpecCellGrid) -> Vec<SpecSourceColumn> {
    let Some(dict_header) = grid.row(N_SOURCE_HEADER_ROW) else {
        return vec![];
    };

    let mut l_columns: Vec<SpecSourceColumn> = Vec::new();
    for (col_idx, value) in dict_header {
        let c_label = value.to_text();
        let Some((field, _)) = TUP_SOURCE_COLUMNS
            .iter()
            .find(|(_, label)| *label == c_label)
        else {
            continue;
        };

        if let Some(col) = l_columns.iter_mut().find(|col| col.field == *field) {
            warn!(
                col_idx = col.col_idx,
                col_idx_bound = *col_idx,
                label = %c_label,
                "duplicate roster header, earlier column ignored"
            );
            col.col_idx = *col_idx;
            continue;
        }
        l_columns.push(SpecSourceColumn {
            field: *field,
            label: c_label,
            col_idx: *col_idx,
        });
    }
    l_columns
}

/// Turn a decoded grid into records.
///
/// Every non-empty row below the header becomes one record; only matched columns
/// are read. Fails when no header cell matches.
pub fn import_records(grid: &SpecCellGrid) -> Result<SpecImportResult, ImportError> {
    let l_columns = match_source_columns(grid);
    if l_columns.is_empty() {
        return Err(ImportError::NoRecognizedColumns {
            n_headers_seen: grid.row(N_SOURCE_HEADER_ROW).map_or(0, |row| row.len()),
        });
    }

    let l_records: Vec<SpecRecord> = grid
        .row_numbers()
        .filter(|n_row| *n_row != N_SOURCE_HEADER_ROW)
        .enumerate()
        .map(|(id, n_row)| {
            l_columns
                .iter()
                .fold(SpecRecord::new(id), |record, col| {
                    match grid.get(n_row, col.col_idx) {
                        Some(value) => record.with_(col.field, value.clone()),
                        None => record,
                    }
                })
        })
        .collect();

    debug!(
        n_columns = l_columns.len(),
        n_records = l_records.len(),
        "roster imported"
    );

    let selection = SpecSelectionStore::seeded(l_records.len());
    Ok(SpecImportResult {
        columns: l_columns,
        records: l_records,
        selection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::C_LABEL_SELECTED;
    use crate::spec::{EnumCellValue, EnumRecordField};

    fn build_grid() -> SpecCellGrid {
        let mut grid = SpecCellGrid::new();
        grid.insert(1, 1, "№ з/п".into());
        grid.insert(1, 2, "Службова примітка".into());
        grid.insert(1, 3, "Прізвище, ім'я та по-батькові".into());
        grid.insert(1, 4, "Вік".into());
        for (n_row, c_name, n_age) in [(2, "Петренко Іван", 31.0), (3, "Коваль Олег", 44.0)] {
            grid.insert(n_row, 1, EnumCellValue::Number(f64::from(n_row - 1)));
            grid.insert(n_row, 2, "ігнорується".into());
            grid.insert(n_row, 3, c_name.into());
            grid.insert(n_row, 4, EnumCellValue::Number(n_age));
        }
        grid
    }

    #[test]
    fn import_keeps_matched_columns_verbatim() {
        let grid = build_grid();
        let result = import_records(&grid).expect("import");

        assert_eq!(result.columns.len(), 3);
        assert_eq!(result.records.len(), grid.n_rows() - 1);
        let record = &result.records[1];
        assert_eq!(record.id, 1);
        assert_eq!(
            record.value(EnumRecordField::Name),
            EnumCellValue::from("Коваль Олег")
        );
        assert_eq!(record.value(EnumRecordField::Age), EnumCellValue::Number(44.0));
        assert_eq!(record.value(EnumRecordField::Rank), EnumCellValue::None);
        assert_eq!(record.values.len(), 3);
    }

    #[test]
    fn import_seeds_selection() {
        let result = import_records(&build_grid()).expect("import");
        assert_eq!(result.selection.len(), 2);
        for state in result.selection.states() {
            assert!(state.selected);
            assert_eq!(state.note, C_LABEL_SELECTED);
        }
    }

    #[test]
    fn import_without_known_headers_fails() {
        let mut grid = SpecCellGrid::new();
        grid.insert(1, 1, "Колонка".into());
        grid.insert(2, 1, "значення".into());
        assert_eq!(
            import_records(&grid),
            Err(ImportError::NoRecognizedColumns { n_headers_seen: 1 })
        );
        assert!(import_records(&SpecCellGrid::new()).is_err());
    }

    #[test]
    fn import_with_header_only_yields_no_records() {
        let mut grid = SpecCellGrid::new();
        grid.insert(1, 5, "ДН".into());
        let result = import_records(&grid).expect("import");
        assert!(result.records.is_empty());
        assert!(result.selection.is_empty());
    }

    #[test]
    fn duplicate_header_binds_last_column() {
        let mut grid = SpecCellGrid::new();
        grid.insert(1, 1, "Вік".into());
        grid.insert(1, 2, "Вік".into());
        grid.insert(2, 1, EnumCellValue::Number(20.0));
        grid.insert(2, 2, EnumCellValue::Number(99.0));
        let result = import_records(&grid).expect("import");
        assert_eq!(result.columns.len(), 1);
        assert_eq!(result.columns[0].col_idx, 2);
        assert_eq!(
            result.records[0].value(EnumRecordField::Age),
            EnumCellValue::Number(99.0)
        );
    }
}
