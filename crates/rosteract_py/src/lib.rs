use chrono::{Local, NaiveDate};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyAny, PyBytes, PyDict, PyFloat, PyList, PyString};
use rosteract_io_xlsx::{
    SpecExportArtifact, XlsxIoError, export_reports, import_roster_from_ipc_bytes,
    import_roster_from_xlsx_bytes,
};
use rosteract_layout::{
    EnumCellValue, EnumRecordField, SelectionError, SpecImportResult, SpecRecord,
    SpecReportMetadata, SpecSelectionStore, SpecSignatory, SpecSourceColumn,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "rosteract.acts.v1";
const C_BRIDGE_TRANSPORT: &str = "ipc_bytes";

/// One operator session: the imported roster and its selection state.
#[pyclass(name = "ActSession")]
struct PyActSession {
    columns: Vec<SpecSourceColumn>,
    records: Vec<SpecRecord>,
    selection: SpecSelectionStore,
}

#[pymethods]
impl PyActSession {
    #[new]
    fn new() -> Self {
        Self {
            columns: Vec::new(),
            records: Vec::new(),
            selection: SpecSelectionStore::default(),
        }
    }

    /// Replace the roster from `.xlsx`/`.xls` bytes. Returns the record count.
    fn import_xlsx(&mut self, v_xlsx: &[u8]) -> PyResult<usize> {
        let result = import_roster_from_xlsx_bytes(v_xlsx).map_err(convert_io_error)?;
        Ok(self.replace_roster(result))
    }

    /// Replace the roster from Polars IPC bytes. Returns the record count.
    fn import_ipc(&mut self, v_ipc_df: &[u8]) -> PyResult<usize> {
        let result = import_roster_from_ipc_bytes(v_ipc_df).map_err(convert_io_error)?;
        Ok(self.replace_roster(result))
    }

    /// Replace the roster from any object Polars accepts as a DataFrame.
    fn import_dataframe(&mut self, py: Python<'_>, df: &Bound<'_, PyAny>) -> PyResult<usize> {
        let df_polars = convert_to_polars_dataframe(py, df)?;
        let v_ipc_df = df_polars
            .call_method1("write_ipc", (py.None(),))?
            .call_method0("getvalue")?
            .extract::<Vec<u8>>()?;
        self.import_ipc(&v_ipc_df)
    }

    /// Flip the selected flag of record `id`. Returns the new flag.
    fn toggle(&mut self, id: usize) -> PyResult<bool> {
        self.selection = self.selection.toggle(id).map_err(convert_selection_error)?;
        Ok(self.selected(id))
    }

    /// Replace the rejection note of record `id`.
    fn set_note(&mut self, id: usize, text: String) -> PyResult<()> {
        self.selection = self
            .selection
            .set_note(id, text)
            .map_err(convert_selection_error)?;
        Ok(())
    }

    /// Field keys of the matched source columns.
    fn columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .map(|col| col.field.key().to_string())
            .collect()
    }

    /// Records as dicts, with `selected` and `note` alongside the fields.
    fn records(&self, py: Python<'_>) -> PyResult<Py<PyAny>> {
        let mut l_rows = Vec::with_capacity(self.records.len());
        for record in &self.records {
            let dict_row = PyDict::new(py);
            for field in EnumRecordField::ALL {
                if record.values.contains_key(&field) {
                    dict_row.set_item(field.key(), convert_cell_value(py, &record.value(field)))?;
                }
            }
            if let Some(state) = self.selection.get(record.id) {
                dict_row.set_item("selected", state.selected)?;
                dict_row.set_item("note", state.note.as_str())?;
            }
            l_rows.push(dict_row);
        }
        Ok(PyList::new(py, l_rows)?.into_any().unbind())
    }

    /// `(total, selected, rejected)`.
    fn counts(&self) -> (usize, usize, usize) {
        let n_selected = self.selection.n_selected();
        (self.records.len(), n_selected, self.records.len() - n_selected)
    }

    /// Build the three acts and return `(archive_name, archive_bytes)`.
    ///
    /// `metadata` is any object exposing the metadata attributes; missing
    /// attributes keep their defaults. `today` is `YYYY-MM-DD`, local date if omitted.
    #[pyo3(signature = (metadata = None, today = None))]
    fn export(
        &self,
        py: Python<'_>,
        metadata: Option<&Bound<'_, PyAny>>,
        today: Option<&str>,
    ) -> PyResult<(String, Py<PyBytes>)> {
        let cfg_metadata = parse_spec_report_metadata(metadata)?;
        let date_today = match today {
            Some(val) => parse_date(val, "today")?,
            None => Local::now().date_naive(),
        };

        let SpecExportArtifact {
            archive_name,
            v_archive,
            ..
        } = export_reports(&self.records, &self.selection, &cfg_metadata, date_today)
            .map_err(convert_io_error)?;
        Ok((archive_name, PyBytes::new(py, &v_archive).unbind()))
    }
}

impl PyActSession {
    fn replace_roster(&mut self, result: SpecImportResult) -> usize {
        self.columns = result.columns;
        self.records = result.records;
        self.selection = result.selection;
        info!(n_records = self.records.len(), "session roster replaced");
        self.records.len()
    }

    fn selected(&self, id: usize) -> bool {
        self.selection.get(id).is_some_and(|state| state.selected)
    }
}

/// Install a fmt subscriber. `RUST_LOG` wins over `level`.
///
/// Returns `False` when a subscriber is already installed.
#[pyfunction]
#[pyo3(signature = (level = "info"))]
fn init_logging(level: &str) -> PyResult<bool> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(val) => val,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|err| PyValueError::new_err(format!("Invalid log level `{level}`: {err}")))?,
    };
    Ok(fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .try_init()
        .is_ok())
}

fn parse_spec_report_metadata(obj: Option<&Bound<'_, PyAny>>) -> PyResult<SpecReportMetadata> {
    let mut cfg = SpecReportMetadata::default();
    let Some(obj) = obj else {
        return Ok(cfg);
    };
    if obj.is_none() {
        return Ok(cfg);
    }

    if let Some(val) = extract_optional_attr::<String>(obj, "destination_unit")? {
        cfg.destination_unit = val;
    }
    if let Some(val) = extract_optional_attr::<String>(obj, "order_number")? {
        cfg.order_number = val;
    }
    cfg.order_date = match extract_optional_attr::<String>(obj, "order_date")? {
        Some(val) if !val.trim().is_empty() => Some(parse_date(&val, "order_date")?),
        _ => None,
    };
    parse_spec_signatory(obj, "approver", &mut cfg.approver)?;
    parse_spec_signatory(obj, "responsible", &mut cfg.responsible)?;
    parse_spec_signatory(obj, "distribution_responsible", &mut cfg.distribution_responsible)?;
    Ok(cfg)
}

/// Read `{prefix}_position`, `{prefix}_rank` and `{prefix}_name` onto `signatory`.
fn parse_spec_signatory(
    obj: &Bound<'_, PyAny>,
    prefix: &str,
    signatory: &mut SpecSignatory,
) -> PyResult<()> {
    if let Some(val) = extract_optional_attr::<String>(obj, &format!("{prefix}_position"))? {
        signatory.position = val;
    }
    if let Some(val) = extract_optional_attr::<String>(obj, &format!("{prefix}_rank"))? {
        signatory.rank = val;
    }
    if let Some(val) = extract_optional_attr::<String>(obj, &format!("{prefix}_name"))? {
        signatory.name = val;
    }
    Ok(())
}

fn parse_date(value: &str, attr: &str) -> PyResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|err| {
        PyValueError::new_err(format!("`{attr}` must be YYYY-MM-DD, got `{value}`: {err}"))
    })
}

fn convert_cell_value(py: Python<'_>, value: &EnumCellValue) -> Py<PyAny> {
    match value {
        EnumCellValue::None => py.None(),
        EnumCellValue::String(val) => PyString::new(py, val).into_any().unbind(),
        EnumCellValue::Number(val) => PyFloat::new(py, *val).into_any().unbind(),
        EnumCellValue::Date(val) => PyString::new(py, &val.format("%Y-%m-%d").to_string())
            .into_any()
            .unbind(),
    }
}

fn convert_io_error(err: XlsxIoError) -> PyErr {
    match err {
        XlsxIoError::Import(_) | XlsxIoError::Decode(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn convert_selection_error(err: SelectionError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn convert_to_polars_dataframe<'py>(
    py: Python<'py>,
    df: &Bound<'py, PyAny>,
) -> PyResult<Bound<'py, PyAny>> {
    let module_polars = py.import("polars")?;
    let cls_dataframe = module_polars.getattr("DataFrame")?;

    if df.is_instance(&cls_dataframe)? {
        return Ok(df.clone());
    }

    cls_dataframe.call1((df,))
}

fn extract_optional_attr<T>(obj: &Bound<'_, PyAny>, attr: &str) -> PyResult<Option<T>>
where
    for<'a> T: FromPyObject<'a>,
{
    if !obj.hasattr(attr)? {
        return Ok(None);
    }
    let val = obj.getattr(attr)?;
    if val.is_none() {
        return Ok(None);
    }
    Ok(Some(val.extract::<T>()?))
}

#[pymodule]
fn _rosteract_rs(_py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyActSession>()?;
    module.add_function(wrap_pyfunction!(init_logging, module)?)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
