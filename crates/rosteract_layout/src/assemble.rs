//! Report assembler: three acts plus file and archive names.

use chrono::NaiveDate;
use tracing::info;

use crate::conf::{
    C_ARCHIVE_NAME_TEMPLATE, C_FILE_NAME_COMMISSION_COPY_TEMPLATE,
    C_FILE_NAME_COMMISSION_TEMPLATE, C_FILE_NAME_RECEIVING_TEMPLATE,
};
use crate::derive::derive_fields;
use crate::layout::layout;
use crate::spec::{
    EnumActShape, LayoutError, SpecRecord, SpecReportBundle, SpecReportFile,
    SpecReportMetadata, SpecSelectionStore,
};
use crate::util::{format_date_short, render_text_template, sanitize_file_name_part};

fn render_name(template: &str, today: NaiveDate, unit: &str) -> String {
    let c_date = format_date_short(today);
    let c_unit = sanitize_file_name_part(unit, "_");
    render_text_template(
        template,
        &[("date", c_date.as_str()), ("unit", c_unit.as_str())],
    )
}

/// Suggested file name of one act.
pub fn derive_file_name(shape: EnumActShape, today: NaiveDate, unit: &str) -> String {
    let template = match shape {
        EnumActShape::Receiving => C_FILE_NAME_RECEIVING_TEMPLATE,
        EnumActShape::Commission => C_FILE_NAME_COMMISSION_TEMPLATE,
        EnumActShape::CommissionCopy => C_FILE_NAME_COMMISSION_COPY_TEMPLATE,
    };
    render_name(template, today, unit)
}

/// Suggested name of the archive holding all three acts.
pub fn derive_archive_name(today: NaiveDate, unit: &str) -> String {
    render_name(C_ARCHIVE_NAME_TEMPLATE, today, unit)
}

/// Lay out the receiving act, the commission act and its copy.
///
/// Derived fields are resolved once so that all three acts share one export date.
pub fn assemble_reports(
    records: &[SpecRecord],
    selection: &SpecSelectionStore,
    metadata: &SpecReportMetadata,
    today: NaiveDate,
) -> Result<SpecReportBundle, LayoutError> {
    let derived = derive_fields(records, selection, metadata, today);

    let l_files = EnumActShape::ALL
        .into_iter()
        .map(|shape| {
            Ok(SpecReportFile {
                shape,
                file_name: derive_file_name(shape, today, &metadata.destination_unit),
                document: layout(shape, records, selection, &derived, metadata)?,
            })
        })
        .collect::<Result<Vec<_>, LayoutError>>()?;

    info!(
        n_records = derived.n_total,
        n_selected = derived.n_selected,
        n_rejected = derived.n_rejected,
        unit = %metadata.destination_unit,
        "acts assembled"
    );

    Ok(SpecReportBundle {
        archive_name: derive_archive_name(today, &metadata.destination_unit),
        files: l_files,
    })
}
