use chrono::NaiveDate;
use rosteract_layout::{
    SpecRecord, SpecReportBundle, SpecReportMetadata, SpecSelectionStore, assemble_reports,
};
use tracing::info;

use crate::archive::pack_archive;
use crate::spec::{SpecExportArtifact, XlsxIoError};
use crate::writer::encode_document;

/// Encode every act of a bundle, keeping bundle order.
pub fn encode_bundle(bundle: &SpecReportBundle) -> Result<Vec<(String, Vec<u8>)>, XlsxIoError> {
    bundle
        .files
        .iter()
        .map(|file| Ok((file.file_name.clone(), encode_document(&file.document)?)))
        .collect()
}

/// Lay out, encode and pack the three acts of one export.
pub fn export_reports(
    records: &[SpecRecord],
    selection: &SpecSelectionStore,
    metadata: &SpecReportMetadata,
    today: NaiveDate,
) -> Result<SpecExportArtifact, XlsxIoError> {
    let bundle = assemble_reports(records, selection, metadata, today)?;
    let l_files = encode_bundle(&bundle)?;
    let v_archive = pack_archive(&l_files)?;

    info!(
        archive = %bundle.archive_name,
        n_files = l_files.len(),
        n_bytes = v_archive.len(),
        "export packed"
    );

    Ok(SpecExportArtifact {
        archive_name: bundle.archive_name,
        v_archive,
        file_names: l_files.into_iter().map(|(name, _)| name).collect(),
    })
}
