use std::io::{Cursor, Write};

use zip::write::{FileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::spec::XlsxIoError;

/// Pack `(entry name, bytes)` pairs into one deflated zip archive.
///
/// Entry order is preserved. Duplicate names are rejected.
pub fn pack_archive(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>, XlsxIoError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::<()>::default().compression_method(CompressionMethod::Deflated);

    for (name, v_content) in files {
        zip.start_file(name.as_str(), options)
            .map_err(|err| XlsxIoError::Archive(format!("Failed to add `{name}`: {err}")))?;
        zip.write_all(v_content)
            .map_err(|err| XlsxIoError::Archive(format!("Failed to write `{name}`: {err}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|err| XlsxIoError::Archive(format!("Failed to finish archive: {err}")))?;
    Ok(cursor.into_inner())
}
