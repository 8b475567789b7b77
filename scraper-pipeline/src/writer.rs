use scraper_core::{CoreError, PostRecord};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Writes all records as one pretty-printed JSON array, replacing `path`.
///
/// The document goes to a sibling temporary file first and is renamed into
/// place, so an interrupted write never leaves a truncated file behind.
pub fn write_results(records: &[PostRecord], path: &Path) -> Result<(), CoreError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temporary_path(path);
    debug!("Writing {} records to {}", records.len(), tmp_path.display());

    let result = write_document(records, &tmp_path).and_then(|_| {
        fs::rename(&tmp_path, path)?;
        Ok(())
    });
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    info!("Saved {} posts to {}", records.len(), path.display());
    Ok(())
}

fn write_document(records: &[PostRecord], path: &Path) -> Result<(), CoreError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn temporary_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "results.json".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
