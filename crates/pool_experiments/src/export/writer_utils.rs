use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

/// Fails when there are no rows to write.
pub(crate) fn ensure_results<T>(results: &[T]) -> Result<(), Box<dyn Error>> {
    if results.is_empty() {
        return Err("sweep produced no experiment results to export".into());
    }
    Ok(())
}

/// Open `path` for writing, creating missing parent directories first.
pub(crate) fn create_output_file(path: impl AsRef<Path>) -> Result<File, Box<dyn Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    File::create(path).map_err(|err| -> Box<dyn Error> {
        format!("cannot create export file {}: {err}", path.display()).into()
    })
}
