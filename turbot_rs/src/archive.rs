//! Zip packaging of bot code for `bots:push`.

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{Result, TurbotError};

/// Write a zip at `archive_path` containing `subpaths` (relative to `base`).
///
/// Directories are added recursively. Entry names are relative to `base`
/// and always use `/` separators; a name listed twice (directly or through
/// a directory) is written once. Returns the entry names written.
pub fn create_zip_archive(archive_path: &Path, base: &Path, subpaths: &[String]) -> Result<Vec<String>> {
    let file = File::create(archive_path)?;
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut written = Vec::new();
    let mut seen = HashSet::new();

    for subpath in subpaths {
        let path = base.join(subpath);
        if path.is_dir() {
            for entry in WalkDir::new(&path).sort_by_file_name() {
                let entry = entry.map_err(|e| TurbotError::Io(io::Error::other(e.to_string())))?;
                if entry.file_type().is_dir() {
                    continue;
                }
                let name = entry_name(base, entry.path());
                if seen.insert(name.clone()) {
                    add_file(&mut zip, &name, entry.path(), options)?;
                    written.push(name);
                }
            }
        } else if path.is_file() {
            let name = entry_name(base, &path);
            if seen.insert(name.clone()) {
                add_file(&mut zip, &name, &path, options)?;
                written.push(name);
            }
        } else {
            return Err(TurbotError::failed(format!(
                "Could not find `{}` listed in manifest.json",
                subpath
            )));
        }
    }

    zip.finish()?;
    debug!(archive = %archive_path.display(), entries = written.len(), "created bot archive");
    Ok(written)
}

fn add_file(
    zip: &mut ZipWriter<File>,
    name: &str,
    path: &Path,
    options: SimpleFileOptions,
) -> Result<()> {
    zip.start_file(name, options)?;
    let mut source = File::open(path)?;
    io::copy(&mut source, zip)?;
    Ok(())
}

fn entry_name(base: &Path, path: &Path) -> String {
    let relative: PathBuf = path.strip_prefix(base).map(Path::to_path_buf).unwrap_or_else(|_| path.to_path_buf());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
