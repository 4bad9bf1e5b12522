use crate::error::{AppError, AppResult};
use crate::github::{ChangeSet, FileChange};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub const CODE_DIFF_MARKER: &str = "Code Diff:";
pub const NO_PATCH_SENTINEL: &str = "No code-level changes available for this file.";
pub const SEPARATOR_WIDTH: usize = 40;

/// Write one record per file, in the order GitHub returned them.
///
/// The target is truncated first; the handle is closed when the writer drops,
/// including on an error partway through. A partial write is not rolled back.
pub fn save_change_log(changes: &ChangeSet, path: &Path) -> AppResult<()> {
    let write_err = |source: std::io::Error| AppError::Write {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(write_err)?;
    let mut writer = BufWriter::new(file);
    write_records(&mut writer, &changes.files).map_err(write_err)?;
    writer.flush().map_err(write_err)?;

    log::debug!(
        "Wrote {} file record(s) to {}",
        changes.files.len(),
        path.display()
    );
    Ok(())
}

pub fn write_records<W: Write>(out: &mut W, files: &[FileChange]) -> std::io::Result<()> {
    for file in files {
        writeln!(out, "File: {}", file.filename)?;
        writeln!(
            out,
            "Additions: {}, Deletions: {}, Changes: {}",
            file.additions, file.deletions, file.changes
        )?;
        writeln!(out, "Status: {}", file.status)?;
        match &file.patch {
            Some(patch) => {
                writeln!(out, "{CODE_DIFF_MARKER}")?;
                writeln!(out, "{patch}")?;
            }
            None => writeln!(out, "{NO_PATCH_SENTINEL}")?,
        }
        writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))?;
    }
    Ok(())
}
