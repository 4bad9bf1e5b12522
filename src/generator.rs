use crate::error::{AppError, AppResult};
use crate::llm::LlmClient;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Read the change log, ask the model for a description, and write it out.
///
/// The model is never called when the change log is missing, and nothing is
/// written to `output` unless the model call succeeds.
pub fn generate_pr_description(
    llm: &dyn LlmClient,
    changes_file: &Path,
    output: &Path,
) -> AppResult<()> {
    let change_log = match fs::read_to_string(changes_file) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(AppError::MissingInput(changes_file.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };

    log::debug!(
        "Read {} bytes of change log from {}",
        change_log.len(),
        changes_file.display()
    );

    let description = llm.generate_pr_description(&change_log)?;

    fs::write(output, &description).map_err(|source| AppError::Write {
        path: output.to_path_buf(),
        source,
    })?;

    Ok(())
}
