use crate::change_log::save_change_log;
use crate::error::AppError;
use crate::generator::generate_pr_description;
use crate::github::{ChangeSet, CompareRequest, CompareSource};
use crate::llm::LlmClient;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the pipeline keeps its two artifacts.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub changes_file: PathBuf,
    pub output_file: PathBuf,
}

/// Linear run state. There is no transition out of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Serializing,
    Summarizing,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Fetching => Stage::Serializing,
            Stage::Serializing => Stage::Summarizing,
            Stage::Summarizing | Stage::Done => Stage::Done,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetching => "fetch",
            Stage::Serializing => "serialize",
            Stage::Summarizing => "summarize",
            Stage::Done => "done",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A run that ended in the failed state.
#[derive(Debug, Error)]
#[error("{stage} stage failed")]
pub struct StageFailure {
    pub stage: Stage,
    #[source]
    pub source: AppError,
}

fn fail(stage: Stage) -> impl FnOnce(AppError) -> StageFailure {
    move |source| {
        log::debug!("Pipeline failed during {stage}");
        println!("{}", failure_line(stage, &source));
        StageFailure { stage, source }
    }
}

/// Console status line for a failed stage. The full error is logged by `main`.
pub fn failure_line(stage: Stage, err: &AppError) -> &'static str {
    match (stage, err) {
        (_, AppError::MissingInput(_)) => "No change log to describe; run `prdesc fetch` first.",
        (Stage::Fetching, _) => "Failed to fetch data.",
        (Stage::Serializing, _) => "Failed to save code-level changes.",
        (Stage::Summarizing | Stage::Done, _) => "Failed to generate the PR description.",
    }
}

/// FETCHING then SERIALIZING. Nothing is written if the fetch fails.
pub fn fetch_changes(
    source: &dyn CompareSource,
    request: &CompareRequest,
    changes_file: &Path,
) -> Result<usize, StageFailure> {
    let mut stage = Stage::Fetching;
    log::info!("Comparing {}/{} {}", request.owner, request.repo, request.range());

    let changes = source.compare(request).map_err(fail(stage))?;
    log_comparison(&changes);

    stage = stage.next();
    save_change_log(&changes, changes_file).map_err(fail(stage))?;
    println!("Code-level changes saved to {}", changes_file.display());

    Ok(changes.files.len())
}

/// SUMMARIZING only, from whatever change log is on disk.
pub fn describe_changes(llm: &dyn LlmClient, artifacts: &Artifacts) -> Result<(), StageFailure> {
    log::info!(
        "Generating description from {}",
        artifacts.changes_file.display()
    );

    generate_pr_description(llm, &artifacts.changes_file, &artifacts.output_file)
        .map_err(fail(Stage::Summarizing))?;

    println!(
        "Pull request description saved to {}",
        artifacts.output_file.display()
    );
    Ok(())
}

/// The whole run: FETCHING → SERIALIZING → SUMMARIZING → DONE.
pub fn run(
    source: &dyn CompareSource,
    llm: &dyn LlmClient,
    request: &CompareRequest,
    artifacts: &Artifacts,
) -> Result<Stage, StageFailure> {
    fetch_changes(source, request, &artifacts.changes_file)?;
    describe_changes(llm, artifacts)?;
    Ok(Stage::Summarizing.next())
}

fn log_comparison(changes: &ChangeSet) {
    log::info!(
        "Comparison status={} ahead_by={} behind_by={} commits={} files={}",
        changes.status.as_deref().unwrap_or("unknown"),
        changes.ahead_by.unwrap_or(0),
        changes.behind_by.unwrap_or(0),
        changes.total_commits.unwrap_or(0),
        changes.files.len()
    );
}
