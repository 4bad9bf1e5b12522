use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "prdesc",
    version,
    about = "LLM-assisted pull request description generator"
)]
pub struct Cli {
    /// Repository owner (user or organization)
    #[arg(long, env = "REPO_OWNER", global = true)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long, env = "REPO_NAME", global = true)]
    pub repo: Option<String>,

    /// Branch carrying the changes
    #[arg(long, env = "BRANCH_NAME", global = true)]
    pub head: Option<String>,

    /// Branch the changes are compared against (e.g. main)
    #[arg(long, env = "BASE_BRANCH", global = true)]
    pub base: Option<String>,

    /// GitHub token (otherwise uses GITHUB_TOKEN env var)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// API key (otherwise uses OPENAI_API_KEY env var)
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Model name to use (default: gpt-4-turbo)
    #[arg(long, env = "PRDESC_MODEL", global = true)]
    pub model: Option<String>,

    /// GitHub REST API base URL, for GitHub Enterprise
    #[arg(long, env = "GITHUB_API_URL", global = true)]
    pub github_api_url: Option<String>,

    /// Base URL of an OpenAI-compatible server
    #[arg(long, env = "OPENAI_BASE_URL", global = true)]
    pub openai_base_url: Option<String>,

    /// Where the serialized change log is written and read (default: code_changes.txt)
    #[arg(long, global = true)]
    pub changes_file: Option<PathBuf>,

    /// Where the generated description is written (default: PR_description.md)
    #[arg(long, global = true)]
    pub output: Option<PathBuf>,

    /// Config file to use instead of ~/.config/prdesc.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the description to the terminal as it is generated
    #[arg(long, global = true)]
    pub stream: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand; omit to run the whole pipeline
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Run a single part of the pipeline, e.g. `prdesc describe`
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Fetch the branch comparison and write the change log only
    Fetch,
    /// Generate the description from an existing change log
    Describe,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "prdesc",
            "describe",
            "--changes-file",
            "in.txt",
            "--output",
            "out.md",
            "-vv",
        ])
        .unwrap();

        assert_eq!(cli.command, Some(Command::Describe));
        assert_eq!(cli.changes_file, Some(PathBuf::from("in.txt")));
        assert_eq!(cli.output, Some(PathBuf::from("out.md")));
        assert_eq!(cli.verbose, 2);
    }
}
