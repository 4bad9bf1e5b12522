use crate::cli_args::Cli;
use crate::error::{AppError, AppResult};
use crate::github::CompareRequest;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_MODEL: &str = "gpt-4-turbo";
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CHANGES_FILE: &str = "code_changes.txt";
pub const DEFAULT_OUTPUT_FILE: &str = "PR_description.md";

/// Final resolved configuration for prdesc. Loaded once, never mutated.
#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: Option<String>,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub head_branch: Option<String>,
    pub base_branch: Option<String>,
    pub github_api_url: String,
    pub openai_api_key: Option<String>,
    pub model: String,
    pub openai_base_url: String,
    pub stream: bool,
    pub changes_file: PathBuf,
    pub output_file: PathBuf,
}

/// Everything needed to talk to the compare endpoint.
#[derive(Debug, Clone)]
pub struct GitHubSettings {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub head: String,
    pub base: String,
    pub api_base_url: String,
}

impl GitHubSettings {
    pub fn compare_request(&self) -> CompareRequest {
        CompareRequest {
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            base: self.base.clone(),
            head: self.head.clone(),
        }
    }
}

/// Everything needed to talk to the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub stream: bool,
}

impl Config {
    /// Build the final config from CLI flags, environment, TOML file, and defaults.
    ///
    /// Precedence:
    ///   1. CLI flags (clap folds in `REPO_OWNER`, `OPENAI_API_KEY`, ...)
    ///   2. TOML `~/.config/prdesc.toml`, or the file given with `--config`
    ///   3. Hardcoded defaults
    pub fn from_sources(cli: &Cli) -> AppResult<Self> {
        let file_cfg = match &cli.config {
            Some(path) => load_explicit_config(path)?,
            None => load_file_config().unwrap_or_default(),
        };

        Ok(Self::resolve(cli, file_cfg))
    }

    fn resolve(cli: &Cli, file_cfg: FileConfig) -> Self {
        Config {
            github_token: non_empty(cli.github_token.clone()).or(file_cfg.github_token),
            repo_owner: non_empty(cli.owner.clone()).or(file_cfg.repo_owner),
            repo_name: non_empty(cli.repo.clone()).or(file_cfg.repo_name),
            head_branch: non_empty(cli.head.clone()).or(file_cfg.head_branch),
            base_branch: non_empty(cli.base.clone()).or(file_cfg.base_branch),
            github_api_url: non_empty(cli.github_api_url.clone())
                .or(file_cfg.github_api_url)
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            openai_api_key: non_empty(cli.api_key.clone()).or(file_cfg.openai_api_key),
            model: non_empty(cli.model.clone())
                .or(file_cfg.model)
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openai_base_url: non_empty(cli.openai_base_url.clone())
                .or(file_cfg.openai_base_url)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            stream: cli.stream || file_cfg.stream.unwrap_or(false),
            changes_file: cli
                .changes_file
                .clone()
                .or(file_cfg.changes_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CHANGES_FILE)),
            output_file: cli
                .output
                .clone()
                .or(file_cfg.output_file)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE)),
        }
    }

    /// GitHub view of the config; every field is required.
    pub fn github(&self) -> AppResult<GitHubSettings> {
        Ok(GitHubSettings {
            token: required(&self.github_token, &GITHUB_TOKEN)?,
            owner: required(&self.repo_owner, &REPO_OWNER)?,
            repo: required(&self.repo_name, &REPO_NAME)?,
            head: required(&self.head_branch, &HEAD_BRANCH)?,
            base: required(&self.base_branch, &BASE_BRANCH)?,
            api_base_url: self.github_api_url.clone(),
        })
    }

    /// OpenAI view of the config; only the API key is required.
    pub fn openai(&self) -> AppResult<OpenAiSettings> {
        Ok(OpenAiSettings {
            api_key: required(&self.openai_api_key, &OPENAI_API_KEY)?,
            model: self.model.clone(),
            api_base_url: self.openai_base_url.clone(),
            stream: self.stream,
        })
    }
}

/// How a required value can be supplied, for the error message.
struct Setting {
    what: &'static str,
    flag: &'static str,
    env: &'static str,
    key: &'static str,
}

const GITHUB_TOKEN: Setting = Setting {
    what: "GitHub token",
    flag: "--github-token",
    env: "GITHUB_TOKEN",
    key: "github_token",
};
const REPO_OWNER: Setting = Setting {
    what: "repository owner",
    flag: "--owner",
    env: "REPO_OWNER",
    key: "repo_owner",
};
const REPO_NAME: Setting = Setting {
    what: "repository name",
    flag: "--repo",
    env: "REPO_NAME",
    key: "repo_name",
};
const HEAD_BRANCH: Setting = Setting {
    what: "head branch",
    flag: "--head",
    env: "BRANCH_NAME",
    key: "head_branch",
};
const BASE_BRANCH: Setting = Setting {
    what: "base branch",
    flag: "--base",
    env: "BASE_BRANCH",
    key: "base_branch",
};
const OPENAI_API_KEY: Setting = Setting {
    what: "OpenAI API key",
    flag: "--api-key",
    env: "OPENAI_API_KEY",
    key: "openai_api_key",
};

fn required(value: &Option<String>, setting: &Setting) -> AppResult<String> {
    value.clone().ok_or_else(|| {
        AppError::Configuration(format!(
            "missing {}; set {}, the {} env var, or `{}` in the config file",
            setting.what, setting.flag, setting.env, setting.key
        ))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    github_token: Option<String>,
    repo_owner: Option<String>,
    repo_name: Option<String>,
    head_branch: Option<String>,
    base_branch: Option<String>,
    github_api_url: Option<String>,
    openai_api_key: Option<String>,
    /// Default model to use when not provided via CLI or env.
    model: Option<String>,
    openai_base_url: Option<String>,
    stream: Option<bool>,
    changes_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
}

/// Return `~/.config/prdesc.toml`
fn config_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("prdesc.toml"))
}

fn load_file_config() -> Option<FileConfig> {
    let path = config_path()?;
    if !path.exists() {
        return None;
    }

    let data = fs::read_to_string(&path).ok()?;
    match toml::from_str::<FileConfig>(&data) {
        Ok(cfg) => {
            log::debug!("Loaded config from {}", path.display());
            Some(cfg)
        }
        Err(e) => {
            log::warn!("Ignoring unreadable config {}: {}", path.display(), e);
            None
        }
    }
}

fn load_explicit_config(path: &Path) -> AppResult<FileConfig> {
    let data = fs::read_to_string(path).map_err(|e| {
        AppError::Configuration(format!("cannot read config file {}: {e}", path.display()))
    })?;

    toml::from_str::<FileConfig>(&data).map_err(|e| {
        AppError::Configuration(format!("invalid config file {}: {e}", path.display()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    const ALL_FLAGS: [&str; 13] = [
        "prdesc",
        "--github-token",
        "ghp_cli",
        "--owner",
        "octo",
        "--repo",
        "widgets",
        "--head",
        "feature",
        "--base",
        "main",
        "--api-key",
        "sk-cli",
    ];

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn empty_config() -> Config {
        Config {
            github_token: None,
            repo_owner: None,
            repo_name: None,
            head_branch: None,
            base_branch: None,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            openai_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            stream: false,
            changes_file: PathBuf::from(DEFAULT_CHANGES_FILE),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
        }
    }

    #[test]
    fn cli_values_win_over_file() {
        let file_cfg: FileConfig = toml::from_str(
            r#"
            repo_owner = "file-owner"
            model = "gpt-4o"
            output_file = "docs/pr.md"
            "#,
        )
        .unwrap();

        let config = Config::resolve(&cli(&ALL_FLAGS), file_cfg);
        let github = config.github().unwrap();
        assert_eq!(github.owner, "octo");
        assert_eq!(github.compare_request().range(), "main...feature");
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.output_file, PathBuf::from("docs/pr.md"));
        assert_eq!(config.openai().unwrap().api_key, "sk-cli");
    }

    #[test]
    fn defaults_fill_in_optional_values() {
        let mut args = ALL_FLAGS.to_vec();
        args.extend(["--model", "  "]);
        let config = Config::resolve(&cli(&args), FileConfig::default());

        assert_eq!(config.model, "gpt-4-turbo");
        assert_eq!(config.changes_file, PathBuf::from("code_changes.txt"));
        assert_eq!(config.output_file, PathBuf::from("PR_description.md"));
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert!(!config.stream);
    }

    #[test]
    fn missing_github_value_is_a_configuration_error() {
        let mut config = empty_config();
        config.github_token = Some("ghp".to_string());
        config.repo_owner = Some("octo".to_string());
        config.repo_name = Some("widgets".to_string());
        config.head_branch = Some("feature".to_string());

        let err = config.github().unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
        assert!(err.to_string().contains("BASE_BRANCH"));
    }

    #[test]
    fn missing_value_message_names_every_source() {
        let err = empty_config().github().unwrap_err();
        assert_eq!(
            err.to_string(),
            "configuration error: missing GitHub token; set --github-token, \
             the GITHUB_TOKEN env var, or `github_token` in the config file"
        );
    }

    #[test]
    fn missing_api_key_is_a_configuration_error() {
        let err = empty_config().openai().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn explicit_config_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_explicit_config(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn explicit_config_file_is_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prdesc.toml");
        fs::write(&path, "openai_api_key = \"sk-file\"\nstream = true\n").unwrap();

        let file_cfg = load_explicit_config(&path).unwrap();
        assert_eq!(file_cfg.openai_api_key.as_deref(), Some("sk-file"));
        assert_eq!(file_cfg.stream, Some(true));
    }
}
