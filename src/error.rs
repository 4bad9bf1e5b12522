use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("failed to fetch data: HTTP {status} - {body}")]
    Fetch { status: u16, body: String },
    #[error("file '{}' not found", .0.display())]
    MissingInput(PathBuf),
    #[error("language model error: HTTP {status} - {body}")]
    Generation { status: u16, body: String },
    #[error("malformed response from {service}: {reason}")]
    MalformedResponse { service: &'static str, reason: String },
    #[error("request to {service} failed")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("request to {service} failed mid-stream")]
    StreamInterrupted {
        service: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{}'", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
