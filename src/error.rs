use thiserror::Error;

/// Fatal failures of the render path. Everything else degrades silently.
#[derive(Error, Debug)]
pub enum StatuslineError {
    #[error("failed to read stdin: {0}")]
    Stdin(#[from] std::io::Error),

    #[error("stdin is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object on stdin, got {0}")]
    NotAnObject(&'static str),
}
