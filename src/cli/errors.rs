use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid size parameter: {size}. Must be a positive integer or 'original'")]
    InvalidSize { size: String },

    #[error("Size must be greater than 0, got: {size}")]
    ZeroSize { size: usize },

    #[error("Invalid --set parameter: {param}. Expected KEY=VALUE")]
    InvalidParam { param: String },

    #[error("--fill takes exactly 3 values (r,g,b), got {count}")]
    InvalidFill { count: usize },

    #[error("--filter must be a filter tag or a JSON object, got: {filter}")]
    InvalidFilter { filter: String },

    #[error("Script line {line}: {source}")]
    Script {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Editor(#[from] imgedit::Error),
}
