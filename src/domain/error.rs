use thiserror::Error;

/// BattleKeep unified error type
#[derive(Error, Debug)]
pub enum BattleKeepError {
    #[error("Could not find session '{key}'")]
    SessionNotFound { key: String },

    #[error("Session '{key}' already exists")]
    SessionExists { key: String },

    #[error("Maximum number of sessions ({max}) reached")]
    RegistryFull { max: usize },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Output error: {0}")]
    Output(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BattleKeepError {
    pub(crate) fn not_found(key: &str) -> Self {
        Self::SessionNotFound {
            key: key.to_string(),
        }
    }
}

pub type BattleKeepResult<T> = Result<T, BattleKeepError>;
