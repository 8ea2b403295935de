use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Failed to read cache {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Corrupt cache {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to write cache {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("Invalid language code in cache key: {0:?}")]
    InvalidLanguage(String),

    #[error("Malformed cache key: {0:?}")]
    Malformed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read input {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid CSV input: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input CSV has no {0:?} column")]
    MissingColumn(&'static str),

    #[error("Input {0} contains no units")]
    Empty(PathBuf),
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Output I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Cache persistence failed: {0}")]
    Persist(#[from] CacheError),

    #[error(transparent)]
    Key(#[from] KeyError),

    #[error("Failed to write output row: {0}")]
    Sink(#[from] SinkError),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
