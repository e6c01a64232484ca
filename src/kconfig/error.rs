use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum KconfigError {
    #[error("settings file not found: {path}: {source}")]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid hexadecimal value for {key} on line {line}: {value}")]
    InvalidHex {
        key: String,
        value: String,
        line: usize,
    },
}
