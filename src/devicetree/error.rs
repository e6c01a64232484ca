use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TreeError {
    #[error("hardware description not found: {path}: {source}")]
    FileNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read hardware description '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse hardware description '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AddressError {
    #[error("node has no registers")]
    NoRegisters,

    #[error("first register of node has no integer address")]
    InvalidAddress,

    #[error("address 0x{address:X} overflows when offset by 0x{base_offset:X}")]
    Overflow { base_offset: u64, address: u64 },
}
