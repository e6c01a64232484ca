use crate::aggregate::{NamespaceError, TargetSpecError};
use crate::config::ConfigError;
use crate::context::RenderError;
use crate::devicetree::{AddressError, TreeError};
use crate::image::ImageError;
use crate::kconfig::KconfigError;
use thiserror::Error;

/// Top-level error type for the suit-build library.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Kconfig(#[from] KconfigError),

    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("address resolution failed: {0}")]
    Address(#[from] AddressError),

    #[error("invalid target: {0}")]
    TargetSpec(#[from] TargetSpecError),

    #[error(transparent)]
    Namespace(#[from] NamespaceError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Image(#[from] ImageError),

    #[error("failed to write '{path}': {source}")]
    Write {
        path: std::path::PathBuf,
        source: std::io::Error,
    },
}
