//! Settings of the tool itself, layered from TOML files and the environment.

mod builder;
mod env;
mod error;
mod file;
mod settings;
mod source;

pub use builder::Config;
pub use env::EnvSource;
pub use error::ConfigError;
pub use file::FileSource;
pub use settings::{
    AddressSettings, ImageSettings, NamespaceSettings, Settings, TemplateSettings, ENV_PREFIX,
    ENV_SEPARATOR,
};
pub use source::{ConfigEntry, ConfigSource};
