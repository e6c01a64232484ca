use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{Config, ConfigError};
use crate::aggregate::CollisionPolicy;
use crate::context::MiniJinjaEngine;
use crate::devicetree::{AddressResolver, SECURE_DOMAIN_BASE_OFFSET};
use crate::image::{ImageDefaults, SuitGeneratorCli};

/// Prefix of settings environment variables.
pub const ENV_PREFIX: &str = "SUIT_BUILD";

/// Separator between path segments of settings environment variables.
pub const ENV_SEPARATOR: &str = "__";

/// Settings of one `suit-build` run.
///
/// Every field has a default, so an empty settings table is valid.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub address: AddressSettings,
    pub namespace: NamespaceSettings,
    pub template: TemplateSettings,
    pub image: ImageSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AddressSettings {
    /// Added to register addresses by `get_absolute_address`.
    pub base_offset: u64,
}

impl Default for AddressSettings {
    fn default() -> Self {
        Self {
            base_offset: SECURE_DOMAIN_BASE_OFFSET,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NamespaceSettings {
    /// Fail when two targets or run values map to the same key.
    pub reject_collisions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    pub strict_undefined: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageSettings {
    pub program: PathBuf,
    #[serde(flatten)]
    pub layout: ImageDefaults,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            program: PathBuf::from("suit-generator"),
            layout: ImageDefaults::default(),
        }
    }
}

impl Settings {
    /// Loads settings from an optional TOML file, then `SUIT_BUILD__*`
    /// environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.with_file(path, true);
        }
        builder.with_env(ENV_PREFIX, ENV_SEPARATOR).build()
    }

    pub fn resolver(&self) -> AddressResolver {
        AddressResolver::new(self.address.base_offset)
    }

    pub fn collision_policy(&self) -> CollisionPolicy {
        if self.namespace.reject_collisions {
            CollisionPolicy::Reject
        } else {
            CollisionPolicy::Overwrite
        }
    }

    pub fn engine(&self) -> MiniJinjaEngine {
        MiniJinjaEngine::new().strict(self.template.strict_undefined)
    }

    pub fn generator(&self) -> SuitGeneratorCli {
        SuitGeneratorCli::new(&self.image.program)
    }
}
