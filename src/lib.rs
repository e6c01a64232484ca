//! Multi-image build configuration aggregation for SUIT manifest generation.
//!
//! Each image of a build contributes its Kconfig `.config`, its hardware
//! description tree and its binary. [`aggregate`] merges them into one
//! namespace, [`context`] renders manifest templates against it, and
//! [`image`] hands finished envelopes to the storage image generator.

pub mod aggregate;
pub mod pipeline;
pub mod config;
pub mod context;
pub mod devicetree;
pub mod image;
pub mod kconfig;
mod error;

pub use aggregate::{AggregatedNamespace, Aggregator, TargetRecord, TargetSpec};
pub use config::{ConfigError, Settings};
pub use context::{MiniJinjaEngine, RenderContext, TemplateEngine};
pub use devicetree::{AddressResolver, HardwareTree};
pub use error::Error;
pub use kconfig::{BuildConfiguration, ConfigValue};
