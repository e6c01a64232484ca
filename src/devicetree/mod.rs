//! Hardware description trees and absolute address resolution.
//!
//! A tree is the JSON export of an image's extended devicetree. Its schema
//! belongs to the exporter; this crate only relies on nodes exposing a
//! `regs` array of `{ "addr", "size" }` objects and, optionally, a `parent`
//! node.

mod address;
mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use address::{AddressResolver, RegisterNode, SECURE_DOMAIN_BASE_OFFSET};
pub use error::{AddressError, TreeError};

/// A deserialized hardware description tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HardwareTree {
    root: Value,
}

impl HardwareTree {
    /// Loads a tree from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TreeError> {
        let path = path.as_ref();
        let contents = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                TreeError::FileNotFound {
                    path: path.to_path_buf(),
                    source: e,
                }
            } else {
                TreeError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let root = serde_json::from_slice(&contents).map_err(|e| TreeError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        tracing::debug!(path = %path.display(), "loaded hardware description");
        Ok(Self { root })
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    /// Node selected by a `/chosen` property, e.g. `zephyr,code-partition`.
    pub fn chosen(&self, name: &str) -> Option<&Value> {
        self.root.get("chosen_nodes")?.get(name)
    }

    /// Node at a full devicetree path, e.g. `/soc/mram@e000000`.
    pub fn node(&self, path: &str) -> Option<&Value> {
        self.root.get("nodes")?.get(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample() -> Value {
        json!({
            "chosen_nodes": {
                "zephyr,code-partition": { "regs": [{ "addr": 0x30000, "size": 0x10000 }] }
            },
            "nodes": {
                "/soc/mram@e000000": { "regs": [{ "addr": 0x0E00_0000, "size": 0x200000 }] }
            }
        })
    }

    #[test]
    fn test_load_tree() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", sample()).unwrap();

        let tree = HardwareTree::load(file.path()).unwrap();

        assert_eq!(tree.root(), &sample());
        let partition = tree.chosen("zephyr,code-partition").unwrap();
        assert_eq!(partition.first_register_address(), Ok(0x30000));
        assert!(tree.node("/soc/mram@e000000").is_some());
        assert!(tree.chosen("zephyr,sram").is_none());
    }

    #[test]
    fn test_load_missing_tree() {
        let result = HardwareTree::load("/nonexistent/edt.json");
        assert!(matches!(result, Err(TreeError::FileNotFound { .. })));
    }

    #[test]
    fn test_load_corrupt_tree() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"\x80\x04\x95 not json").unwrap();

        let result = HardwareTree::load(file.path());
        assert!(matches!(result, Err(TreeError::ParseError { .. })));
    }

    #[test]
    fn test_serializes_transparently() {
        let tree = HardwareTree::from_value(sample());
        assert_eq!(serde_json::to_value(&tree).unwrap(), sample());
    }
}
