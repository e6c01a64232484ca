use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum TargetSpecError {
    #[error("target '{spec}' must have 3 comma-separated fields (name,binary,hardware description), found {found}")]
    FieldCount { spec: String, found: usize },

    #[error("target '{spec}' has an empty {field} field")]
    EmptyField { spec: String, field: &'static str },
}

/// One `name,binary_path,hardware_tree_path` target declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSpec {
    pub name: String,
    pub binary: PathBuf,
    pub hardware_tree: PathBuf,
}

impl FromStr for TargetSpec {
    type Err = TargetSpecError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = spec.split(',').collect();
        let [name, binary, hardware_tree] = fields[..] else {
            return Err(TargetSpecError::FieldCount {
                spec: spec.to_string(),
                found: fields.len(),
            });
        };

        for (field, value) in [("name", name), ("binary", binary), ("hardware description", hardware_tree)] {
            if value.is_empty() {
                return Err(TargetSpecError::EmptyField {
                    spec: spec.to_string(),
                    field,
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            binary: PathBuf::from(binary),
            hardware_tree: PathBuf::from(hardware_tree),
        })
    }
}
