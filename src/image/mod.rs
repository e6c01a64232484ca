//! Hand-off to the SUIT storage and update image generator.
//!
//! The generator itself is external. This module only assembles the
//! parameters it needs and runs it.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ImageError {
    #[error("failed to run image generator '{program}': {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("image generator '{program}' exited with {status}")]
    Failed {
        program: PathBuf,
        status: std::process::ExitStatus,
    },
}

/// Fixed storage layout parameters of the secure domain.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ImageDefaults {
    pub update_candidate_info_address: u64,
    pub envelope_address: u64,
    pub envelope_slot_size: u64,
    pub envelope_slot_count: u32,
    pub dfu_partition_address: u64,
    pub dfu_max_caches: u32,
}

impl Default for ImageDefaults {
    fn default() -> Self {
        Self {
            update_candidate_info_address: 0x0E1E_9340,
            envelope_address: 0x0E1E_7000,
            envelope_slot_size: 2048,
            envelope_slot_count: 8,
            dfu_partition_address: 0x0E15_5000,
            dfu_max_caches: 6,
        }
    }
}

/// Parameters for the SUIT storage used on the boot path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootStorageRequest {
    pub input_files: Vec<PathBuf>,
    pub storage_output_directory: PathBuf,
    pub envelope_address: u64,
    pub envelope_slot_size: u64,
    pub envelope_slot_count: u32,
    pub update_candidate_info_address: u64,
    pub dfu_max_caches: u32,
}

impl BootStorageRequest {
    pub fn new(input_files: Vec<PathBuf>, storage_output_directory: PathBuf, defaults: &ImageDefaults) -> Self {
        Self {
            input_files,
            storage_output_directory,
            envelope_address: defaults.envelope_address,
            envelope_slot_size: defaults.envelope_slot_size,
            envelope_slot_count: defaults.envelope_slot_count,
            update_candidate_info_address: defaults.update_candidate_info_address,
            dfu_max_caches: defaults.dfu_max_caches,
        }
    }
}

/// Parameters for the files of a secure domain update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRequest {
    pub input_file: PathBuf,
    pub storage_output_file: PathBuf,
    pub dfu_partition_output_file: PathBuf,
    pub update_candidate_info_address: u64,
    pub dfu_partition_address: u64,
    pub dfu_max_caches: u32,
}

impl UpdateRequest {
    /// Builds a request; the DFU partition address always comes from the caller.
    pub fn new(
        input_file: PathBuf,
        storage_output_file: PathBuf,
        dfu_partition_output_file: PathBuf,
        dfu_partition_address: u64,
        defaults: &ImageDefaults,
    ) -> Self {
        Self {
            input_file,
            storage_output_file,
            dfu_partition_output_file,
            update_candidate_info_address: defaults.update_candidate_info_address,
            dfu_partition_address,
            dfu_max_caches: defaults.dfu_max_caches,
        }
    }
}

/// Produces storage and update images from manifests.
pub trait ImageGenerator {
    fn create_files_for_boot(&self, request: &BootStorageRequest) -> Result<(), ImageError>;

    fn create_files_for_update(&self, request: &UpdateRequest) -> Result<(), ImageError>;
}

/// Runs the `suit-generator image` command line.
#[derive(Debug, Clone)]
pub struct SuitGeneratorCli {
    program: PathBuf,
}

impl Default for SuitGeneratorCli {
    fn default() -> Self {
        Self::new("suit-generator")
    }
}

impl SuitGeneratorCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: Vec<OsString>) -> Result<(), ImageError> {
        tracing::debug!(program = %self.program.display(), ?args, "running image generator");
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| ImageError::Spawn {
                program: self.program.clone(),
                source: e,
            })?;

        if !status.success() {
            return Err(ImageError::Failed {
                program: self.program.clone(),
                status,
            });
        }
        Ok(())
    }
}

impl ImageGenerator for SuitGeneratorCli {
    fn create_files_for_boot(&self, request: &BootStorageRequest) -> Result<(), ImageError> {
        self.run(boot_args(request))
    }

    fn create_files_for_update(&self, request: &UpdateRequest) -> Result<(), ImageError> {
        self.run(update_args(request))
    }
}

fn hex(value: u64) -> OsString {
    format!("0x{value:08X}").into()
}

fn boot_args(request: &BootStorageRequest) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["image".into(), "boot".into()];
    for input in &request.input_files {
        args.push("--input-file".into());
        args.push(input.into());
    }
    let tail: [OsString; 12] = [
        "--storage-output-directory".into(),
        request.storage_output_directory.clone().into(),
        "--update-candidate-info-address".into(),
        hex(request.update_candidate_info_address),
        "--envelope-address".into(),
        hex(request.envelope_address),
        "--envelope-slot-size".into(),
        request.envelope_slot_size.to_string().into(),
        "--envelope-slot-count".into(),
        request.envelope_slot_count.to_string().into(),
        "--dfu-max-caches".into(),
        request.dfu_max_caches.to_string().into(),
    ];
    args.extend(tail);
    args
}

fn update_args(request: &UpdateRequest) -> Vec<OsString> {
    vec![
        "image".into(),
        "update".into(),
        "--input-file".into(),
        request.input_file.clone().into(),
        "--storage-output-file".into(),
        request.storage_output_file.clone().into(),
        "--dfu-partition-output-file".into(),
        request.dfu_partition_output_file.clone().into(),
        "--update-candidate-info-address".into(),
        hex(request.update_candidate_info_address),
        "--dfu-partition-address".into(),
        hex(request.dfu_partition_address),
        "--dfu-max-caches".into(),
        request.dfu_max_caches.to_string().into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.into_string().unwrap())
            .collect()
    }

    #[test]
    fn test_boot_request_uses_defaults() {
        let request = BootStorageRequest::new(
            vec!["root.suit".into()],
            "storage".into(),
            &ImageDefaults::default(),
        );

        assert_eq!(request.envelope_address, 0x0E1E7000);
        assert_eq!(request.envelope_slot_size, 2048);
        assert_eq!(request.envelope_slot_count, 8);
        assert_eq!(request.update_candidate_info_address, 0x0E1E9340);
        assert_eq!(request.dfu_max_caches, 6);
    }

    #[test]
    fn test_boot_args() {
        let request = BootStorageRequest::new(
            vec!["root.suit".into(), "app.suit".into()],
            "out".into(),
            &ImageDefaults::default(),
        );

        assert_eq!(
            strings(boot_args(&request)),
            vec![
                "image", "boot",
                "--input-file", "root.suit",
                "--input-file", "app.suit",
                "--storage-output-directory", "out",
                "--update-candidate-info-address", "0x0E1E9340",
                "--envelope-address", "0x0E1E7000",
                "--envelope-slot-size", "2048",
                "--envelope-slot-count", "8",
                "--dfu-max-caches", "6",
            ]
        );
    }

    #[test]
    fn test_update_args_take_caller_partition_address() {
        let request = UpdateRequest::new(
            "root.suit".into(),
            "storage.hex".into(),
            "dfu.hex".into(),
            0x0E10_0000,
            &ImageDefaults::default(),
        );

        assert_eq!(
            strings(update_args(&request)),
            vec![
                "image", "update",
                "--input-file", "root.suit",
                "--storage-output-file", "storage.hex",
                "--dfu-partition-output-file", "dfu.hex",
                "--update-candidate-info-address", "0x0E1E9340",
                "--dfu-partition-address", "0x0E100000",
                "--dfu-max-caches", "6",
            ]
        );
    }

    #[test]
    fn test_missing_program() {
        let generator = SuitGeneratorCli::new("/nonexistent/suit-generator");
        let request = UpdateRequest::new(
            "a".into(),
            "b".into(),
            "c".into(),
            0,
            &ImageDefaults::default(),
        );

        let result = generator.create_files_for_update(&request);
        assert!(matches!(result, Err(ImageError::Spawn { .. })));
    }
}
