//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use suit_build::TargetSpec;

/// Links the multi-image build with the SUIT manifest generator
#[derive(Parser, Debug)]
#[command(name = "suit-build")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML file with tool settings
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every mode
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Image declaration: name,binary,hardware description
    #[arg(long = "core", required = true)]
    pub cores: Vec<TargetSpec>,

    /// Location of the zephyr directory
    #[arg(long)]
    pub zephyr_base: PathBuf,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate SUIT configuration files based on input templates
    Template {
        #[command(flatten)]
        targets: TargetArgs,

        /// Output artifact folder
        #[arg(long)]
        artifacts_folder: PathBuf,

        /// Input SUIT jinja2 template
        #[arg(long)]
        template_suit: PathBuf,

        /// Output SUIT configuration
        #[arg(long)]
        output_suit: PathBuf,
    },

    /// Generate SUIT storage required by secure domain
    Storage {
        #[command(flatten)]
        targets: TargetArgs,

        /// Location of input envelope(s)
        #[arg(long = "input-envelope", required = true)]
        input_envelopes: Vec<PathBuf>,

        /// Directory path to store hex files with SUIT storage contents
        #[arg(long)]
        storage_output_directory: PathBuf,
    },

    /// Generate files needed for Secure Domain update
    Update {
        #[command(flatten)]
        targets: TargetArgs,

        /// SUIT envelope in binary format
        #[arg(long)]
        input_file: PathBuf,

        /// SUIT storage output file in HEX format
        #[arg(long)]
        storage_output_file: PathBuf,

        /// DFU partition output file in HEX format
        #[arg(long)]
        dfu_partition_output_file: PathBuf,

        /// Start address of DFU partition
        #[arg(long, value_parser = parse_address)]
        dfu_partition_address: u64,
    },
}

impl Commands {
    pub fn targets(&self) -> &TargetArgs {
        match self {
            Commands::Template { targets, .. }
            | Commands::Storage { targets, .. }
            | Commands::Update { targets, .. } => targets,
        }
    }
}

/// Parses an integer with an optional `0x`, `0o` or `0b` radix prefix.
fn parse_address(s: &str) -> Result<u64, String> {
    let lower = s.to_ascii_lowercase();
    let (digits, radix) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2)
    } else {
        (lower.as_str(), 10)
    };

    let digits = digits.replace('_', "");
    u64::from_str_radix(&digits, radix).map_err(|e| format!("invalid address '{s}': {e}"))
}
