//! suit-build CLI
//!
//! Entry point called by the build system once per SUIT build step.

mod cli;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};
use suit_build::image::{BootStorageRequest, UpdateRequest};
use suit_build::pipeline::{self, TemplateJob};
use suit_build::{Error, Settings};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

/// Logs go to stderr; `RUST_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}

fn run(cli: Cli) -> Result<(), Error> {
    let settings = Settings::load(cli.settings.as_deref())?;
    tracing::debug!(?settings, "settings loaded");

    let targets = cli.command.targets();
    tracing::debug!(zephyr_base = %targets.zephyr_base.display(), cores = targets.cores.len(), "received arguments");
    let namespace = pipeline::aggregate_targets(&settings, &targets.cores)?;

    match cli.command {
        Commands::Template {
            artifacts_folder,
            template_suit,
            output_suit,
            ..
        } => {
            let job = TemplateJob {
                template: template_suit,
                output: output_suit,
                artifacts_folder,
            };
            pipeline::generate_manifest(namespace, &job, &settings.engine())
        }
        Commands::Storage {
            input_envelopes,
            storage_output_directory,
            ..
        } => {
            let request = BootStorageRequest::new(
                input_envelopes,
                storage_output_directory,
                &settings.image.layout,
            );
            pipeline::generate_storage(&settings.generator(), &request)
        }
        Commands::Update {
            input_file,
            storage_output_file,
            dfu_partition_output_file,
            dfu_partition_address,
            ..
        } => {
            let request = UpdateRequest::new(
                input_file,
                storage_output_file,
                dfu_partition_output_file,
                dfu_partition_address,
                &settings.image.layout,
            );
            pipeline::generate_update(&settings.generator(), &request)
        }
    }
}
