//! The three `suit-build` modes, end to end.
//!
//! Every mode aggregates the declared targets first, so a broken target
//! declaration or a missing input fails the run before anything is written.

use std::path::PathBuf;

use crate::aggregate::{AggregatedNamespace, Aggregator, TargetSpec};
use crate::config::Settings;
use crate::context::{RenderContext, TemplateEngine, ARTIFACTS_FOLDER_KEY, OUTPUT_ENVELOPE_KEY};
use crate::image::{BootStorageRequest, ImageGenerator, UpdateRequest};
use crate::Error;

/// Inputs and outputs of manifest template rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateJob {
    pub template: PathBuf,
    pub output: PathBuf,
    pub artifacts_folder: PathBuf,
}

/// Aggregates `specs` with the resolver and collision policy from `settings`.
pub fn aggregate_targets(settings: &Settings, specs: &[TargetSpec]) -> Result<AggregatedNamespace, Error> {
    Aggregator::new(settings.resolver(), settings.collision_policy()).aggregate_specs(specs)
}

/// Renders the manifest template of `job` and writes it to `job.output`.
///
/// The output file is only created once rendering succeeded.
pub fn generate_manifest(
    namespace: AggregatedNamespace,
    job: &TemplateJob,
    engine: &impl TemplateEngine,
) -> Result<(), Error> {
    let context = RenderContext::builder(namespace)
        .with_value(OUTPUT_ENVELOPE_KEY, job.output.display().to_string())
        .with_value(ARTIFACTS_FOLDER_KEY, job.artifacts_folder.display().to_string())
        .build()?;

    let rendered = context.render_file(engine, &job.template)?;
    std::fs::write(&job.output, rendered).map_err(|e| Error::Write {
        path: job.output.clone(),
        source: e,
    })?;

    tracing::info!(output = %job.output.display(), "manifest generated");
    Ok(())
}

pub fn generate_storage(generator: &impl ImageGenerator, request: &BootStorageRequest) -> Result<(), Error> {
    generator.create_files_for_boot(request)?;
    tracing::info!(
        directory = %request.storage_output_directory.display(),
        envelopes = request.input_files.len(),
        "SUIT storage generated"
    );
    Ok(())
}

pub fn generate_update(generator: &impl ImageGenerator, request: &UpdateRequest) -> Result<(), Error> {
    generator.create_files_for_update(request)?;
    tracing::info!(
        storage = %request.storage_output_file.display(),
        dfu_partition = %request.dfu_partition_output_file.display(),
        "update files generated"
    );
    Ok(())
}
