//! Render context for manifest templates.

mod template;

use std::path::{Path, PathBuf};

use thiserror::Error;

pub use template::MiniJinjaEngine;

use crate::aggregate::{AggregatedNamespace, NamespaceEntry};
use crate::Error;

/// Key of the output manifest path in template mode.
pub const OUTPUT_ENVELOPE_KEY: &str = "output_envelope";

/// Key of the artifact folder path in template mode.
pub const ARTIFACTS_FOLDER_KEY: &str = "artifacts_folder";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("template not found: {path}: {source}")]
    TemplateNotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read template '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("template rendering failed: {0}")]
    Engine(#[from] minijinja::Error),
}

/// Renders template text against a [`RenderContext`].
pub trait TemplateEngine {
    fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError>;
}

/// The aggregated namespace together with the run-specific values of one
/// invocation.
///
/// ## Example
///
/// ```no_run
/// use suit_build::aggregate::Aggregator;
/// use suit_build::context::{MiniJinjaEngine, RenderContext, ARTIFACTS_FOLDER_KEY};
///
/// let namespace = Aggregator::default().aggregate(["app,app.bin,app/edt.json"])?;
/// let ctx = RenderContext::builder(namespace)
///     .with_value(ARTIFACTS_FOLDER_KEY, "build/artifacts")
///     .build()?;
///
/// let manifest = ctx.render_file(&MiniJinjaEngine::new(), "app_envelope.yaml.jinja2")?;
/// # Ok::<(), suit_build::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct RenderContext {
    namespace: AggregatedNamespace,
}

impl RenderContext {
    pub fn builder(namespace: AggregatedNamespace) -> RenderContextBuilder {
        RenderContextBuilder {
            namespace,
            values: Vec::new(),
        }
    }

    pub fn namespace(&self) -> &AggregatedNamespace {
        &self.namespace
    }

    pub fn render(&self, engine: &impl TemplateEngine, template: &str) -> Result<String, RenderError> {
        engine.render(template, self)
    }

    /// Reads a template file and renders it.
    pub fn render_file(
        &self,
        engine: &impl TemplateEngine,
        path: impl AsRef<Path>,
    ) -> Result<String, RenderError> {
        let path = path.as_ref();
        let template = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RenderError::TemplateNotFound {
                    path: path.to_path_buf(),
                    source: e,
                }
            } else {
                RenderError::ReadError {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        tracing::debug!(template = %path.display(), "rendering template");
        self.render(engine, &template)
    }
}

/// Builder for a [`RenderContext`].
///
/// Values are merged into the namespace in the order they were added,
/// through the namespace's collision policy.
#[derive(Debug)]
#[must_use = "builders do nothing until .build() is called"]
pub struct RenderContextBuilder {
    namespace: AggregatedNamespace,
    values: Vec<(String, String)>,
}

impl RenderContextBuilder {
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.push((key.into(), value.into()));
        self
    }

    pub fn with_values<I, K, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.values
            .extend(values.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    pub fn build(self) -> Result<RenderContext, Error> {
        let mut namespace = self.namespace;
        for (key, value) in self.values {
            namespace.insert(key, NamespaceEntry::Value(value))?;
        }
        Ok(RenderContext { namespace })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{CollisionPolicy, NamespaceError};
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct Echo;

    impl TemplateEngine for Echo {
        fn render(&self, template: &str, context: &RenderContext) -> Result<String, RenderError> {
            let value = context.namespace().value(template).unwrap_or_default();
            Ok(value.to_string())
        }
    }

    #[test]
    fn test_values_are_merged() {
        let ctx = RenderContext::builder(AggregatedNamespace::default())
            .with_value(OUTPUT_ENVELOPE_KEY, "out/app.suit")
            .with_values([(ARTIFACTS_FOLDER_KEY, "out/artifacts")])
            .build()
            .unwrap();

        assert_eq!(ctx.namespace().value(OUTPUT_ENVELOPE_KEY), Some("out/app.suit"));
        assert_eq!(ctx.namespace().value(ARTIFACTS_FOLDER_KEY), Some("out/artifacts"));
    }

    #[test]
    fn test_values_overwrite_by_default() {
        let mut namespace = AggregatedNamespace::default();
        namespace
            .insert("artifacts_folder", NamespaceEntry::Value("old".into()))
            .unwrap();

        let ctx = RenderContext::builder(namespace)
            .with_value("artifacts_folder", "new")
            .build()
            .unwrap();

        assert_eq!(ctx.namespace().value("artifacts_folder"), Some("new"));
    }

    #[test]
    fn test_values_rejected_on_collision_when_configured() {
        let mut namespace = AggregatedNamespace::new(CollisionPolicy::Reject);
        namespace
            .insert("artifacts_folder", NamespaceEntry::Value("old".into()))
            .unwrap();

        let result = RenderContext::builder(namespace)
            .with_value("artifacts_folder", "new")
            .build();

        assert!(matches!(
            result,
            Err(Error::Namespace(NamespaceError::DuplicateKey(_)))
        ));
    }

    #[test]
    fn test_render_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{OUTPUT_ENVELOPE_KEY}").unwrap();
        let ctx = RenderContext::builder(AggregatedNamespace::default())
            .with_value(OUTPUT_ENVELOPE_KEY, "app.suit")
            .build()
            .unwrap();

        assert_eq!(ctx.render_file(&Echo, file.path()).unwrap(), "app.suit");
    }

    #[test]
    fn test_render_file_missing_template() {
        let ctx = RenderContext::builder(AggregatedNamespace::default())
            .build()
            .unwrap();

        let result = ctx.render_file(&Echo, "/nonexistent/template.jinja2");
        assert!(matches!(result, Err(RenderError::TemplateNotFound { .. })));
    }
}
