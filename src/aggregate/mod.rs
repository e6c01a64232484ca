//! Merging per-image configuration into one render namespace.

mod namespace;
mod spec;

use std::path::{Path, PathBuf};

use serde::Serialize;

pub use namespace::{AggregatedNamespace, CollisionPolicy, NamespaceEntry, NamespaceError};
pub use spec::{TargetSpec, TargetSpecError};

use crate::devicetree::{AddressResolver, HardwareTree};
use crate::kconfig::BuildConfiguration;
use crate::Error;

/// Namespace key of the address resolution callable.
pub const ADDRESS_RESOLVER_KEY: &str = "get_absolute_address";

/// Settings file expected next to each image's hardware description.
pub const SETTINGS_FILE_NAME: &str = ".config";

/// Everything known about one image of the build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TargetRecord {
    /// Declared name, never prefixed.
    pub name: String,
    pub config: BuildConfiguration,
    #[serde(rename = "dt")]
    pub hardware_tree: HardwareTree,
    pub binary: PathBuf,
}

impl TargetRecord {
    /// Loads the hardware description and the sibling `.config` of `spec`.
    pub fn load(spec: &TargetSpec) -> Result<Self, Error> {
        let hardware_tree = HardwareTree::load(&spec.hardware_tree)?;
        let config = BuildConfiguration::from_file(settings_path(&spec.hardware_tree))?;

        Ok(Self {
            name: spec.name.clone(),
            config,
            hardware_tree,
            binary: spec.binary.clone(),
        })
    }
}

/// Path of the settings file that belongs to a hardware description file.
pub fn settings_path(hardware_tree: &Path) -> PathBuf {
    hardware_tree
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(SETTINGS_FILE_NAME)
}

/// Namespace key for a target name.
///
/// Names starting with a digit are not valid template identifiers, so they
/// get a leading underscore: `802154_rpmsg` becomes `_802154_rpmsg`.
pub fn storage_key(name: &str) -> String {
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{name}")
    } else {
        name.to_string()
    }
}

/// Builds an [`AggregatedNamespace`] from target declarations.
///
/// ## Example
///
/// ```no_run
/// use suit_build::aggregate::{Aggregator, CollisionPolicy};
/// use suit_build::devicetree::AddressResolver;
///
/// let namespace = Aggregator::new(AddressResolver::default(), CollisionPolicy::Overwrite)
///     .aggregate(["app,build/app/zephyr.bin,build/app/zephyr/edt.json"])?;
/// assert!(namespace.target("app").is_some());
/// # Ok::<(), suit_build::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    resolver: AddressResolver,
    policy: CollisionPolicy,
}

impl Aggregator {
    pub fn new(resolver: AddressResolver, policy: CollisionPolicy) -> Self {
        Self { resolver, policy }
    }

    /// Parses every declaration, then loads and aggregates the targets.
    ///
    /// A malformed declaration fails the whole call before any file is read.
    pub fn aggregate<I, S>(&self, specs: I) -> Result<AggregatedNamespace, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let specs = specs
            .into_iter()
            .map(|s| s.as_ref().parse::<TargetSpec>())
            .collect::<Result<Vec<_>, _>>()?;
        self.aggregate_specs(&specs)
    }

    pub fn aggregate_specs(&self, specs: &[TargetSpec]) -> Result<AggregatedNamespace, Error> {
        let mut namespace = AggregatedNamespace::new(self.policy);

        for spec in specs {
            let record = TargetRecord::load(spec)?;
            let key = storage_key(&record.name);
            tracing::debug!(
                target_name = %record.name,
                key = %key,
                entries = record.config.len(),
                "aggregated target"
            );
            namespace.insert(key, NamespaceEntry::Target(record))?;
        }

        namespace.insert(ADDRESS_RESOLVER_KEY, NamespaceEntry::AddressResolver(self.resolver))?;
        Ok(namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kconfig::{ConfigValue, KconfigError};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    /// Writes `<dir>/<name>/edt.json` and `<dir>/<name>/.config`, returning the spec string.
    fn write_target(dir: &TempDir, name: &str, config: &str, addr: u64) -> String {
        let image_dir = dir.path().join(name);
        fs::create_dir_all(&image_dir).unwrap();
        let edt = image_dir.join("edt.json");
        fs::write(
            &edt,
            json!({ "chosen_nodes": { "zephyr,code-partition": { "regs": [{ "addr": addr }] } } })
                .to_string(),
        )
        .unwrap();
        fs::write(image_dir.join(SETTINGS_FILE_NAME), config).unwrap();

        let binary = image_dir.join("zephyr.bin");
        format!("{},{},{}", name, binary.display(), edt.display())
    }

    #[test]
    fn test_storage_key() {
        assert_eq!(storage_key("app"), "app");
        assert_eq!(storage_key("802154_rpmsg_subimage"), "_802154_rpmsg_subimage");
        assert_eq!(storage_key("app2"), "app2");
    }

    #[test]
    fn test_settings_path_is_sibling() {
        assert_eq!(
            settings_path(Path::new("build/app/zephyr/edt.json")),
            PathBuf::from("build/app/zephyr/.config")
        );
        assert_eq!(settings_path(Path::new("edt.json")), PathBuf::from(".config"));
    }

    #[test]
    fn test_aggregate_keys() {
        let dir = TempDir::new().unwrap();
        let specs = vec![
            write_target(&dir, "imageA", "A=y\n", 0x1000),
            write_target(&dir, "imageB", "B=2\n", 0x2000),
            write_target(&dir, "9img", "C=\"c\"\n", 0x3000),
        ];

        let namespace = Aggregator::default().aggregate(&specs).unwrap();

        let keys: Vec<&str> = namespace.keys().collect();
        assert_eq!(keys, vec!["imageA", "imageB", "_9img", ADDRESS_RESOLVER_KEY]);
        assert!(matches!(
            namespace.get(ADDRESS_RESOLVER_KEY),
            Some(NamespaceEntry::AddressResolver(_))
        ));
    }

    #[test]
    fn test_digit_prefixed_record_keeps_name() {
        let dir = TempDir::new().unwrap();
        let specs = [write_target(&dir, "802154_rpmsg", "X=1\n", 0)];

        let namespace = Aggregator::default().aggregate(&specs).unwrap();

        assert!(namespace.target("802154_rpmsg").is_none());
        assert_eq!(namespace.target("_802154_rpmsg").unwrap().name, "802154_rpmsg");
    }

    #[test]
    fn test_records_round_trip() {
        let dir = TempDir::new().unwrap();
        let spec = write_target(&dir, "app", "CONFIG_SUIT=y\nCONFIG_SEQ=0x5\n", 0x4000);
        let parsed: TargetSpec = spec.parse().unwrap();

        let namespace = Aggregator::default().aggregate([&spec]).unwrap();
        let record = namespace.target("app").unwrap();

        assert_eq!(record.name, parsed.name);
        assert_eq!(record.binary, parsed.binary);
        assert_eq!(record.config.get("CONFIG_SUIT"), Some(&ConfigValue::Bool(true)));
        assert_eq!(record.config.get_int("CONFIG_SEQ"), Some(5));
        assert_eq!(record.hardware_tree, HardwareTree::load(&parsed.hardware_tree).unwrap());
    }

    #[test]
    fn test_malformed_spec_fails_before_loading() {
        let dir = TempDir::new().unwrap();
        let good = write_target(&dir, "app", "A=1\n", 0);

        let result = Aggregator::default().aggregate([good.as_str(), "onlyname,onlybinary"]);

        assert!(matches!(
            result,
            Err(Error::TargetSpec(TargetSpecError::FieldCount { found: 2, .. }))
        ));
    }

    #[test]
    fn test_missing_settings_file() {
        let dir = TempDir::new().unwrap();
        let spec = write_target(&dir, "app", "", 0);
        fs::remove_file(dir.path().join("app").join(SETTINGS_FILE_NAME)).unwrap();

        let result = Aggregator::default().aggregate([spec]);

        assert!(matches!(
            result,
            Err(Error::Kconfig(KconfigError::FileNotFound { .. }))
        ));
    }

    #[test]
    fn test_duplicate_names_overwrite_by_default() {
        let dir = TempDir::new().unwrap();
        let first = write_target(&dir, "app", "V=1\n", 0);
        let second_dir = TempDir::new().unwrap();
        let second = write_target(&second_dir, "app", "V=2\n", 0);

        let namespace = Aggregator::default().aggregate([first, second]).unwrap();

        assert_eq!(namespace.len(), 2);
        assert_eq!(namespace.target("app").unwrap().config.get_int("V"), Some(2));
    }

    #[test]
    fn test_duplicate_names_rejected_when_configured() {
        let dir = TempDir::new().unwrap();
        let first = write_target(&dir, "app", "V=1\n", 0);
        let second_dir = TempDir::new().unwrap();
        let second = write_target(&second_dir, "app", "V=2\n", 0);

        let aggregator = Aggregator::new(AddressResolver::default(), CollisionPolicy::Reject);
        let result = aggregator.aggregate([first, second]);

        assert!(matches!(
            result,
            Err(Error::Namespace(NamespaceError::DuplicateKey(key))) if key == "app"
        ));
    }

    #[test]
    fn test_resolver_key_overrides_target_of_same_name() {
        let dir = TempDir::new().unwrap();
        let spec = write_target(&dir, ADDRESS_RESOLVER_KEY, "A=1\n", 0);

        let namespace = Aggregator::default().aggregate([spec]).unwrap();

        assert_eq!(namespace.len(), 1);
        assert!(matches!(
            namespace.get(ADDRESS_RESOLVER_KEY),
            Some(NamespaceEntry::AddressResolver(_))
        ));
    }
}
