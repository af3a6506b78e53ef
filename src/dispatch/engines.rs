//! Engine version probing and advisory checks

use crate::process::{LaunchSpec, ProcessLauncher};
use crate::version::satisfies;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// An engine whose reported version misses the declared constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineMismatch {
    pub engine: String,
    pub constraint: String,
    pub actual: String,
}

impl fmt::Display for EngineMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "script requires {} {}, found {}",
            self.engine, self.constraint, self.actual
        )
    }
}

/// Runtimes whose version may be queried regardless of configuration
pub const KNOWN_ENGINES: &[&str] = &["bun", "node"];

/// Ask each declared engine for its version via `<engine> --version`
///
/// Only known runtimes and the configured executor are run; other names in
/// a script's `engines` are skipped. Engines that cannot be run are left out
/// of the result.
pub async fn detect_versions(
    launcher: &dyn ProcessLauncher,
    engines: &BTreeMap<String, String>,
    executor: &str,
) -> BTreeMap<String, String> {
    let mut versions = BTreeMap::new();
    for engine in engines.keys() {
        if !(KNOWN_ENGINES.contains(&engine.as_str()) || engine == executor) {
            debug!("Not probing unknown engine {}", engine);
            continue;
        }
        let spec = LaunchSpec::new(engine).args(["--version"]);
        match launcher.capture(&spec).await {
            Some(version) => {
                debug!("Detected {} {}", engine, version);
                versions.insert(engine.clone(), version);
            }
            None => debug!("Could not determine {} version", engine),
        }
    }
    versions
}

/// Compare declared constraints against detected versions
///
/// Engines without a detected version are skipped.
pub fn mismatches(
    engines: &BTreeMap<String, String>,
    actual: &BTreeMap<String, String>,
) -> Vec<EngineMismatch> {
    engines
        .iter()
        .filter_map(|(engine, constraint)| {
            let version = actual.get(engine)?;
            (!satisfies(version, constraint)).then(|| EngineMismatch {
                engine: engine.clone(),
                constraint: constraint.clone(),
                actual: version.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::RecordingLauncher;

    fn map(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reports_only_failed_constraints() {
        let engines = map(&[("bun", ">=1.0"), ("node", ">=18")]);
        let actual = map(&[("bun", "1.1.38"), ("node", "v16.20.2")]);

        let found = mismatches(&engines, &actual);
        assert_eq!(
            found,
            vec![EngineMismatch {
                engine: "node".to_string(),
                constraint: ">=18".to_string(),
                actual: "v16.20.2".to_string(),
            }]
        );
        assert_eq!(found[0].to_string(), "script requires node >=18, found v16.20.2");
    }

    #[test]
    fn unknown_versions_are_skipped() {
        let engines = map(&[("deno", ">=2")]);
        assert!(mismatches(&engines, &BTreeMap::new()).is_empty());
    }

    #[tokio::test]
    async fn detects_each_declared_engine() {
        let launcher = RecordingLauncher {
            versions: [("bun".to_string(), "1.1.38".to_string())].into(),
            ..RecordingLauncher::default()
        };
        let engines = map(&[("bun", ">=1.0"), ("node", ">=18")]);

        let versions = detect_versions(&launcher, &engines, "bun").await;
        assert_eq!(versions, map(&[("bun", "1.1.38")]));
    }

    #[tokio::test]
    async fn only_known_engines_and_executor_are_run() {
        let launcher = RecordingLauncher {
            versions: [
                ("node".to_string(), "v20.11.1".to_string()),
                ("deno".to_string(), "2.1.0".to_string()),
                ("rm".to_string(), "9.4".to_string()),
            ]
            .into(),
            ..RecordingLauncher::default()
        };
        let engines = map(&[("node", ">=18"), ("deno", ">=2"), ("rm", ">=1")]);

        let versions = detect_versions(&launcher, &engines, "deno").await;
        assert_eq!(versions, map(&[("deno", "2.1.0"), ("node", "v20.11.1")]));

        let versions = detect_versions(&launcher, &engines, "bun").await;
        assert_eq!(versions, map(&[("node", "v20.11.1")]));
    }
}
