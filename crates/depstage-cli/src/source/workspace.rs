//! JS monorepo workspace input.
//!
//! Scans `packages/`, `apps/`, `tools/` and `libs/` under the workspace
//! root for `<dir>/<name>/package.json`, in that directory order and then
//! by sorted subdirectory name. Each parseable manifest with a `name`
//! becomes one node; unreadable or nameless manifests are skipped with a
//! warning.
//!
//! Dependencies are the keys of `dependencies`, `devDependencies` and
//! `peerDependencies` (first occurrence wins) that name another workspace
//! package, kept in the order the manifest declares them. External packages never reach the graph builder, so they are
//! not reported as dangling.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use depstage_core::{Metadata, NodeEntry};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, warn};

use super::ParsedInput;

/// Directories searched for packages, in scan order.
pub const WORKSPACE_DIRS: [&str; 4] = ["packages", "apps", "tools", "libs"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageManifest {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    dependencies: Map<String, Value>,
    #[serde(default)]
    dev_dependencies: Map<String, Value>,
    #[serde(default)]
    peer_dependencies: Map<String, Value>,
}

struct Package {
    name: String,
    version: Option<String>,
    path: String,
    declared: Vec<String>,
}

/// Discover workspace packages under `root`.
pub fn scan(root: &Path) -> Result<ParsedInput> {
    let packages = discover(root)?;
    if packages.is_empty() {
        bail!(
            "no workspace packages found under {} (looked in {})",
            root.display(),
            WORKSPACE_DIRS.join("/, ") + "/"
        );
    }

    let internal: HashSet<&str> = packages.iter().map(|p| p.name.as_str()).collect();

    let entries = packages
        .iter()
        .map(|package| {
            let depends_on: Vec<String> = package
                .declared
                .iter()
                .filter(|dep| internal.contains(dep.as_str()))
                .cloned()
                .collect();
            NodeEntry {
                name: package.name.clone(),
                depends_on,
                metadata: Metadata::from([
                    ("version".to_string(), json!(package.version)),
                    ("path".to_string(), json!(package.path)),
                ]),
            }
        })
        .collect();

    Ok(ParsedInput {
        title: None,
        entries,
    })
}

fn discover(root: &Path) -> Result<Vec<Package>> {
    let mut packages = Vec::new();

    for dir in WORKSPACE_DIRS {
        let base = root.join(dir);
        if !base.is_dir() {
            continue;
        }

        let mut subdirs: Vec<String> = fs::read_dir(&base)
            .with_context(|| format!("Failed to read {}", base.display()))?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .collect();
        subdirs.sort();

        for subdir in subdirs {
            let manifest_path = base.join(&subdir).join("package.json");
            if !manifest_path.is_file() {
                continue;
            }
            let relative = format!("{dir}/{subdir}");
            match read_manifest(&manifest_path) {
                Ok(manifest) => {
                    if let Some(package) = into_package(manifest, relative) {
                        packages.push(package);
                    } else {
                        warn!(path = %manifest_path.display(), "package.json has no name, skipping");
                    }
                }
                Err(err) => {
                    warn!(path = %manifest_path.display(), error = %err, "unreadable package.json, skipping");
                }
            }
        }
    }

    debug!(count = packages.len(), "workspace packages discovered");
    Ok(packages)
}

fn read_manifest(path: &Path) -> Result<PackageManifest> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn into_package(manifest: PackageManifest, path: String) -> Option<Package> {
    let name = manifest.name.filter(|name| !name.is_empty())?;

    let mut declared: Vec<String> = Vec::new();
    for (dep, _) in manifest
        .dependencies
        .into_iter()
        .chain(manifest.dev_dependencies)
        .chain(manifest.peer_dependencies)
    {
        if !declared.contains(&dep) {
            declared.push(dep);
        }
    }

    Some(Package {
        name,
        version: manifest.version,
        path,
        declared,
    })
}

/// pnpm commands that rebuild and retest everything depending on `name`.
pub fn filter_commands(name: &str) -> Vec<String> {
    ["test", "build"]
        .iter()
        .map(|script| format!("pnpm --filter \"...{name}\" run {script}"))
        .collect()
}
