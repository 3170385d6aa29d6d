//! Depth-limited recursive manifest scan.

use std::collections::BTreeSet;
use std::path::Path;

use modmap_core::{DiscoveredModule, Ecosystem, Manifest};
use tracing::debug;

use crate::manifest::declared_name;
use crate::override_file::override_name;

/// Directories never descended into and never reported as modules.
pub const SKIP_DIRS: &[&str] = &[
    "node_modules",
    "vendor",
    "vendors",
    "bower_components",
    "dist",
    "build",
    "target",
    "out",
    "bin",
    "obj",
    ".git",
    ".github",
    ".mvn",
    "gradle",
    "__pycache__",
    ".venv",
    "venv",
    "test",
    "tests",
    "testdata",
    "fixtures",
    "mock",
    "mocks",
    "buildSrc",
];

/// Manifests that mark a module, in priority order. Name-bearing manifests
/// come first; lock files only count when nothing better is present.
pub const MANIFEST_PRIORITY: &[Manifest] = &[
    Manifest::PackageJson,
    Manifest::PomXml,
    Manifest::BuildGradleKts,
    Manifest::BuildGradle,
    Manifest::BuildSbt,
    Manifest::PyprojectToml,
    Manifest::Pipfile,
    Manifest::RequirementsTxt,
    Manifest::GoMod,
    Manifest::Gemfile,
    Manifest::ProjectAssetsJson,
    Manifest::PackagesConfig,
    Manifest::ComposerJson,
    Manifest::PackageLockJson,
    Manifest::YarnLock,
    Manifest::PnpmLockYaml,
    Manifest::PoetryLock,
    Manifest::GopkgLock,
    Manifest::GemfileLock,
    Manifest::ComposerLock,
];

/// Relative module path of `dir` under `root`, `"."` for the root itself.
pub(crate) fn relative_path(root: &Path, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        Some(".".to_string())
    } else {
        Some(parts.join("/"))
    }
}

pub(crate) fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// One module per ecosystem present in `dir`.
fn modules_in(root: &Path, dir: &Path) -> Vec<DiscoveredModule> {
    let mut seen: BTreeSet<Ecosystem> = BTreeSet::new();
    let picked: Vec<Manifest> = MANIFEST_PRIORITY
        .iter()
        .copied()
        .filter(|m| dir.join(m.file_name()).is_file() && seen.insert(m.ecosystem()))
        .collect();
    if picked.is_empty() {
        return Vec::new();
    }

    let Some(path) = relative_path(root, dir) else {
        return Vec::new();
    };
    let operator_name = override_name(dir);
    picked
        .into_iter()
        .map(|manifest| {
            let name = declared_name(dir, manifest).unwrap_or_else(|| dir_name(dir));
            let module = DiscoveredModule::new(name, path.clone(), manifest);
            match &operator_name {
                Some(o) => module.with_override(o.clone()),
                None => module,
            }
        })
        .collect()
}

/// Scan `root` to `max_depth` levels below it. Children are visited in name
/// order; symlinked directories are not followed.
pub fn scan(root: &Path, max_depth: usize, skip: &BTreeSet<String>) -> Vec<DiscoveredModule> {
    let mut out = Vec::new();
    walk(root, root, max_depth, skip, &mut out);
    out
}

fn walk(
    root: &Path,
    dir: &Path,
    remaining: usize,
    skip: &BTreeSet<String>,
    out: &mut Vec<DiscoveredModule>,
) {
    out.extend(modules_in(root, dir));
    if remaining == 0 {
        return;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };
    let mut children: Vec<_> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter(|entry| !skip.contains(entry.file_name().to_string_lossy().as_ref()))
        .map(|entry| entry.path())
        .collect();
    children.sort();

    for child in children {
        walk(root, &child, remaining - 1, skip, out);
    }
}
