//! Modules declared explicitly by build systems at the repository root:
//! Maven `<modules>`, Gradle `include`, Node `workspaces`, .NET solutions.
//!
//! Declared paths that resolve outside the repository are dropped.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use modmap_core::{DiscoveredModule, Manifest};
use regex::Regex;
use tracing::debug;

use crate::manifest::{json_name, parse_pom, pom_coordinates};
use crate::scanner::{dir_name, relative_path};

/// Every module declared at `root`, in Maven, Gradle, Node, .NET order.
pub fn declared_modules(root: &Path) -> Vec<DiscoveredModule> {
    let mut out = maven_modules(root);
    out.extend(gradle_modules(root));
    out.extend(node_workspaces(root));
    out.extend(dotnet_projects(root));
    out
}

/// Canonical directory for `rel` under `root`, if it exists and stays inside.
fn contained_dir(root: &Path, rel: &str) -> Option<PathBuf> {
    let resolved = root.join(rel).canonicalize().ok()?;
    if !resolved.starts_with(root) {
        debug!(path = %rel, "declared module escapes repository root");
        return None;
    }
    resolved.is_dir().then_some(resolved)
}

// ---------------------------------------------------------------------------
// Maven
// ---------------------------------------------------------------------------

pub fn maven_modules(root: &Path) -> Vec<DiscoveredModule> {
    let Ok(text) = std::fs::read_to_string(root.join("pom.xml")) else {
        return Vec::new();
    };
    let Some(parent) = parse_pom(&text) else {
        return Vec::new();
    };

    parent
        .modules
        .iter()
        .filter_map(|declared| {
            let dir = contained_dir(root, declared)?;
            let pom = dir.join("pom.xml");
            if !pom.is_file() {
                return None;
            }
            let name = pom_coordinates(&pom).unwrap_or_else(|| dir_name(&dir));
            Some(DiscoveredModule::new(name, relative_path(root, &dir)?, Manifest::PomXml))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Gradle
// ---------------------------------------------------------------------------

fn include_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"include\s*\(([^)]+)\)").expect("static include pattern"))
}

fn include_bare_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"include\s+([^(\n]+)").expect("static include pattern"))
}

fn quoted_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"["']([^"']+)["']"#).expect("static quoted pattern"))
}

fn rename_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"findProject\(\s*["']([^"']+)["']\s*\)\??\s*\.\s*name\s*=\s*["']([^"']+)["']"#,
        )
        .expect("static findProject pattern")
    })
}

/// Project references from `include(...)` and `include "..."` statements, in
/// order of first appearance, plus `findProject(...).name = ...` renames.
pub fn parse_gradle_settings(text: &str) -> (Vec<String>, BTreeMap<String, String>) {
    let uncommented: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("//"))
        .collect::<Vec<_>>()
        .join("\n");

    let mut included: Vec<String> = Vec::new();
    let mut seen: BTreeSet<String> = BTreeSet::new();
    for re in [include_call_re(), include_bare_re()] {
        for call in re.captures_iter(&uncommented) {
            for quoted in quoted_re().captures_iter(&call[1]) {
                let project = quoted[1].to_string();
                if seen.insert(project.clone()) {
                    included.push(project);
                }
            }
        }
    }

    let renames = rename_re()
        .captures_iter(&uncommented)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .collect();
    (included, renames)
}

pub fn gradle_modules(root: &Path) -> Vec<DiscoveredModule> {
    let Some((path, manifest)) = [
        ("settings.gradle.kts", Manifest::SettingsGradleKts),
        ("settings.gradle", Manifest::SettingsGradle),
    ]
    .into_iter()
    .map(|(file, manifest)| (root.join(file), manifest))
    .find(|(path, _)| path.is_file()) else {
        return Vec::new();
    };
    let Ok(text) = std::fs::read_to_string(&path) else {
        return Vec::new();
    };
    let (included, renames) = parse_gradle_settings(&text);

    included
        .iter()
        .filter_map(|project| {
            let rel = project.trim_start_matches(':').replace(':', "/");
            let dir = contained_dir(root, &rel)?;
            let colon = format!(":{}", project.trim_start_matches(':'));
            let name = renames
                .get(project)
                .or_else(|| renames.get(&colon))
                .cloned()
                .unwrap_or_else(|| project.rsplit(':').next().unwrap_or(project).to_string());
            Some(DiscoveredModule::new(name, relative_path(root, &dir)?, manifest))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Node workspaces
// ---------------------------------------------------------------------------

/// Workspace patterns from a root package.json: either an array or
/// `{ "packages": [...] }`.
pub fn workspace_patterns(package_json: &serde_json::Value) -> Vec<String> {
    let patterns = match package_json.get("workspaces") {
        Some(serde_json::Value::Array(items)) => items,
        Some(serde_json::Value::Object(obj)) => match obj.get("packages") {
            Some(serde_json::Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    patterns
        .iter()
        .filter_map(|p| p.as_str().map(str::to_string))
        .collect()
}

pub fn node_workspaces(root: &Path) -> Vec<DiscoveredModule> {
    let Ok(text) = std::fs::read_to_string(root.join("package.json")) else {
        return Vec::new();
    };
    let Ok(doc) = serde_json::from_str::<serde_json::Value>(&text) else {
        return Vec::new();
    };

    let base = glob::Pattern::escape(&root.to_string_lossy());
    let mut out = Vec::new();
    for pattern in workspace_patterns(&doc) {
        let full = format!("{base}/{}", pattern.trim_start_matches("./"));
        let Ok(paths) = glob::glob(&full) else {
            debug!(pattern = %pattern, "invalid workspace pattern");
            continue;
        };
        let mut dirs: Vec<PathBuf> = paths.filter_map(|p| p.ok()).collect();
        dirs.sort();
        for dir in dirs {
            let Some(rel) = relative_path(root, &dir) else {
                continue;
            };
            let Some(dir) = contained_dir(root, &rel) else {
                continue;
            };
            let manifest = dir.join("package.json");
            if !manifest.is_file() {
                continue;
            }
            let name = json_name(&manifest).unwrap_or_else(|| dir_name(&dir));
            if let Some(path) = relative_path(root, &dir) {
                out.push(DiscoveredModule::new(name, path, Manifest::PackageJson));
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// .NET solutions
// ---------------------------------------------------------------------------

fn sln_project_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"Project\("[^"]*"\)\s*=\s*"([^"]+)"\s*,\s*"([^"]+)""#)
            .expect("static sln pattern")
    })
}

const PROJECT_EXTENSIONS: [&str; 3] = [".csproj", ".fsproj", ".vbproj"];

/// `(project name, project directory)` pairs from a solution file. Solution
/// folders and non-code projects are skipped.
pub fn parse_solution(text: &str) -> Vec<(String, String)> {
    sln_project_re()
        .captures_iter(text)
        .filter(|c| PROJECT_EXTENSIONS.iter().any(|ext| c[2].ends_with(ext)))
        .map(|c| {
            let file = c[2].replace('\\', "/");
            let dir = match file.rsplit_once('/') {
                Some((dir, _)) => dir.to_string(),
                None => ".".to_string(),
            };
            (c[1].to_string(), dir)
        })
        .collect()
}

pub fn dotnet_projects(root: &Path) -> Vec<DiscoveredModule> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };
    let mut solutions: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "sln"))
        .collect();
    solutions.sort();

    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::new();
    for sln in solutions {
        let Ok(text) = std::fs::read_to_string(&sln) else {
            continue;
        };
        for (name, rel) in parse_solution(&text) {
            let Some(dir) = contained_dir(root, &rel) else {
                continue;
            };
            let Some(path) = relative_path(root, &dir) else {
                continue;
            };
            if seen.insert(path.clone()) {
                out.push(DiscoveredModule::new(name, path, Manifest::PackagesConfig));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gradle_include_forms() {
        let text = r#"
rootProject.name = "shop"
include("services:api", ":services:worker")
include ':web', ":admin"
// include(":disabled")
includeBuild("tooling")
findProject(":services:api")?.name = "shop-api"
"#;
        let (included, renames) = parse_gradle_settings(text);
        assert_eq!(included, vec!["services:api", ":services:worker", ":web", ":admin"]);
        assert_eq!(renames.get(":services:api").map(String::as_str), Some("shop-api"));
    }

    #[test]
    fn workspace_patterns_both_shapes() {
        let arr = serde_json::json!({"workspaces": ["packages/*", "apps/web"]});
        assert_eq!(workspace_patterns(&arr), vec!["packages/*", "apps/web"]);
        let obj = serde_json::json!({"workspaces": {"packages": ["libs/*"], "nohoist": []}});
        assert_eq!(workspace_patterns(&obj), vec!["libs/*"]);
        assert!(workspace_patterns(&serde_json::json!({"workspaces": "x"})).is_empty());
    }

    #[test]
    fn solution_projects() {
        let sln = r#"
Project("{FAE04EC0}") = "Shop.Api", "src\Shop.Api\Shop.Api.csproj", "{1}"
EndProject
Project("{2150E333}") = "Solution Items", "Solution Items", "{2}"
EndProject
Project("{F2A71F9B}") = "Shop.Core", "Shop.Core.fsproj", "{3}"
EndProject
"#;
        assert_eq!(
            parse_solution(sln),
            vec![
                ("Shop.Api".to_string(), "src/Shop.Api".to_string()),
                ("Shop.Core".to_string(), ".".to_string()),
            ]
        );
    }
}
