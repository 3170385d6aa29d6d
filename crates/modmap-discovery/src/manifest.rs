//! Declared-name extraction from manifest files.
//!
//! Every extractor returns `None` on a missing, unreadable or malformed file;
//! the caller then falls back to the directory name.

use std::path::Path;
use std::sync::OnceLock;

use modmap_core::Manifest;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use tracing::debug;

/// Declared name for the module whose `manifest` lives in `dir`.
pub fn declared_name(dir: &Path, manifest: Manifest) -> Option<String> {
    match manifest {
        Manifest::PackageJson | Manifest::ComposerJson => {
            json_name(&dir.join(manifest.file_name()))
        }
        Manifest::PomXml => pom_coordinates(&dir.join(manifest.file_name())),
        Manifest::BuildGradle | Manifest::BuildGradleKts => gradle_root_project(dir),
        Manifest::PyprojectToml => pyproject_name(&dir.join(manifest.file_name())),
        Manifest::GoMod => go_module(&dir.join(manifest.file_name())),
        _ => None,
    }
}

fn read(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "manifest unreadable");
            None
        }
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// `name` from package.json or composer.json.
pub fn json_name(path: &Path) -> Option<String> {
    let text = read(path)?;
    let doc: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| debug!(path = %path.display(), error = %e, "malformed JSON manifest"))
        .ok()?;
    doc.get("name").and_then(|v| v.as_str()).and_then(non_empty)
}

/// Top-level coordinates and `<modules>` of a Maven POM.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PomInfo {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub modules: Vec<String>,
}

impl PomInfo {
    /// `groupId:artifactId`, or the bare artifactId when the group is inherited.
    pub fn coordinates(&self) -> Option<String> {
        let artifact = self.artifact_id.as_deref()?;
        Some(match self.group_id.as_deref() {
            Some(group) => format!("{group}:{artifact}"),
            None => artifact.to_string(),
        })
    }
}

/// Parse a POM, reading only direct children of the root element.
///
/// `<parent><groupId>` and dependency coordinates are ignored.
pub fn parse_pom(text: &str) -> Option<PomInfo> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut info = PomInfo::default();
    let mut stack: Vec<Vec<u8>> = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(e.local_name().as_ref().to_vec()),
            Ok(Event::End(_)) => {
                stack.pop();
            }
            Ok(Event::Text(t)) => {
                let Ok(value) = t.unescape() else { continue };
                let value = value.trim();
                if value.is_empty() {
                    continue;
                }
                match stack.as_slice() {
                    [_, field] if field.as_slice() == b"groupId" => {
                        info.group_id = Some(value.to_string());
                    }
                    [_, field] if field.as_slice() == b"artifactId" => {
                        info.artifact_id = Some(value.to_string());
                    }
                    [_, list, item] if list.as_slice() == b"modules" && item.as_slice() == b"module" => {
                        info.modules.push(value.to_string());
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "malformed pom.xml");
                return None;
            }
        }
    }
    Some(info)
}

/// `groupId:artifactId` from a pom.xml file.
pub fn pom_coordinates(path: &Path) -> Option<String> {
    parse_pom(&read(path)?)?.coordinates()
}

fn root_project_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"rootProject\.name\s*=\s*["'](.+?)["']"#).expect("static rootProject pattern")
    })
}

/// `rootProject.name` from settings.gradle(.kts) in `dir`.
pub fn gradle_root_project(dir: &Path) -> Option<String> {
    for file in ["settings.gradle.kts", "settings.gradle"] {
        let path = dir.join(file);
        if !path.is_file() {
            continue;
        }
        let text = read(&path)?;
        if let Some(caps) = root_project_re().captures(&text) {
            return Some(caps[1].to_string());
        }
    }
    None
}

/// `project.name` from pyproject.toml.
pub fn pyproject_name(path: &Path) -> Option<String> {
    let text = read(path)?;
    let doc: toml::Value = toml::from_str(&text)
        .map_err(|e| debug!(path = %path.display(), error = %e, "malformed pyproject.toml"))
        .ok()?;
    doc.get("project")?.get("name")?.as_str().and_then(non_empty)
}

/// Module path from the `module` directive of go.mod.
pub fn go_module(path: &Path) -> Option<String> {
    read(path)?
        .lines()
        .find_map(|line| line.strip_prefix("module "))
        .and_then(non_empty)
}

#[cfg(test)]
mod tests {
    use super::*;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <parent>
    <groupId>com.parent</groupId>
    <artifactId>parent-pom</artifactId>
  </parent>
  <groupId>com.acme</groupId>
  <artifactId>order-api</artifactId>
  <modules>
    <module>core</module>
    <module>web</module>
  </modules>
  <dependencies>
    <dependency>
      <groupId>org.other</groupId>
      <artifactId>lib</artifactId>
    </dependency>
  </dependencies>
</project>"#;

    #[test]
    fn pom_reads_top_level_only() {
        let info = parse_pom(POM).unwrap();
        assert_eq!(info.coordinates().as_deref(), Some("com.acme:order-api"));
        assert_eq!(info.modules, vec!["core", "web"]);
    }

    #[test]
    fn pom_inherited_group_uses_artifact() {
        let pom = "<project><parent><groupId>g</groupId></parent><artifactId>svc</artifactId></project>";
        assert_eq!(parse_pom(pom).unwrap().coordinates().as_deref(), Some("svc"));
    }

    #[test]
    fn pom_without_artifact_has_no_name() {
        let pom = "<project><groupId>g</groupId></project>";
        assert_eq!(parse_pom(pom).unwrap().coordinates(), None);
    }

    #[test]
    fn malformed_pom_is_none() {
        assert!(parse_pom("<project><artifactId>x</groupId></project>").is_none());
    }

    #[test]
    fn root_project_pattern() {
        let caps = root_project_re()
            .captures("rootProject.name = 'inventory'\ninclude 'a'")
            .unwrap();
        assert_eq!(&caps[1], "inventory");
    }
}
