//! Discovered modules and the closed sets that classify them.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Package ecosystem a module belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ecosystem {
    Java,
    Node,
    Python,
    Go,
    Ruby,
    Dotnet,
    Php,
}

impl Ecosystem {
    pub const ALL: [Ecosystem; 7] = [
        Ecosystem::Java,
        Ecosystem::Node,
        Ecosystem::Python,
        Ecosystem::Go,
        Ecosystem::Ruby,
        Ecosystem::Dotnet,
        Ecosystem::Php,
    ];

    /// Language tag the registry uses for applications of this ecosystem.
    pub fn registry_language(self) -> &'static str {
        match self {
            Ecosystem::Java => "Java",
            Ecosystem::Node => "Node",
            Ecosystem::Python => "Python",
            Ecosystem::Go => "Go",
            Ecosystem::Ruby => "Ruby",
            Ecosystem::Dotnet => ".NET Core",
            Ecosystem::Php => "PHP",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ecosystem::Java => "java",
            Ecosystem::Node => "node",
            Ecosystem::Python => "python",
            Ecosystem::Go => "go",
            Ecosystem::Ruby => "ruby",
            Ecosystem::Dotnet => "dotnet",
            Ecosystem::Php => "php",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The build or lock file that identified a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Manifest {
    #[serde(rename = "package.json")]
    PackageJson,
    #[serde(rename = "package-lock.json")]
    PackageLockJson,
    #[serde(rename = "yarn.lock")]
    YarnLock,
    #[serde(rename = "pnpm-lock.yaml")]
    PnpmLockYaml,
    #[serde(rename = "pom.xml")]
    PomXml,
    #[serde(rename = "build.gradle")]
    BuildGradle,
    #[serde(rename = "build.gradle.kts")]
    BuildGradleKts,
    #[serde(rename = "settings.gradle")]
    SettingsGradle,
    #[serde(rename = "settings.gradle.kts")]
    SettingsGradleKts,
    #[serde(rename = "build.sbt")]
    BuildSbt,
    #[serde(rename = "pyproject.toml")]
    PyprojectToml,
    #[serde(rename = "Pipfile")]
    Pipfile,
    #[serde(rename = "requirements.txt")]
    RequirementsTxt,
    #[serde(rename = "poetry.lock")]
    PoetryLock,
    #[serde(rename = "go.mod")]
    GoMod,
    #[serde(rename = "Gopkg.lock")]
    GopkgLock,
    #[serde(rename = "Gemfile")]
    Gemfile,
    #[serde(rename = "Gemfile.lock")]
    GemfileLock,
    #[serde(rename = "project.assets.json")]
    ProjectAssetsJson,
    #[serde(rename = "packages.config")]
    PackagesConfig,
    #[serde(rename = "composer.json")]
    ComposerJson,
    #[serde(rename = "composer.lock")]
    ComposerLock,
}

impl Manifest {
    /// File name of the manifest on disk.
    pub fn file_name(self) -> &'static str {
        match self {
            Manifest::PackageJson => "package.json",
            Manifest::PackageLockJson => "package-lock.json",
            Manifest::YarnLock => "yarn.lock",
            Manifest::PnpmLockYaml => "pnpm-lock.yaml",
            Manifest::PomXml => "pom.xml",
            Manifest::BuildGradle => "build.gradle",
            Manifest::BuildGradleKts => "build.gradle.kts",
            Manifest::SettingsGradle => "settings.gradle",
            Manifest::SettingsGradleKts => "settings.gradle.kts",
            Manifest::BuildSbt => "build.sbt",
            Manifest::PyprojectToml => "pyproject.toml",
            Manifest::Pipfile => "Pipfile",
            Manifest::RequirementsTxt => "requirements.txt",
            Manifest::PoetryLock => "poetry.lock",
            Manifest::GoMod => "go.mod",
            Manifest::GopkgLock => "Gopkg.lock",
            Manifest::Gemfile => "Gemfile",
            Manifest::GemfileLock => "Gemfile.lock",
            Manifest::ProjectAssetsJson => "project.assets.json",
            Manifest::PackagesConfig => "packages.config",
            Manifest::ComposerJson => "composer.json",
            Manifest::ComposerLock => "composer.lock",
        }
    }

    /// Ecosystem this manifest belongs to.
    pub fn ecosystem(self) -> Ecosystem {
        match self {
            Manifest::PackageJson
            | Manifest::PackageLockJson
            | Manifest::YarnLock
            | Manifest::PnpmLockYaml => Ecosystem::Node,
            Manifest::PomXml
            | Manifest::BuildGradle
            | Manifest::BuildGradleKts
            | Manifest::SettingsGradle
            | Manifest::SettingsGradleKts
            | Manifest::BuildSbt => Ecosystem::Java,
            Manifest::PyprojectToml
            | Manifest::Pipfile
            | Manifest::RequirementsTxt
            | Manifest::PoetryLock => Ecosystem::Python,
            Manifest::GoMod | Manifest::GopkgLock => Ecosystem::Go,
            Manifest::Gemfile | Manifest::GemfileLock => Ecosystem::Ruby,
            Manifest::ProjectAssetsJson | Manifest::PackagesConfig => Ecosystem::Dotnet,
            Manifest::ComposerJson | Manifest::ComposerLock => Ecosystem::Php,
        }
    }
}

impl fmt::Display for Manifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A unit of source code identified as belonging to one ecosystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredModule {
    /// Declared name, in the ecosystem's own format (`group:artifact`, `@scope/name`, ...).
    pub name: String,
    /// Path relative to the repository root, `"."` for the root itself.
    pub path: String,
    pub ecosystem: Ecosystem,
    pub manifest: Manifest,
    /// Operator-declared registry identity. Outranks every inferred name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_name: Option<String>,
}

impl DiscoveredModule {
    /// Builds a module whose ecosystem is derived from its manifest.
    pub fn new(name: impl Into<String>, path: impl Into<String>, manifest: Manifest) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            ecosystem: manifest.ecosystem(),
            manifest,
            override_name: None,
        }
    }

    pub fn with_override(mut self, name: impl Into<String>) -> Self {
        self.override_name = Some(name.into());
        self
    }

    /// The override name, if present and non-empty.
    pub fn override_name(&self) -> Option<&str> {
        self.override_name.as_deref().filter(|n| !n.is_empty())
    }

    pub fn has_override(&self) -> bool {
        self.override_name().is_some()
    }

    pub fn key(&self) -> ModuleKey {
        ModuleKey {
            path: self.path.clone(),
            ecosystem: self.ecosystem,
        }
    }
}

/// Identity of a module within one discovery run.
///
/// Paths alone are not unique: a directory holding both `package.json` and
/// `pom.xml` yields two modules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModuleKey {
    pub path: String,
    pub ecosystem: Ecosystem,
}

impl fmt::Display for ModuleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.path, self.ecosystem)
    }
}
