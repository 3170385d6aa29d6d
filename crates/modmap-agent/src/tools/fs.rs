//! Read-only filesystem access confined to the repository root.
//!
//! Every path is canonicalised before use and must stay beneath the root, so
//! `..` segments and symlinks cannot reach outside it.

use std::io::Read;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};

use super::error::{ToolError, ToolResult};

/// Bytes returned by one `read_text_file` call.
pub const MAX_READ_BYTES: usize = 64 * 1024;
pub const MAX_LIST_ENTRIES: usize = 200;
pub const MAX_SEARCH_RESULTS: usize = 100;

const SEARCH_MAX_DEPTH: usize = 8;
const SEARCH_SKIP: &[&str] = &[
    ".git",
    "node_modules",
    "vendor",
    "target",
    "dist",
    "build",
    "__pycache__",
    ".venv",
];

fn io_error(path: &Path, source: std::io::Error) -> ToolError {
    ToolError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone)]
pub struct RepoFs {
    root: PathBuf,
}

impl RepoFs {
    pub fn open(root: &Path) -> ToolResult<Self> {
        let root = root.canonicalize().map_err(|e| io_error(root, e))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonical path for `requested`, relative to the root or absolute.
    pub fn resolve(&self, requested: &str) -> ToolResult<PathBuf> {
        let requested = requested.trim();
        let candidate = match requested {
            "" | "." => self.root.clone(),
            other if Path::new(other).is_absolute() => PathBuf::from(other),
            other => self.root.join(other),
        };
        let resolved = candidate.canonicalize().map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound(requested.to_string()),
            _ => io_error(&candidate, e),
        })?;
        if !resolved.starts_with(&self.root) {
            return Err(ToolError::OutsideRoot(requested.to_string()));
        }
        Ok(resolved)
    }

    /// `/`-joined path relative to the root, `"."` for the root.
    pub fn display(&self, path: &Path) -> String {
        let parts: Vec<String> = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        if parts.is_empty() {
            ".".to_string()
        } else {
            parts.join("/")
        }
    }

    pub fn list_directory(&self, requested: &str) -> ToolResult<String> {
        let dir = self.resolve(requested)?;
        if !dir.is_dir() {
            return Err(ToolError::InvalidInput {
                tool: "list_directory".into(),
                reason: format!("{requested} is not a directory"),
            });
        }

        let mut entries: Vec<(String, bool)> = std::fs::read_dir(&dir)
            .map_err(|e| io_error(&dir, e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| {
                let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                (entry.file_name().to_string_lossy().into_owned(), is_dir)
            })
            .collect();
        entries.sort();

        let total = entries.len();
        let mut lines: Vec<String> = entries
            .into_iter()
            .take(MAX_LIST_ENTRIES)
            .map(|(name, is_dir)| {
                if is_dir {
                    format!("[DIR] {name}")
                } else {
                    format!("[FILE] {name}")
                }
            })
            .collect();
        if total > MAX_LIST_ENTRIES {
            lines.push(format!("... ({} more entries)", total - MAX_LIST_ENTRIES));
        }
        if lines.is_empty() {
            return Ok(format!("{} is empty", self.display(&dir)));
        }
        Ok(lines.join("\n"))
    }

    /// Paths under `requested` whose name matches `pattern` (case-insensitive
    /// glob). Patterns containing `/` match against the relative path instead.
    pub fn search_files(&self, requested: &str, pattern: &str) -> ToolResult<String> {
        let start = self.resolve(requested)?;
        let glob = Pattern::new(pattern).map_err(|e| ToolError::InvalidInput {
            tool: "search_files".into(),
            reason: format!("invalid pattern {pattern:?}: {e}"),
        })?;
        let options = MatchOptions {
            case_sensitive: false,
            require_literal_separator: false,
            require_literal_leading_dot: false,
        };
        let by_path = pattern.contains('/');

        let mut hits = Vec::new();
        let mut truncated = false;
        let mut stack = vec![(start, 0usize)];
        while let Some((dir, depth)) = stack.pop() {
            let Ok(read) = std::fs::read_dir(&dir) else {
                continue;
            };
            let mut children: Vec<_> = read.filter_map(|e| e.ok()).collect();
            children.sort_by_key(|e| e.file_name());
            let mut subdirs = Vec::new();
            for child in children {
                let name = child.file_name().to_string_lossy().into_owned();
                let path = child.path();
                let rel = self.display(&path);
                let subject = if by_path { rel.as_str() } else { name.as_str() };
                if glob.matches_with(subject, options) {
                    if hits.len() == MAX_SEARCH_RESULTS {
                        truncated = true;
                        break;
                    }
                    hits.push(rel);
                }
                let is_dir = child.file_type().map(|t| t.is_dir()).unwrap_or(false);
                if is_dir && depth < SEARCH_MAX_DEPTH && !SEARCH_SKIP.contains(&name.as_str()) {
                    subdirs.push((path, depth + 1));
                }
            }
            if truncated {
                break;
            }
            stack.extend(subdirs.into_iter().rev());
        }

        if hits.is_empty() {
            return Ok(format!("No matches for {pattern:?}"));
        }
        let mut out = hits.join("\n");
        if truncated {
            out.push_str(&format!("\n... (results capped at {MAX_SEARCH_RESULTS})"));
        }
        Ok(out)
    }

    pub fn read_text_file(&self, requested: &str) -> ToolResult<String> {
        let path = self.resolve(requested)?;
        if path.is_dir() {
            return Err(ToolError::InvalidInput {
                tool: "read_text_file".into(),
                reason: format!("{requested} is a directory"),
            });
        }

        let file = std::fs::File::open(&path).map_err(|e| io_error(&path, e))?;
        let mut bytes = Vec::new();
        file.take(MAX_READ_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .map_err(|e| io_error(&path, e))?;

        if bytes.iter().take(8192).any(|b| *b == 0) {
            return Err(ToolError::InvalidInput {
                tool: "read_text_file".into(),
                reason: format!("{requested} is a binary file"),
            });
        }
        let truncated = bytes.len() > MAX_READ_BYTES;
        bytes.truncate(MAX_READ_BYTES);
        let mut text = String::from_utf8_lossy(&bytes).into_owned();
        if truncated {
            text.push_str(&format!("\n[truncated after {MAX_READ_BYTES} bytes]"));
        }
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> (tempfile::TempDir, RepoFs) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("services/api")).unwrap();
        std::fs::write(dir.path().join("README.md"), "# Orders platform\n").unwrap();
        std::fs::write(dir.path().join("services/api/package.json"), r#"{"name":"orders-api"}"#).unwrap();
        std::fs::write(dir.path().join("services/api/README.md"), "API").unwrap();
        let fs = RepoFs::open(dir.path()).unwrap();
        (dir, fs)
    }

    #[test]
    fn listing_marks_directories() {
        let (_dir, fs) = repo();
        assert_eq!(fs.list_directory(".").unwrap(), "[FILE] README.md\n[DIR] services");
    }

    #[test]
    fn escapes_are_rejected() {
        let (_dir, fs) = repo();
        assert!(matches!(fs.resolve(".."), Err(ToolError::OutsideRoot(_))));
        assert!(matches!(fs.read_text_file("/etc/hostname"), Err(ToolError::OutsideRoot(_)) | Err(ToolError::NotFound(_))));
        assert!(matches!(fs.read_text_file("missing.txt"), Err(ToolError::NotFound(_))));
    }

    #[test]
    fn search_by_name_and_path() {
        let (_dir, fs) = repo();
        assert_eq!(
            fs.search_files(".", "readme*").unwrap(),
            "README.md\nservices/api/README.md"
        );
        assert_eq!(
            fs.search_files(".", "services/*/package.json").unwrap(),
            "services/api/package.json"
        );
        assert!(fs.search_files(".", "*.gradle").unwrap().starts_with("No matches"));
    }

    #[test]
    fn large_files_are_truncated() {
        let (dir, fs) = repo();
        std::fs::write(dir.path().join("big.txt"), "a".repeat(MAX_READ_BYTES + 10)).unwrap();
        let text = fs.read_text_file("big.txt").unwrap();
        assert!(text.ends_with(&format!("[truncated after {MAX_READ_BYTES} bytes]")));
        assert!(text.len() < MAX_READ_BYTES + 64);
    }

    #[test]
    fn binary_files_are_refused() {
        let (dir, fs) = repo();
        std::fs::write(dir.path().join("blob.bin"), [0u8, 1, 2, 3]).unwrap();
        assert!(matches!(fs.read_text_file("blob.bin"), Err(ToolError::InvalidInput { .. })));
    }
}
