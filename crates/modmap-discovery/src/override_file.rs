//! Operator-declared application names.
//!
//! A `contrast_security.yaml` (or `contrast.yaml`) next to a module may carry
//!
//! ```yaml
//! application:
//!   name: storefront
//! ```
//!
//! which outranks every inferred name.

use std::path::Path;

use tracing::debug;

/// Override file names, in lookup order.
pub const OVERRIDE_FILES: [&str; 2] = ["contrast_security.yaml", "contrast.yaml"];

/// `application.name` from the first override file in `dir` that declares one.
pub fn override_name(dir: &Path) -> Option<String> {
    OVERRIDE_FILES.iter().find_map(|file| {
        let path = dir.join(file);
        if !path.is_file() {
            return None;
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|e| debug!(path = %path.display(), error = %e, "unreadable override file"))
            .ok()?;
        application_name(&text)
    })
}

fn application_name(text: &str) -> Option<String> {
    let doc: serde_yaml::Value = serde_yaml::from_str(text).ok()?;
    let name = doc.get("application")?.get("name")?;
    let name = match name {
        serde_yaml::Value::String(s) => s.trim().to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!name.is_empty()).then_some(name)
}
