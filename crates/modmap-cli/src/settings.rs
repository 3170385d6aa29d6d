//! Resolver configuration layering: preset, then TOML file, then flags.

use std::path::Path;

use anyhow::{Context, Result};
use modmap_core::ResolverConfig;

/// Recursively overlay `over` onto `base`. Tables merge; other values replace.
fn merge(base: &mut toml::Value, over: toml::Value) {
    match (base, over) {
        (toml::Value::Table(base), toml::Value::Table(over)) => {
            for (key, value) in over {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Apply the TOML document `text` on top of `preset`. Keys absent from the
/// file keep the preset's values.
pub fn overlay(preset: &ResolverConfig, text: &str) -> Result<ResolverConfig> {
    let mut merged = toml::Value::try_from(preset).context("failed to encode preset")?;
    let file: toml::Value = toml::from_str(text).context("invalid TOML")?;
    merge(&mut merged, file);
    let config: ResolverConfig = merged.try_into().context("invalid resolver configuration")?;
    Ok(config)
}

pub fn load(preset: ResolverConfig, path: Option<&Path>) -> Result<ResolverConfig> {
    let Some(path) = path else {
        return Ok(preset);
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    overlay(&preset, &text).with_context(|| format!("in config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_only_named_keys() {
        let cfg = overlay(
            &ResolverConfig::single(),
            "top_candidates = 3\n[agent]\nmax_tool_calls = 6\n",
        )
        .unwrap();
        assert_eq!(cfg.top_candidates, 3);
        assert_eq!(cfg.agent.max_tool_calls, 6);
        assert_eq!(cfg.agent.max_model_turns, 10);
        // preset values survive
        assert_eq!(cfg.confidence_threshold, 0.7);
        assert_eq!(cfg.ambiguity_floor, Some(0.6));
    }

    #[test]
    fn batch_preset_can_enable_ambiguity() {
        let cfg = overlay(&ResolverConfig::batch(), "ambiguity_floor = 0.4").unwrap();
        assert_eq!(cfg.ambiguity_floor, Some(0.4));
        assert_eq!(cfg.confidence_threshold, 0.5);
    }

    #[test]
    fn wrong_types_are_rejected() {
        assert!(overlay(&ResolverConfig::batch(), "top_candidates = \"many\"").is_err());
        assert!(overlay(&ResolverConfig::batch(), "not toml at all [").is_err());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load(ResolverConfig::batch(), Some(Path::new("/nonexistent/modmap.toml")))
            .unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/modmap.toml"));
    }
}
