//! Search-term extraction.
//!
//! Turns a module's declared name into the identifier most likely to appear in
//! the registry. Total and pure: every input yields a string.

use crate::domain::{DiscoveredModule, Ecosystem};

/// Derive the registry search term for `module`.
///
/// An operator override always wins. Otherwise packaging is stripped in
/// order: Java `group:artifact` becomes `artifact`, any `@scope/name` becomes
/// `name`, and Go or PHP `vendor/package` paths reduce to their final segment.
pub fn extract_search_term(module: &DiscoveredModule) -> String {
    if let Some(name) = module.override_name() {
        return name.to_string();
    }

    let name = module.name.as_str();
    if module.ecosystem == Ecosystem::Java && name.contains(':') {
        return last_segment(name, ':');
    }
    if let Some((_, pkg)) = name.strip_prefix('@').and_then(|s| s.split_once('/')) {
        return pkg.to_string();
    }
    match module.ecosystem {
        Ecosystem::Go | Ecosystem::Php => last_segment(name, '/'),
        _ => name.to_string(),
    }
}

fn last_segment(name: &str, sep: char) -> String {
    name.rsplit(sep).next().unwrap_or(name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Manifest;

    fn module(name: &str, manifest: Manifest) -> DiscoveredModule {
        DiscoveredModule::new(name, ".", manifest)
    }

    #[test]
    fn java_coordinates_use_artifact() {
        let m = module("com.acme:order-api", Manifest::PomXml);
        assert_eq!(extract_search_term(&m), "order-api");
    }

    #[test]
    fn java_without_group_unchanged() {
        let m = module("order-api", Manifest::BuildGradle);
        assert_eq!(extract_search_term(&m), "order-api");
    }

    #[test]
    fn scoped_node_package_drops_scope() {
        let m = module("@acme/billing-ui", Manifest::PackageJson);
        assert_eq!(extract_search_term(&m), "billing-ui");
    }

    #[test]
    fn nested_scope_keeps_remaining_path() {
        let m = module("@acme/ui/widgets", Manifest::PackageJson);
        assert_eq!(extract_search_term(&m), "ui/widgets");
    }

    #[test]
    fn unscoped_node_package_unchanged() {
        let m = module("billing-ui", Manifest::PackageJson);
        assert_eq!(extract_search_term(&m), "billing-ui");
    }

    #[test]
    fn go_module_path_uses_last_segment() {
        let m = module("github.com/acme/payments-svc", Manifest::GoMod);
        assert_eq!(extract_search_term(&m), "payments-svc");
    }

    #[test]
    fn php_vendor_package_uses_package() {
        let m = module("acme/storefront", Manifest::ComposerJson);
        assert_eq!(extract_search_term(&m), "storefront");
    }

    #[test]
    fn scope_is_dropped_in_every_ecosystem() {
        for manifest in [Manifest::PyprojectToml, Manifest::Gemfile, Manifest::BuildGradle] {
            let m = module("@acme/billing", manifest);
            assert_eq!(extract_search_term(&m), "billing", "{manifest:?}");
        }
    }

    #[test]
    fn java_coordinates_take_precedence_over_scope() {
        let m = module("@acme/tools:billing", Manifest::PomXml);
        assert_eq!(extract_search_term(&m), "billing");
    }

    #[test]
    fn python_names_pass_through() {
        let m = module("acme.tools:cli", Manifest::PyprojectToml);
        assert_eq!(extract_search_term(&m), "acme.tools:cli");
    }

    #[test]
    fn override_beats_ecosystem_rules() {
        let m = module("com.acme:order-api", Manifest::PomXml).with_override("Order Platform");
        assert_eq!(extract_search_term(&m), "Order Platform");
    }

    #[test]
    fn empty_override_is_ignored() {
        let m = module("github.com/acme/svc", Manifest::GoMod).with_override("");
        assert_eq!(extract_search_term(&m), "svc");
    }

    #[test]
    fn trailing_separator_yields_empty_segment() {
        let m = module("github.com/acme/", Manifest::GoMod);
        assert_eq!(extract_search_term(&m), "");
    }
}
