//! All-modules mapping: partitions, sibling context, failure isolation.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use modmap_core::fakes::{ScriptedAgent, StaticModuleSource, StaticRegistry};
use modmap_core::{
    AgentConfidence, AgentError, AgentFinding, BatchOutcome, Candidate, DiscoveredModule,
    Manifest, ModuleKey, Pipeline, ResolverConfig, UnresolvedReason,
};

fn finding(id: &str, name: &str) -> AgentFinding {
    AgentFinding {
        application_id: id.into(),
        application_name: name.into(),
        confidence: AgentConfidence::Medium,
        reasoning: "deployment manifest names it".into(),
        metadata: Default::default(),
    }
}

fn not_found() -> AgentFinding {
    AgentFinding {
        application_id: "NOT_FOUND".into(),
        application_name: "NOT_FOUND".into(),
        confidence: AgentConfidence::Low,
        reasoning: "no registry entry mentions it".into(),
        metadata: Default::default(),
    }
}

fn registry() -> Arc<StaticRegistry> {
    Arc::new(StaticRegistry::new(vec![
        Candidate::new("10", "storefront", "Node"),
        Candidate::new("20", "order-api", "Java"),
        Candidate::new("30", "inventory", "Python"),
    ]))
}

fn modules() -> Vec<DiscoveredModule> {
    vec![
        DiscoveredModule::new("storefront", "web", Manifest::PackageJson),
        DiscoveredModule::new("com.acme:order-api", "services/orders", Manifest::PomXml),
        DiscoveredModule::new("stock-keeper", "services/stock", Manifest::PyprojectToml),
        DiscoveredModule::new("github.com/acme/mailer", "tools/mailer", Manifest::GoMod),
        DiscoveredModule::new("legacy", "legacy", Manifest::Gemfile),
    ]
}

fn assert_partition(outcome: &BatchOutcome, modules: &[DiscoveredModule]) {
    let expected: BTreeSet<ModuleKey> = modules.iter().map(DiscoveredModule::key).collect();
    let mut seen: Vec<ModuleKey> = Vec::new();
    seen.extend(outcome.deterministic.keys().cloned());
    seen.extend(outcome.agent.keys().cloned());
    seen.extend(outcome.unresolved.keys().cloned());
    assert_eq!(seen.len(), expected.len(), "a module landed in two buckets");
    assert_eq!(seen.into_iter().collect::<BTreeSet<_>>(), expected);
    assert_eq!(outcome.total, modules.len());
}

#[tokio::test]
async fn partitions_cover_every_module_once() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .then(Ok(finding("30", "inventory")))
            .then(Ok(not_found()))
            .then(Err(AgentError::ToolCallLimitExceeded { limit: 15 })),
    );
    let source = Arc::new(StaticModuleSource::new(modules()));
    let p = Pipeline::new(source.clone(), registry(), ResolverConfig::batch()).with_agent(agent.clone());

    let out = p.map_modules(Path::new("/repo")).await.unwrap();
    assert_partition(&out, &modules());
    assert_eq!(source.requested_depths(), vec![4]);

    assert_eq!(out.deterministic.len(), 2);
    assert_eq!(out.agent.len(), 1);
    assert_eq!(out.unresolved.len(), 2);
    assert_eq!(out.matched(), 3);
    assert_eq!(agent.calls(), 3);

    let stock = out
        .agent
        .values()
        .find(|m| m.module.path == "services/stock")
        .unwrap();
    assert_eq!(stock.app_id, "30");
    assert_eq!(stock.confidence, 0.80);

    let reasons: Vec<&str> = out.unresolved.values().map(|u| u.reason.as_str()).collect();
    assert!(reasons.contains(&"not_found"));
    assert!(reasons.contains(&"agent_failed"));
}

#[tokio::test]
async fn later_investigations_see_earlier_agent_matches() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .then(Ok(finding("30", "inventory")))
            .then(Ok(not_found()))
            .then(Ok(not_found())),
    );
    let p = Pipeline::new(
        Arc::new(StaticModuleSource::new(modules())),
        registry(),
        ResolverConfig::batch(),
    )
    .with_agent(agent.clone());

    p.map_modules(Path::new("/repo")).await.unwrap();

    let requests = agent.requests();
    assert_eq!(requests.len(), 3);
    // deterministic siblings are visible from the start
    assert!(requests[0].instructions.contains("web (node) -> storefront (id=10)"));
    assert!(!requests[0].instructions.contains("inventory (id=30)"));
    // the first agent match is visible afterwards
    assert!(requests[1].instructions.contains("services/stock (python) -> inventory (id=30)"));
    assert!(requests[2].instructions.contains("services/stock (python) -> inventory (id=30)"));
}

#[tokio::test]
async fn without_agent_reasons_are_reported() {
    let p = Pipeline::new(
        Arc::new(StaticModuleSource::new(modules())),
        registry(),
        ResolverConfig::batch(),
    );
    let out = p.map_modules(Path::new("/repo")).await.unwrap();
    assert_partition(&out, &modules());
    assert!(out.agent.is_empty());
    assert!(out
        .unresolved
        .values()
        .all(|u| u.reason == UnresolvedReason::BelowThreshold));
}

#[tokio::test]
async fn ambiguity_applies_when_floor_enabled() {
    let registry = Arc::new(StaticRegistry::new(vec![
        Candidate::new("1", "employee-management", "Node"),
        Candidate::new("2", "alex-employee-management", "Node"),
    ]));
    let modules = vec![DiscoveredModule::new("employee-management", ".", Manifest::PackageJson)];
    let batch = Pipeline::new(
        Arc::new(StaticModuleSource::new(modules.clone())),
        registry.clone(),
        ResolverConfig::batch(),
    );
    assert_eq!(batch.map_modules(Path::new("/r")).await.unwrap().deterministic.len(), 1);

    let strict = Pipeline::new(
        Arc::new(StaticModuleSource::new(modules)),
        registry,
        ResolverConfig::batch().with_ambiguity_floor(Some(0.4)),
    );
    let out = strict.map_modules(Path::new("/r")).await.unwrap();
    assert!(out.deterministic.is_empty());
    let only = out.unresolved.values().next().unwrap();
    assert_eq!(only.reason, UnresolvedReason::Ambiguous);
}

#[tokio::test]
async fn empty_registry_marks_all_unresolved_without_agent() {
    let agent = Arc::new(ScriptedAgent::new());
    let p = Pipeline::new(
        Arc::new(StaticModuleSource::new(modules())),
        Arc::new(StaticRegistry::new(vec![])),
        ResolverConfig::batch(),
    )
    .with_agent(agent.clone());

    let out = p.map_modules(Path::new("/repo")).await.unwrap();
    assert_partition(&out, &modules());
    assert_eq!(agent.calls(), 0);
    assert!(out
        .unresolved
        .values()
        .all(|u| u.reason == UnresolvedReason::NoCandidates));
}

#[tokio::test]
async fn empty_repository_is_an_empty_outcome() {
    let registry = registry();
    let p = Pipeline::new(
        Arc::new(StaticModuleSource::new(vec![])),
        registry.clone(),
        ResolverConfig::batch(),
    );
    let out = p.map_modules(Path::new("/repo")).await.unwrap();
    assert_eq!(out.total, 0);
    assert!(out.unresolved.is_empty());
    assert_eq!(registry.list_calls(), 0);
}

#[tokio::test]
async fn same_path_in_two_ecosystems_kept_apart() {
    let modules = vec![
        DiscoveredModule::new("storefront", ".", Manifest::PackageJson),
        DiscoveredModule::new("storefront", ".", Manifest::PomXml),
    ];
    let p = Pipeline::new(
        Arc::new(StaticModuleSource::new(modules.clone())),
        registry(),
        ResolverConfig::batch(),
    );
    let out = p.map_modules(Path::new("/repo")).await.unwrap();
    assert_partition(&out, &modules);
    assert_eq!(out.deterministic.len(), 2);
}
