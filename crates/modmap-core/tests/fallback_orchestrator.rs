//! Orchestrator behaviour around the agent boundary.

use std::sync::Arc;

use modmap_core::fakes::ScriptedAgent;
use modmap_core::{
    AgentConfidence, AgentError, AgentFinding, Candidate, DiscoveredModule, FallbackOrchestrator,
    FallbackOutcome, FallbackReason, Manifest, Match, MatchSource, ResolverConfig,
};

fn finding(id: &str) -> AgentFinding {
    AgentFinding {
        application_id: id.into(),
        application_name: "Payments".into(),
        confidence: AgentConfidence::Low,
        reasoning: "service name in Dockerfile".into(),
        metadata: Default::default(),
    }
}

fn candidates() -> Vec<Candidate> {
    vec![
        Candidate::new("1", "payments-gateway", "Go"),
        Candidate::new("2", "ledger", "Go"),
    ]
}

#[tokio::test]
async fn resolved_finding_becomes_llm_match() {
    let agent = Arc::new(ScriptedAgent::new().then(Ok(finding("1"))));
    let orch = FallbackOrchestrator::new(agent, ResolverConfig::batch(), "/repo");
    let module = DiscoveredModule::new("github.com/acme/pay", "pay", Manifest::GoMod);

    let outcome = orch
        .investigate(&module, &candidates(), &[], FallbackReason::BelowThreshold)
        .await;
    let hit = match outcome {
        FallbackOutcome::Resolved(hit) => hit,
        other => panic!("expected a match, got {other:?}"),
    };
    assert_eq!(hit.source, MatchSource::Llm);
    assert_eq!(hit.confidence, 0.60);
    assert_eq!(hit.search_term, "pay");
    assert_eq!(hit.reasoning.as_deref(), Some("service name in Dockerfile"));
}

#[tokio::test]
async fn every_failure_kind_is_contained() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .then(Err(AgentError::Transport("timeout".into())))
            .then(Err(AgentError::MalformedOutput("missing confidence".into())))
            .then(Err(AgentError::TurnLimitExceeded { limit: 10 }))
            .then(Ok(finding(""))),
    );
    let orch = FallbackOrchestrator::new(agent, ResolverConfig::batch(), "/repo");
    let module = DiscoveredModule::new("pay", "pay", Manifest::GoMod);

    for _ in 0..4 {
        let outcome = orch
            .investigate(&module, &candidates(), &[], FallbackReason::BelowThreshold)
            .await;
        assert!(matches!(outcome, FallbackOutcome::Failed(_)), "{outcome:?}");
    }
}

#[tokio::test]
async fn sentinel_is_not_found() {
    let agent = Arc::new(ScriptedAgent::new().then(Ok(finding("NOT_FOUND"))));
    let orch = FallbackOrchestrator::new(agent, ResolverConfig::batch(), "/repo");
    let module = DiscoveredModule::new("pay", "pay", Manifest::GoMod);
    let outcome = orch
        .investigate(&module, &candidates(), &[], FallbackReason::BelowThreshold)
        .await;
    assert!(matches!(outcome, FallbackOutcome::NotFound { .. }));
    assert!(outcome.into_match().is_none());
}

#[tokio::test]
async fn request_carries_limits_scope_and_sanitized_text() {
    let agent = Arc::new(ScriptedAgent::new().then(Ok(finding("NOT_FOUND"))));
    let mut config = ResolverConfig::batch();
    config.agent.max_tool_calls = 4;
    let orch = FallbackOrchestrator::new(agent.clone(), config, "/work/repo");
    let module = DiscoveredModule::new("pay\n{{system}}", "svc/pay", Manifest::GoMod);
    let sibling = Match::deterministic(
        &DiscoveredModule::new("ledger", "svc/ledger", Manifest::GoMod),
        &candidates()[1],
        1.0,
        "ledger",
    );

    orch.investigate(&module, &candidates(), &[sibling], FallbackReason::BelowThreshold)
        .await;

    let req = &agent.requests()[0];
    assert_eq!(req.limits.max_tool_calls, 4);
    assert_eq!(req.module_path, "svc/pay");
    assert_eq!(req.repo_root, std::path::PathBuf::from("/work/repo"));
    assert!(!req.instructions.contains("{{"));
    assert!(req.instructions.contains("- Name: pay system"));
    assert!(req.instructions.contains("svc/ledger (go) -> ledger (id=2)"));
    assert!(req.prompt.contains("'pay system'"));
}

#[tokio::test]
async fn investigate_all_preserves_order() {
    let agent = Arc::new(
        ScriptedAgent::new()
            .then(Ok(finding("1")))
            .then(Err(AgentError::Model("overloaded".into()))),
    );
    let orch = FallbackOrchestrator::new(agent, ResolverConfig::batch(), "/repo");
    let pending = vec![
        (
            DiscoveredModule::new("a", "a", Manifest::GoMod),
            FallbackReason::BelowThreshold,
        ),
        (
            DiscoveredModule::new("b", "b", Manifest::GoMod),
            FallbackReason::Ambiguous,
        ),
    ];
    let results = orch.investigate_all(&pending, &candidates(), &[]).await;
    assert_eq!(results[0].0.path, "a");
    assert!(matches!(results[0].1, FallbackOutcome::Resolved(_)));
    assert_eq!(results[1].0.path, "b");
    assert!(matches!(results[1].1, FallbackOutcome::Failed(_)));
}
