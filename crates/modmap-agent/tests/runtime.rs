//! AgentRuntime driven by a scripted model over a temporary repository.

use std::path::Path;
use std::sync::Arc;

use modmap_agent::fakes::ScriptedModel;
use modmap_agent::{AgentRuntime, ContentBlock, Role, SUBMIT_RESULT};
use modmap_core::fakes::StaticRegistry;
use modmap_core::{
    AgentConfidence, AgentError, AgentLimits, AgentRequest, Candidate, DiscoveredModule,
    FallbackOrchestrator, FallbackOutcome, FallbackReason, InvestigativeAgent, Manifest,
    MatchSource, ResolverConfig,
};
use serde_json::json;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn repo() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("services/pay")).unwrap();
    std::fs::write(
        dir.path().join("services/pay/README.md"),
        "# Payment Gateway\nDeployed as payment-gateway-prod.\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("services/pay/package.json"),
        r#"{"name": "pay"}"#,
    )
    .unwrap();
    dir
}

fn registry() -> Arc<StaticRegistry> {
    Arc::new(StaticRegistry::new(vec![
        Candidate::new("app-9", "payment-gateway-prod", "Node"),
        Candidate::new("app-3", "billing", "Java"),
    ]))
}

fn request(root: &Path, limits: AgentLimits) -> AgentRequest {
    AgentRequest {
        instructions: "Identify the registry application for module 'pay'.".into(),
        prompt: "Resolve the module 'pay' at path 'services/pay'.".into(),
        repo_root: root.to_path_buf(),
        module_path: "services/pay".into(),
        limits,
    }
}

fn submission(id: &str, confidence: &str) -> serde_json::Value {
    json!({
        "application_id": id,
        "application_name": "payment-gateway-prod",
        "confidence": confidence,
        "reasoning": "README names the deployed application",
        "metadata": {"search_terms": ["payment"]}
    })
}

fn runtime(model: &Arc<ScriptedModel>) -> AgentRuntime {
    AgentRuntime::new(model.clone(), registry())
}

// ---------------------------------------------------------------------------
// Happy paths
// ---------------------------------------------------------------------------

#[tokio::test]
async fn investigates_then_submits() {
    let dir = repo();
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool("tu_1", "read_text_file", json!({"path": "services/pay/README.md"}))
            .then_tool("tu_2", "search_applications", json!({"filter": "payment"}))
            .then_tool("tu_3", SUBMIT_RESULT, submission("app-9", "HIGH")),
    );

    let finding = runtime(&model)
        .investigate(request(dir.path(), AgentLimits::default()))
        .await
        .unwrap();

    assert_eq!(finding.application_id, "app-9");
    assert_eq!(finding.confidence, AgentConfidence::High);
    assert!(finding.metadata.contains_key("search_terms"));

    let turns = model.turns();
    assert_eq!(turns.len(), 3);
    assert!(turns[0].system.contains("module 'pay'"));
    assert_eq!(
        turns[0].tool_names,
        vec![
            "list_directory",
            "search_files",
            "read_text_file",
            "search_applications",
            SUBMIT_RESULT
        ]
    );

    // Second turn carries the file contents back as a tool result.
    let last = turns[1].messages.last().unwrap();
    assert_eq!(last.role, Role::User);
    match &last.content[0] {
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            assert_eq!(tool_use_id, "tu_1");
            assert!(content.contains("payment-gateway-prod"));
            assert!(!is_error);
        }
        other => panic!("expected tool result, got {other:?}"),
    }
}

#[tokio::test]
async fn json_in_final_text_is_accepted() {
    let dir = repo();
    let text = format!(
        "Conclusion:\n```json\n{}\n```",
        submission("app-9", "medium")
    );
    let model = Arc::new(ScriptedModel::new().then_text(&text));

    let finding = runtime(&model)
        .investigate(request(dir.path(), AgentLimits::default()))
        .await
        .unwrap();
    assert_eq!(finding.confidence, AgentConfidence::Medium);
}

#[tokio::test]
async fn plain_text_gets_a_reminder() {
    let dir = repo();
    let model = Arc::new(
        ScriptedModel::new()
            .then_text("I think it is the payment gateway.")
            .then_tool("tu_1", SUBMIT_RESULT, submission("app-9", "LOW")),
    );

    let finding = runtime(&model)
        .investigate(request(dir.path(), AgentLimits::default()))
        .await
        .unwrap();
    assert_eq!(finding.confidence, AgentConfidence::Low);

    let turns = model.turns();
    let reminder = turns[1].messages.last().unwrap();
    assert_eq!(reminder.role, Role::User);
    assert!(matches!(&reminder.content[0], ContentBlock::Text { text } if text.contains(SUBMIT_RESULT)));
}

#[tokio::test]
async fn invalid_submission_is_returned_for_correction() {
    let dir = repo();
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool("tu_1", SUBMIT_RESULT, json!({"application_id": "app-9"}))
            .then_tool("tu_2", SUBMIT_RESULT, submission("app-9", "HIGH")),
    );

    let finding = runtime(&model)
        .investigate(request(dir.path(), AgentLimits::default()))
        .await
        .unwrap();
    assert_eq!(finding.application_id, "app-9");

    let turns = model.turns();
    match &turns[1].messages.last().unwrap().content[0] {
        ContentBlock::ToolResult { is_error, .. } => assert!(is_error),
        other => panic!("expected tool error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Ceilings
// ---------------------------------------------------------------------------

#[tokio::test]
async fn turn_ceiling_fails_closed() {
    let dir = repo();
    let model = Arc::new(
        ScriptedModel::new()
            .then_text("still looking")
            .then_text("still looking")
            .then_text("never reached"),
    );
    let limits = AgentLimits {
        max_model_turns: 2,
        ..AgentLimits::default()
    };

    let err = runtime(&model)
        .investigate(request(dir.path(), limits))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::TurnLimitExceeded { limit: 2 }), "{err:?}");
    assert_eq!(model.turns().len(), 2);
}

#[tokio::test]
async fn failed_tool_calls_count_toward_ceiling() {
    let dir = repo();
    let model = Arc::new(
        ScriptedModel::new()
            .then_tool("tu_1", "read_text_file", json!({"path": "../outside.txt"}))
            .then_tool("tu_2", "list_directory", json!({"path": "."})),
    );
    let limits = AgentLimits {
        max_tool_calls: 1,
        ..AgentLimits::default()
    };

    let err = runtime(&model)
        .investigate(request(dir.path(), limits))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::ToolCallLimitExceeded { limit: 1 }), "{err:?}");

    // The rejected read went back to the model as an error result.
    let turns = model.turns();
    match &turns[1].messages.last().unwrap().content[0] {
        ContentBlock::ToolResult { is_error, content, .. } => {
            assert!(is_error);
            assert!(content.contains("outside.txt"));
        }
        other => panic!("expected tool error, got {other:?}"),
    }
}

#[tokio::test]
async fn model_errors_propagate() {
    let dir = repo();
    let model = Arc::new(ScriptedModel::new().then(Err(AgentError::Transport("503".into()))));
    let err = runtime(&model)
        .investigate(request(dir.path(), AgentLimits::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Transport(_)));
}

#[tokio::test]
async fn missing_repository_is_a_tool_error() {
    let dir = repo();
    let gone = dir.path().join("does-not-exist");
    let model = Arc::new(ScriptedModel::new());
    let err = runtime(&model)
        .investigate(request(&gone, AgentLimits::default()))
        .await
        .unwrap_err();
    assert!(matches!(err, AgentError::Tool(_)));
    assert!(model.turns().is_empty());
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

#[tokio::test]
async fn history_is_trimmed_at_turn_boundaries() {
    let dir = repo();
    let mut script = ScriptedModel::new();
    for i in 0..5 {
        script = script.then_tool(&format!("tu_{i}"), "list_directory", json!({"path": "."}));
    }
    let model = Arc::new(script.then_tool("tu_final", SUBMIT_RESULT, submission("app-9", "HIGH")));
    let limits = AgentLimits {
        max_history_messages: 4,
        history_keep_recent: 2,
        ..AgentLimits::default()
    };

    runtime(&model)
        .investigate(request(dir.path(), limits))
        .await
        .unwrap();

    for turn in model.turns() {
        assert!(turn.messages.len() <= 4, "{} messages sent", turn.messages.len());
        assert_eq!(turn.messages[0].role, Role::User);
        assert!(matches!(&turn.messages[0].content[0], ContentBlock::Text { text } if text.starts_with("Resolve the module")));
        if turn.messages.len() > 1 {
            assert_eq!(turn.messages[1].role, Role::Assistant);
        }
        assert_eq!(turn.messages.last().unwrap().role, Role::User);
    }
}

// ---------------------------------------------------------------------------
// Orchestrator integration
// ---------------------------------------------------------------------------

#[tokio::test]
async fn orchestrator_maps_runtime_finding_to_match() {
    let dir = repo();
    let model = Arc::new(
        ScriptedModel::new().then_tool("tu_1", SUBMIT_RESULT, submission("app-9", "HIGH")),
    );
    let agent = Arc::new(runtime(&model));
    let orchestrator = FallbackOrchestrator::new(agent, ResolverConfig::batch(), dir.path());
    let module = DiscoveredModule::new("pay", "services/pay", Manifest::PackageJson);
    let candidates = vec![
        Candidate::new("app-9", "payment-gateway-prod", "Node"),
        Candidate::new("app-3", "billing", "Java"),
    ];

    let outcome = orchestrator
        .investigate(&module, &candidates, &[], FallbackReason::BelowThreshold)
        .await;

    match outcome {
        FallbackOutcome::Resolved(hit) => {
            assert_eq!(hit.app_id, "app-9");
            assert_eq!(hit.source, MatchSource::Llm);
            assert_eq!(hit.confidence, 0.95);
        }
        other => panic!("expected resolved, got {other:?}"),
    }
    assert!(model.turns()[0].system.contains("services/pay"));
}
