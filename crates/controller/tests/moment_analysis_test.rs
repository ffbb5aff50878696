use std::sync::Arc;

use fanplay_controller::{AnalysisSession, LockState, MomentOrchestrator};
use fanplay_core::mocks::{guide_json, guide_reply, ScriptedEngine, ScriptedReply};
use fanplay_core::types::{GroundingChunk, MediaFile, PersonaTag, SourceInput, SportTag};
use fanplay_core::{EngineReply, Error};

const CLIP: &str = "https://example.com/watch?v=abc123";

fn session_with(engine: Arc<ScriptedEngine>) -> AnalysisSession {
    AnalysisSession::with_id("viewer-1", Arc::new(MomentOrchestrator::new(engine)))
}

#[tokio::test]
async fn test_no_source_fails_without_engine_call() {
    let engine = Arc::new(ScriptedEngine::constant(&guide_json("E")));
    let orchestrator = MomentOrchestrator::new(engine.clone());

    let err = orchestrator
        .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let session = session_with(engine.clone());
    let err = session
        .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url("  "))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    assert_eq!(engine.call_count(), 0);
    assert_eq!(session.lock_state(), LockState::Unlocked);
}

#[tokio::test]
async fn test_url_beginner_end_to_end() {
    let grounding = vec![
        GroundingChunk::web(Some("ATP Tour"), Some("https://www.atptour.com/en/scores/2008")),
        GroundingChunk::default(),
        GroundingChunk::web(None, Some("https://en.wikipedia.org/wiki/2008_Wimbledon")),
    ];
    let engine = Arc::new(ScriptedEngine::new(vec![guide_reply(
        "2008 Wimbledon Final: Nadal vs Federer",
        Some(grounding),
    )]));
    let session = session_with(engine.clone());

    let guide = session
        .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url(CLIP))
        .await
        .unwrap();

    assert!(!guide.identified_event.is_empty());
    assert!((3..=5).contains(&guide.foundational_rules.len()));
    let sources = guide.sources.unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[1].title, "Source");
    assert!(sources.iter().all(|s| s.url.starts_with("https://")));

    let sent = engine.last_request().unwrap();
    assert!(sent.enable_search);
    assert!(!sent.system_instruction.contains("ALREADY CONFIRMED"));
    assert!(sent.contents[0].as_text().unwrap().contains("abc123"));
}

#[tokio::test]
async fn test_persona_switch_reuses_confirmed_event() {
    let engine = Arc::new(ScriptedEngine::new(vec![
        guide_reply("2008 Final: A vs B", None),
        // The engine drifts to a different match on the second call.
        guide_reply("2019 Final: C vs D", None),
    ]));
    let session = session_with(engine.clone());

    session
        .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url(CLIP))
        .await
        .unwrap();

    let guide = session
        .analyze(SportTag::Tennis, PersonaTag::Hardcore, SourceInput::url(CLIP))
        .await
        .unwrap();

    let second = &engine.requests()[1];
    assert!(second.system_instruction.contains("ALREADY CONFIRMED"));
    assert!(second.system_instruction.contains("\"2008 Final: A vs B\""));
    assert!(second.system_instruction.contains("PERSONA RULES (HARDCORE)"));
    assert_eq!(guide.identified_event, "2008 Final: A vs B");
}

#[tokio::test]
async fn test_hint_containing_answer_is_kept() {
    let engine = Arc::new(ScriptedEngine::new(vec![
        guide_reply("2008 Final: A vs B", None),
        guide_reply("Wimbledon 2008 final: a vs b (Centre Court)", None),
    ]));
    let session = session_with(engine);

    session
        .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url(CLIP))
        .await
        .unwrap();
    let guide = session
        .analyze(SportTag::Tennis, PersonaTag::Coach, SourceInput::url(CLIP))
        .await
        .unwrap();

    assert_eq!(guide.identified_event, "Wimbledon 2008 final: a vs b (Centre Court)");
}

#[tokio::test]
async fn test_source_change_never_carries_hint() {
    let engine = Arc::new(ScriptedEngine::new(vec![
        guide_reply("E1", None),
        guide_reply("E2", None),
        guide_reply("E3", None),
        guide_reply("E4", None),
    ]));
    let session = session_with(engine.clone());

    session
        .analyze(SportTag::Soccer, PersonaTag::NewFan, SourceInput::url("https://a.example/1"))
        .await
        .unwrap();
    let guide = session
        .analyze(SportTag::Soccer, PersonaTag::NewFan, SourceInput::url("https://a.example/2"))
        .await
        .unwrap();
    assert_eq!(guide.identified_event, "E2");
    assert!(!engine.requests()[1].system_instruction.contains("ALREADY CONFIRMED"));

    let clip = |name: &str| MediaFile::new(name, "video/mp4", vec![7u8; 16]);
    session
        .analyze(SportTag::Soccer, PersonaTag::NewFan, SourceInput::media(clip("one.mp4")))
        .await
        .unwrap();
    let guide = session
        .analyze(SportTag::Soccer, PersonaTag::NewFan, SourceInput::media(clip("two.mp4")))
        .await
        .unwrap();
    assert_eq!(guide.identified_event, "E4");
    assert!(!engine.requests()[3].system_instruction.contains("ALREADY CONFIRMED"));
    assert_eq!(
        session.lock_state(),
        LockState::Locked {
            source_key: "two.mp4".into(),
            confirmed_event: "E4".into()
        }
    );
}

#[tokio::test]
async fn test_malformed_output_keeps_state_and_has_distinct_message() {
    let engine = Arc::new(ScriptedEngine::new(vec![
        guide_reply("2008 Final: A vs B", None),
        ScriptedReply::Reply(EngineReply {
            text: "I think this is a tennis match!".into(),
            grounding_chunks: None,
        }),
    ]));
    let session = session_with(engine);

    session
        .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url(CLIP))
        .await
        .unwrap();
    let before = session.lock_state();

    let err = session
        .analyze(SportTag::Tennis, PersonaTag::Hardcore, SourceInput::url(CLIP))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)));
    assert_eq!(session.lock_state(), before);

    let message = err.user_message();
    assert_ne!(message, Error::missing_source().user_message());
    assert_ne!(message, Error::engine_unavailable("x").user_message());
}

#[tokio::test]
async fn test_rule_count_violation_rejected() {
    let raw = serde_json::json!({
        "identifiedEvent": "E",
        "foundationalRules": ["only one"],
        "whatHappened": "a",
        "whyItMatters": "b",
        "whatHappensNext": "c"
    })
    .to_string();
    let engine = Arc::new(ScriptedEngine::constant(&raw));
    let session = session_with(engine);

    let err = session
        .analyze(SportTag::Basketball, PersonaTag::Beginner, SourceInput::url("u"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::MalformedResponse(_)));
    assert_eq!(session.lock_state(), LockState::Unlocked);
}

#[tokio::test]
async fn test_engine_unavailable_propagates_once() {
    let engine = Arc::new(ScriptedEngine::unavailable("connection refused"));
    let session = session_with(engine.clone());

    let err = session
        .analyze(SportTag::Tennis, PersonaTag::Beginner, SourceInput::url(CLIP))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::EngineUnavailable(_)));
    assert!(err.is_retryable());
    assert_eq!(engine.call_count(), 1);
}

#[tokio::test]
async fn test_media_request_sends_inline_data() {
    let engine = Arc::new(ScriptedEngine::constant(&guide_json("Derby")));
    let session = session_with(engine.clone());

    session
        .analyze(
            SportTag::Soccer,
            PersonaTag::Coach,
            SourceInput::media(MediaFile::new("derby.jpg", "image/jpeg", vec![1u8, 2, 3])),
        )
        .await
        .unwrap();

    let sent = engine.last_request().unwrap();
    let wire = serde_json::to_value(&sent.contents).unwrap();
    assert_eq!(wire[0]["inlineData"]["mimeType"], "image/jpeg");
    assert_eq!(wire[0]["inlineData"]["data"], "AQID");
    assert!(wire[1]["text"].as_str().unwrap().contains("Soccer visual for a coach"));
}
