use std::collections::BTreeMap;

use empathy_core::models::*;
use empathy_core::models::pagination::parse_cursor;
use proptest::prelude::*;

#[test]
fn tiers_form_a_total_order() {
    assert!(AccessTier::Observer < AccessTier::Contributor);
    assert!(AccessTier::Contributor < AccessTier::Validator);
    assert!(AccessTier::Validator < AccessTier::Steward);
    assert_eq!(AccessTier::Validator.level(), 3);
}

#[test]
fn capability_predicates_follow_tiers() {
    let observer = AgentCredentials::new("o", AccessTier::Observer);
    let contributor = AgentCredentials::new("c", AccessTier::Contributor);
    let validator = AgentCredentials::new("v", AccessTier::Validator);
    let steward = AgentCredentials::new("s", AccessTier::Steward);

    assert!(!observer.can_stage());
    assert!(contributor.can_stage() && !contributor.can_validate());
    assert!(validator.can_stage() && validator.can_validate());
    assert!(steward.can_validate() && steward.can_administer());
}

#[test]
fn require_reports_agent_and_tiers() {
    let observer = AgentCredentials::new("watcher", AccessTier::Observer);
    let err = observer.require(AccessTier::Contributor).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("watcher"));
    assert!(msg.contains("OBSERVER"));
    assert!(msg.contains("CONTRIBUTOR"));
}

#[test]
fn tier_parses_names_and_levels() {
    assert_eq!(AccessTier::parse("validator"), Some(AccessTier::Validator));
    assert_eq!(AccessTier::parse("4"), Some(AccessTier::Steward));
    assert_eq!(AccessTier::parse("admin"), None);
}

#[test]
fn ttl_strategy_defaults() {
    assert_eq!(TtlStrategy::WorkingResults.default_secs(), 3_600);
    assert_eq!(TtlStrategy::StagedPatterns.default_secs(), 86_400);
    assert_eq!(TtlStrategy::ConflictContext.default_secs(), 604_800);
    assert_eq!(TtlStrategy::Session.default_secs(), 1_800);
}

#[test]
fn staged_pattern_validation() {
    assert!(StagedPattern::new("p1", "n", 0.5).validate().is_ok());
    assert!(StagedPattern::new("", "n", 0.5).validate().is_err());
    assert!(StagedPattern::new("p1", "n", 1.5).validate().is_err());
    assert!(StagedPattern::new("p1", "n", f64::NAN).validate().is_err());
}

#[test]
fn staged_pattern_deserializes_with_missing_optional_fields() {
    let json = r#"{"pattern_id":"p9","name":"retry","confidence":0.4}"#;
    let pattern: StagedPattern = serde_json::from_str(json).unwrap();
    assert_eq!(pattern.pattern_id, "p9");
    assert!(pattern.code.is_none());
    assert!(pattern.context.is_empty());
}

#[test]
fn session_participants_are_a_set() {
    let mut session = Session::new("s1", "alice", serde_json::Map::new());
    assert_eq!(session.participants, vec!["alice"]);
    assert!(session.add_participant("bob"));
    assert!(!session.add_participant("bob"));
    assert!(session.remove_participant("alice"));
    assert!(!session.remove_participant("alice"));
    assert_eq!(session.participants, vec!["bob"]);
}

#[test]
fn conflict_resolve_sets_fields() {
    let mut positions = BTreeMap::new();
    positions.insert("a1".to_string(), "X".to_string());
    let mut ctx = ConflictContext::new("c1", positions, BTreeMap::new(), "a1", None);
    assert!(!ctx.resolved);
    ctx.resolve("Chose X", "v1");
    assert!(ctx.resolved);
    assert_eq!(ctx.resolution.as_deref(), Some("Chose X"));
    assert_eq!(ctx.resolved_by.as_deref(), Some("v1"));
    assert_eq!(ctx.parties(), vec!["a1"]);
}

#[test]
fn stream_id_parses_and_orders() {
    let a: StreamId = "5-1".parse().unwrap();
    let b: StreamId = "5-2".parse().unwrap();
    let c: StreamId = "6".parse().unwrap();
    assert!(a < b && b < c);
    assert_eq!(c, StreamId::new(6, 0));
    assert_eq!(a.to_string(), "5-1");
    assert!("abc".parse::<StreamId>().is_err());
    assert!("5-x".parse::<StreamId>().is_err());
}

#[test]
fn stream_id_never_goes_backwards() {
    let last = StreamId::new(100, 7);
    assert_eq!(last.next_after(50), StreamId::new(100, 8));
    assert_eq!(last.next_after(100), StreamId::new(100, 8));
    assert_eq!(last.next_after(101), StreamId::new(101, 0));
}

#[test]
fn stream_event_decodes_from_fields() {
    let event = StreamEvent {
        entry_id: StreamId::new(1, 0),
        data: serde_json::json!({"step": 3}),
        agent_id: "a1".into(),
        timestamp: chrono::Utc::now(),
    };
    let entry = StreamEntry {
        id: StreamId::new(1, 0),
        fields: event.to_fields().unwrap(),
    };
    let decoded = StreamEvent::from_entry(&entry).unwrap();
    assert_eq!(decoded.data, serde_json::json!({"step": 3}));
    assert_eq!(decoded.agent_id, "a1");
}

#[test]
fn stream_event_rejects_missing_data() {
    let entry = StreamEntry {
        id: StreamId::new(1, 0),
        fields: vec![("agent_id".into(), "a1".into())],
    };
    assert!(StreamEvent::from_entry(&entry).is_err());
}

#[test]
fn cursor_parsing() {
    assert_eq!(parse_cursor("0").unwrap(), 0);
    assert_eq!(parse_cursor("").unwrap(), 0);
    assert_eq!(parse_cursor("42").unwrap(), 42);
    assert!(parse_cursor("next").is_err());
}

#[test]
fn paginated_result_has_more_tracks_cursor() {
    let page = PaginatedResult::from_scan(vec![1, 2], 7, 2);
    assert!(page.has_more);
    assert_eq!(page.cursor, "7");
    let last = PaginatedResult::from_scan(vec![3], 0, 1);
    assert!(!last.has_more);
    assert_eq!(last.cursor, "0");
}

#[test]
fn time_window_rejects_nan() {
    assert!(TimeWindow::between(f64::NAN, 1.0).validate().is_err());
    assert!(TimeWindow::between(1.0, 2.0).with_limit(5).validate().is_ok());
}

proptest! {
    #[test]
    fn stream_id_display_roundtrips(ms in 0u64..u64::MAX / 2, seq in 0u64..1_000_000) {
        let id = StreamId::new(ms, seq);
        let parsed: StreamId = id.to_string().parse().unwrap();
        prop_assert_eq!(parsed, id);
    }
}
