use std::fs;
use std::io::BufReader;

use dramatis::config::DramatisConfig;
use dramatis::highlight::{LinkState, NodeState};
use dramatis::ingest::{EventReader, UpdateEvent};
use dramatis::layout::SyncKind;
use dramatis::session::{AnalysisSession, EventOutcome, SessionStatus};
use eframe::egui::vec2;

const STREAM: &str = r#"{"type":"progress","message":"Reading chapter 1"}
{"type":"batch_complete","batchIndex":1,"totalBatches":2,"data":{"characters":[{"name":"Alice","mentions":10,"description":"A curious girl"},{"name":"Bob","mentions":4},{"name":"Extra","mentions":1}],"interactions":[{"source":"Alice","target":"Bob","weight":3,"contexts":["garden"]},{"source":"Alice","target":"Extra","weight":5}]}}
not even json
{"type":"batch_complete","batchIndex":2,"totalBatches":2,"data":{"characters":[{"name":"Alice","mentions":14},{"name":"Bob","mentions":6},{"name":"Carol","mentions":3}],"interactions":[{"source":"Alice","target":"Bob","weight":4},{"source":"Carol","target":"Alice","weight":2},{"source":"Bob","target":"Carol","weight":1}]}}
{"type":"analysis_complete","data":{"characters":[{"name":"Alice","mentions":14},{"name":"Bob","mentions":6},{"name":"Carol","mentions":3}],"interactions":[{"source":"Alice","target":"Bob","weight":4},{"source":"Carol","target":"Alice","weight":2}]}}
{"type":"progress","message":"late straggler"}
"#;

fn session() -> AnalysisSession {
    AnalysisSession::new(DramatisConfig::default(), vec2(1200.0, 800.0))
}

fn settle(session: &mut AnalysisSession, from: f64) -> f64 {
    let mut now = from;
    for _ in 0..60 {
        now += 1.0 / 60.0;
        session.tick(now);
    }
    now
}

#[test]
fn streamed_file_drives_the_session_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.jsonl");
    fs::write(&path, STREAM).unwrap();

    let reader = BufReader::new(fs::File::open(&path).unwrap());
    let (events, errors): (Vec<_>, Vec<_>) = EventReader::new(reader).partition(Result::is_ok);
    assert_eq!(errors.len(), 1);

    let mut session = session();
    let mut now = 0.0;
    let mut outcomes = Vec::new();
    for event in events.into_iter().map(Result::unwrap) {
        outcomes.push(session.handle_event(event, now));
        now = settle(&mut session, now);
    }

    assert_eq!(outcomes[0], EventOutcome::StatusOnly);
    assert_eq!(
        outcomes[1],
        EventOutcome::GraphUpdated {
            kind: SyncKind::NewGraph,
            nodes: 2,
            links: 1
        }
    );
    assert!(matches!(outcomes[2], EventOutcome::GraphUpdated { nodes: 3, links: 2, .. }));
    assert_eq!(
        outcomes[3],
        EventOutcome::GraphUpdated {
            kind: SyncKind::InPlace,
            nodes: 3,
            links: 2
        }
    );
    assert_eq!(outcomes[4], EventOutcome::Ignored);
    assert_eq!(session.status(), &SessionStatus::Complete);
    assert_eq!(session.message(), Some("Reading chapter 1"));

    let top = &session.summary()[0];
    assert_eq!(top.name, "Alice");
    assert_eq!(top.total_interactions, 6);
}

#[test]
fn existing_character_keeps_its_position_across_batches() {
    let mut session = session();
    let first = UpdateEvent::BatchComplete {
        batch_index: 1,
        total_batches: 2,
        data: serde_json::from_str(
            r#"{"characters":[{"name":"Alice","mentions":10},{"name":"Bob","mentions":4}],"interactions":[{"source":"Alice","target":"Bob","weight":3}]}"#,
        )
        .unwrap(),
    };
    session.handle_event(first, 0.0);
    let now = settle(&mut session, 0.0);
    let alice = session.simulation().position("Alice").unwrap();

    let second = UpdateEvent::BatchComplete {
        batch_index: 2,
        total_batches: 2,
        data: serde_json::from_str(
            r#"{"characters":[{"name":"Alice","mentions":12},{"name":"Bob","mentions":4},{"name":"Dan","mentions":5}],"interactions":[{"source":"Alice","target":"Bob","weight":3},{"source":"Dan","target":"Alice","weight":2}]}"#,
        )
        .unwrap(),
    };
    session.handle_event(second, now);

    assert_eq!(session.simulation().position("Alice"), Some(alice));
    let frame = session.frame();
    let alice_frame = frame.nodes.iter().find(|node| node.name == "Alice").unwrap();
    assert_eq!(alice_frame.position, alice);
}

#[test]
fn selection_survives_graph_updates() {
    let mut session = session();
    session.handle_event(
        UpdateEvent::BatchComplete {
            batch_index: 1,
            total_batches: 2,
            data: serde_json::from_str(
                r#"{"characters":[{"name":"Alice","mentions":10},{"name":"Bob","mentions":4}],"interactions":[]}"#,
            )
            .unwrap(),
        },
        0.0,
    );
    assert!(session.set_highlight(Some("Bob")));
    assert!(!session.frame().links.iter().any(|link| link.state == LinkState::Active));

    session.handle_event(
        UpdateEvent::BatchComplete {
            batch_index: 2,
            total_batches: 2,
            data: serde_json::from_str(
                r#"{"characters":[{"name":"Alice","mentions":10},{"name":"Bob","mentions":4}],"interactions":[{"source":"Bob","target":"Alice","weight":7}]}"#,
            )
            .unwrap(),
        },
        1.0,
    );

    let frame = session.frame();
    let state_of = |name: &str| frame.nodes.iter().find(|node| node.name == name).unwrap().state;
    assert_eq!(state_of("Bob"), NodeState::Selected);
    assert_eq!(state_of("Alice"), NodeState::Connected);
    assert_eq!(frame.links[0].state, LinkState::Active);
}

#[test]
fn config_file_changes_session_behaviour() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dramatis.toml");
    fs::write(
        &path,
        "[palette]\nsticky_colors = true\n\n[replay]\nbatch_interval_ms = 0\n",
    )
    .unwrap();

    let config = DramatisConfig::load(Some(&path)).unwrap();
    assert!(config.palette.sticky_colors);
    assert_eq!(config.replay.batch_interval_ms, 0);
    assert_eq!(config.camera, DramatisConfig::default().camera);

    let mut session = AnalysisSession::new(config, vec2(800.0, 600.0));
    let batch = |characters: &str| UpdateEvent::BatchComplete {
        batch_index: 1,
        total_batches: 1,
        data: serde_json::from_str(&format!(r#"{{"characters":{characters},"interactions":[]}}"#)).unwrap(),
    };
    session.handle_event(batch(r#"[{"name":"Alice","mentions":5}]"#), 0.0);
    let alice_color = session.graph().node("Alice").unwrap().color;

    session.handle_event(
        batch(r#"[{"name":"Zed","mentions":9},{"name":"Alice","mentions":5}]"#),
        1.0,
    );
    assert_eq!(session.graph().node("Alice").unwrap().color, alice_color);
}

#[test]
fn missing_config_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let error = DramatisConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
    assert!(error.to_string().contains("absent.toml"));
}
