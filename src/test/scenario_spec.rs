use crate::error::{ConfigError, SimError};
use crate::net::{FrameKind, NodeRole};
use crate::scenario::{run_scenario, Scenario, ScenarioSpec};
use crate::sim::SimTime;

const HIDDEN: &str = r#"
{
    "schema_version": 1,
    "meta": { "name": "hidden terminal" },
    "nodes": [
        { "name": "A" },
        { "name": "B", "role": "coordinator" },
        { "name": "C" }
    ],
    "links": [
        { "from": 0, "to": 1, "loss_db": 0, "symmetric": true },
        { "from": 2, "to": 1, "loss_db": 0, "symmetric": true },
        { "from": 0, "to": 2, "loss_db": 200, "symmetric": true }
    ],
    "mac": { "rts_threshold": 0 },
    "flows": [
        { "src": 0, "dst": 1, "payload_bytes": 1024, "rate_bps": 2000000, "stop_ms": 50 },
        { "src": 2, "dst": 1, "payload_bytes": 1024, "rate_bps": 2000000, "stop_ms": 50 }
    ],
    "seed": 9
}
"#;

#[test]
fn parses_scenario_with_defaults() {
    let spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    assert_eq!(spec.nodes.len(), 3);
    assert_eq!(spec.nodes[0].role, NodeRole::Peer);
    assert_eq!(spec.nodes[1].role, NodeRole::Coordinator);
    assert_eq!(spec.flows[0].start_ms, 0.0);
    assert_eq!(spec.flows[0].on_ms, None);

    let mac = spec.mac_config();
    assert_eq!(mac.rts_threshold, Some(0));
    assert_eq!(mac.cw_min, 32);
    assert_eq!(mac.max_retries, 7);
    let phy = spec.phy_config();
    assert_eq!(phy.slot, SimTime::from_micros(20));
    assert_eq!(spec.default_until().expect("until"), SimTime::from_millis(150));
}

#[test]
fn builds_matrix_and_runs() {
    let spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    let mut sc = Scenario::build(&spec).expect("build");
    assert_eq!(sc.network().nodes().len(), 3);
    assert_eq!(sc.network().nodes()[1].name(), "B");
    assert_eq!(sc.network().nodes()[1].role(), NodeRole::Coordinator);
    assert_eq!(sc.network().nodes()[0].role(), NodeRole::Peer);
    // 200 dB 超过接收门限
    let m = sc.network().matrix();
    assert!(!m.query(crate::net::NodeId(0), crate::net::NodeId(2)).is_reachable());
    assert!(m.query(crate::net::NodeId(1), crate::net::NodeId(2)).is_reachable());

    let stats = sc.run(SimTime::from_millis(150)).expect("run");
    assert_eq!(stats.flows.len(), 2);
    assert!(stats.total_received() > 0);
    assert!(stats.total_received() <= stats.total_sent());
    for f in &stats.flows {
        assert!((0.0..=1.0).contains(&f.loss_ratio()), "{f}");
    }
    assert!(sc.trace().summary(FrameKind::Rts, Some(1)).total() > 0);
}

#[test]
fn run_scenario_matches_manual_build() {
    let spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    let a = run_scenario(&spec, SimTime::from_millis(100)).expect("run");
    let mut sc = Scenario::build(&spec).expect("build");
    let b = sc.run(SimTime::from_millis(100)).expect("run");
    assert_eq!(a, b);
}

#[test]
fn configuration_errors_are_reported_before_running() {
    let mut spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    spec.nodes.clear();
    assert_eq!(Scenario::build(&spec).err(), Some(SimError::Config(ConfigError::NoNodes)));

    let mut spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    spec.mac.as_mut().expect("mac").rts_threshold = Some(3_000);
    assert!(matches!(
        Scenario::build(&spec).err(),
        Some(SimError::Config(ConfigError::RtsThreshold { threshold: 3_000, max: 2_346 }))
    ));

    let mut spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    spec.links[0].to = 9;
    assert_eq!(
        Scenario::build(&spec).err(),
        Some(SimError::Config(ConfigError::UnknownNode(9)))
    );

    let mut spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    spec.flows[1].start_ms = 80.0;
    assert!(matches!(
        Scenario::build(&spec).err(),
        Some(SimError::Config(ConfigError::InvalidSchedule { flow: 1, .. }))
    ));

    let mut spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    spec.flows[0].dst = Some(7);
    assert_eq!(
        Scenario::build(&spec).err(),
        Some(SimError::Config(ConfigError::UnknownNode(7)))
    );

    let mut spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    spec.flows[0].stop_ms = f64::NAN;
    assert!(matches!(
        Scenario::build(&spec).err(),
        Some(SimError::Config(ConfigError::InvalidFlow { flow: 0, .. }))
    ));
}

#[test]
fn trace_serializes_to_json_array() {
    let spec = ScenarioSpec::from_json(HIDDEN).expect("parse");
    let mut sc = Scenario::build(&spec).expect("build");
    sc.run(SimTime::from_millis(20)).expect("run");
    let raw = sc.trace().to_json_pretty().expect("json");
    let v: serde_json::Value = serde_json::from_str(&raw).expect("parse json");
    let arr = v.as_array().expect("array");
    assert_eq!(arr.len(), sc.trace().len());
    let first = &arr[0];
    assert!(first.get("t_ns").and_then(|t| t.as_u64()).is_some());
    assert!(matches!(
        first.get("outcome").and_then(|o| o.as_str()),
        Some("succeeded" | "collided" | "unreachable")
    ));
}
