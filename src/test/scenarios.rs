use crate::mac::MacConfig;
use crate::net::{Destination, FrameKind, NodeId, NodeRole, PhyConfig};
use crate::scenario::Scenario;
use crate::sim::SimTime;
use crate::topo::WlanOpts;
use crate::topo::exposed_terminal::build_exposed_terminal;
use crate::topo::hidden_terminal::build_hidden_terminal;
use crate::topo::star::build_star;
use crate::topo::three_pairs::build_three_pairs;
use crate::trace::TraceOutcome;
use crate::traffic::FlowConfig;

fn short_opts() -> WlanOpts {
    WlanOpts {
        start: SimTime::ZERO,
        stop: SimTime::from_millis(300),
        ..WlanOpts::default()
    }
}

fn flow(src: NodeId, dst: Destination, payload_bytes: u32, rate_bps: u64, stop_ms: u64) -> FlowConfig {
    FlowConfig {
        src,
        dst,
        payload_bytes,
        rate_bps,
        start: SimTime::ZERO,
        stop: SimTime::from_millis(stop_ms),
        on_off: None,
    }
}

/// 两个互相可达的节点
fn pair(mac: MacConfig) -> (Scenario, NodeId, NodeId) {
    let mut sc = Scenario::new(PhyConfig::default(), mac, 1).expect("scenario");
    let net = sc.network_mut();
    let a = net.add_node("a", NodeRole::Peer);
    let b = net.add_node("b", NodeRole::Coordinator);
    net.set_symmetric_loss(a, b, 30.0).expect("link");
    (sc, a, b)
}

#[test]
fn uncontended_flow_delivers_everything() {
    let (mut sc, a, b) = pair(MacConfig::default());
    sc.add_flow(flow(a, Destination::Unicast(b), 1_000, 1_000_000, 100))
        .expect("flow");
    let stats = sc.run(SimTime::from_millis(200)).expect("run");

    let f = stats.get(0).expect("flow 0");
    assert_eq!(f.sent, 13);
    assert_eq!(f.received, f.sent);
    assert_eq!(f.delivery_succeeded, f.sent);
    assert_eq!(f.delivery_failed, 0);
    assert_eq!(f.queue_drops, 0);
    assert!(f.mean_latency_ns.is_some());

    let arrivals = sc.network().flows()[0].sink.arrivals().to_vec();
    assert_eq!(arrivals, (0..13).collect::<Vec<u64>>());

    let trace = sc.trace();
    assert!(!trace.is_empty());
    assert!(trace.records().iter().all(|r| r.outcome == TraceOutcome::Succeeded));
    assert_eq!(trace.summary(FrameKind::Data, Some(b.0)).succeeded, 13);
    assert_eq!(trace.summary(FrameKind::Ack, Some(a.0)).succeeded, 13);
}

#[test]
fn same_seed_gives_identical_trace() {
    let run = || {
        let (mut sc, _) = build_hidden_terminal(&short_opts()).expect("build");
        sc.run(SimTime::from_millis(350)).expect("run");
        sc.into_trace().records
    };
    let first = run();
    let second = run();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn different_seeds_change_the_schedule() {
    let run = |seed| {
        let opts = WlanOpts { seed, ..short_opts() };
        let (mut sc, _) = build_hidden_terminal(&opts).expect("build");
        sc.run(SimTime::from_millis(350)).expect("run");
        sc.into_trace().records
    };
    assert_ne!(run(1), run(2));
}

#[test]
fn hidden_terminal_collides_and_rts_cts_mitigates() {
    let basic = {
        let (mut sc, topo) = build_hidden_terminal(&short_opts()).expect("build");
        sc.run(SimTime::from_millis(350)).expect("run");
        sc.trace().summary(FrameKind::Data, Some(topo.b.0))
    };
    let rts = {
        let mut opts = short_opts();
        opts.mac.rts_threshold = Some(0);
        let (mut sc, topo) = build_hidden_terminal(&opts).expect("build");
        let stats = sc.run(SimTime::from_millis(350)).expect("run");
        assert!(stats.get(topo.flow_a.0).expect("flow a").received > 0);
        assert!(stats.get(topo.flow_c.0).expect("flow c").received > 0);
        sc.trace().summary(FrameKind::Data, Some(topo.b.0))
    };

    assert!(basic.collided > 0);
    assert!(
        basic.collision_rate() > 0.2,
        "basic access collision rate {:.3}",
        basic.collision_rate()
    );
    assert!(
        rts.collision_rate() < basic.collision_rate() / 2.0,
        "rts {:.3} vs basic {:.3}",
        rts.collision_rate(),
        basic.collision_rate()
    );
    // 数据帧只剩 CTS 往返间隙内的极小碰撞窗口
    assert!(
        rts.collision_rate() < 0.05,
        "rts data collision rate {:.3} ({} ok / {} collided), basic {:.3}",
        rts.collision_rate(),
        rts.succeeded,
        rts.collided,
        basic.collision_rate()
    );
}

#[test]
fn chain_both_ends_lose_more_than_single_flow() {
    let opts = WlanOpts {
        rate_bps: 2_000_000,
        ..short_opts()
    };
    let (mut chain, topo) = build_hidden_terminal(&opts).expect("build");
    chain.run(opts.until()).expect("run");
    let chain_data = chain.trace().summary(FrameKind::Data, Some(topo.b.0));

    // 基线：同样的三点链，只有 A -> B 一条流
    let mut base = Scenario::new(PhyConfig::default(), MacConfig::default(), 1).expect("scenario");
    let net = base.network_mut();
    let a = net.add_node("A", NodeRole::Peer);
    let b = net.add_node("B", NodeRole::Coordinator);
    let c = net.add_node("C", NodeRole::Peer);
    net.set_symmetric_loss(a, b, 0.0).expect("link");
    net.set_symmetric_loss(b, c, 0.0).expect("link");
    base.add_flow(flow(a, Destination::Unicast(b), 1_024, 2_000_000, 300))
        .expect("flow");
    let base_stats = base.run(opts.until()).expect("run");
    let base_data = base.trace().summary(FrameKind::Data, Some(b.0));

    assert_eq!(base_data.collided, 0);
    let bf = base_stats.get(0).expect("flow");
    assert_eq!(bf.received, bf.sent);
    assert!(chain_data.collided > 0);
    assert!(chain_data.collision_rate() > base_data.collision_rate());
    let retries: u64 = [topo.a, topo.c]
        .iter()
        .filter_map(|&n| chain.mac_stats(n))
        .map(|m| m.failed_attempts)
        .sum();
    assert!(retries > 0);
}

#[test]
fn retry_exhaustion_reports_delivery_failed() {
    // S 与 J 互相听不到；J 持续广播长帧，S 的每次尝试都在 R 处碰撞
    let mut sc = Scenario::new(PhyConfig::default(), MacConfig::default(), 1).expect("scenario");
    let net = sc.network_mut();
    let s = net.add_node("S", NodeRole::Peer);
    let r = net.add_node("R", NodeRole::Coordinator);
    let j = net.add_node("J", NodeRole::Peer);
    net.set_symmetric_loss(s, r, 0.0).expect("link");
    net.set_symmetric_loss(j, r, 0.0).expect("link");

    sc.add_flow(flow(s, Destination::Unicast(r), 1_024, 100_000, 50))
        .expect("flow");
    sc.add_flow(flow(j, Destination::Broadcast, 2_000, 11_000_000, 200))
        .expect("flow");
    let stats = sc.run(SimTime::from_millis(200)).expect("run");

    let f = stats.get(0).expect("flow S");
    assert_eq!(f.sent, 1);
    assert_eq!(f.received, 0);
    assert_eq!(f.delivery_failed, 1);

    let m = sc.mac_stats(s).expect("mac");
    assert_eq!(m.attempts, 8);
    assert_eq!(m.drops, 1);
    assert_eq!(m.max_cw, 1024);
    assert_eq!(sc.network().node(s).expect("S").mac().contention_window(), 32);
}

#[test]
fn backoff_window_grows_to_min_times_two_to_the_n() {
    // 目的节点不可达：每次尝试都等 ACK 超时
    let mac = MacConfig {
        max_retries: 4,
        ..MacConfig::default()
    };
    let mut sc = Scenario::new(PhyConfig::default(), mac, 1).expect("scenario");
    let s = sc.network_mut().add_node("S", NodeRole::Peer);
    let r = sc.network_mut().add_node("R", NodeRole::Peer);
    sc.add_flow(flow(s, Destination::Unicast(r), 500, 10_000, 10))
        .expect("flow");
    let stats = sc.run(SimTime::from_millis(100)).expect("run");

    let m = sc.mac_stats(s).expect("mac");
    assert_eq!(m.attempts, 5);
    assert_eq!(m.failed_attempts, 5);
    assert_eq!(m.max_cw, 32 << 4);
    assert_eq!(stats.get(0).expect("flow").delivery_failed, 1);

    let data = sc.trace().summary(FrameKind::Data, Some(r.0));
    assert_eq!(data.unreachable, 5);
}

#[test]
fn backoff_window_is_capped_at_cw_max() {
    let mac = MacConfig {
        cw_max: 128,
        ..MacConfig::default()
    };
    let mut sc = Scenario::new(PhyConfig::default(), mac, 1).expect("scenario");
    let s = sc.network_mut().add_node("S", NodeRole::Peer);
    let r = sc.network_mut().add_node("R", NodeRole::Peer);
    sc.add_flow(flow(s, Destination::Unicast(r), 500, 10_000, 10))
        .expect("flow");
    sc.run(SimTime::from_millis(100)).expect("run");

    let m = sc.mac_stats(s).expect("mac");
    assert_eq!(m.attempts, 8);
    assert_eq!(m.max_cw, 128);
}

#[test]
fn overheard_cts_sets_nav_at_third_party() {
    let mac = MacConfig {
        rts_threshold: Some(0),
        ..MacConfig::default()
    };
    let phy = PhyConfig::default();
    let mut sc = Scenario::new(phy.clone(), mac, 1).expect("scenario");
    let net = sc.network_mut();
    let a = net.add_node("A", NodeRole::Peer);
    let b = net.add_node("B", NodeRole::Coordinator);
    let d = net.add_node("D", NodeRole::Peer);
    net.set_symmetric_loss(a, b, 0.0).expect("link");
    net.set_symmetric_loss(b, d, 0.0).expect("link");
    sc.add_flow(flow(a, Destination::Unicast(b), 1_024, 100_000, 50))
        .expect("flow");
    let stats = sc.run(SimTime::from_millis(100)).expect("run");
    assert_eq!(stats.get(0).expect("flow").received, 1);

    let cts = sc
        .trace()
        .records()
        .iter()
        .find(|r| r.kind == FrameKind::Cts)
        .cloned()
        .expect("cts record");
    let expected = SimTime(cts.end_ns)
        + phy.prop_delay
        + phy.sifs.times(2)
        + phy.data_airtime(1_024)
        + phy.ack_airtime();
    assert_eq!(sc.network().nav_until(d), expected);
    // 被寻址的节点不设置 NAV
    assert_eq!(sc.network().nav_until(a), SimTime::ZERO);
}

#[test]
fn lost_ack_retransmission_is_delivered_once() {
    // B 能收到 A，但 A 听不到 B：ACK 全部丢失
    let mac = MacConfig {
        max_retries: 3,
        ..MacConfig::default()
    };
    let mut sc = Scenario::new(PhyConfig::default(), mac, 1).expect("scenario");
    let net = sc.network_mut();
    let a = net.add_node("A", NodeRole::Peer);
    let b = net.add_node("B", NodeRole::Coordinator);
    net.set_loss(a, b, 0.0).expect("link");
    sc.add_flow(flow(a, Destination::Unicast(b), 200, 10_000, 10))
        .expect("flow");
    let stats = sc.run(SimTime::from_millis(100)).expect("run");

    let f = stats.get(0).expect("flow");
    assert_eq!(f.received, 1);
    assert_eq!(f.delivery_failed, 1);
    assert_eq!(sc.network().node_stats(b).expect("B").duplicates, 3);
    assert_eq!(sc.trace().summary(FrameKind::Ack, Some(a.0)).unreachable, 4);
}

#[test]
fn broadcast_counts_a_reception_per_receiver() {
    let mut sc = Scenario::new(PhyConfig::default(), MacConfig::default(), 1).expect("scenario");
    let net = sc.network_mut();
    let s = net.add_node("S", NodeRole::Coordinator);
    let x = net.add_node("X", NodeRole::Peer);
    let y = net.add_node("Y", NodeRole::Peer);
    net.set_loss(s, x, 0.0).expect("link");
    net.set_loss(s, y, 0.0).expect("link");
    sc.add_flow(flow(s, Destination::Broadcast, 500, 400_000, 10))
        .expect("flow");
    let stats = sc.run(SimTime::from_millis(50)).expect("run");

    let f = stats.get(0).expect("flow");
    assert_eq!(f.sent, 1);
    assert_eq!(f.received, 2);
    let data = sc.trace().summary(FrameKind::Data, None);
    assert_eq!(data.succeeded, 2);
}

#[test]
fn broadcast_with_no_receivers_is_one_unreachable_record() {
    let mut sc = Scenario::new(PhyConfig::default(), MacConfig::default(), 1).expect("scenario");
    let s = sc.network_mut().add_node("S", NodeRole::Peer);
    sc.network_mut().add_node("T", NodeRole::Peer);
    sc.add_flow(flow(s, Destination::Broadcast, 500, 400_000, 10))
        .expect("flow");
    sc.run(SimTime::from_millis(50)).expect("run");

    let records = sc.trace().records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].receiver, None);
    assert_eq!(records[0].outcome, TraceOutcome::Unreachable);
}

#[test]
fn loss_above_threshold_is_unreachable() {
    let (mut sc, a, b) = pair(MacConfig::default());
    sc.network_mut().set_loss(a, b, 150.0).expect("link");
    assert!(!sc.network().matrix().query(a, b).is_reachable());
    assert!(sc.network().matrix().query(b, a).is_reachable());
}

#[test]
fn builtin_topologies_run() {
    let opts = WlanOpts {
        stop: SimTime::from_millis(100),
        ..short_opts()
    };
    let (mut sc, topo) = build_exposed_terminal(&opts).expect("exposed");
    let stats = sc.run(opts.until()).expect("run");
    assert!(stats.get(topo.flow_a.0).expect("a").received > 0);
    assert!(stats.get(topo.flow_b.0).expect("b").sent > 0);

    let (mut sc, topo) = build_three_pairs(&opts).expect("three pairs");
    let stats = sc.run(opts.until()).expect("run");
    assert_eq!(stats.flows.len(), 3);
    assert!(topo.flows.iter().any(|f| stats.get(f.0).expect("flow").received > 0));

    let (mut sc, star) = build_star(&opts, 4).expect("star");
    let stats = sc.run(opts.until()).expect("run");
    assert_eq!(star.stations.len(), 4);
    assert!(stats.total_received() > 0);
    assert!(stats.flows.iter().all(|f| f.received > 0));
}

#[test]
fn exposed_terminal_station_a_corrupts_frames_at_b() {
    // a 与 b 互相可达而 B 听不到 a：B -> b 的数据帧在 b 处与 a 的数据帧碰撞
    let (mut sc, topo) = build_exposed_terminal(&short_opts()).expect("build");
    let stats = sc.run(SimTime::from_millis(350)).expect("run");

    let at_b = sc.trace().summary(FrameKind::Data, Some(topo.sta_b.0));
    assert!(at_b.collided > 0, "data at b: {at_b:?}");
    // A 只听得到 a，a -> A 不受干扰
    let at_a = sc.trace().summary(FrameKind::Data, Some(topo.ap_a.0));
    assert_eq!(at_a.collided, 0);
    assert!(stats.get(topo.flow_a.0).expect("flow a").received > 0);

    let fb = stats.get(topo.flow_b.0).expect("flow b");
    assert!(fb.delivery_failed > 0);
    assert!(fb.received < fb.sent);
}
