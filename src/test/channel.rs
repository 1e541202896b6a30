use crate::net::{Channel, Frame, FrameKind, MediumChange, NodeId, ACK_BYTES};
use crate::sim::SimTime;

fn frame(src: usize, dst: usize) -> Frame {
    Frame::control(
        FrameKind::Ack,
        NodeId(src),
        NodeId(dst),
        ACK_BYTES,
        SimTime::from_micros(100),
        SimTime::ZERO,
    )
}

fn channel(n: usize) -> Channel {
    let mut ch = Channel::default();
    for _ in 0..n {
        ch.add_radio();
    }
    ch
}

#[test]
fn lone_signal_is_decoded() {
    let mut ch = channel(2);
    let tx = ch.begin_tx(frame(0, 1), 1);
    ch.signal_arrives(NodeId(1), tx);
    assert!(ch.medium(NodeId(1), SimTime(1)).busy);

    let rx = ch.signal_departs(NodeId(1), tx).expect("reception");
    assert!(rx.decoded);
    assert_eq!(rx.frame.src, NodeId(0));

    assert!(ch.end_tx(NodeId(0), tx).is_some());
    assert!(ch.transmission(tx).is_none(), "finished transmissions are collected");
}

#[test]
fn overlapping_signals_corrupt_each_other() {
    let mut ch = channel(3);
    let t0 = ch.begin_tx(frame(0, 1), 1);
    let t2 = ch.begin_tx(frame(2, 1), 1);
    ch.signal_arrives(NodeId(1), t0);
    ch.signal_arrives(NodeId(1), t2);

    assert!(!ch.signal_departs(NodeId(1), t0).expect("rx").decoded);
    assert!(!ch.signal_departs(NodeId(1), t2).expect("rx").decoded);
}

#[test]
fn signal_after_previous_one_ended_is_clean() {
    let mut ch = channel(3);
    let t0 = ch.begin_tx(frame(0, 1), 1);
    ch.signal_arrives(NodeId(1), t0);
    assert!(ch.signal_departs(NodeId(1), t0).expect("rx").decoded);

    let t2 = ch.begin_tx(frame(2, 1), 1);
    ch.signal_arrives(NodeId(1), t2);
    assert!(ch.signal_departs(NodeId(1), t2).expect("rx").decoded);
}

#[test]
fn receiver_transmitting_is_half_duplex() {
    let mut ch = channel(2);
    let t0 = ch.begin_tx(frame(0, 1), 1);
    ch.signal_arrives(NodeId(1), t0);
    // 接收端自己开始发送，正在接收的信号被破坏
    let _t1 = ch.begin_tx(frame(1, 0), 1);
    assert!(!ch.signal_departs(NodeId(1), t0).expect("rx").decoded);
}

#[test]
fn refresh_reports_busy_idle_transitions() {
    let mut ch = channel(2);
    assert_eq!(ch.refresh(NodeId(1), SimTime::ZERO), None);

    let t0 = ch.begin_tx(frame(0, 1), 1);
    ch.signal_arrives(NodeId(1), t0);
    assert_eq!(ch.refresh(NodeId(1), SimTime(1)), Some(MediumChange::BecameBusy));
    assert_eq!(ch.refresh(NodeId(1), SimTime(2)), None);

    ch.signal_departs(NodeId(1), t0);
    assert_eq!(ch.refresh(NodeId(1), SimTime(100)), Some(MediumChange::BecameIdle));
    assert_eq!(ch.medium(NodeId(1), SimTime(100)).idle_since, SimTime(100));
}

#[test]
fn nav_keeps_medium_busy_until_it_expires() {
    let mut ch = channel(1);
    assert!(ch.extend_nav(NodeId(0), SimTime(50)));
    assert!(!ch.extend_nav(NodeId(0), SimTime(40)), "NAV never shrinks");
    assert!(ch.medium(NodeId(0), SimTime(49)).busy);
    assert!(!ch.medium(NodeId(0), SimTime(50)).busy);
    assert_eq!(ch.nav_until(NodeId(0)), SimTime(50));
}
