use crate::net::{Destination, FlowId, NodeId};
use crate::queue::{DatagramQueue, DropTailQueue};
use crate::sim::SimTime;
use crate::traffic::Datagram;

fn datagram(seq: u64, size_bytes: u32) -> Datagram {
    Datagram {
        flow: FlowId(0),
        seq,
        src: NodeId(0),
        dst: Destination::Unicast(NodeId(1)),
        size_bytes,
        created_at: SimTime::ZERO,
    }
}

#[test]
fn droptail_queue_enforces_packet_capacity_and_preserves_order() {
    let mut q = DropTailQueue::new(2);
    assert_eq!(q.capacity_pkts(), 2);
    assert!(q.is_empty());

    assert!(q.enqueue(datagram(1, 60)).is_ok());
    assert!(q.enqueue(datagram(2, 40)).is_ok());
    assert_eq!(q.len(), 2);
    assert_eq!(q.bytes(), 100);

    let dropped = q.enqueue(datagram(3, 10)).expect_err("should drop");
    assert_eq!(dropped.seq, 3);
    assert_eq!(q.len(), 2);
    assert_eq!(q.bytes(), 100);

    assert_eq!(q.dequeue().expect("datagram").seq, 1);
    assert_eq!(q.dequeue().expect("datagram").seq, 2);
    assert_eq!(q.bytes(), 0);
    assert!(q.dequeue().is_none());
}

#[test]
fn droptail_queue_accepts_again_after_dequeue() {
    let mut q = DropTailQueue::new(1);
    assert!(q.enqueue(datagram(1, 10)).is_ok());
    assert!(q.enqueue(datagram(2, 10)).is_err());
    assert_eq!(q.dequeue().expect("datagram").seq, 1);
    assert!(q.enqueue(datagram(3, 10)).is_ok());
    assert_eq!(q.dequeue().expect("datagram").seq, 3);
}
