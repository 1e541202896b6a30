//! DropTail（尾丢弃）队列
//!
//! 当队列已满时，直接丢弃新到达的数据报。

use std::collections::VecDeque;

use crate::traffic::Datagram;

use super::DatagramQueue;

#[derive(Debug)]
pub struct DropTailQueue {
    max_pkts: usize,
    cur_bytes: u64,
    q: VecDeque<Datagram>,
}

impl DropTailQueue {
    pub fn new(max_pkts: usize) -> Self {
        Self {
            max_pkts,
            cur_bytes: 0,
            q: VecDeque::new(),
        }
    }
}

impl DatagramQueue for DropTailQueue {
    fn enqueue(&mut self, d: Datagram) -> Result<(), Datagram> {
        if self.q.len() >= self.max_pkts {
            return Err(d);
        }
        self.cur_bytes = self.cur_bytes.saturating_add(d.size_bytes as u64);
        self.q.push_back(d);
        Ok(())
    }

    fn dequeue(&mut self) -> Option<Datagram> {
        let d = self.q.pop_front()?;
        self.cur_bytes = self.cur_bytes.saturating_sub(d.size_bytes as u64);
        Some(d)
    }

    fn len(&self) -> usize {
        self.q.len()
    }

    fn bytes(&self) -> u64 {
        self.cur_bytes
    }

    fn capacity_pkts(&self) -> usize {
        self.max_pkts
    }
}
