//! 接口队列（Queue disciplines）
//!
//! MAC 从这里取出下一个待发送的数据报。目前只有 DropTail（尾丢弃）。

use crate::traffic::Datagram;

mod drop_tail;

pub use drop_tail::DropTailQueue;

/// 默认队列容量（数据报个数）
pub const DEFAULT_QUEUE_PKTS: usize = 400;

/// 数据报队列抽象
pub trait DatagramQueue: std::fmt::Debug {
    /// 入队：成功返回 Ok；若被丢弃则返回 Err(datagram)
    fn enqueue(&mut self, d: Datagram) -> Result<(), Datagram>;
    /// 出队：按队列策略返回下一个数据报
    fn dequeue(&mut self) -> Option<Datagram>;

    fn len(&self) -> usize;
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    fn bytes(&self) -> u64;
    fn capacity_pkts(&self) -> usize;
}
