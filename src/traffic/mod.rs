//! 业务流
//!
//! 定义业务源（开关式恒定码率）与接收端统计。

mod datagram;
mod onoff;
mod sink;

pub use datagram::Datagram;
pub use onoff::{Flow, FlowConfig, FlowCounters, FlowStart, FlowStop, FlowTick, OnOff};
pub use sink::FlowSink;
