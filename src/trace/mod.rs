//! 帧级别的发送轨迹
//!
//! 设计目标：
//! - **结构化**：每次空口尝试都产生 JSON 可序列化的记录，而不是解析文本日志
//! - **有序**：记录按帧发送结束的顺序追加
//! - **可汇总**：直接从轨迹计算各类帧的碰撞率

mod types;

pub use types::{TraceLog, TraceOutcome, TraceRecord, TraceSummary};
