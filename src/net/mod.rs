//! 无线网络模块
//!
//! 此模块包含信道仿真的核心组件，如节点、帧、连通矩阵、共享信道和网络。

// 子模块声明
mod channel;
mod frame;
mod id;
mod matrix;
mod net_world;
mod network;
mod node;
mod phy;
mod response;
mod signal;
mod stats;

// 重新导出公共接口
pub use channel::{Channel, MediumChange, Reception, Transmission};
pub use frame::{Destination, Frame, FrameKind};
pub use id::{FlowId, NodeId, TxId};
pub use matrix::{ConnectivityMatrix, LinkLoss};
pub use net_world::WifiWorld;
pub use network::{Network, DEFAULT_SEED};
pub use node::{Node, NodeRole, NodeStats};
pub use phy::{PhyConfig, ACK_BYTES, CTS_BYTES, MAX_MPDU_BYTES, RTS_BYTES};
pub use response::{NavExpire, SendResponse};
pub use signal::{RxEnd, RxStart, TxEnd};
pub use stats::{FlowReport, FlowStatistics};
