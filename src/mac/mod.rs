//! MAC 竞争引擎
//!
//! 802.11 DCF：载波侦听、二进制指数退避、ACK 确认与可选的 RTS/CTS 握手。

mod backoff;
mod config;
mod dcf;
mod state;
mod timer;

pub use backoff::ContentionWindow;
pub use config::MacConfig;
pub use dcf::{
    DeliveryOutcome, DeliveryReport, Mac, MacContext, MacOutput, MacStats, MediumView,
};
pub use state::{Countdown, MacState, MacStateKind};
pub use timer::{MacTimer, MacTimerFired};
