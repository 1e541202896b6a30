//! DCF 竞争引擎（CSMA/CA，可选 RTS/CTS）
//!
//! 每个节点一个状态机实例，只由本节点的信道事件和定时器驱动：
//!
//! ```text
//! Idle --帧就绪, 媒介空闲≥DIFS--> Transmitting | WaitingCts
//! Idle --帧就绪, 否则----------> BackingOff
//! BackingOff --计数归零-------> Transmitting | WaitingCts
//! WaitingCts --CTS----------> Transmitting (SIFS 后发数据)
//! Transmitting --发完(单播)---> WaitingAck
//! WaitingAck --ACK----------> Idle
//! WaitingCts/WaitingAck --超时--> BackingOff (窗口翻倍) | Idle (重传耗尽, 丢弃)
//! ```
//!
//! 状态机不直接操作信道：需要发送的帧和上报给业务层的结果以 [`MacOutput`] 返回，
//! 由网络层执行。等待一律表示为可撤销的定时器事件。

use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use super::backoff::ContentionWindow;
use super::config::MacConfig;
use super::state::{Countdown, MacState, MacStateKind};
use super::timer::{MacTimer, MacTimerFired};
use crate::error::SchedulingError;
use crate::net::{Destination, Frame, FrameKind, NodeId, PhyConfig, RTS_BYTES};
use crate::queue::{DatagramQueue, DropTailQueue};
use crate::sim::{SimTime, Simulator};
use crate::traffic::Datagram;

/// MAC 看到的媒介状态（物理载波侦听 + NAV）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MediumView {
    pub busy: bool,
    /// 最近一次由忙转闲的时刻
    pub idle_since: SimTime,
}

impl MediumView {
    pub fn idle_since(t: SimTime) -> Self {
        Self {
            busy: false,
            idle_since: t,
        }
    }

    pub fn busy() -> Self {
        Self {
            busy: true,
            idle_since: SimTime::ZERO,
        }
    }
}

/// 一次 MAC 调用所需的外部环境
pub struct MacContext<'a> {
    pub now: SimTime,
    pub medium: MediumView,
    pub sim: &'a mut Simulator,
    pub rng: &'a mut ChaCha8Rng,
}

/// 数据报最终投递结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Succeeded,
    /// 重传耗尽，数据报被丢弃
    Failed,
}

#[derive(Debug, Clone)]
pub struct DeliveryReport {
    pub datagram: Datagram,
    pub outcome: DeliveryOutcome,
    pub attempts: u32,
}

/// 状态机交给网络层执行的动作
#[derive(Debug, Clone)]
pub enum MacOutput {
    /// 立即把该帧送上空口
    Transmit(Frame),
    /// 向业务层上报投递结果
    Report(DeliveryReport),
    /// 接口队列已满，数据报被尾丢弃
    QueueDrop(Datagram),
}

/// MAC 统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacStats {
    /// 发出的数据帧或 RTS（每次尝试计一次）
    pub attempts: u64,
    pub successes: u64,
    /// 超时（CTS 或 ACK 未收到）次数
    pub failed_attempts: u64,
    /// 重传耗尽而丢弃的数据报
    pub drops: u64,
    pub queue_drops: u64,
    pub rts_sent: u64,
    /// 达到过的最大竞争窗口
    pub max_cw: u32,
}

#[derive(Debug, Clone)]
struct Pending {
    datagram: Datagram,
    seq: u16,
    attempts: u32,
}

#[derive(Debug)]
pub struct Mac {
    node: NodeId,
    cfg: MacConfig,
    phy: PhyConfig,
    state: MacState,
    queue: DropTailQueue,
    pending: Option<Pending>,
    cw: ContentionWindow,
    retries: u32,
    next_seq: u16,
    stats: MacStats,
}

impl Mac {
    pub fn new(node: NodeId, cfg: MacConfig, phy: PhyConfig) -> Self {
        let cw = ContentionWindow::new(cfg.cw_min, cfg.cw_max);
        let queue = DropTailQueue::new(cfg.queue_pkts);
        let stats = MacStats {
            max_cw: cw.current(),
            ..MacStats::default()
        };
        Self {
            node,
            cfg,
            phy,
            state: MacState::Idle,
            queue,
            pending: None,
            cw,
            retries: 0,
            next_seq: 0,
            stats,
        }
    }

    pub fn state(&self) -> &MacState {
        &self.state
    }

    pub fn state_kind(&self) -> MacStateKind {
        self.state.kind()
    }

    pub fn contention_window(&self) -> u32 {
        self.cw.current()
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    pub fn stats(&self) -> &MacStats {
        &self.stats
    }

    pub fn config(&self) -> &MacConfig {
        &self.cfg
    }

    /// 排队中的数据报个数（不含正在处理的那个）
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 上层交来一个数据报
    #[tracing::instrument(level = "debug", skip(self, d, ctx), fields(node = self.node.0, flow = d.flow.0, seq = d.seq))]
    pub fn enqueue(&mut self, d: Datagram, ctx: &mut MacContext<'_>) -> Result<Vec<MacOutput>, SchedulingError> {
        let mut out = Vec::new();
        if let Err(d) = self.queue.enqueue(d) {
            self.stats.queue_drops += 1;
            debug!(queue_len = self.queue.len(), "接口队列已满，尾丢弃");
            out.push(MacOutput::QueueDrop(d));
            return Ok(out);
        }
        if self.state == MacState::Idle {
            self.try_start(ctx, &mut out)?;
        }
        Ok(out)
    }

    /// 确保有待发帧；队列为空时返回 false
    fn load_next(&mut self) -> bool {
        if self.pending.is_some() {
            return true;
        }
        let Some(datagram) = self.queue.dequeue() else {
            return false;
        };
        self.pending = Some(Pending {
            datagram,
            seq: self.next_seq,
            attempts: 0,
        });
        self.next_seq = (self.next_seq + 1) & 0x0fff;
        true
    }

    /// Idle 状态下取下一个帧并决定立即发送还是退避
    fn try_start(&mut self, ctx: &mut MacContext<'_>, out: &mut Vec<MacOutput>) -> Result<(), SchedulingError> {
        if !self.load_next() {
            self.state = MacState::Idle;
            return Ok(());
        }

        let idle_enough = !ctx.medium.busy && ctx.medium.idle_since + self.phy.difs() <= ctx.now;
        if idle_enough {
            trace!(node = self.node.0, "媒介空闲已超过 DIFS，直接发送");
            self.transmit_pending(out);
            Ok(())
        } else {
            self.start_backoff(ctx)
        }
    }

    fn start_backoff(&mut self, ctx: &mut MacContext<'_>) -> Result<(), SchedulingError> {
        let slots = self.cw.draw(ctx.rng);
        debug!(node = self.node.0, slots, cw = self.cw.current(), "进入退避");
        self.state = MacState::BackingOff {
            slots,
            countdown: None,
        };
        if !ctx.medium.busy {
            self.resume_countdown(ctx)?;
        }
        Ok(())
    }

    /// 媒介空闲：从 idle_since + DIFS 开始逐时隙倒数
    fn resume_countdown(&mut self, ctx: &mut MacContext<'_>) -> Result<(), SchedulingError> {
        let MacState::BackingOff { slots, countdown } = &mut self.state else {
            return Ok(());
        };
        if countdown.is_some() {
            return Ok(());
        }
        let resume_at = (ctx.medium.idle_since + self.phy.difs()).max(ctx.now);
        let fire_at = resume_at + self.phy.slot.times(*slots as u64);
        let timer = ctx.sim.schedule(
            fire_at,
            MacTimerFired {
                node: self.node,
                timer: MacTimer::Backoff,
            },
        )?;
        trace!(node = self.node.0, slots = *slots, resume_at = ?resume_at, fire_at = ?fire_at, "退避倒计时开始");
        *countdown = Some(Countdown { resume_at, timer });
        Ok(())
    }

    /// 媒介变忙：挂起倒计时，保留剩余时隙
    pub fn on_medium_busy(&mut self, ctx: &mut MacContext<'_>) {
        let MacState::BackingOff { slots, countdown } = &mut self.state else {
            return;
        };
        let Some(c) = countdown.take() else {
            return;
        };
        ctx.sim.cancel(c.timer);
        let slot = self.phy.slot.as_nanos().max(1);
        let elapsed = ctx.now.saturating_sub(c.resume_at).as_nanos() / slot;
        *slots = slots.saturating_sub(elapsed.min(u32::MAX as u64) as u32);
        trace!(node = self.node.0, remaining = *slots, "媒介变忙，冻结退避计数");
    }

    /// 媒介变闲：若在退避中则恢复倒计时
    pub fn on_medium_idle(&mut self, ctx: &mut MacContext<'_>) -> Result<(), SchedulingError> {
        if matches!(self.state, MacState::BackingOff { .. }) && !ctx.medium.busy {
            self.resume_countdown(ctx)?;
        }
        Ok(())
    }

    fn data_frame(&self, p: &Pending) -> Frame {
        let payload = p.datagram.size_bytes;
        let nav = match p.datagram.dst {
            Destination::Unicast(_) => self.phy.sifs + self.phy.ack_airtime(),
            Destination::Broadcast => SimTime::ZERO,
        };
        Frame {
            kind: FrameKind::Data,
            src: self.node,
            dst: p.datagram.dst,
            size_bytes: self.phy.data_frame_bytes(payload),
            airtime: self.phy.data_airtime(payload),
            nav,
            seq: p.seq,
            retry: p.attempts > 1,
            payload: Some(p.datagram.clone()),
        }
    }

    fn rts_frame(&self, p: &Pending, dst: NodeId) -> Frame {
        let phy = &self.phy;
        let nav = phy.sifs.times(3)
            + phy.cts_airtime()
            + phy.data_airtime(p.datagram.size_bytes)
            + phy.ack_airtime();
        let mut f = Frame::control(FrameKind::Rts, self.node, dst, RTS_BYTES, phy.rts_airtime(), nav);
        f.seq = p.seq;
        f.retry = p.attempts > 1;
        f
    }

    /// 赢得信道：发 RTS（需要时）或直接发数据帧
    fn transmit_pending(&mut self, out: &mut Vec<MacOutput>) {
        let Some(p) = self.pending.as_mut() else {
            warn!(node = self.node.0, "没有待发帧却赢得了信道");
            self.state = MacState::Idle;
            return;
        };
        p.attempts += 1;
        self.stats.attempts += 1;
        let p = p.clone();

        let rts_dst = match p.datagram.dst {
            Destination::Unicast(dst) if self.cfg.uses_rts(p.datagram.size_bytes) => Some(dst),
            _ => None,
        };
        let frame = match rts_dst {
            Some(dst) => {
                self.stats.rts_sent += 1;
                self.state = MacState::WaitingCts { timeout: None };
                self.rts_frame(&p, dst)
            }
            None => {
                self.state = MacState::Transmitting { sifs_timer: None };
                self.data_frame(&p)
            }
        };
        debug!(
            node = self.node.0,
            kind = ?frame.kind,
            seq = p.seq,
            attempt = p.attempts,
            "📡 发送"
        );
        out.push(MacOutput::Transmit(frame));
    }

    /// 本节点一帧发送完毕
    pub fn on_tx_end(&mut self, kind: FrameKind, ctx: &mut MacContext<'_>) -> Result<Vec<MacOutput>, SchedulingError> {
        let mut out = Vec::new();
        match (kind, &self.state) {
            (FrameKind::Rts, MacState::WaitingCts { timeout: None }) => {
                let at = ctx.now + self.phy.response_timeout(self.phy.cts_airtime());
                let timeout = ctx.sim.schedule(
                    at,
                    MacTimerFired {
                        node: self.node,
                        timer: MacTimer::CtsTimeout,
                    },
                )?;
                self.state = MacState::WaitingCts {
                    timeout: Some(timeout),
                };
            }
            (FrameKind::Data, MacState::Transmitting { sifs_timer: None }) => {
                let unicast = self
                    .pending
                    .as_ref()
                    .map(|p| matches!(p.datagram.dst, Destination::Unicast(_)))
                    .unwrap_or(false);
                if unicast {
                    let at = ctx.now + self.phy.response_timeout(self.phy.ack_airtime());
                    let timeout = ctx.sim.schedule(
                        at,
                        MacTimerFired {
                            node: self.node,
                            timer: MacTimer::AckTimeout,
                        },
                    )?;
                    self.state = MacState::WaitingAck {
                        timeout: Some(timeout),
                    };
                } else {
                    self.complete(DeliveryOutcome::Succeeded, ctx, &mut out)?;
                }
            }
            // CTS/ACK 是响应帧，不经过状态机
            _ => {}
        }
        Ok(out)
    }

    /// 收到发给本节点的 CTS 或 ACK
    pub fn on_response(&mut self, frame: &Frame, ctx: &mut MacContext<'_>) -> Result<Vec<MacOutput>, SchedulingError> {
        let mut out = Vec::new();
        let peer = self.pending.as_ref().and_then(|p| p.datagram.dst.node());
        if peer != Some(frame.src) {
            trace!(node = self.node.0, from = frame.src.0, "响应帧与待发帧不匹配，忽略");
            return Ok(out);
        }
        match (frame.kind, &self.state) {
            (FrameKind::Cts, MacState::WaitingCts { timeout: Some(t) }) => {
                ctx.sim.cancel(*t);
                let sifs_timer = ctx.sim.schedule(
                    ctx.now + self.phy.sifs,
                    MacTimerFired {
                        node: self.node,
                        timer: MacTimer::SendData,
                    },
                )?;
                trace!(node = self.node.0, "收到 CTS，SIFS 后发送数据");
                self.state = MacState::Transmitting {
                    sifs_timer: Some(sifs_timer),
                };
            }
            (FrameKind::Ack, MacState::WaitingAck { timeout: Some(t) }) => {
                ctx.sim.cancel(*t);
                self.complete(DeliveryOutcome::Succeeded, ctx, &mut out)?;
            }
            _ => {}
        }
        Ok(out)
    }

    /// 定时器到期
    pub fn on_timer(&mut self, timer: MacTimer, ctx: &mut MacContext<'_>) -> Result<Vec<MacOutput>, SchedulingError> {
        let mut out = Vec::new();
        match (timer, &self.state) {
            (MacTimer::Backoff, MacState::BackingOff { countdown: Some(_), .. }) => {
                self.transmit_pending(&mut out);
            }
            (MacTimer::SendData, MacState::Transmitting { sifs_timer: Some(_) }) => {
                self.state = MacState::Transmitting { sifs_timer: None };
                if let Some(p) = self.pending.as_ref() {
                    out.push(MacOutput::Transmit(self.data_frame(p)));
                }
            }
            (MacTimer::CtsTimeout, MacState::WaitingCts { timeout: Some(_) })
            | (MacTimer::AckTimeout, MacState::WaitingAck { timeout: Some(_) }) => {
                debug!(node = self.node.0, ?timer, "⏱️  响应超时");
                self.on_attempt_failed(ctx, &mut out)?;
            }
            _ => {
                trace!(node = self.node.0, ?timer, state = ?self.state.kind(), "过期定时器，忽略");
            }
        }
        Ok(out)
    }

    fn on_attempt_failed(&mut self, ctx: &mut MacContext<'_>, out: &mut Vec<MacOutput>) -> Result<(), SchedulingError> {
        self.retries += 1;
        self.stats.failed_attempts += 1;
        if self.retries > self.cfg.max_retries {
            self.stats.drops += 1;
            info!(node = self.node.0, retries = self.retries, "❌ 重传耗尽，丢弃数据报");
            return self.complete(DeliveryOutcome::Failed, ctx, out);
        }
        self.cw.grow();
        self.stats.max_cw = self.stats.max_cw.max(self.cw.current());
        self.start_backoff(ctx)
    }

    /// 当前数据报处理结束（成功或丢弃），回到 Idle 并尝试下一个
    fn complete(&mut self, outcome: DeliveryOutcome, ctx: &mut MacContext<'_>, out: &mut Vec<MacOutput>) -> Result<(), SchedulingError> {
        if let Some(p) = self.pending.take() {
            if outcome == DeliveryOutcome::Succeeded {
                self.stats.successes += 1;
            }
            out.push(MacOutput::Report(DeliveryReport {
                datagram: p.datagram,
                outcome,
                attempts: p.attempts,
            }));
        }
        self.cw.reset();
        self.retries = 0;
        self.state = MacState::Idle;
        if outcome == DeliveryOutcome::Failed {
            // 失败的交换之后，下一帧总是先随机退避
            if self.load_next() {
                return self.start_backoff(ctx);
            }
            return Ok(());
        }
        self.try_start(ctx, out)
    }
}
