//! 无线网络
//!
//! 把节点、连通矩阵、共享信道、各节点 MAC 与业务流串起来：
//! MAC 产出要发的帧，网络据连通矩阵把信号投到各接收端，接收结果再回灌给 MAC。

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, trace, warn};

use super::channel::{Channel, MediumChange};
use super::frame::{Destination, Frame, FrameKind};
use super::id::{FlowId, NodeId, TxId};
use super::matrix::{ConnectivityMatrix, LinkLoss};
use super::node::{Node, NodeRole, NodeStats};
use super::phy::{PhyConfig, ACK_BYTES, CTS_BYTES};
use super::response::{NavExpire, SendResponse};
use super::signal::{RxEnd, RxStart, TxEnd};
use super::stats::{FlowReport, FlowStatistics};
use crate::error::{ConfigError, SchedulingError, SimError};
use crate::mac::{DeliveryOutcome, DeliveryReport, Mac, MacConfig, MacContext, MacOutput, MacStats, MacTimer};
use crate::sim::{SimTime, Simulator};
use crate::trace::{TraceLog, TraceOutcome, TraceRecord};
use crate::traffic::{Datagram, Flow, FlowConfig, FlowStart, FlowStop, FlowTick};

/// 默认随机种子
pub const DEFAULT_SEED: u64 = 1;

/// 无线网络
#[derive(Debug)]
pub struct Network {
    nodes: Vec<Node>,
    matrix: ConnectivityMatrix,
    channel: Channel,
    phy: PhyConfig,
    mac_cfg: MacConfig,
    flows: Vec<Flow>,
    pub trace: TraceLog,
    rng: ChaCha8Rng,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            matrix: ConnectivityMatrix::default(),
            channel: Channel::default(),
            phy: PhyConfig::default(),
            mac_cfg: MacConfig::default(),
            flows: Vec::new(),
            trace: TraceLog::default(),
            rng: ChaCha8Rng::seed_from_u64(DEFAULT_SEED),
        }
    }
}

impl Network {
    /// 用给定的物理层/MAC 参数与随机种子创建空网络
    pub fn new(phy: PhyConfig, mac_cfg: MacConfig, seed: u64) -> Result<Self, ConfigError> {
        phy.validate()?;
        mac_cfg.validate()?;
        Ok(Self {
            phy,
            mac_cfg,
            rng: ChaCha8Rng::seed_from_u64(seed),
            ..Self::default()
        })
    }

    /// 添加节点
    pub fn add_node(&mut self, name: impl Into<String>, role: NodeRole) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mac = Mac::new(id, self.mac_cfg.clone(), self.phy.clone());
        self.nodes.push(Node::new(id, name, role, mac));
        self.matrix.resize(self.nodes.len());
        self.channel.add_radio();
        id
    }

    fn check_node(&self, id: NodeId) -> Result<(), ConfigError> {
        if id.0 >= self.nodes.len() {
            return Err(ConfigError::UnknownNode(id.0));
        }
        Ok(())
    }

    /// 设置 a -> b 的衰减；超过接收门限的视为不可达
    pub fn set_loss(&mut self, a: NodeId, b: NodeId, attenuation_db: f64) -> Result<(), ConfigError> {
        if attenuation_db > self.phy.max_loss_db {
            trace!(from = a.0, to = b.0, attenuation_db, "衰减超过接收门限，记为不可达");
            return self.matrix.set_unreachable(a, b);
        }
        self.matrix.set_loss(a, b, attenuation_db)
    }

    pub fn set_symmetric_loss(&mut self, a: NodeId, b: NodeId, attenuation_db: f64) -> Result<(), ConfigError> {
        self.set_loss(a, b, attenuation_db)?;
        self.set_loss(b, a, attenuation_db)
    }

    pub fn set_unreachable(&mut self, a: NodeId, b: NodeId) -> Result<(), ConfigError> {
        self.matrix.set_unreachable(a, b)
    }

    /// 注册业务流并调度其起止事件
    pub fn add_flow(&mut self, cfg: FlowConfig, sim: &mut Simulator) -> Result<FlowId, SimError> {
        let id = FlowId(self.flows.len());
        cfg.validate(id.0)?;
        self.check_node(cfg.src)?;
        if let Destination::Unicast(dst) = cfg.dst {
            self.check_node(dst)?;
        }
        sim.schedule(cfg.start, FlowStart { flow: id })?;
        sim.schedule(cfg.stop, FlowStop { flow: id })?;
        info!(
            flow = id.0,
            src = cfg.src.0,
            dst = ?cfg.dst,
            payload_bytes = cfg.payload_bytes,
            rate_bps = cfg.rate_bps,
            "➕ 注册业务流"
        );
        self.flows.push(Flow::new(id, cfg));
        Ok(id)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn mac_stats(&self, id: NodeId) -> Option<&MacStats> {
        self.nodes.get(id.0).map(|n| n.mac.stats())
    }

    pub fn node_stats(&self, id: NodeId) -> Option<&NodeStats> {
        self.nodes.get(id.0).map(|n| &n.stats)
    }

    pub fn matrix(&self) -> &ConnectivityMatrix {
        &self.matrix
    }

    pub fn phy(&self) -> &PhyConfig {
        &self.phy
    }

    pub fn mac_config(&self) -> &MacConfig {
        &self.mac_cfg
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn trace(&self) -> &TraceLog {
        &self.trace
    }

    /// 当前媒介对某节点是否忙（物理载波侦听或 NAV）
    pub fn medium_busy(&self, node: NodeId, now: SimTime) -> bool {
        self.channel.medium(node, now).busy
    }

    pub fn nav_until(&self, node: NodeId) -> SimTime {
        self.channel.nav_until(node)
    }

    /// 汇总所有业务流的统计
    pub fn flow_statistics(&self) -> FlowStatistics {
        let flows = self
            .flows
            .iter()
            .map(|f| {
                let active = f.cfg.stop.saturating_sub(f.cfg.start).as_secs_f64();
                let goodput_bps = if active > 0.0 {
                    f.sink.received_bytes() as f64 * 8.0 / active
                } else {
                    0.0
                };
                FlowReport {
                    flow: f.id.0,
                    src: f.cfg.src.0,
                    dst: f.cfg.dst.node().map(|n| n.0),
                    sent: f.counters.sent,
                    received: f.sink.received(),
                    received_bytes: f.sink.received_bytes(),
                    delivery_succeeded: f.counters.delivery_succeeded,
                    delivery_failed: f.counters.delivery_failed,
                    queue_drops: f.counters.queue_drops,
                    mean_latency_ns: f.sink.mean_latency().map(|t| t.as_nanos()),
                    goodput_bps,
                }
            })
            .collect();
        FlowStatistics { flows }
    }

    /// 把一个数据报交给源节点的 MAC
    pub fn enqueue(&mut self, src: NodeId, d: Datagram, sim: &mut Simulator) -> Result<(), SimError> {
        self.check_node(src)?;
        self.with_mac(src, sim, |mac, ctx| mac.enqueue(d, ctx))
    }

    /// 以当前媒介视图调用某节点的 MAC，并执行其产出的动作
    fn with_mac<F>(&mut self, node: NodeId, sim: &mut Simulator, f: F) -> Result<(), SimError>
    where
        F: FnOnce(&mut Mac, &mut MacContext<'_>) -> Result<Vec<MacOutput>, SchedulingError>,
    {
        let now = sim.now();
        let medium = self.channel.medium(node, now);
        let outputs = {
            let mut ctx = MacContext {
                now,
                medium,
                sim: &mut *sim,
                rng: &mut self.rng,
            };
            f(&mut self.nodes[node.0].mac, &mut ctx)?
        };
        self.apply(outputs, sim)
    }

    fn apply(&mut self, outputs: Vec<MacOutput>, sim: &mut Simulator) -> Result<(), SimError> {
        for out in outputs {
            match out {
                MacOutput::Transmit(frame) => self.start_tx(frame, sim)?,
                MacOutput::Report(report) => self.on_delivery_report(report),
                MacOutput::QueueDrop(d) => {
                    if let Some(f) = self.flows.get_mut(d.flow.0) {
                        f.counters.queue_drops += 1;
                    }
                }
            }
        }
        Ok(())
    }

    /// 把一帧送上空口：信号经传播时延到达每个可达节点
    #[tracing::instrument(level = "debug", skip(self, frame, sim), fields(src = frame.src.0, kind = ?frame.kind))]
    fn start_tx(&mut self, frame: Frame, sim: &mut Simulator) -> Result<(), SimError> {
        let now = sim.now();
        let src = frame.src;
        let airtime = frame.airtime;
        let receivers: Vec<NodeId> = self.matrix.reachable_from(src).collect();
        self.nodes[src.0].stats.frames_sent += 1;

        let tx = self.channel.begin_tx(frame, receivers.len());
        let arrive = now + self.phy.prop_delay;
        for &r in &receivers {
            sim.schedule(arrive, RxStart { node: r, tx })?;
            sim.schedule(arrive + airtime, RxEnd { node: r, tx })?;
        }
        sim.schedule(now + airtime, TxEnd { node: src, tx })?;
        trace!(tx = tx.0, receivers = receivers.len(), airtime = ?airtime, "信号上空口");

        self.refresh_medium(src, sim)
    }

    /// 重新评估节点的载波侦听结果，把忙闲翻转通知 MAC
    fn refresh_medium(&mut self, node: NodeId, sim: &mut Simulator) -> Result<(), SimError> {
        match self.channel.refresh(node, sim.now()) {
            Some(MediumChange::BecameBusy) => self.with_mac(node, sim, |mac, ctx| {
                mac.on_medium_busy(ctx);
                Ok(Vec::new())
            }),
            Some(MediumChange::BecameIdle) => {
                self.with_mac(node, sim, |mac, ctx| mac.on_medium_idle(ctx).map(|()| Vec::new()))
            }
            None => Ok(()),
        }
    }

    fn record(&mut self, frame: &Frame, end: SimTime, receiver: Option<NodeId>, outcome: TraceOutcome) {
        let sender = &mut self.nodes[frame.src.0].stats;
        match outcome {
            TraceOutcome::Succeeded => sender.tx_succeeded += 1,
            TraceOutcome::Collided | TraceOutcome::Unreachable => sender.tx_failed += 1,
        }
        self.trace.push(TraceRecord {
            t_ns: end.saturating_sub(frame.airtime).as_nanos(),
            end_ns: end.as_nanos(),
            sender: frame.src.0,
            receiver: receiver.map(|r| r.0),
            kind: frame.kind,
            bytes: frame.size_bytes,
            outcome,
            retry: frame.retry,
        });
    }

    pub(crate) fn on_rx_start(&mut self, node: NodeId, tx: TxId, sim: &mut Simulator) -> Result<(), SimError> {
        self.channel.signal_arrives(node, tx);
        self.refresh_medium(node, sim)
    }

    #[tracing::instrument(level = "trace", skip(self, sim), fields(node = node.0, tx = tx.0))]
    pub(crate) fn on_rx_end(&mut self, node: NodeId, tx: TxId, sim: &mut Simulator) -> Result<(), SimError> {
        let Some(rx) = self.channel.signal_departs(node, tx) else {
            warn!(node = node.0, tx = tx.0, "未知信号结束");
            return Ok(());
        };
        let now = sim.now();
        let frame = rx.frame;

        if frame.is_for(node) || frame.dst == Destination::Broadcast {
            // 记录时刻以发送端视角为准
            let end = now.saturating_sub(self.phy.prop_delay);
            let outcome = if rx.decoded {
                self.nodes[node.0].stats.rx_decoded += 1;
                TraceOutcome::Succeeded
            } else {
                self.nodes[node.0].stats.rx_collided += 1;
                TraceOutcome::Collided
            };
            self.record(&frame, end, Some(node), outcome);
        }

        if rx.decoded && !frame.is_for(node) && frame.nav > SimTime::ZERO {
            let until = now + frame.nav;
            if self.channel.extend_nav(node, until) {
                trace!(node = node.0, from = frame.src.0, until = ?until, "设置 NAV");
                sim.schedule(until, NavExpire { node })?;
            }
        }
        self.refresh_medium(node, sim)?;

        if rx.decoded {
            self.on_frame_decoded(node, frame, sim)?;
        }
        Ok(())
    }

    fn on_frame_decoded(&mut self, node: NodeId, frame: Frame, sim: &mut Simulator) -> Result<(), SimError> {
        let now = sim.now();
        match frame.kind {
            FrameKind::Data => {
                let unicast = frame.is_for(node);
                if !unicast && frame.dst != Destination::Broadcast {
                    return Ok(());
                }
                if unicast {
                    let ack = Frame::control(
                        FrameKind::Ack,
                        node,
                        frame.src,
                        ACK_BYTES,
                        self.phy.ack_airtime(),
                        SimTime::ZERO,
                    );
                    sim.schedule(now + self.phy.sifs, SendResponse { frame: ack })?;
                    if self.nodes[node.0].is_duplicate(frame.src, frame.seq, frame.retry) {
                        self.nodes[node.0].stats.duplicates += 1;
                        debug!(node = node.0, from = frame.src.0, seq = frame.seq, "重复数据帧，只回 ACK");
                        return Ok(());
                    }
                }
                if let Some(d) = frame.payload {
                    self.deliver(node, d, now);
                }
                Ok(())
            }
            FrameKind::Rts => {
                if !frame.is_for(node) {
                    return Ok(());
                }
                if self.channel.nav_until(node) > now {
                    debug!(node = node.0, from = frame.src.0, "NAV 未到期，不回 CTS");
                    return Ok(());
                }
                let cts_airtime = self.phy.cts_airtime();
                let nav = frame.nav.saturating_sub(self.phy.sifs + cts_airtime);
                let cts = Frame::control(FrameKind::Cts, node, frame.src, CTS_BYTES, cts_airtime, nav);
                sim.schedule(now + self.phy.sifs, SendResponse { frame: cts })?;
                Ok(())
            }
            FrameKind::Cts | FrameKind::Ack => {
                if !frame.is_for(node) {
                    return Ok(());
                }
                self.with_mac(node, sim, |mac, ctx| mac.on_response(&frame, ctx))
            }
        }
    }

    fn deliver(&mut self, node: NodeId, d: Datagram, now: SimTime) {
        let Some(flow) = self.flows.get_mut(d.flow.0) else {
            warn!(flow = d.flow.0, "未知业务流的数据报");
            return;
        };
        trace!(node = node.0, flow = d.flow.0, seq = d.seq, "📥 数据报送达");
        flow.sink.on_receive(&d, now);
    }

    pub(crate) fn on_send_response(&mut self, frame: Frame, sim: &mut Simulator) -> Result<(), SimError> {
        if self.channel.is_transmitting(frame.src) {
            debug!(node = frame.src.0, kind = ?frame.kind, "正在发送，放弃响应帧");
            return Ok(());
        }
        self.start_tx(frame, sim)
    }

    pub(crate) fn on_tx_end(&mut self, node: NodeId, tx: TxId, sim: &mut Simulator) -> Result<(), SimError> {
        let Some(frame) = self.channel.end_tx(node, tx) else {
            warn!(node = node.0, tx = tx.0, "未知传输结束");
            return Ok(());
        };
        let now = sim.now();
        match frame.dst {
            Destination::Unicast(dst) => {
                if self.matrix.query(node, dst) == LinkLoss::Unreachable {
                    self.record(&frame, now, Some(dst), TraceOutcome::Unreachable);
                }
            }
            Destination::Broadcast => {
                if self.matrix.reachable_from(node).next().is_none() {
                    self.record(&frame, now, None, TraceOutcome::Unreachable);
                }
            }
        }
        self.refresh_medium(node, sim)?;

        let kind = frame.kind;
        if matches!(kind, FrameKind::Data | FrameKind::Rts) {
            self.with_mac(node, sim, |mac, ctx| mac.on_tx_end(kind, ctx))?;
        }
        Ok(())
    }

    pub(crate) fn on_nav_expire(&mut self, node: NodeId, sim: &mut Simulator) -> Result<(), SimError> {
        self.refresh_medium(node, sim)
    }

    pub(crate) fn on_mac_timer(&mut self, node: NodeId, timer: MacTimer, sim: &mut Simulator) -> Result<(), SimError> {
        self.with_mac(node, sim, |mac, ctx| mac.on_timer(timer, ctx))
    }

    fn on_delivery_report(&mut self, report: DeliveryReport) {
        let Some(flow) = self.flows.get_mut(report.datagram.flow.0) else {
            return;
        };
        match report.outcome {
            DeliveryOutcome::Succeeded => flow.counters.delivery_succeeded += 1,
            DeliveryOutcome::Failed => {
                flow.counters.delivery_failed += 1;
                info!(
                    flow = flow.id.0,
                    seq = report.datagram.seq,
                    attempts = report.attempts,
                    "❌ DeliveryFailed"
                );
            }
        }
    }

    pub(crate) fn on_flow_start(&mut self, id: FlowId, sim: &mut Simulator) -> Result<(), SimError> {
        let Some(flow) = self.flows.get_mut(id.0) else {
            return Err(ConfigError::InvalidFlow {
                flow: id.0,
                reason: "flow is not registered",
            }
            .into());
        };
        flow.activate();
        debug!(flow = id.0, "▶️  业务流开始");
        if let Some(first) = flow.first_send() {
            sim.schedule(first, FlowTick { flow: id })?;
        }
        Ok(())
    }

    pub(crate) fn on_flow_tick(&mut self, id: FlowId, sim: &mut Simulator) -> Result<(), SimError> {
        let now = sim.now();
        let Some(flow) = self.flows.get_mut(id.0) else {
            return Ok(());
        };
        if !flow.is_active() || now >= flow.cfg.stop {
            return Ok(());
        }
        let d = flow.make_datagram(now);
        let src = flow.cfg.src;
        if let Some(next) = flow.next_send_after(now) {
            sim.schedule(next, FlowTick { flow: id })?;
        }
        self.enqueue(src, d, sim)
    }

    pub(crate) fn on_flow_stop(&mut self, id: FlowId) {
        if let Some(flow) = self.flows.get_mut(id.0) {
            flow.deactivate();
            debug!(flow = id.0, sent = flow.counters.sent, "⏹️  业务流停止");
        }
    }
}
