//! The per-(port, vc) input queue pipeline: buffer → RFE (routing
//! algorithm execution) → VCA (VC allocation) → SWA (switch allocation) →
//! crossbar traversal. Grounded on
//! `router/inputoutputqueued/InputQueue.h`'s exact pipeline-register layout
//! (`rfe_`/`vca_`/`swa_` structs, each carrying an `ePipelineFsm` plus the
//! stage's working flit and results) — the state machine below reuses that
//! shape directly, advanced a stage at a time by the owning router rather
//! than through per-stage scheduled events, since `Router` already drives
//! one call per cycle into each of its input queues.

use crate::flit::Flit;
use crate::routing::Response;
use std::collections::VecDeque;

/// A pipeline register's occupancy state, shared by all three stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Empty,
    WaitingToRequest,
    WaitingForResponse,
    ReadyToAdvance,
}

#[derive(Debug, Default)]
struct RfeRegister {
    fsm: Option<PipelineStage>,
    flit: Option<Flit>,
    route: Option<Response>,
}

#[derive(Debug, Default)]
struct VcaRegister {
    fsm: Option<PipelineStage>,
    flit: Option<Flit>,
    route: Option<Response>,
    allocated_port: Option<u32>,
    allocated_vc: Option<u32>,
}

#[derive(Debug, Default)]
struct SwaRegister {
    fsm: Option<PipelineStage>,
    flit: Option<Flit>,
    allocated_port: Option<u32>,
    allocated_vc: Option<u32>,
}

/// Stalls VCA until SWA is empty, mirroring `_vcaSwaWait` in the original —
/// trades throughput for a simpler, more predictable pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputQueueConfig {
    pub depth: u32,
    pub vca_swa_wait: bool,
}

pub struct InputQueue {
    pub port: u32,
    pub vc: u32,
    config: InputQueueConfig,
    buffer: VecDeque<Flit>,
    rfe: RfeRegister,
    vca: VcaRegister,
    swa: SwaRegister,
    last_receive: Option<crate::time::VTime>,
    /// The output `(port, vc)` granted to this packet's head flit, held
    /// across its body/tail flits until the tail is taken for crossbar
    /// traversal (spec §4.6: "a packet's VC may change only between
    /// routers, never within").
    held_route: Option<(u32, u32)>,
    /// Count of buffer slots vacated this cycle, awaiting drain into an
    /// upstream credit return (spec §4.7's `incrementCredit`).
    freed_this_cycle: u32,
}

impl InputQueue {
    pub fn new(port: u32, vc: u32, config: InputQueueConfig) -> Self {
        InputQueue {
            port,
            vc,
            config,
            buffer: VecDeque::new(),
            rfe: RfeRegister::default(),
            vca: VcaRegister::default(),
            swa: SwaRegister::default(),
            last_receive: None,
            held_route: None,
            freed_this_cycle: 0,
        }
    }

    /// Drain the count of buffer slots vacated since the last call, for the
    /// router to turn into outbound credit packets.
    pub fn take_freed_credits(&mut self) -> u32 {
        let n = self.freed_this_cycle;
        self.freed_this_cycle = 0;
        n
    }

    /// Buffer a newly arrived flit. Enforces the single-flit-per-cycle
    /// assurance and the configured buffer depth.
    pub fn receive_flit(&mut self, flit: Flit, now: crate::time::VTime) -> Result<(), &'static str> {
        if self.last_receive == Some(now) {
            return Err("more than one flit received this cycle");
        }
        if self.buffer.len() as u32 >= self.config.depth {
            return Err("input queue buffer overflow");
        }
        self.last_receive = Some(now);
        self.buffer.push_back(flit);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty() && self.rfe.flit.is_none() && self.vca.flit.is_none() && self.swa.flit.is_none()
    }

    /// RFE: pull the head-of-line flit into the routing stage if RFE is
    /// free and a head flit is waiting. Body/tail flits never enter RFE —
    /// they inherit the head's route, see [`Self::try_advance_body_to_swa`].
    pub fn try_start_rfe(&mut self) -> Option<&Flit> {
        if self.rfe.flit.is_none() && matches!(self.buffer.front(), Some(f) if f.is_head) {
            let flit = self.buffer.pop_front().unwrap();
            self.rfe.flit = Some(flit);
            self.rfe.fsm = Some(PipelineStage::WaitingForResponse);
            self.freed_this_cycle += 1;
        }
        self.rfe.flit.as_ref()
    }

    /// Body/tail flits bypass RFE and VCA entirely, inheriting the packet's
    /// held `(port, vc)` from the head's grant and entering SWA directly
    /// once it is free. Returns whether a flit advanced.
    pub fn try_advance_body_to_swa(&mut self) -> bool {
        if self.swa.flit.is_some() {
            return false;
        }
        let is_body = matches!(self.buffer.front(), Some(f) if !f.is_head);
        if !is_body {
            return false;
        }
        let Some((port, vc)) = self.held_route else {
            return false;
        };
        let flit = self.buffer.pop_front().unwrap();
        self.swa.flit = Some(flit);
        self.swa.allocated_port = Some(port);
        self.swa.allocated_vc = Some(vc);
        self.swa.fsm = Some(PipelineStage::WaitingToRequest);
        self.freed_this_cycle += 1;
        true
    }

    /// Feed the routing algorithm's response back into RFE, marking it
    /// ready to advance into VCA.
    pub fn complete_rfe(&mut self, response: Response) {
        self.rfe.route = Some(response);
        self.rfe.fsm = Some(PipelineStage::ReadyToAdvance);
    }

    /// Move a completed RFE result into VCA if VCA is free.
    pub fn advance_rfe_to_vca(&mut self) -> bool {
        if self.rfe.fsm != Some(PipelineStage::ReadyToAdvance) || self.vca.flit.is_some() {
            return false;
        }
        if self.config.vca_swa_wait && self.swa.flit.is_some() {
            return false;
        }
        self.vca.flit = self.rfe.flit.take();
        self.vca.route = self.rfe.route.take();
        self.vca.fsm = Some(PipelineStage::WaitingToRequest);
        self.rfe.fsm = None;
        true
    }

    pub fn vca_candidates(&self) -> Option<&Response> {
        if self.vca.fsm == Some(PipelineStage::WaitingToRequest) {
            self.vca.route.as_ref()
        } else {
            None
        }
    }

    /// Record the output `(port, vc)` the VC scheduler granted this
    /// packet's head flit, held for the lifetime of the packet.
    pub fn complete_vca(&mut self, port: u32, vc: u32) {
        self.held_route = Some((port, vc));
        self.vca.allocated_port = Some(port);
        self.vca.allocated_vc = Some(vc);
        self.vca.fsm = Some(PipelineStage::ReadyToAdvance);
    }

    pub fn advance_vca_to_swa(&mut self) -> bool {
        if self.vca.fsm != Some(PipelineStage::ReadyToAdvance) || self.swa.flit.is_some() {
            return false;
        }
        self.swa.flit = self.vca.flit.take();
        self.swa.allocated_port = self.vca.allocated_port.take();
        self.swa.allocated_vc = self.vca.allocated_vc.take();
        self.swa.fsm = Some(PipelineStage::WaitingToRequest);
        self.vca.route = None;
        self.vca.fsm = None;
        true
    }

    /// `(port, vc, is_tail)` of the flit waiting for a crossbar grant, `vc`
    /// being the held output vc the caller needs to key credit checks by.
    pub fn swa_request(&self) -> Option<(u32, u32, bool)> {
        if self.swa.fsm == Some(PipelineStage::WaitingToRequest) {
            let is_tail = self.swa.flit.as_ref().map(|f| f.is_tail).unwrap_or(false);
            let port = self.swa.allocated_port?;
            let vc = self.swa.allocated_vc?;
            Some((port, vc, is_tail))
        } else {
            None
        }
    }

    /// Grant received: take the flit out for crossbar traversal. Releasing
    /// the held output vc on the tail flit is the caller's job (it must
    /// also tell the VC scheduler), signalled by the flit's own `is_tail`.
    pub fn take_granted_flit(&mut self) -> Option<(Flit, u32, u32)> {
        if self.swa.fsm != Some(PipelineStage::WaitingToRequest) {
            return None;
        }
        let flit = self.swa.flit.take()?;
        let port = self.swa.allocated_port.take().unwrap();
        let vc = self.swa.allocated_vc.take().unwrap();
        self.swa.fsm = None;
        if flit.is_tail {
            self.held_route = None;
        }
        Some((flit, port, vc))
    }
}
