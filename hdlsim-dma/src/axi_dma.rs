//! AXI DMA.
//!
//! Moves a stream of `len_beats` beats into memory starting at a base address, and streams `len_beats` beats out of
//! memory, splitting each transfer into bursts of at most `burst_len` beats. The two directions are independent.

use hdlsim_macro::Signal;

use crate::constants::axi_dma::QOS_WIDTH;
use crate::*;

/// Transfer request.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct DmaRequest {
    /// Starts a transfer. Held until acknowledged.
    pub start: bool,
    /// Base address.
    pub addr: u64,
    /// Transfer length in beats. Zero is treated as one beat.
    pub len_beats: u32,
    /// Quality of service of the issued bursts. Only the low `QOS_WIDTH` bits are used.
    pub qos: u8,
}

impl DmaRequest {
    /// Creates a start request.
    pub fn start(addr: u64, len_beats: u32) -> Self { Self { start: true, addr, len_beats, qos: 0 } }
}

/// AXI DMA inputs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiDmaInput {
    /// Write (stream to memory) request.
    pub wr: DmaRequest,
    /// Read (memory to stream) request.
    pub rd: DmaRequest,
    /// Stream sink.
    pub s_axis: AxisValid<AxisBeat>,
    /// Stream source.
    pub m_axis: AxisReady,
    /// Signals driven by the AXI slave.
    pub m_axi: AxiSlave,
    /// Clears the sticky protocol error.
    pub protocol_error_clear: bool,
}

/// AXI DMA outputs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiDmaOutput {
    /// The write request is accepted in this cycle.
    pub wr_ack: bool,
    /// One-cycle pulse after the last beat of a write transfer was accepted.
    pub wr_finish: bool,
    /// The read request is accepted in this cycle.
    pub rd_ack: bool,
    /// One-cycle pulse after the last beat of a read transfer was delivered.
    pub rd_finish: bool,
    /// Stream sink.
    pub s_axis: AxisReady,
    /// Stream source.
    pub m_axis: AxisValid<AxisBeat>,
    /// Signals driven to the AXI slave.
    pub m_axi: AxiMaster,
    /// Sticky protocol error.
    pub protocol_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
enum WrPhase {
    Reset,
    Prepare,
    BurstStarted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
enum RdPhase {
    Reset,
    Prepare,
    BurstStarted,
    /// Drains the current burst after the transfer delivered its final beat.
    WaitLast,
}

#[derive(Debug, Clone, Signal)]
struct TransferState<P: Signal> {
    phase: P,
    addr: u64,
    qos: u8,
    /// Byte offset of the next burst.
    offset: u64,
    /// Beats left in the transfer, minus one.
    remaining: u32,
    finish: bool,
}

impl<P: Signal> TransferState<P> {
    fn new(phase: P) -> Self { Self { phase, addr: 0, qos: 0, offset: 0, remaining: 0, finish: false } }
}

#[derive(Debug, Clone, Copy)]
struct DmaParams {
    burst_len: u32,
    burst_bytes: u64,
}

impl DmaParams {
    /// Burst covering at most `remaining + 1` beats.
    fn burst(&self, addr: u64, remaining: u32, qos: u8) -> BurstRequest {
        BurstRequest { addr, burst: (self.burst_len - 1).min(remaining) as u8, qos: qos & mask(QOS_WIDTH) as u8 }
    }
}

#[derive(Debug, Clone)]
struct WrInput {
    req: DmaRequest,
    s_axis: AxisValid<AxisBeat>,
    exec: BurstStatus,
}

#[derive(Debug, Default, Clone)]
struct WrOutput {
    ack: bool,
    finish: bool,
    s_axis: AxisReady,
    burst: Valid<BurstRequest>,
    sink: AxisValid<AxisBeat>,
}

fn wr_step(params: &DmaParams, input: &WrInput, s: &TransferState<WrPhase>) -> (WrOutput, TransferState<WrPhase>) {
    let mut output = WrOutput { finish: s.finish, ..Default::default() };
    let mut next = TransferState { finish: false, ..s.clone() };

    match s.phase {
        WrPhase::Reset => next.phase = WrPhase::Prepare,
        WrPhase::Prepare => {
            let remaining = input.req.len_beats.saturating_sub(1);
            output.burst = Valid::new(input.req.start, params.burst(input.req.addr, remaining, input.req.qos));
            output.ack = input.req.start & input.exec.wr_ready;
            if output.ack {
                next = TransferState {
                    phase: WrPhase::BurstStarted,
                    addr: input.req.addr,
                    qos: input.req.qos,
                    offset: params.burst_bytes,
                    remaining,
                    finish: false,
                };
            }
        }
        WrPhase::BurstStarted => {
            if input.exec.wr_idle {
                // Between bursts: launches the next one.
                output.burst = Valid::valid(params.burst(s.addr.wrapping_add(s.offset), s.remaining, s.qos));
                if input.exec.wr_ready {
                    next.offset = s.offset + params.burst_bytes;
                }
            } else {
                output.sink = input.s_axis.clone();
                output.s_axis = input.exec.s_axis;
                if input.s_axis.accepted(&input.exec.s_axis) {
                    if input.s_axis.inner.tlast || s.remaining == 0 {
                        next.phase = WrPhase::Prepare;
                        next.finish = true;
                    } else {
                        next.remaining = s.remaining - 1;
                    }
                }
            }
        }
    }

    (output, next)
}

#[derive(Debug, Clone)]
struct RdInput {
    req: DmaRequest,
    m_axis: AxisReady,
    exec: BurstStatus,
}

#[derive(Debug, Default, Clone)]
struct RdOutput {
    ack: bool,
    finish: bool,
    m_axis: AxisValid<AxisBeat>,
    burst: Valid<BurstRequest>,
    source_ready: AxisReady,
}

fn rd_step(params: &DmaParams, input: &RdInput, s: &TransferState<RdPhase>) -> (RdOutput, TransferState<RdPhase>) {
    let mut output = RdOutput { finish: s.finish, ..Default::default() };
    let mut next = TransferState { finish: false, ..s.clone() };

    match s.phase {
        RdPhase::Reset => next.phase = RdPhase::Prepare,
        RdPhase::Prepare => {
            let remaining = input.req.len_beats.saturating_sub(1);
            output.burst = Valid::new(input.req.start, params.burst(input.req.addr, remaining, input.req.qos));
            output.ack = input.req.start & input.exec.rd_ready;
            if output.ack {
                next = TransferState {
                    phase: RdPhase::BurstStarted,
                    addr: input.req.addr,
                    qos: input.req.qos,
                    offset: params.burst_bytes,
                    remaining,
                    finish: false,
                };
            }
        }
        RdPhase::BurstStarted => {
            if input.exec.rd_idle {
                output.burst = Valid::valid(params.burst(s.addr.wrapping_add(s.offset), s.remaining, s.qos));
                if input.exec.rd_ready {
                    next.offset = s.offset + params.burst_bytes;
                }
            } else {
                let beat = &input.exec.m_axis;
                let tlast = beat.tvalid && s.remaining == 0;
                output.m_axis = AxisValid::new(beat.tvalid, AxisBeat { tlast, ..beat.inner.clone() });
                output.source_ready = input.m_axis;
                if beat.accepted(&input.m_axis) {
                    if s.remaining == 0 {
                        // RLAST should coincide with the final beat of the transfer.
                        next.phase = if beat.inner.tlast { RdPhase::Prepare } else { RdPhase::WaitLast };
                        next.finish = true;
                    } else {
                        next.remaining = s.remaining - 1;
                    }
                }
            }
        }
        RdPhase::WaitLast => {
            // Discards the rest of the burst.
            output.source_ready = AxisReady::null_sink();
            if input.exec.rd_idle {
                next.phase = RdPhase::Prepare;
            }
        }
    }

    (output, next)
}

/// AXI DMA.
///
/// Both directions issue their first burst from the cycle the request is acknowledged and the next one as soon as
/// the burst executor is idle again. A write transfer ends on the earlier of its `len_beats`-th beat and a beat with
/// TLAST; the rest of the burst in flight is padded with null-strobe beats. A read transfer always delivers exactly
/// `len_beats` beats, with TLAST on the final one only.
#[derive(Debug)]
pub struct AxiDma {
    config: DmaConfig,
    exec: AxiStreamToFull,
    wr: Fsm<WrInput, WrOutput, TransferState<WrPhase>>,
    rd: Fsm<RdInput, RdOutput, TransferState<RdPhase>>,
}

struct Wires {
    exec: BurstInput,
    wr: WrInput,
    rd: RdInput,
    output: AxiDmaOutput,
}

impl AxiDma {
    /// Creates a new DMA.
    pub fn new(config: DmaConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let params = DmaParams { burst_len: config.burst_len as u32, burst_bytes: config.burst_bytes() };
        let exec = AxiStreamToFull::new(config.addr_w, config.axis());
        let wr = Fsm::new(
            "wr",
            move |input: &WrInput, state: &TransferState<WrPhase>| wr_step(&params, input, state),
            TransferState::new(WrPhase::Reset),
        );
        let rd = Fsm::new(
            "rd",
            move |input: &RdInput, state: &TransferState<RdPhase>| rd_step(&params, input, state),
            TransferState::new(RdPhase::Reset),
        );
        Ok(Self { config, exec, wr, rd })
    }

    /// Configuration.
    pub fn config(&self) -> &DmaConfig { &self.config }

    /// Returns whether no write transfer is in progress.
    pub fn wr_idle(&self) -> bool { self.wr.state().phase == WrPhase::Prepare }

    /// Returns whether no read transfer is in progress.
    pub fn rd_idle(&self) -> bool { self.rd.state().phase == RdPhase::Prepare }

    fn wires(&self, input: &AxiDmaInput) -> Wires {
        let status = self.exec.status(&input.m_axi);

        let wr_in = WrInput { req: input.wr.clone(), s_axis: input.s_axis.clone(), exec: status.clone() };
        let wr_out = self.wr.comb(&wr_in);
        let rd_in = RdInput { req: input.rd.clone(), m_axis: input.m_axis, exec: status.clone() };
        let rd_out = self.rd.comb(&rd_in);

        let exec_in = BurstInput {
            wr: wr_out.burst,
            rd: rd_out.burst,
            s_axis: wr_out.sink,
            m_axis: rd_out.source_ready,
            m_axi: input.m_axi.clone(),
            protocol_error_clear: input.protocol_error_clear,
        };
        let exec_out = self.exec.comb(&exec_in);

        let output = AxiDmaOutput {
            wr_ack: wr_out.ack,
            wr_finish: wr_out.finish,
            rd_ack: rd_out.ack,
            rd_finish: rd_out.finish,
            s_axis: wr_out.s_axis,
            m_axis: rd_out.m_axis,
            m_axi: exec_out.m_axi,
            protocol_error: status.protocol_error,
        };
        Wires { exec: exec_in, wr: wr_in, rd: rd_in, output }
    }
}

impl Component for AxiDma {
    type Input = AxiDmaInput;
    type Output = AxiDmaOutput;

    fn comb(&self, input: &AxiDmaInput) -> AxiDmaOutput { self.wires(input).output }

    fn tick(&mut self, input: &AxiDmaInput, rst: bool) {
        let wires = self.wires(input);
        if !rst {
            let output = &wires.output;
            if output.wr_ack {
                log::debug!("write started: addr={:#x}, beats={}", input.wr.addr, input.wr.len_beats.max(1));
            }
            if output.rd_ack {
                log::debug!("read started: addr={:#x}, beats={}", input.rd.addr, input.rd.len_beats.max(1));
            }
            if output.wr_finish {
                log::debug!("write finished");
            }
            if output.rd_finish {
                log::debug!("read finished");
            }
        }

        self.exec.tick(&wires.exec, rst);
        self.wr.tick(&wires.wr, rst);
        self.rd.tick(&wires.rd, rst);
    }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) {
        self.exec.trace(prefix, tracer);
        self.wr.trace(prefix, tracer);
        self.rd.trace(prefix, tracer);
    }
}
