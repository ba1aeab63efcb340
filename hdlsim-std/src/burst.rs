//! Burst executor: turns burst requests plus AXI4-Stream beats into AXI4 transactions.
//!
//! The write path accepts one burst request at a time, forwards `burst + 1` beats of its stream sink to the W channel
//! and waits for the write response before it becomes idle again. The read path does the same for AR/R, forwarding
//! read data to its stream source.

use hdlsim_macro::Signal;

use crate::*;

/// Burst request.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct BurstRequest {
    /// Address of the first beat.
    pub addr: u64,
    /// Number of beats minus one.
    pub burst: u8,
    /// Quality of service.
    pub qos: u8,
}

/// Outputs of the burst executor that depend only on its registers and on the signals driven by the AXI slave.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct BurstStatus {
    /// A write request is accepted in this cycle if it is valid.
    pub wr_ready: bool,
    /// The write path is available for a new burst.
    pub wr_idle: bool,
    /// A read request is accepted in this cycle if it is valid.
    pub rd_ready: bool,
    /// The read path is available for a new burst.
    pub rd_idle: bool,
    /// Stream sink (memory write).
    pub s_axis: AxisReady,
    /// Stream source (memory read).
    pub m_axis: AxisValid<AxisBeat>,
    /// Sticky protocol error.
    pub protocol_error: bool,
}

/// Burst executor inputs.
#[derive(Debug, Default, Clone)]
pub struct BurstInput {
    /// Write burst request.
    pub wr: Valid<BurstRequest>,
    /// Read burst request.
    pub rd: Valid<BurstRequest>,
    /// Stream sink (memory write).
    pub s_axis: AxisValid<AxisBeat>,
    /// Stream source (memory read).
    pub m_axis: AxisReady,
    /// Signals driven by the AXI slave.
    pub m_axi: AxiSlave,
    /// Clears the sticky protocol error.
    pub protocol_error_clear: bool,
}

/// Burst executor outputs.
#[derive(Debug, Default, Clone)]
pub struct BurstOutput {
    /// Handshakes and streams.
    pub status: BurstStatus,
    /// Signals driven to the AXI slave.
    pub m_axi: AxiMaster,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
enum WrPhase {
    WaitingAddr,
    Data,
    DummyCycles,
    WaitResponse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
enum RdPhase {
    WaitingAddr,
    Data,
}

#[derive(Debug, Clone, Signal)]
struct BurstState {
    wr: WrPhase,
    /// Remaining write beats in the burst, minus one.
    wr_burst: u8,
    rd: RdPhase,
    /// Remaining read beats in the burst, minus one.
    rd_burst: u8,
    error: bool,
}

impl Default for BurstState {
    fn default() -> Self {
        Self { wr: WrPhase::WaitingAddr, wr_burst: 0, rd: RdPhase::WaitingAddr, rd_burst: 0, error: false }
    }
}

#[derive(Debug, Clone, Copy)]
struct BurstParams {
    addr_w: usize,
    axis: AxisParams,
    size: u8,
}

impl BurstParams {
    fn addr(&self, req: &BurstRequest) -> AxiAddr {
        AxiAddr {
            addr: req.addr & mask(self.addr_w) as u64,
            len: req.burst,
            size: self.size,
            burst: BURST_TYPE_INCR,
            cache: CACHE_BUFFERABLE | CACHE_CACHEABLE,
            qos: req.qos,
        }
    }
}

fn status(params: &BurstParams, slave: &AxiSlave, s: &BurstState) -> BurstStatus {
    let wr_waiting = s.wr == WrPhase::WaitingAddr;
    let rd_waiting = s.rd == RdPhase::WaitingAddr;

    let m_axis = if s.rd == RdPhase::Data {
        let beat = AxisBeat {
            tdata: slave.r.inner.data & mask(params.axis.data_w),
            // No RUSER.
            tuser: 0,
            tkeep: params.axis.full_keep(),
            tlast: slave.r.inner.last,
        };
        AxisValid::new(slave.r.valid, beat)
    } else {
        AxisValid::tinvalid()
    };

    BurstStatus {
        wr_ready: wr_waiting & slave.aw_ready,
        wr_idle: wr_waiting,
        rd_ready: rd_waiting & slave.ar_ready,
        rd_idle: rd_waiting,
        s_axis: AxisReady::new(s.wr == WrPhase::Data && slave.w_ready),
        m_axis,
        protocol_error: s.error,
    }
}

fn step(params: &BurstParams, input: &BurstInput, s: &BurstState) -> (BurstOutput, BurstState) {
    let slave = &input.m_axi;
    let status = status(params, slave, s);

    let w = match s.wr {
        WrPhase::Data => {
            let strb = if params.axis.keep { input.s_axis.inner.tkeep } else { params.axis.full_keep() };
            let inner = AxiWrite { data: input.s_axis.inner.tdata, strb, last: s.wr_burst == 0 };
            Valid::new(input.s_axis.tvalid, inner)
        }
        // Null strobe. Only completes the burst.
        WrPhase::DummyCycles => Valid::valid(AxiWrite { data: 0, strb: 0, last: s.wr_burst == 0 }),
        WrPhase::WaitingAddr | WrPhase::WaitResponse => Valid::invalid(),
    };

    let m_axi = AxiMaster {
        aw: Valid::new(s.wr == WrPhase::WaitingAddr && input.wr.valid, params.addr(&input.wr.inner)),
        w,
        b_ready: s.wr == WrPhase::WaitResponse,
        ar: Valid::new(s.rd == RdPhase::WaitingAddr && input.rd.valid, params.addr(&input.rd.inner)),
        r_ready: s.rd == RdPhase::Data && input.m_axis.tready,
    };

    let mut next = s.clone();

    // Write path.
    let w_accepted = m_axi.w_accepted(slave);
    let wr_last_of_burst = s.wr_burst == 0;
    if w_accepted && s.wr_burst > 0 {
        next.wr_burst = s.wr_burst - 1;
    }
    match s.wr {
        WrPhase::WaitingAddr => {
            if m_axi.aw_accepted(slave) {
                next.wr = WrPhase::Data;
                next.wr_burst = m_axi.aw.inner.len;
            }
        }
        WrPhase::Data => {
            if w_accepted && wr_last_of_burst {
                next.wr = WrPhase::WaitResponse;
            } else if w_accepted && input.s_axis.inner.tlast {
                next.wr = WrPhase::DummyCycles;
            }
        }
        WrPhase::DummyCycles => {
            if w_accepted && wr_last_of_burst {
                next.wr = WrPhase::WaitResponse;
            }
        }
        WrPhase::WaitResponse => {
            if m_axi.b_accepted(slave) {
                next.wr = WrPhase::WaitingAddr;
            }
        }
    }
    let wr_error = m_axi.b_accepted(slave) && slave.b.inner.resp != RESP_OKAY;

    // Read path.
    let r_accepted = m_axi.r_accepted(slave);
    let rd_last_of_burst = s.rd_burst == 0;
    if r_accepted && s.rd_burst > 0 {
        next.rd_burst = s.rd_burst - 1;
    }
    match s.rd {
        RdPhase::WaitingAddr => {
            if m_axi.ar_accepted(slave) {
                next.rd = RdPhase::Data;
                next.rd_burst = m_axi.ar.inner.len;
            }
        }
        RdPhase::Data => {
            if r_accepted && (slave.r.inner.last || rd_last_of_burst) {
                next.rd = RdPhase::WaitingAddr;
            }
        }
    }
    let rd_error = r_accepted && (slave.r.inner.last != rd_last_of_burst || slave.r.inner.resp != RESP_OKAY);

    next.error = (s.error && !input.protocol_error_clear) || wr_error || rd_error;

    (BurstOutput { status, m_axi }, next)
}

/// Burst executor.
///
/// The AXI4 user signals are not carried: TUSER of the write stream is dropped and read beats have TUSER = 0.
#[derive(Debug)]
pub struct AxiStreamToFull {
    params: BurstParams,
    inner: Fsm<BurstInput, BurstOutput, BurstState>,
}

impl AxiStreamToFull {
    /// Creates a new burst executor for an `addr_w`-bit address space and the given stream widths.
    ///
    /// # Panics
    ///
    /// Panics if `axis.data_w` is not a power of two between 8 and 128.
    pub fn new(addr_w: usize, axis: AxisParams) -> Self {
        assert!(
            axis.data_w.is_power_of_two() && (8..=128).contains(&axis.data_w),
            "unsupported data width: {}",
            axis.data_w
        );
        let params = BurstParams { addr_w, axis, size: flog2(axis.bytes_per_beat()) as u8 };
        let inner = Fsm::new(
            "axi_stream_to_full",
            move |input: &BurstInput, state: &BurstState| step(&params, input, state),
            BurstState::default(),
        );
        Self { params, inner }
    }

    /// Stream widths.
    pub fn params(&self) -> AxisParams { self.params.axis }

    /// Outputs that do not depend on the burst requests nor on the stream handshakes.
    ///
    /// A client decides its requests from these, then evaluates `comb` with them.
    pub fn status(&self, m_axi: &AxiSlave) -> BurstStatus { status(&self.params, m_axi, self.inner.state()) }
}

impl Component for AxiStreamToFull {
    type Input = BurstInput;
    type Output = BurstOutput;

    fn comb(&self, input: &BurstInput) -> BurstOutput { self.inner.comb(input) }

    fn tick(&mut self, input: &BurstInput, rst: bool) {
        if !rst {
            let output = self.inner.comb(input);
            let m_axi = &output.m_axi;
            if m_axi.aw_accepted(&input.m_axi) {
                log::debug!("write burst: addr={:#x}, beats={}", m_axi.aw.inner.addr, m_axi.aw.inner.beats());
            }
            if m_axi.ar_accepted(&input.m_axi) {
                log::debug!("read burst: addr={:#x}, beats={}", m_axi.ar.inner.addr, m_axi.ar.inner.beats());
            }
        }

        let error = self.inner.state().error;
        self.inner.tick(input, rst);
        if !error && self.inner.state().error {
            log::warn!("protocol error latched");
        }
    }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) { self.inner.trace(prefix, tracer) }
}
