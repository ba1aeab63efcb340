//! Triple buffer on top of [`AxiDma`].
//!
//! A producer stream is written into one of three memory buffers while a consumer stream is read out of another.
//! Whenever the producer completes a frame, its buffer becomes the latest published one; whenever the consumer
//! completes a frame, it moves on to the latest published buffer. The buffer being written and the buffer being read
//! are never the same.

use hdlsim_macro::Signal;

use crate::constants::triple_buffer::*;
use crate::*;

/// Triple buffer inputs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct TripleBufferInput {
    /// Starts a new write transfer whenever the previous one is done.
    pub wr_enable: bool,
    /// Starts a new read transfer whenever the previous one is done.
    pub rd_enable: bool,
    /// Base address of buffer 0.
    pub base_addr_0: u64,
    /// Base address of buffer 1.
    pub base_addr_1: u64,
    /// Base address of buffer 2.
    pub base_addr_2: u64,
    /// Quality of service of write bursts.
    pub wr_qos: u8,
    /// Quality of service of read bursts.
    pub rd_qos: u8,
    /// Beats per written frame.
    pub wr_len_beats: u32,
    /// Beats per read frame.
    pub rd_len_beats: u32,
    /// Keeps writing into the same buffer when a frame ends before `wr_len_beats` beats.
    pub wr_dont_change_buffer_if_incomplete: bool,
    /// Producer stream.
    pub s_axis: AxisValid<AxisBeat>,
    /// Consumer stream.
    pub m_axis: AxisReady,
    /// Signals driven by the AXI slave.
    pub m_axi: AxiSlave,
    /// Clears the sticky protocol error.
    pub protocol_error_clear: bool,
}

impl TripleBufferInput {
    /// Base address of the given buffer.
    pub fn base_addr(&self, index: u8) -> u64 {
        match index {
            0 => self.base_addr_0,
            1 => self.base_addr_1,
            _ => self.base_addr_2,
        }
    }
}

/// Triple buffer outputs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct TripleBufferOutput {
    /// Producer stream.
    pub s_axis: AxisReady,
    /// Consumer stream.
    pub m_axis: AxisValid<AxisBeat>,
    /// Signals driven to the AXI slave.
    pub m_axi: AxiMaster,
    /// Buffer being written.
    pub wr_buffer: u8,
    /// Buffer being read.
    pub rd_buffer: u8,
    /// Latest published buffer.
    pub last_wr_buffer: u8,
    /// Beats written into the latest published buffer.
    pub last_wr_beats: u32,
    /// Sticky protocol error.
    pub protocol_error: bool,
}

/// Buffer indices shared by both directions.
#[derive(Debug, Clone, PartialEq, Eq, Signal)]
struct Buffers {
    wr: u8,
    rd: u8,
    last_wr: u8,
    last_wr_beats: u32,
    /// Beats published with the buffer being read. Zero until a buffer was published.
    rd_beats: u32,
}

impl Default for Buffers {
    fn default() -> Self {
        Self { wr: INIT_WR_BUFFER, rd: INIT_RD_BUFFER, last_wr: INIT_RD_BUFFER, last_wr_beats: 0, rd_beats: 0 }
    }
}

#[derive(Debug, Default, Clone)]
struct RotateInput {
    /// Publishes the buffer being written with the given number of beats.
    wr: Valid<u32>,
    /// Moves the reader to the latest published buffer.
    rd: bool,
}

impl Buffers {
    fn rotate(&self, input: &RotateInput) -> Self {
        let mut next = self.clone();
        match (input.wr.valid, input.rd) {
            (false, false) => {}
            (true, false) => {
                next.last_wr = self.wr;
                next.last_wr_beats = input.wr.inner;
                next.wr = (self.wr + 1) % N_BUFFERS;
                if next.wr == self.rd {
                    next.wr = (self.wr + 2) % N_BUFFERS;
                }
            }
            (false, true) => {
                if self.last_wr != self.wr {
                    next.rd = self.last_wr;
                    next.rd_beats = self.last_wr_beats;
                }
            }
            (true, true) => {
                next.last_wr = self.wr;
                next.last_wr_beats = input.wr.inner;
                next.wr = self.rd;
                next.rd = self.wr;
                next.rd_beats = input.wr.inner;
            }
        }
        next
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
enum WrPhase {
    Reset,
    Config,
    Running,
    /// Discards the producer's beats until TLAST.
    WaitLast,
}

#[derive(Debug, Clone, Signal)]
struct WrState {
    phase: WrPhase,
    /// Beats left in the frame, minus one.
    beats_count: u32,
    /// Beats written in the frame.
    beats_counter: u32,
}

impl Default for WrState {
    fn default() -> Self { Self { phase: WrPhase::Reset, beats_count: 0, beats_counter: 0 } }
}

#[derive(Debug, Clone)]
struct WrInput {
    s_axis: AxisValid<AxisBeat>,
    len_beats: u32,
    dont_change_if_incomplete: bool,
    dma_ack: bool,
    dma_s_axis: AxisReady,
}

#[derive(Debug, Default, Clone)]
struct WrOutput {
    s_axis: AxisReady,
    rotate: Valid<u32>,
}

/// Transfer request and stream driven into the DMA. Depends only on registers and external inputs.
fn wr_drive(s: &WrState, input: &TripleBufferInput, buffers: &Buffers) -> (DmaRequest, AxisValid<AxisBeat>) {
    match s.phase {
        WrPhase::Config => {
            let req = DmaRequest {
                start: input.wr_enable,
                addr: input.base_addr(buffers.wr),
                len_beats: input.wr_len_beats,
                qos: input.wr_qos,
            };
            (req, AxisValid::tinvalid())
        }
        WrPhase::Running => {
            let beat = &input.s_axis;
            let tlast = beat.inner.tlast || s.beats_count == 0;
            (DmaRequest::default(), AxisValid::new(beat.tvalid, AxisBeat { tlast, ..beat.inner.clone() }))
        }
        WrPhase::Reset | WrPhase::WaitLast => (DmaRequest::default(), AxisValid::tinvalid()),
    }
}

fn wr_step(input: &WrInput, s: &WrState) -> (WrOutput, WrState) {
    let mut output = WrOutput::default();
    let mut next = s.clone();

    match s.phase {
        WrPhase::Reset => next.phase = WrPhase::Config,
        WrPhase::Config => {
            if input.dma_ack {
                next = WrState {
                    phase: WrPhase::Running,
                    beats_count: input.len_beats.saturating_sub(1),
                    beats_counter: 0,
                };
            }
        }
        WrPhase::Running => {
            output.s_axis = input.dma_s_axis;
            if input.s_axis.accepted(&input.dma_s_axis) {
                let tlast = input.s_axis.inner.tlast;
                let budget_done = s.beats_count == 0;
                next.beats_count = s.beats_count.saturating_sub(1);
                next.beats_counter = s.beats_counter + 1;

                if tlast && !budget_done {
                    // Early TLAST.
                    if !input.dont_change_if_incomplete {
                        output.rotate = Valid::valid(next.beats_counter);
                    }
                    next.phase = WrPhase::Config;
                } else if !tlast && budget_done {
                    // Missing TLAST.
                    next.phase = WrPhase::WaitLast;
                } else if tlast {
                    output.rotate = Valid::valid(next.beats_counter);
                    next.phase = WrPhase::Config;
                }
            }
        }
        WrPhase::WaitLast => {
            output.s_axis = AxisReady::null_sink();
            if input.s_axis.accepted_last(&output.s_axis) {
                output.rotate = Valid::valid(s.beats_counter);
                next.phase = WrPhase::Config;
            }
        }
    }

    (output, next)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Signal)]
enum RdPhase {
    Reset,
    Config,
    InProgress,
    NextBuffer,
}

#[derive(Debug, Clone)]
struct RdInput {
    enable: bool,
    m_axis: AxisReady,
    dma_ack: bool,
    dma_m_axis: AxisValid<AxisBeat>,
}

#[derive(Debug, Default, Clone)]
struct RdOutput {
    m_axis: AxisValid<AxisBeat>,
    rotate: bool,
}

fn rd_drive(
    phase: RdPhase, input: &TripleBufferInput, buffers: &Buffers, ignore_rd_size: bool,
) -> (DmaRequest, AxisReady) {
    match phase {
        RdPhase::Config => {
            let len_beats = if ignore_rd_size && buffers.rd_beats != 0 { buffers.rd_beats } else { input.rd_len_beats };
            let req = DmaRequest {
                start: input.rd_enable,
                addr: input.base_addr(buffers.rd),
                len_beats,
                qos: input.rd_qos,
            };
            (req, AxisReady::stall())
        }
        RdPhase::InProgress => (DmaRequest::default(), input.m_axis),
        RdPhase::Reset | RdPhase::NextBuffer => (DmaRequest::default(), AxisReady::stall()),
    }
}

fn rd_step(input: &RdInput, phase: &RdPhase) -> (RdOutput, RdPhase) {
    let mut output = RdOutput::default();
    let next = match phase {
        RdPhase::Reset => RdPhase::Config,
        RdPhase::Config if input.dma_ack => RdPhase::InProgress,
        RdPhase::InProgress => {
            output.m_axis = input.dma_m_axis.clone();
            if input.dma_m_axis.accepted_last(&input.m_axis) {
                RdPhase::NextBuffer
            } else {
                RdPhase::InProgress
            }
        }
        RdPhase::NextBuffer if input.enable => {
            output.rotate = true;
            RdPhase::Config
        }
        _ => *phase,
    };
    (output, next)
}

/// Triple buffer.
///
/// The producer side writes a frame of `wr_len_beats` beats per transfer. A frame that ends early is published with
/// the beats actually written, unless `wr_dont_change_buffer_if_incomplete` is set, in which case the next frame
/// overwrites the same buffer. The beats of a frame that runs past `wr_len_beats` without TLAST are dropped up to and
/// including the next TLAST.
///
/// The consumer side reads `rd_len_beats` beats per transfer, or the number of beats the buffer was published with
/// when [`TripleBufferConfig::ignore_rd_size_signal`] is set. Until the producer publishes a buffer, the consumer
/// keeps reading buffer 0.
#[derive(Debug)]
pub struct AxiDmaTripleBuffer {
    config: TripleBufferConfig,
    dma: AxiDma,
    buffers: Fsm<RotateInput, Buffers, Buffers>,
    wr: Fsm<WrInput, WrOutput, WrState>,
    rd: Fsm<RdInput, RdOutput, RdPhase>,
}

struct Wires {
    dma: AxiDmaInput,
    wr: WrInput,
    rd: RdInput,
    rotate: RotateInput,
    output: TripleBufferOutput,
}

impl AxiDmaTripleBuffer {
    /// Creates a new triple buffer.
    pub fn new(config: TripleBufferConfig) -> Result<Self, ConfigError> {
        let dma = AxiDma::new(config.dma)?;
        let buffers = Fsm::new(
            "buffers",
            |input: &RotateInput, state: &Buffers| (state.clone(), state.rotate(input)),
            Buffers::default(),
        );
        let wr = Fsm::new("tb_wr", wr_step, WrState::default());
        let rd = Fsm::new("tb_rd", rd_step, RdPhase::Reset);
        Ok(Self { config, dma, buffers, wr, rd })
    }

    /// Configuration.
    pub fn config(&self) -> &TripleBufferConfig { &self.config }

    /// Inner DMA.
    pub fn dma(&self) -> &AxiDma { &self.dma }

    fn wires(&self, input: &TripleBufferInput) -> Wires {
        let buffers = self.buffers.state();
        let (wr_req, sink) = wr_drive(self.wr.state(), input, buffers);
        let (rd_req, source_ready) = rd_drive(*self.rd.state(), input, buffers, self.config.ignore_rd_size_signal);

        let dma_in = AxiDmaInput {
            wr: wr_req,
            rd: rd_req,
            s_axis: sink,
            m_axis: source_ready,
            m_axi: input.m_axi.clone(),
            protocol_error_clear: input.protocol_error_clear,
        };
        let dma_out = self.dma.comb(&dma_in);

        let wr_in = WrInput {
            s_axis: input.s_axis.clone(),
            len_beats: input.wr_len_beats,
            dont_change_if_incomplete: input.wr_dont_change_buffer_if_incomplete,
            dma_ack: dma_out.wr_ack,
            dma_s_axis: dma_out.s_axis,
        };
        let wr_out = self.wr.comb(&wr_in);
        let rd_in = RdInput {
            enable: input.rd_enable,
            m_axis: input.m_axis,
            dma_ack: dma_out.rd_ack,
            dma_m_axis: dma_out.m_axis,
        };
        let rd_out = self.rd.comb(&rd_in);

        let output = TripleBufferOutput {
            s_axis: wr_out.s_axis,
            m_axis: rd_out.m_axis,
            m_axi: dma_out.m_axi,
            wr_buffer: buffers.wr,
            rd_buffer: buffers.rd,
            last_wr_buffer: buffers.last_wr,
            last_wr_beats: buffers.last_wr_beats,
            protocol_error: dma_out.protocol_error,
        };
        let rotate = RotateInput { wr: wr_out.rotate, rd: rd_out.rotate };
        Wires { dma: dma_in, wr: wr_in, rd: rd_in, rotate, output }
    }
}

impl Component for AxiDmaTripleBuffer {
    type Input = TripleBufferInput;
    type Output = TripleBufferOutput;

    fn comb(&self, input: &TripleBufferInput) -> TripleBufferOutput { self.wires(input).output }

    fn tick(&mut self, input: &TripleBufferInput, rst: bool) {
        let wires = self.wires(input);
        let prev = self.buffers.state().clone();

        self.dma.tick(&wires.dma, rst);
        self.wr.tick(&wires.wr, rst);
        self.rd.tick(&wires.rd, rst);
        self.buffers.tick(&wires.rotate, rst);

        let next = self.buffers.state();
        if !rst && *next != prev {
            log::debug!(
                "buffers: wr {} -> {}, rd {} -> {}, published {} ({} beats)",
                prev.wr,
                next.wr,
                prev.rd,
                next.rd,
                next.last_wr,
                next.last_wr_beats
            );
        }
    }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) {
        self.dma.trace(prefix, tracer);
        self.buffers.trace(prefix, tracer);
        self.wr.trace(prefix, tracer);
        self.rd.trace(prefix, tracer);
    }
}

#[cfg(test)]
mod tests {
    use itertools::iproduct;

    use super::*;

    fn publish(beats: u32) -> RotateInput { RotateInput { wr: Valid::valid(beats), rd: false } }

    fn consume() -> RotateInput { RotateInput { wr: Valid::invalid(), rd: true } }

    #[test]
    fn write_rotation_skips_read_buffer() {
        let mut b = Buffers::default();
        let mut written = vec![];
        for beats in 1..=5 {
            written.push(b.wr);
            b = b.rotate(&publish(beats));
            assert_eq!(b.last_wr, written[written.len() - 1]);
            assert_eq!(b.last_wr_beats, beats);
        }
        // Alternates between the two buffers not being read.
        assert_eq!(written, [1, 2, 1, 2, 1]);
        assert_eq!(b.rd, 0);
        assert_eq!(b.wr, 2);
    }

    #[test]
    fn read_rotation_follows_latest() {
        let mut b = Buffers::default();
        // Nothing published yet.
        b = b.rotate(&consume());
        assert_eq!((b.rd, b.rd_beats), (0, 0));

        b = b.rotate(&publish(7));
        b = b.rotate(&consume());
        assert_eq!((b.wr, b.rd, b.rd_beats), (2, 1, 7));

        // Stays on the latest buffer.
        b = b.rotate(&consume());
        assert_eq!((b.wr, b.rd, b.rd_beats), (2, 1, 7));
    }

    #[test]
    fn simultaneous_rotation_swaps() {
        let b = Buffers::default().rotate(&publish(3));
        let b = b.rotate(&RotateInput { wr: Valid::valid(4), rd: true });
        assert_eq!((b.wr, b.rd, b.last_wr, b.last_wr_beats, b.rd_beats), (0, 2, 2, 4, 4));
    }

    /// Checks every reachable index assignment against every rotation.
    #[test]
    fn rotation_never_collides() {
        for (wr, rd, last_wr, rotate_wr, rotate_rd) in iproduct!(0..3u8, 0..3u8, 0..3u8, [false, true], [false, true]) {
            if wr == rd || last_wr == wr {
                continue;
            }
            let b = Buffers { wr, rd, last_wr, last_wr_beats: 1, rd_beats: 1 };
            let input = RotateInput { wr: Valid::new(rotate_wr, 2), rd: rotate_rd };
            let next = b.rotate(&input);
            assert_ne!(next.wr, next.rd, "{:?} {:?}", b, input);
            assert_ne!(next.last_wr, next.wr, "{:?} {:?}", b, input);
            assert!(next.wr < N_BUFFERS && next.rd < N_BUFFERS);
        }
    }

    #[test]
    fn forced_last_on_budget() {
        let input = TripleBufferInput {
            s_axis: AxisValid::new(true, AxisBeat::new(5, false)),
            wr_len_beats: 4,
            ..Default::default()
        };
        let buffers = Buffers::default();

        let running = WrState { phase: WrPhase::Running, beats_count: 1, beats_counter: 2 };
        assert!(!wr_drive(&running, &input, &buffers).1.inner.tlast);
        let running = WrState { beats_count: 0, ..running };
        assert!(wr_drive(&running, &input, &buffers).1.inner.tlast);

        let config = WrState { phase: WrPhase::Config, ..running };
        let input = TripleBufferInput { wr_enable: true, base_addr_1: 0x40, ..input };
        let (req, sink) = wr_drive(&config, &input, &buffers);
        assert!(req.start && !sink.tvalid);
        assert_eq!(req.addr, 0x40);
    }

    #[test]
    fn early_last_policy() {
        let running = WrState { phase: WrPhase::Running, beats_count: 3, beats_counter: 1 };
        let input = WrInput {
            s_axis: AxisValid::new(true, AxisBeat::new(0, true)),
            len_beats: 5,
            dont_change_if_incomplete: false,
            dma_ack: false,
            dma_s_axis: AxisReady::null_sink(),
        };
        let (output, next) = wr_step(&input, &running);
        assert_eq!(output.rotate, Valid::valid(2));
        assert_eq!(next.phase, WrPhase::Config);

        let input = WrInput { dont_change_if_incomplete: true, ..input };
        let (output, next) = wr_step(&input, &running);
        assert!(!output.rotate.valid);
        assert_eq!(next.phase, WrPhase::Config);
    }

    #[test]
    fn rd_len_source() {
        let input = TripleBufferInput { rd_enable: true, rd_len_beats: 9, ..Default::default() };
        let mut buffers = Buffers::default();
        assert_eq!(rd_drive(RdPhase::Config, &input, &buffers, true).0.len_beats, 9);
        buffers.rd_beats = 4;
        assert_eq!(rd_drive(RdPhase::Config, &input, &buffers, true).0.len_beats, 4);
        assert_eq!(rd_drive(RdPhase::Config, &input, &buffers, false).0.len_beats, 9);
    }
}
