//! Testbenches shared by the integration tests.

#![allow(dead_code)]

use hdlsim::*;
use hdlsim_dma::*;
use hdlsim_std::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MEM_SIZE: usize = 1 << 16;

/// Installs a logger once per test binary.
pub fn init_logger() {
    let _ = simple_logger::SimpleLogger::new().with_level(log::LevelFilter::Warn).env().init();
}

/// Random beats masked to `data_w` bits.
pub fn random_frame(rng: &mut StdRng, data_w: usize, len: usize) -> Vec<u128> {
    (0..len).map(|_| rng.gen::<u128>() & mask(data_w)).collect()
}

pub fn rng(seed: u64) -> StdRng { StdRng::seed_from_u64(seed) }

/// `AxiDma` attached to a memory, a stream master and a stream slave.
#[derive(Debug)]
pub struct DmaBench {
    pub dma: AxiDma,
    pub mem: AxiMemory,
    pub master: StreamMaster,
    pub slave: StreamSlave,
    /// Requests and error clear. Each request is withdrawn once acknowledged.
    pub ctrl: AxiDmaInput,
    pub last: AxiDmaOutput,
    pub wr_finishes: usize,
    pub rd_finishes: usize,
}

impl DmaBench {
    pub fn new(config: DmaConfig) -> Self {
        Self {
            dma: AxiDma::new(config).unwrap(),
            mem: AxiMemory::new(AxiMemoryConfig::new(MEM_SIZE, config.data_w)),
            master: StreamMaster::new(config.axis()),
            slave: StreamSlave::new(config.axis()),
            ctrl: AxiDmaInput::default(),
            last: AxiDmaOutput::default(),
            wr_finishes: 0,
            rd_finishes: 0,
        }
    }

    pub fn with_memory(mut self, mem: AxiMemoryConfig) -> Self {
        self.mem = AxiMemory::new(mem);
        self
    }

    pub fn start_write(&mut self, addr: u64, len_beats: u32) { self.ctrl.wr = DmaRequest::start(addr, len_beats); }

    pub fn start_read(&mut self, addr: u64, len_beats: u32) { self.ctrl.rd = DmaRequest::start(addr, len_beats); }
}

impl Bench for DmaBench {
    fn cycle(&mut self, rst: bool) {
        let input = AxiDmaInput {
            s_axis: self.master.outputs(),
            m_axis: self.slave.outputs(),
            m_axi: self.mem.outputs(),
            ..self.ctrl.clone()
        };
        let output = self.dma.comb(&input);

        self.master.tick(&output.s_axis, rst);
        self.slave.tick(&output.m_axis, rst);
        self.mem.tick(&output.m_axi, rst);
        self.dma.tick(&input, rst);

        if output.wr_ack {
            self.ctrl.wr.start = false;
        }
        if output.rd_ack {
            self.ctrl.rd.start = false;
        }
        self.wr_finishes += usize::from(output.wr_finish);
        self.rd_finishes += usize::from(output.rd_finish);
        self.last = output;
    }

    fn trace(&self, tracer: &mut Tracer) {
        tracer.probe("dma_out", &self.last);
        self.dma.trace("dma", tracer);
    }
}

/// Simulator over a `DmaBench`, out of reset.
pub fn dma_sim(config: DmaConfig) -> Simulator<DmaBench> {
    init_logger();
    let mut sim = Simulator::new(DmaBench::new(config));
    sim.reset(2);
    sim
}

/// `AxiDmaTripleBuffer` attached to a memory, a stream master and a stream slave.
#[derive(Debug)]
pub struct TripleBufferBench {
    pub tb: AxiDmaTripleBuffer,
    pub mem: AxiMemory,
    pub master: StreamMaster,
    pub slave: StreamSlave,
    pub ctrl: TripleBufferInput,
    pub last: TripleBufferOutput,
    /// Cycles in which the buffer being written was the buffer being read.
    pub collisions: usize,
}

/// Base addresses of the three buffers.
pub const BASE_ADDRS: [u64; 3] = [0x1000, 0x5000, 0x9000];

impl TripleBufferBench {
    pub fn new(config: TripleBufferConfig, len_beats: u32) -> Self {
        let axis = config.dma.axis();
        let ctrl = TripleBufferInput {
            base_addr_0: BASE_ADDRS[0],
            base_addr_1: BASE_ADDRS[1],
            base_addr_2: BASE_ADDRS[2],
            wr_len_beats: len_beats,
            rd_len_beats: len_beats,
            ..Default::default()
        };
        Self {
            tb: AxiDmaTripleBuffer::new(config).unwrap(),
            mem: AxiMemory::new(AxiMemoryConfig::new(MEM_SIZE, config.dma.data_w)),
            master: StreamMaster::new(axis),
            slave: StreamSlave::new(axis),
            ctrl,
            last: TripleBufferOutput::default(),
            collisions: 0,
        }
    }

    /// Contents of every buffer, `len` beats each.
    pub fn buffers(&self, len: usize) -> Vec<Vec<u128>> {
        BASE_ADDRS.iter().map(|addr| self.mem.read_beats(*addr as usize, len)).collect()
    }
}

impl Bench for TripleBufferBench {
    fn cycle(&mut self, rst: bool) {
        let input = TripleBufferInput {
            s_axis: self.master.outputs(),
            m_axis: self.slave.outputs(),
            m_axi: self.mem.outputs(),
            ..self.ctrl.clone()
        };
        let output = self.tb.comb(&input);
        if !rst && output.wr_buffer == output.rd_buffer {
            self.collisions += 1;
        }

        self.master.tick(&output.s_axis, rst);
        self.slave.tick(&output.m_axis, rst);
        self.mem.tick(&output.m_axi, rst);
        self.tb.tick(&input, rst);
        self.last = output;
    }

    fn trace(&self, tracer: &mut Tracer) {
        tracer.probe("tb_out", &self.last);
        self.tb.trace("tb", tracer);
    }
}

/// Simulator over a `TripleBufferBench`, out of reset.
pub fn triple_buffer_sim(config: TripleBufferConfig, len_beats: u32) -> Simulator<TripleBufferBench> {
    init_logger();
    let mut sim = Simulator::new(TripleBufferBench::new(config, len_beats));
    sim.reset(2);
    sim
}
