//! AXI4 memory slave model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::*;

/// Memory configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxiMemoryConfig {
    /// Size in bytes.
    pub size: usize,
    /// Data width in bits.
    pub data_w: usize,
    /// Probability that each ready/valid the memory drives is deasserted in a cycle.
    pub backpressure: f64,
    /// Seed of the backpressure generator.
    pub seed: u64,
}

impl AxiMemoryConfig {
    /// Memory of `size` bytes without backpressure.
    pub fn new(size: usize, data_w: usize) -> Self { Self { size, data_w, backpressure: 0.0, seed: 0 } }

    /// Enables random backpressure.
    #[must_use]
    pub fn with_backpressure(mut self, probability: f64, seed: u64) -> Self {
        self.backpressure = probability;
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone)]
struct WriteBurst {
    addr: AxiAddr,
    beat: usize,
    error: bool,
}

#[derive(Debug, Clone)]
struct ReadBurst {
    addr: AxiAddr,
    beat: usize,
}

/// Per-channel deassertion of the signals the memory drives, drawn at every clock edge.
#[derive(Debug, Default, Clone, Copy)]
struct Burps {
    aw: bool,
    w: bool,
    b: bool,
    ar: bool,
    r: bool,
}

/// Byte-addressed AXI4 slave with one outstanding write burst and one outstanding read burst.
///
/// Every output is registered: read data is returned from the cycle after AR is accepted, and the write response
/// from the cycle after the last W beat.
#[derive(Debug)]
pub struct AxiMemory {
    config: AxiMemoryConfig,
    bytes: Vec<u8>,
    rng: StdRng,
    burps: Burps,
    wr: Option<WriteBurst>,
    b: Option<u8>,
    rd: Option<ReadBurst>,
    drop_rlast: bool,
    aw_log: Vec<AxiAddr>,
    ar_log: Vec<AxiAddr>,
}

impl AxiMemory {
    /// Creates a new zero-initialized memory.
    pub fn new(config: AxiMemoryConfig) -> Self {
        Self {
            config,
            bytes: vec![0; config.size],
            rng: StdRng::seed_from_u64(config.seed),
            burps: Burps::default(),
            wr: None,
            b: None,
            rd: None,
            drop_rlast: false,
            aw_log: Vec::new(),
            ar_log: Vec::new(),
        }
    }

    /// Bytes per beat.
    pub fn bytes_per_beat(&self) -> usize { self.config.data_w / 8 }

    /// Suppresses RLAST on every read beat.
    pub fn set_drop_rlast(&mut self, drop_rlast: bool) { self.drop_rlast = drop_rlast; }

    /// Accepted write bursts, oldest first.
    pub fn aw_log(&self) -> &[AxiAddr] { &self.aw_log }

    /// Accepted read bursts, oldest first.
    pub fn ar_log(&self) -> &[AxiAddr] { &self.ar_log }

    /// Copies `data` into the memory at `addr`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn load(&mut self, addr: usize, data: &[u8]) { self.bytes[addr..addr + data.len()].copy_from_slice(data); }

    /// Bytes at `addr..addr + len`.
    ///
    /// # Panics
    ///
    /// Panics if the range is out of bounds.
    pub fn read_bytes(&self, addr: usize, len: usize) -> &[u8] { &self.bytes[addr..addr + len] }

    /// Writes `beats` of `data_w` bits each, little-endian, from `addr`.
    pub fn write_beats(&mut self, addr: usize, beats: &[u128]) {
        let bytes = self.bytes_per_beat();
        for (i, beat) in beats.iter().enumerate() {
            self.load(addr + i * bytes, &beat.to_le_bytes()[..bytes]);
        }
    }

    /// Reads `count` beats of `data_w` bits each, little-endian, from `addr`.
    pub fn read_beats(&self, addr: usize, count: usize) -> Vec<u128> {
        let bytes = self.bytes_per_beat();
        (0..count).map(|i| self.beat_at(addr + i * bytes, bytes).unwrap_or_default()).collect()
    }

    fn beat_at(&self, addr: usize, bytes: usize) -> Option<u128> {
        let data = self.bytes.get(addr..addr.checked_add(bytes)?)?;
        Some(data.iter().rev().fold(0, |acc, byte| (acc << 8) | u128::from(*byte)))
    }

    fn write_lanes(&mut self, addr: usize, w: &AxiWrite, bytes: usize) -> bool {
        let mut ok = true;
        for lane in (0..bytes).filter(|lane| ((w.strb >> lane) & 1) == 1) {
            match self.bytes.get_mut(addr + lane) {
                Some(byte) => *byte = (w.data >> (8 * lane)) as u8,
                None => ok = false,
            }
        }
        ok
    }

    fn burp(&mut self) -> bool { self.config.backpressure > 0.0 && self.rng.gen_bool(self.config.backpressure) }

    /// Signals driven by the memory in this cycle.
    pub fn outputs(&self) -> AxiSlave {
        let r = match &self.rd {
            Some(rd) => {
                let addr = rd.addr.addr as usize + rd.beat * rd.addr.bytes_per_beat();
                let data = self.beat_at(addr, rd.addr.bytes_per_beat());
                let inner = AxiRead {
                    data: data.unwrap_or_default(),
                    resp: if data.is_some() { RESP_OKAY } else { RESP_SLVERR },
                    last: rd.beat + 1 == rd.addr.beats() && !self.drop_rlast,
                };
                Valid::new(!self.burps.r, inner)
            }
            None => Valid::invalid(),
        };

        AxiSlave {
            aw_ready: self.wr.is_none() && self.b.is_none() && !self.burps.aw,
            w_ready: self.wr.is_some() && !self.burps.w,
            b: match self.b {
                Some(resp) => Valid::new(!self.burps.b, AxiResp { resp }),
                None => Valid::invalid(),
            },
            ar_ready: self.rd.is_none() && !self.burps.ar,
            r,
        }
    }
}

impl Component for AxiMemory {
    type Input = AxiMaster;
    type Output = AxiSlave;

    fn comb(&self, _input: &AxiMaster) -> AxiSlave { self.outputs() }

    fn tick(&mut self, input: &AxiMaster, rst: bool) {
        if rst {
            self.burps = Burps::default();
            self.wr = None;
            self.b = None;
            self.rd = None;
            return;
        }

        let slave = self.outputs();

        if input.aw_accepted(&slave) {
            self.aw_log.push(input.aw.inner.clone());
            self.wr = Some(WriteBurst { addr: input.aw.inner.clone(), beat: 0, error: false });
        }

        if input.w_accepted(&slave) {
            if let Some(mut wr) = self.wr.take() {
                let bytes = wr.addr.bytes_per_beat();
                let addr = wr.addr.addr as usize + wr.beat * bytes;
                let in_burst = wr.beat < wr.addr.beats();
                let written = self.write_lanes(addr, &input.w.inner, bytes);
                let last_ok = input.w.inner.last == (wr.beat + 1 == wr.addr.beats());
                wr.error |= !in_burst || !written || !last_ok;
                wr.beat += 1;

                if input.w.inner.last {
                    let resp = if wr.error { RESP_SLVERR } else { RESP_OKAY };
                    if wr.error {
                        log::warn!("write burst at {:#x} failed", wr.addr.addr);
                    }
                    self.b = Some(resp);
                } else {
                    self.wr = Some(wr);
                }
            }
        }

        if input.b_accepted(&slave) {
            self.b = None;
        }

        if input.ar_accepted(&slave) {
            self.ar_log.push(input.ar.inner.clone());
            self.rd = Some(ReadBurst { addr: input.ar.inner.clone(), beat: 0 });
        }

        if input.r_accepted(&slave) {
            if let Some(rd) = self.rd.as_mut() {
                rd.beat += 1;
                if rd.beat == rd.addr.beats() {
                    self.rd = None;
                }
            }
        }

        self.burps = Burps { aw: self.burp(), w: self.burp(), b: self.burp(), ar: self.burp(), r: self.burp() };
    }
}
