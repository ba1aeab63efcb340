//! AXI4-Stream testbench drivers.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

/// Drives queued beats on an AXI4-Stream channel.
#[derive(Debug)]
pub struct StreamMaster {
    params: AxisParams,
    queue: VecDeque<AxisBeat>,
    rng: StdRng,
    idle: f64,
    burp: bool,
    sent: usize,
}

impl StreamMaster {
    /// Creates a new driver which asserts TVALID whenever a beat is queued.
    pub fn new(params: AxisParams) -> Self {
        Self { params, queue: VecDeque::new(), rng: StdRng::seed_from_u64(0), idle: 0.0, burp: false, sent: 0 }
    }

    /// Inserts random idle cycles: TVALID is deasserted with the given probability in each cycle.
    #[must_use]
    pub fn with_idle(mut self, probability: f64, seed: u64) -> Self {
        self.idle = probability;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Queues a beat.
    pub fn send_beat(&mut self, beat: AxisBeat) { self.queue.push_back(self.params.mask(&beat)); }

    /// Queues a frame. TLAST is asserted on its final beat.
    pub fn send_frame(&mut self, data: &[u128]) {
        for (i, tdata) in data.iter().enumerate() {
            self.send_beat(AxisBeat::new(*tdata, i + 1 == data.len()));
        }
    }

    /// Queues a frame whose final beat lacks TLAST.
    pub fn send_frame_without_last(&mut self, data: &[u128]) {
        for tdata in data {
            self.send_beat(AxisBeat::new(*tdata, false));
        }
    }

    /// Number of queued beats.
    pub fn pending(&self) -> usize { self.queue.len() }

    /// Returns whether every queued beat was sent.
    pub fn is_idle(&self) -> bool { self.queue.is_empty() }

    /// Number of beats sent.
    pub fn sent(&self) -> usize { self.sent }

    /// Signals driven in this cycle.
    pub fn outputs(&self) -> AxisValid<AxisBeat> {
        match self.queue.front() {
            Some(beat) if !self.burp => AxisValid::new(true, beat.clone()),
            _ => AxisValid::tinvalid(),
        }
    }
}

impl Component for StreamMaster {
    type Input = AxisReady;
    type Output = AxisValid<AxisBeat>;

    fn comb(&self, _input: &AxisReady) -> AxisValid<AxisBeat> { self.outputs() }

    fn tick(&mut self, input: &AxisReady, rst: bool) {
        if rst {
            self.burp = false;
            return;
        }

        if self.outputs().accepted(input) {
            self.queue.pop_front();
            self.sent += 1;
        }
        self.burp = self.idle > 0.0 && self.rng.gen_bool(self.idle);
    }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) { tracer.probe(prefix, &self.outputs()); }
}

/// Frame received by a [`StreamSlave`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Beats in arrival order.
    pub beats: Vec<AxisBeat>,
    /// Cycle in which the first beat was accepted.
    pub first_cycle: u64,
    /// Cycle in which the last beat was accepted.
    pub last_cycle: u64,
}

impl Frame {
    /// TDATA of every beat.
    pub fn data(&self) -> Vec<u128> { self.beats.iter().map(|beat| beat.tdata).collect() }
}

/// Receives frames from an AXI4-Stream channel.
#[derive(Debug)]
pub struct StreamSlave {
    params: AxisParams,
    rng: StdRng,
    stall: f64,
    burp: bool,
    frame_limit: Option<usize>,
    cycle: u64,
    current: Vec<AxisBeat>,
    first_cycle: u64,
    frames: Vec<Frame>,
    received: usize,
}

impl StreamSlave {
    /// Creates a new driver which always asserts TREADY.
    pub fn new(params: AxisParams) -> Self {
        Self {
            params,
            rng: StdRng::seed_from_u64(0),
            stall: 0.0,
            burp: false,
            frame_limit: None,
            cycle: 0,
            current: Vec::new(),
            first_cycle: 0,
            frames: Vec::new(),
            received: 0,
        }
    }

    /// Inserts random stalls: TREADY is deasserted with the given probability in each cycle.
    #[must_use]
    pub fn with_stall(mut self, probability: f64, seed: u64) -> Self {
        self.stall = probability;
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Stops accepting beats once `limit` frames were received. `None` removes the limit.
    pub fn set_frame_limit(&mut self, limit: Option<usize>) { self.frame_limit = limit; }

    /// Received frames.
    pub fn frames(&self) -> &[Frame] { &self.frames }

    /// Removes and returns the received frames.
    pub fn take_frames(&mut self) -> Vec<Frame> { std::mem::take(&mut self.frames) }

    /// Beats of the frame being received.
    pub fn partial(&self) -> &[AxisBeat] { &self.current }

    /// Number of beats received.
    pub fn received(&self) -> usize { self.received }

    /// Signals driven in this cycle.
    pub fn outputs(&self) -> AxisReady {
        let full = self.frame_limit.map_or(false, |limit| self.frames.len() >= limit);
        AxisReady::new(!self.burp && !full)
    }
}

impl Component for StreamSlave {
    type Input = AxisValid<AxisBeat>;
    type Output = AxisReady;

    fn comb(&self, _input: &AxisValid<AxisBeat>) -> AxisReady { self.outputs() }

    fn tick(&mut self, input: &AxisValid<AxisBeat>, rst: bool) {
        self.cycle += 1;
        if rst {
            self.burp = false;
            return;
        }

        if input.accepted(&self.outputs()) {
            if self.current.is_empty() {
                self.first_cycle = self.cycle;
            }
            self.current.push(self.params.mask(&input.inner));
            self.received += 1;

            if input.inner.tlast {
                log::debug!("frame received: {} beats", self.current.len());
                let beats = std::mem::take(&mut self.current);
                self.frames.push(Frame { beats, first_cycle: self.first_cycle, last_cycle: self.cycle });
            }
        }
        self.burp = self.stall > 0.0 && self.rng.gen_bool(self.stall);
    }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) { tracer.probe(prefix, &self.outputs()); }
}
