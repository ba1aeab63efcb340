//! Clocked simulation driver.

use std::path::Path;

use thiserror::Error;

use crate::*;

/// Simulation error.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum SimError {
    #[error("condition not met within {cycles} cycles")]
    Timeout { cycles: u64 },
    #[error("tracing is not enabled")]
    NoTracer,
    #[error(transparent)]
    Trace(#[from] TraceError),
}

/// Polarity of the reset pin of the design under test.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolarity {
    /// Reset is asserted when the pin is high.
    #[default]
    ActiveHigh,
    /// Reset is asserted when the pin is low.
    ActiveLow,
}

impl ResetPolarity {
    /// Returns whether the pin level `pin` asserts reset.
    pub fn is_asserted(self, pin: bool) -> bool {
        match self {
            Self::ActiveHigh => pin,
            Self::ActiveLow => !pin,
        }
    }

    /// Pin level which asserts (`asserted == true`) or deasserts reset.
    pub fn level(self, asserted: bool) -> bool { self.is_asserted(asserted) }
}

/// A closed system of components driven by a common clock.
pub trait Bench {
    /// Evaluates one clock cycle: combinational settling followed by the rising edge.
    fn cycle(&mut self, rst: bool);

    /// Records the current state into `tracer`.
    fn trace(&self, _tracer: &mut Tracer) {}
}

/// Clocked simulation of a `Bench`.
#[derive(Debug)]
pub struct Simulator<B: Bench> {
    bench: B,
    cycles: u64,
    polarity: ResetPolarity,
    tracer: Option<Tracer>,
}

impl<B: Bench> Simulator<B> {
    /// Creates a new simulator.
    pub fn new(bench: B) -> Self { Self { bench, cycles: 0, polarity: ResetPolarity::default(), tracer: None } }

    /// Sets the polarity used by `drive_reset_pin`.
    #[must_use]
    pub fn with_polarity(mut self, polarity: ResetPolarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Enables waveform tracing.
    #[must_use]
    pub fn with_tracer(mut self, tracer: Tracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    /// The simulated system.
    pub fn bench(&self) -> &B { &self.bench }

    /// The simulated system, mutably. Use it to drive stimulus between cycles.
    pub fn bench_mut(&mut self) -> &mut B { &mut self.bench }

    /// Consumes the simulator, returning the simulated system.
    pub fn into_bench(self) -> B { self.bench }

    /// Number of elapsed clock cycles.
    pub fn cycles(&self) -> u64 { self.cycles }

    fn clock(&mut self, rst: bool) {
        self.bench.cycle(rst);
        self.cycles += 1;

        if let Some(tracer) = self.tracer.as_mut() {
            tracer.advance(self.cycles);
            self.bench.trace(tracer);
        }
    }

    /// Holds reset asserted for `cycles` cycles.
    pub fn reset(&mut self, cycles: u64) {
        log::info!("reset for {} cycles", cycles);
        for _ in 0..cycles {
            self.clock(true);
        }
    }

    /// Evaluates one clock cycle with the reset pin at level `pin`, interpreted with the configured polarity.
    pub fn drive_reset_pin(&mut self, pin: bool) { self.clock(self.polarity.is_asserted(pin)); }

    /// Evaluates one clock cycle.
    pub fn step(&mut self) { self.clock(false); }

    /// Evaluates `cycles` clock cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Steps until `cond` holds, for at most `max_cycles` cycles. Returns the number of cycles stepped.
    pub fn run_until<F>(&mut self, mut cond: F, max_cycles: u64) -> Result<u64, SimError>
    where F: FnMut(&B) -> bool {
        for stepped in 0..=max_cycles {
            if cond(&self.bench) {
                return Ok(stepped);
            }
            if stepped < max_cycles {
                self.step();
            }
        }

        log::warn!("timeout after {} cycles at cycle {}", max_cycles, self.cycles);
        Err(SimError::Timeout { cycles: max_cycles })
    }

    /// Recorded waveform, if tracing is enabled.
    pub fn tracer_mut(&mut self) -> Option<&mut Tracer> { self.tracer.as_mut() }

    /// Writes the recorded waveform to `path`.
    pub fn save_trace<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SimError> {
        let tracer = some_or!(self.tracer.as_mut(), return Err(SimError::NoTracer));
        tracer.save(path)?;
        Ok(())
    }
}
