//! Cycle-accurate components.

use std::fmt::Debug;

use crate::trace::Tracer;

/// A synchronous hardware block evaluated one clock cycle at a time.
///
/// Evaluation of a cycle is split into two phases. `comb` computes the combinational outputs from the current
/// registered state and the inputs sampled in this cycle, without side effects. `tick` then commits the rising clock
/// edge. Both phases must see the same `input`.
///
/// Reset is synchronous and active-high from the component's point of view: when `rst` is asserted at `tick`, every
/// register returns to its initial value regardless of `input`.
pub trait Component: Debug {
    /// Inputs sampled every cycle.
    type Input: Clone + Debug;

    /// Outputs driven every cycle.
    type Output: Clone + Debug;

    /// Combinational outputs for the current cycle.
    fn comb(&self, input: &Self::Input) -> Self::Output;

    /// Commits the rising clock edge.
    fn tick(&mut self, input: &Self::Input, rst: bool);

    /// Records the registered state into `tracer`, with signal names prefixed by `prefix`.
    fn trace(&self, _prefix: &str, _tracer: &mut Tracer) {}
}
