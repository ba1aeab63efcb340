//! FIFO.

use std::collections::VecDeque;

use super::*;

/// Synchronous AXI4-Stream FIFO.
///
/// The sink is ready while the FIFO is not full and the source is valid while it is not empty. Both are registered,
/// so a beat spends at least one cycle in the FIFO. Both ports are in the same clock domain.
#[derive(Debug)]
pub struct AxisFifo<V: Signal> {
    depth: usize,
    queue: VecDeque<V>,
}

impl<V: Signal + Default> AxisFifo<V> {
    /// Creates a new FIFO holding up to `depth` beats.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn new(depth: usize) -> Self {
        assert!(depth > 0, "FIFO depth should be positive");
        Self { depth, queue: VecDeque::with_capacity(depth) }
    }

    /// Number of stored beats.
    pub fn len(&self) -> usize { self.queue.len() }

    /// Returns whether the FIFO is empty.
    pub fn is_empty(&self) -> bool { self.queue.is_empty() }

    /// Signals driven in this cycle.
    pub fn outputs(&self) -> AxisStageOutput<V> {
        let m_axis = match self.queue.front() {
            Some(beat) => AxisValid::new(true, beat.clone()),
            None => AxisValid::tinvalid(),
        };
        AxisStageOutput { s_axis: AxisReady::new(self.queue.len() < self.depth), m_axis }
    }
}

impl<V: Signal + Default> Component for AxisFifo<V> {
    type Input = AxisStageInput<V>;
    type Output = AxisStageOutput<V>;

    fn comb(&self, _input: &AxisStageInput<V>) -> AxisStageOutput<V> { self.outputs() }

    fn tick(&mut self, input: &AxisStageInput<V>, rst: bool) {
        if rst {
            self.queue.clear();
            return;
        }

        let output = self.outputs();
        if output.m_axis.accepted(&input.m_axis) {
            self.queue.pop_front();
        }
        if input.s_axis.accepted(&output.s_axis) {
            self.queue.push_back(input.s_axis.inner.clone());
        }
    }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) {
        tracer.probe(&format!("{}_count", prefix), &(self.queue.len() as u32));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(tvalid: bool, tdata: u128, tready: bool) -> AxisStageInput<AxisBeat> {
        AxisStageInput { s_axis: AxisValid::new(tvalid, AxisBeat::new(tdata, false)), m_axis: AxisReady::new(tready) }
    }

    #[test]
    fn fills_and_drains_in_order() {
        let mut fifo = AxisFifo::<AxisBeat>::new(2);
        assert!(!fifo.outputs().m_axis.tvalid);

        fifo.tick(&input(true, 1, false), false);
        fifo.tick(&input(true, 2, false), false);
        assert_eq!(fifo.len(), 2);
        assert!(!fifo.outputs().s_axis.tready);

        // Full: the offered beat is not taken.
        fifo.tick(&input(true, 3, true), false);
        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.outputs().m_axis.inner.tdata, 2);

        // Simultaneous push and pop.
        fifo.tick(&input(true, 3, true), false);
        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.outputs().m_axis.inner.tdata, 3);

        fifo.tick(&input(false, 0, true), true);
        assert!(fifo.is_empty());
    }
}
