//! Packet rate limiter.

use super::*;

/// Rate limiter inputs.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxisRateLimiterInput {
    /// Sink.
    pub s_axis: AxisValid<AxisBeat>,
    /// Source.
    pub m_axis: AxisReady,
    /// Minimum number of cycles between the starts of two packets.
    pub max_cycles_per_packet: u32,
}

#[derive(Debug, Clone, Signal)]
struct RateLimiterState {
    /// Cycles until the next packet may start.
    counter: u32,
    /// The next beat starts a packet.
    sop: bool,
}

fn step(input: &AxisRateLimiterInput, s: &RateLimiterState) -> (AxisStageOutput<AxisBeat>, RateLimiterState) {
    // A packet may only start when the counter reached zero. Inside a packet, beats flow freely.
    let connected = !s.sop || s.counter == 0;

    let output = if connected {
        AxisStageOutput { s_axis: input.m_axis, m_axis: input.s_axis.clone() }
    } else {
        AxisStageOutput { s_axis: AxisReady::stall(), m_axis: AxisValid::tinvalid() }
    };
    let accepted = input.s_axis.accepted(&output.s_axis);

    let next = RateLimiterState {
        counter: if accepted && s.sop {
            input.max_cycles_per_packet.saturating_sub(1)
        } else {
            s.counter.saturating_sub(1)
        },
        sop: if accepted { input.s_axis.inner.tlast } else { s.sop },
    };

    (output, next)
}

/// Limits the rate at which packets start on an AXI4-Stream channel.
#[derive(Debug)]
pub struct AxisPacketRateLimiter {
    inner: Fsm<AxisRateLimiterInput, AxisStageOutput<AxisBeat>, RateLimiterState>,
}

impl Default for AxisPacketRateLimiter {
    fn default() -> Self { Self::new() }
}

impl AxisPacketRateLimiter {
    /// Creates a new rate limiter.
    pub fn new() -> Self {
        Self { inner: Fsm::new("axis_packet_rate_limiter", step, RateLimiterState { counter: 0, sop: true }) }
    }
}

impl Component for AxisPacketRateLimiter {
    type Input = AxisRateLimiterInput;
    type Output = AxisStageOutput<AxisBeat>;

    fn comb(&self, input: &AxisRateLimiterInput) -> AxisStageOutput<AxisBeat> { self.inner.comb(input) }

    fn tick(&mut self, input: &AxisRateLimiterInput, rst: bool) { self.inner.tick(input, rst) }

    fn trace(&self, prefix: &str, tracer: &mut Tracer) { self.inner.trace(prefix, tracer) }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: AxisParams = AxisParams { data_w: 32, user_w: 0, keep: false };

    #[test]
    fn packets_start_at_limited_rate() {
        let mut master = StreamMaster::new(PARAMS);
        let mut slave = StreamSlave::new(PARAMS);
        let mut limiter = AxisPacketRateLimiter::new();
        for _ in 0..3 {
            master.send_frame(&[1, 2]);
        }

        for _ in 0..40 {
            let input = AxisRateLimiterInput {
                s_axis: master.outputs(),
                m_axis: slave.outputs(),
                max_cycles_per_packet: 10,
            };
            let output = limiter.comb(&input);
            master.tick(&output.s_axis, false);
            slave.tick(&output.m_axis, false);
            limiter.tick(&input, false);
        }

        let starts = slave.frames().iter().map(|frame| frame.first_cycle).collect::<Vec<_>>();
        assert_eq!(starts.len(), 3);
        assert_eq!(starts[1] - starts[0], 10);
        assert_eq!(starts[2] - starts[1], 10);
        // Beats inside a packet are not delayed.
        assert!(slave.frames().iter().all(|frame| frame.last_cycle == frame.first_cycle + 1));
    }
}
