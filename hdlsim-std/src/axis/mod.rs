//! AXI4-Stream interface.

use hdlsim_macro::Signal;

use crate::*;

mod driver;
mod fifo;
mod rate_limiter;

pub use driver::{Frame, StreamMaster, StreamSlave};
pub use fifo::AxisFifo;
pub use rate_limiter::{AxisPacketRateLimiter, AxisRateLimiterInput};

/// AXI4-Stream payload of one beat.
///
/// Fields are sized for the widest supported stream; bits above the configured widths are zero. See
/// [`AxisParams::mask`].
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxisBeat {
    /// AXI4-Stream TDATA
    pub tdata: u128,

    /// AXI4-Stream TUSER
    pub tuser: u64,

    /// AXI4-Stream TKEEP
    pub tkeep: u16,

    /// AXI4-Stream TLAST
    pub tlast: bool,
}

impl AxisBeat {
    /// Creates a beat carrying `tdata`.
    pub fn new(tdata: u128, tlast: bool) -> Self { Self { tdata, tlast, ..Default::default() } }
}

/// Valid/ready channel's forward signals.
///
/// # Note
///
/// Try to use `Valid<V>` when the valid bit is not used as TVALID signal of AXI4-Stream protocol.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxisValid<V: Signal> {
    /// Inner data
    #[member(name = "")]
    pub inner: V,

    /// AXI4-Stream TVALID
    pub tvalid: bool,
}

impl<V: Signal> AxisValid<V> {
    /// Creates a new value.
    pub fn new(tvalid: bool, inner: V) -> Self { Self { inner, tvalid } }

    /// Returns whether the beat is transferred given the consumer's `tready`.
    pub fn accepted(&self, ready: &AxisReady) -> bool { accepted(self.tvalid, ready.tready) }
}

impl<V: Signal + Default> AxisValid<V> {
    /// Creates an invalid value. This is what a null source drives.
    pub fn tinvalid() -> Self { Self::default() }
}

impl AxisValid<AxisBeat> {
    /// Returns whether the beat is transferred and is the last beat of a packet.
    pub fn accepted_last(&self, ready: &AxisReady) -> bool { self.accepted(ready) && self.inner.tlast }
}

/// Valid/ready channel's backward signals.
///
/// # Note
///
/// Try to use `Ready` when the ready bit is not used as TREADY signal of AXI4-Stream protocol.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Signal)]
pub struct AxisReady {
    /// AXI4-Stream TREADY
    pub tready: bool,
}

impl AxisReady {
    /// Creates a new value.
    pub fn new(tready: bool) -> Self { Self { tready } }

    /// What a null sink drives. It accepts and drops every beat.
    pub fn null_sink() -> Self { Self::new(true) }

    /// What a disconnected sink drives.
    pub fn stall() -> Self { Self::new(false) }
}

/// Signals sampled by a stream stage: the payload from its producer and the ready from its consumer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxisStageInput<V: Signal> {
    /// Sink.
    pub s_axis: AxisValid<V>,
    /// Source.
    pub m_axis: AxisReady,
}

/// Signals driven by a stream stage: the ready to its producer and the payload to its consumer.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxisStageOutput<V: Signal> {
    /// Sink.
    pub s_axis: AxisReady,
    /// Source.
    pub m_axis: AxisValid<V>,
}

/// Widths of an AXI4-Stream channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisParams {
    /// TDATA width in bits.
    pub data_w: usize,
    /// TUSER width in bits.
    pub user_w: usize,
    /// Whether TKEEP is present.
    pub keep: bool,
}

impl AxisParams {
    /// Bytes per beat.
    pub fn bytes_per_beat(&self) -> usize { self.data_w / 8 }

    /// TKEEP with every byte lane enabled.
    pub fn full_keep(&self) -> u16 { mask(self.bytes_per_beat()) as u16 }

    /// Clears the bits of `beat` above the configured widths. Without TKEEP, every byte lane is kept.
    pub fn mask(&self, beat: &AxisBeat) -> AxisBeat {
        AxisBeat {
            tdata: beat.tdata & mask(self.data_w),
            tuser: beat.tuser & mask(self.user_w) as u64,
            tkeep: if self.keep { beat.tkeep & self.full_keep() } else { self.full_keep() },
            tlast: beat.tlast,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_names() {
        let names = AxisValid::<AxisBeat>::port_decls()
            .iter_with_prefix(Some("s_axis".to_string()))
            .map(|(name, width)| (name.unwrap(), width))
            .collect::<Vec<_>>();
        let expected = [("tdata", 128), ("tuser", 64), ("tkeep", 16), ("tlast", 1), ("tvalid", 1)]
            .iter()
            .map(|(name, width)| (format!("s_axis_{}", name), *width))
            .collect::<Vec<_>>();
        assert_eq!(names, expected);
        assert_eq!(AxisValid::<AxisBeat>::WIDTH, 210);
    }

    #[test]
    fn params_mask() {
        let params = AxisParams { data_w: 32, user_w: 4, keep: false };
        let beat = AxisBeat { tdata: u128::MAX, tuser: 0xff, tkeep: 0, tlast: true };
        assert_eq!(params.mask(&beat), AxisBeat { tdata: 0xffff_ffff, tuser: 0xf, tkeep: 0xf, tlast: true });

        let params = AxisParams { data_w: 128, user_w: 0, keep: true };
        let beat = AxisBeat { tdata: 1, tuser: 1, tkeep: 0x00ff, tlast: false };
        assert_eq!(params.mask(&beat), AxisBeat { tdata: 1, tuser: 0, tkeep: 0x00ff, tlast: false });
        assert_eq!(params.full_keep(), 0xffff);
    }

    #[test]
    fn handshake() {
        let beat = AxisValid::new(true, AxisBeat::new(7, true));
        assert!(beat.accepted_last(&AxisReady::null_sink()));
        assert!(!beat.accepted(&AxisReady::stall()));
        assert!(!AxisValid::<AxisBeat>::tinvalid().accepted(&AxisReady::null_sink()));
    }
}
