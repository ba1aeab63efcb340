//! AXI4 memory-mapped interface.
//!
//! The signals of one AXI4 port are split by the side that drives them: [`AxiMaster`] carries everything the master
//! drives and [`AxiSlave`] everything the slave drives.

use hdlsim_macro::Signal;

use crate::*;

/// Incrementing burst.
pub const BURST_TYPE_INCR: u8 = 0b01;

/// AxCACHE bufferable bit.
pub const CACHE_BUFFERABLE: u8 = 0b0001;

/// AxCACHE cacheable (modifiable) bit.
pub const CACHE_CACHEABLE: u8 = 0b0010;

/// Normal access success.
pub const RESP_OKAY: u8 = 0b00;

/// Slave error.
pub const RESP_SLVERR: u8 = 0b10;

/// Maximum number of beats in an incrementing burst.
pub const MAX_BURST_BEATS: usize = 256;

/// Payload of the write address (AW) and read address (AR) channels.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiAddr {
    /// AxADDR
    pub addr: u64,
    /// AxLEN: number of beats minus one.
    pub len: u8,
    /// AxSIZE: log2 of bytes per beat.
    pub size: u8,
    /// AxBURST
    pub burst: u8,
    /// AxCACHE
    pub cache: u8,
    /// AxQOS
    pub qos: u8,
}

impl AxiAddr {
    /// Number of beats in the burst.
    pub fn beats(&self) -> usize { usize::from(self.len) + 1 }

    /// Bytes per beat.
    pub fn bytes_per_beat(&self) -> usize { 1 << self.size }
}

/// Payload of the write data (W) channel.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiWrite {
    /// WDATA
    pub data: u128,
    /// WSTRB
    pub strb: u16,
    /// WLAST
    pub last: bool,
}

/// Payload of the write response (B) channel.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiResp {
    /// BRESP
    pub resp: u8,
}

/// Payload of the read data (R) channel.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiRead {
    /// RDATA
    pub data: u128,
    /// RRESP
    pub resp: u8,
    /// RLAST
    pub last: bool,
}

/// Signals driven by an AXI4 master.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiMaster {
    /// AW channel: AWVALID and payload.
    pub aw: Valid<AxiAddr>,
    /// W channel: WVALID and payload.
    pub w: Valid<AxiWrite>,
    /// BREADY
    pub b_ready: bool,
    /// AR channel: ARVALID and payload.
    pub ar: Valid<AxiAddr>,
    /// RREADY
    pub r_ready: bool,
}

/// Signals driven by an AXI4 slave.
#[derive(Debug, Default, Clone, PartialEq, Eq, Signal)]
pub struct AxiSlave {
    /// AWREADY
    pub aw_ready: bool,
    /// WREADY
    pub w_ready: bool,
    /// B channel: BVALID and payload.
    pub b: Valid<AxiResp>,
    /// ARREADY
    pub ar_ready: bool,
    /// R channel: RVALID and payload.
    pub r: Valid<AxiRead>,
}

impl AxiMaster {
    /// Whether an AW transfer happens in this cycle.
    pub fn aw_accepted(&self, slave: &AxiSlave) -> bool { self.aw.accepted(slave.aw_ready) }

    /// Whether a W transfer happens in this cycle.
    pub fn w_accepted(&self, slave: &AxiSlave) -> bool { self.w.accepted(slave.w_ready) }

    /// Whether a B transfer happens in this cycle.
    pub fn b_accepted(&self, slave: &AxiSlave) -> bool { slave.b.accepted(self.b_ready) }

    /// Whether an AR transfer happens in this cycle.
    pub fn ar_accepted(&self, slave: &AxiSlave) -> bool { self.ar.accepted(slave.ar_ready) }

    /// Whether an R transfer happens in this cycle.
    pub fn r_accepted(&self, slave: &AxiSlave) -> bool { slave.r.accepted(self.r_ready) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_names() {
        let names = AxiMaster::port_decls()
            .iter_with_prefix(Some("m_axi".to_string()))
            .filter_map(|(name, _)| name)
            .collect::<Vec<_>>();
        let aw = ["addr", "len", "size", "burst", "cache", "qos", "valid"].map(|name| format!("m_axi_aw_{}", name));
        assert_eq!(&names[..7], &aw[..]);
        assert!(names.contains(&"m_axi_w_strb".to_string()));
        assert!(names.contains(&"m_axi_r_ready".to_string()));

        let names = AxiSlave::port_decls().iter().filter_map(|(name, _)| name).collect::<Vec<_>>();
        let expected =
            ["aw_ready", "w_ready", "b_resp", "b_valid", "ar_ready", "r_data", "r_resp", "r_last", "r_valid"];
        assert_eq!(names, expected.map(String::from));
    }

    #[test]
    fn handshakes() {
        let master = AxiMaster { aw: Valid::valid(AxiAddr::default()), b_ready: true, ..Default::default() };
        let slave = AxiSlave { aw_ready: true, b: Valid::valid(AxiResp { resp: RESP_OKAY }), ..Default::default() };
        assert!(master.aw_accepted(&slave));
        assert!(master.b_accepted(&slave));
        assert!(!master.w_accepted(&slave));
        assert!(!master.ar_accepted(&slave));
        assert_eq!(AxiAddr { len: 255, size: 4, ..Default::default() }.beats(), 256);
        assert_eq!(AxiAddr { size: 4, ..Default::default() }.bytes_per_beat(), 16);
    }
}
