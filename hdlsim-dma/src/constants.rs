//! Constants for DMA modules.

/// Constants for `axi_dma`.
pub mod axi_dma {
    use hdlsim_std::MAX_BURST_BEATS;
    use static_assertions::*;

    /// Default address width.
    pub const ADDR_WIDTH: usize = 40;
    /// Default data width.
    pub const DATA_WIDTH: usize = 128;
    /// Default TUSER width.
    pub const USER_WIDTH: usize = 0;
    /// Default burst length in beats.
    pub const BURST_LEN: usize = 256;
    /// Width of AxQOS.
    pub const QOS_WIDTH: usize = 4;

    /// Maximum address width.
    pub const MAX_ADDR_WIDTH: usize = 64;
    /// Maximum data width.
    pub const MAX_DATA_WIDTH: usize = 128;
    /// Maximum TUSER width.
    pub const MAX_USER_WIDTH: usize = 64;

    const_assert!(BURST_LEN <= MAX_BURST_BEATS);
    const_assert!(DATA_WIDTH <= MAX_DATA_WIDTH);
    const_assert!(DATA_WIDTH.is_power_of_two());
    const_assert!(QOS_WIDTH <= 8);
}

/// Constants for `triple_buffer`.
pub mod triple_buffer {
    use static_assertions::*;

    /// Number of buffers.
    pub const N_BUFFERS: u8 = 3;
    /// Buffer written first after reset.
    pub const INIT_WR_BUFFER: u8 = 1;
    /// Buffer read first after reset.
    pub const INIT_RD_BUFFER: u8 = 0;

    const_assert!(INIT_WR_BUFFER != INIT_RD_BUFFER);
    const_assert!(INIT_WR_BUFFER < N_BUFFERS && INIT_RD_BUFFER < N_BUFFERS);
}
