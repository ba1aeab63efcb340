//! Configuration.

use hdlsim_std::AxisParams;
use thiserror::Error;

use crate::constants::axi_dma::*;

/// Configuration error.
#[allow(missing_docs)]
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("data width should be one of 8, 16, 32, 64, 128 (got {0})")]
    DataWidth(usize),
    #[error("address width should be between 1 and 64 (got {0})")]
    AddrWidth(usize),
    #[error("user width should be at most 64 (got {0})")]
    UserWidth(usize),
    #[error("burst length should be between 1 and 256 beats (got {0})")]
    BurstLen(usize),
}

/// DMA configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DmaConfig {
    /// Address width in bits.
    pub addr_w: usize,
    /// Stream and memory data width in bits.
    pub data_w: usize,
    /// Stream TUSER width in bits.
    pub user_w: usize,
    /// Beats per burst.
    pub burst_len: usize,
    /// Whether the sink carries TKEEP, used as the write strobe.
    pub keep: bool,
}

impl Default for DmaConfig {
    fn default() -> Self {
        Self { addr_w: ADDR_WIDTH, data_w: DATA_WIDTH, user_w: USER_WIDTH, burst_len: BURST_LEN, keep: false }
    }
}

impl DmaConfig {
    /// Creates a new configuration without TKEEP.
    pub fn new(addr_w: usize, data_w: usize, user_w: usize, burst_len: usize) -> Result<Self, ConfigError> {
        let config = Self { addr_w, data_w, user_w, burst_len, keep: false };
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.data_w.is_power_of_two() || !(8..=MAX_DATA_WIDTH).contains(&self.data_w) {
            return Err(ConfigError::DataWidth(self.data_w));
        }
        if !(1..=MAX_ADDR_WIDTH).contains(&self.addr_w) {
            return Err(ConfigError::AddrWidth(self.addr_w));
        }
        if self.user_w > MAX_USER_WIDTH {
            return Err(ConfigError::UserWidth(self.user_w));
        }
        if !(1..=hdlsim_std::MAX_BURST_BEATS).contains(&self.burst_len) {
            return Err(ConfigError::BurstLen(self.burst_len));
        }
        Ok(())
    }

    /// Stream widths.
    pub fn axis(&self) -> AxisParams { AxisParams { data_w: self.data_w, user_w: self.user_w, keep: self.keep } }

    /// Bytes per beat.
    pub fn bytes_per_beat(&self) -> usize { self.data_w / 8 }

    /// Bytes covered by a full burst.
    pub fn burst_bytes(&self) -> u64 { (self.burst_len * self.bytes_per_beat()) as u64 }
}

/// Triple buffer configuration.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TripleBufferConfig {
    /// Configuration of the inner DMA.
    pub dma: DmaConfig,
    /// Read each buffer back at the length it was written with, instead of `rd_len_beats`.
    pub ignore_rd_size_signal: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate() {
        assert!(DmaConfig::default().validate().is_ok());
        assert_eq!(DmaConfig::new(32, 24, 0, 16), Err(ConfigError::DataWidth(24)));
        assert_eq!(DmaConfig::new(32, 256, 0, 16), Err(ConfigError::DataWidth(256)));
        assert_eq!(DmaConfig::new(0, 32, 0, 16), Err(ConfigError::AddrWidth(0)));
        assert_eq!(DmaConfig::new(32, 32, 65, 16), Err(ConfigError::UserWidth(65)));
        assert_eq!(DmaConfig::new(32, 32, 0, 0), Err(ConfigError::BurstLen(0)));
        assert_eq!(DmaConfig::new(32, 32, 0, 257), Err(ConfigError::BurstLen(257)));

        let config = DmaConfig::new(32, 32, 0, 8).unwrap();
        assert_eq!(config.burst_bytes(), 32);
        assert_eq!(config.axis().bytes_per_beat(), 4);
    }
}
