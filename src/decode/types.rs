//! Common decoder types: configuration, edge samples, events, labels

use crate::{Result, TdmError};
use std::fmt;

/// Maximum number of channels a TDM frame can multiplex
pub const MAX_CHANNELS: u32 = 8;

/// Clock polarity to sample on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockEdge {
    /// Sample on rising clock edges
    #[default]
    Rising,
    /// Sample on falling clock edges
    Falling,
}

/// Whether the frame sync assertion edge carries the first data bit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SamplingEdge {
    /// The frame sync edge's data bit is the MSB of channel 0's first sample
    #[default]
    First,
    /// The frame sync edge carries no data bit; accumulation starts on the
    /// following edge
    Second,
}

/// TDM decoder configuration, immutable once decoding starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TdmConfig {
    /// Bits per audio sample (1-32)
    pub bits_per_sample: u32,
    /// Channels multiplexed per frame (1-8)
    pub channels_per_frame: u32,
    /// Clock edge to sample on
    pub clock_edge: ClockEdge,
    /// Sampling edge policy for the frame sync edge
    pub sampling_edge: SamplingEdge,
}

impl Default for TdmConfig {
    fn default() -> Self {
        Self {
            bits_per_sample: 16,
            channels_per_frame: MAX_CHANNELS,
            clock_edge: ClockEdge::Rising,
            sampling_edge: SamplingEdge::First,
        }
    }
}

impl TdmConfig {
    /// Reject out-of-range options before any decoding happens
    ///
    /// A zero channel count or an accumulator-overflowing bit depth would
    /// make the decode loop's modulo/shift arithmetic invalid, so these are
    /// refused up front.
    pub fn validate(&self) -> Result<()> {
        if !(1..=32).contains(&self.bits_per_sample) {
            return Err(TdmError::InvalidConfig(format!(
                "bits per sample must be 1-32, got {}",
                self.bits_per_sample
            )));
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels_per_frame) {
            return Err(TdmError::InvalidConfig(format!(
                "channels per frame must be 1-{}, got {}",
                MAX_CHANNELS, self.channels_per_frame
            )));
        }
        Ok(())
    }
}

/// One clock edge of the configured polarity, with the frame and data lane
/// values observed at that sample position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSample {
    /// Absolute sample index of the edge
    pub sample_index: u64,
    /// Clock level after the transition
    pub clock: bool,
    /// Frame sync level at the edge
    pub frame: bool,
    /// Serial data level at the edge
    pub data: bool,
}

/// One completed audio sample, spanning a range of capture positions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleEvent {
    /// Channel index within the frame (0-based)
    pub channel: u32,
    /// Sample position where this value's span begins
    pub start_sample: u64,
    /// Sample position of the edge that completed the value
    pub end_sample: u64,
    /// Accumulated bits, MSB first
    pub value: u32,
}

impl fmt::Display for SampleEvent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "SampleEvent[ch={}, span={}..{}, value={:#x}]",
            self.channel, self.start_sample, self.end_sample, self.value
        )
    }
}

/// The three label variants shown for a sample annotation, longest first
///
/// Pure presentation: a function of `(channel, value, bits_per_sample)`
/// only, independent of decoder state. The hex width is 2, 4 or 8 digits
/// for bit depths of up to 8, up to 16, and beyond.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleLabels {
    /// e.g. "Channel 3: 00aa"
    pub full: String,
    /// e.g. "C3: 00aa"
    pub short: String,
    /// e.g. "3: 00aa"
    pub numeric: String,
}

impl SampleLabels {
    pub fn format(channel: u32, value: u32, bits_per_sample: u32) -> Self {
        let v = if bits_per_sample <= 8 {
            format!("{:02x}", value)
        } else if bits_per_sample <= 16 {
            format!("{:04x}", value)
        } else {
            format!("{:08x}", value)
        };

        Self {
            full: format!("Channel {}: {}", channel, v),
            short: format!("C{}: {}", channel, v),
            numeric: format!("{}: {}", channel, v),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TdmConfig::default();
        assert_eq!(config.bits_per_sample, 16);
        assert_eq!(config.channels_per_frame, 8);
        assert_eq!(config.clock_edge, ClockEdge::Rising);
        assert_eq!(config.sampling_edge, SamplingEdge::First);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_bits_per_sample_range() {
        for bits in [1, 8, 16, 24, 32] {
            let config = TdmConfig {
                bits_per_sample: bits,
                ..TdmConfig::default()
            };
            assert!(config.validate().is_ok(), "bits={}", bits);
        }
        for bits in [0, 33, 64] {
            let config = TdmConfig {
                bits_per_sample: bits,
                ..TdmConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(TdmError::InvalidConfig(_))),
                "bits={}",
                bits
            );
        }
    }

    #[test]
    fn test_validate_channels_per_frame_range() {
        for channels in 1..=MAX_CHANNELS {
            let config = TdmConfig {
                channels_per_frame: channels,
                ..TdmConfig::default()
            };
            assert!(config.validate().is_ok(), "channels={}", channels);
        }
        for channels in [0, 9, 100] {
            let config = TdmConfig {
                channels_per_frame: channels,
                ..TdmConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(TdmError::InvalidConfig(_))),
                "channels={}",
                channels
            );
        }
    }

    #[test]
    fn test_label_hex_width_follows_bit_depth() {
        let labels = SampleLabels::format(0, 0xaa, 8);
        assert_eq!(labels.full, "Channel 0: aa");

        let labels = SampleLabels::format(1, 0xaa, 16);
        assert_eq!(labels.full, "Channel 1: 00aa");

        let labels = SampleLabels::format(2, 0xaa, 24);
        assert_eq!(labels.full, "Channel 2: 000000aa");
    }

    #[test]
    fn test_label_variants() {
        let labels = SampleLabels::format(5, 0xbeef, 16);
        assert_eq!(labels.full, "Channel 5: beef");
        assert_eq!(labels.short, "C5: beef");
        assert_eq!(labels.numeric, "5: beef");
    }
}
