//! Capture sources for the TDM decoder
//!
//! A capture exposes three synchronized digital traces — bit clock, frame
//! sync, serial data — indexed by absolute sample number. Two sources are
//! provided:
//!
//! - [`DslCapture`]: reads DSLogic .dsl capture files (ZIP archives with
//!   per-probe packed-bit blocks)
//! - [`MemoryCapture`]: holds synthetic traces built in memory, used by
//!   tests and waveform generators

pub mod dsl_file;
pub mod memory;

pub use dsl_file::{DslCapture, DslHeader};
pub use memory::MemoryCapture;

use crate::Result;

/// The three TDM bus lanes at one sample position
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneState {
    /// Bit clock level
    pub clock: bool,
    /// Frame sync level
    pub frame: bool,
    /// Serial data level
    pub data: bool,
}

/// Maps capture probe indices to the three TDM lanes
///
/// DSLogic captures carry up to 16 probes; the decoder only cares about
/// three of them. The default follows the original channel order:
/// probe 0 = clock, probe 1 = frame sync, probe 2 = data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneMap {
    /// Probe carrying the bit clock
    pub clock: usize,
    /// Probe carrying the frame sync
    pub frame: usize,
    /// Probe carrying the serial data
    pub data: usize,
}

impl LaneMap {
    pub fn new(clock: usize, frame: usize, data: usize) -> Self {
        Self { clock, frame, data }
    }

    /// Highest probe index referenced by this mapping
    pub fn max_probe(&self) -> usize {
        self.clock.max(self.frame).max(self.data)
    }
}

impl Default for LaneMap {
    fn default() -> Self {
        Self::new(0, 1, 2)
    }
}

/// A finite capture of three synchronized digital traces
///
/// Implementations must return stable values: reading the same index twice
/// yields the same `LaneState`. Lane values are strictly binary; a capture
/// that cannot guarantee that is not a valid source.
pub trait SignalSource {
    /// Total number of samples in the capture
    fn total_samples(&self) -> u64;

    /// Read all three lanes at an absolute sample index
    ///
    /// Returns `TdmError::OutOfBounds` for `index >= total_samples()`.
    fn read(&mut self, index: u64) -> Result<LaneState>;
}
