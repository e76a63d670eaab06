//! In-memory capture source
//!
//! [`MemoryCapture`] holds three synthetic traces built sample by sample,
//! packed LSB-first like DSLogic block data. Used by tests and waveform
//! generators; also handy for feeding the decoder from non-file sources.

use crate::capture::{LaneState, SignalSource};
use crate::{Result, TdmError};

/// Builder-style in-memory capture of the three TDM lanes
#[derive(Clone, Debug, Default)]
pub struct MemoryCapture {
    clock: Vec<u8>,
    frame: Vec<u8>,
    data: Vec<u8>,
    len: u64,
}

impl MemoryCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one sample position to all three lanes
    pub fn push(&mut self, clock: bool, frame: bool, data: bool) {
        Self::push_bit(&mut self.clock, self.len, clock);
        Self::push_bit(&mut self.frame, self.len, frame);
        Self::push_bit(&mut self.data, self.len, data);
        self.len += 1;
    }

    /// Append one full bit clock cycle: a low clock sample followed by a
    /// high clock sample carrying `frame` and `data`.
    ///
    /// The rising edge lands on the second sample, so with
    /// `ClockEdge::Rising` the decoder sees exactly one edge per call.
    pub fn push_cycle(&mut self, frame: bool, data: bool) {
        self.push(false, frame, data);
        self.push(true, frame, data);
    }

    /// Number of sample positions in the capture
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Return a copy with every clock sample inverted, other lanes untouched
    pub fn with_inverted_clock(&self) -> Self {
        let mut inverted = self.clone();
        for byte in &mut inverted.clock {
            *byte = !*byte;
        }
        inverted
    }

    // Packed LSB-first within each byte, matching the DSLogic block format
    fn push_bit(lane: &mut Vec<u8>, index: u64, value: bool) {
        let byte_index = (index / 8) as usize;
        let bit_offset = index % 8;
        if byte_index >= lane.len() {
            lane.push(0);
        }
        if value {
            lane[byte_index] |= 1 << bit_offset;
        }
    }

    #[inline]
    fn get_bit(lane: &[u8], index: u64) -> bool {
        let byte_index = (index / 8) as usize;
        let bit_offset = index % 8;
        (lane[byte_index] >> bit_offset) & 1 == 1
    }
}

impl SignalSource for MemoryCapture {
    fn total_samples(&self) -> u64 {
        self.len
    }

    fn read(&mut self, index: u64) -> Result<LaneState> {
        if index >= self.len {
            return Err(TdmError::OutOfBounds(index));
        }
        Ok(LaneState {
            clock: Self::get_bit(&self.clock, index),
            frame: Self::get_bit(&self.frame, index),
            data: Self::get_bit(&self.data, index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_read_back() {
        let mut capture = MemoryCapture::new();
        capture.push(true, false, true);
        capture.push(false, true, false);
        capture.push(true, true, true);

        assert_eq!(capture.total_samples(), 3);

        let s0 = capture.read(0).unwrap();
        assert_eq!(s0, LaneState { clock: true, frame: false, data: true });
        let s1 = capture.read(1).unwrap();
        assert_eq!(s1, LaneState { clock: false, frame: true, data: false });
        let s2 = capture.read(2).unwrap();
        assert_eq!(s2, LaneState { clock: true, frame: true, data: true });
    }

    #[test]
    fn test_read_out_of_bounds() {
        let mut capture = MemoryCapture::new();
        capture.push(false, false, false);
        assert!(matches!(capture.read(1), Err(TdmError::OutOfBounds(1))));
        assert!(matches!(
            MemoryCapture::new().read(0),
            Err(TdmError::OutOfBounds(0))
        ));
    }

    #[test]
    fn test_push_crosses_byte_boundary() {
        let mut capture = MemoryCapture::new();
        for i in 0..12u64 {
            capture.push(i % 2 == 0, false, i % 3 == 0);
        }
        assert_eq!(capture.total_samples(), 12);
        for i in 0..12u64 {
            let s = capture.read(i).unwrap();
            assert_eq!(s.clock, i % 2 == 0, "clock at {}", i);
            assert_eq!(s.data, i % 3 == 0, "data at {}", i);
            assert!(!s.frame);
        }
    }

    #[test]
    fn test_push_cycle_places_rising_edge_on_second_sample() {
        let mut capture = MemoryCapture::new();
        capture.push_cycle(true, true);
        assert_eq!(capture.total_samples(), 2);
        assert!(!capture.read(0).unwrap().clock);
        assert!(capture.read(1).unwrap().clock);
        assert!(capture.read(1).unwrap().frame);
        assert!(capture.read(1).unwrap().data);
    }

    #[test]
    fn test_inverted_clock_flips_only_clock() {
        let mut capture = MemoryCapture::new();
        capture.push_cycle(true, false);
        capture.push_cycle(false, true);

        let mut inverted = capture.with_inverted_clock();
        for i in 0..capture.len() {
            let a = capture.read(i).unwrap();
            let b = inverted.read(i).unwrap();
            assert_eq!(a.clock, !b.clock, "clock at {}", i);
            assert_eq!(a.frame, b.frame, "frame at {}", i);
            assert_eq!(a.data, b.data, "data at {}", i);
        }
    }
}
