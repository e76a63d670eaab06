//! Edge scanner — lazy pull-based walk over clock edges
//!
//! [`EdgeScanner`] advances through a [`SignalSource`] looking for clock
//! transitions of one polarity and yields an [`EdgeSample`] per match with
//! the frame and data lanes read at the same position. The sequence is
//! finite and not restartable; once the source is exhausted every further
//! call returns `Ok(None)`.

use crate::capture::SignalSource;
use crate::decode::types::{ClockEdge, EdgeSample};
use crate::Result;
use tracing::trace;

pub struct EdgeScanner<'a, S: SignalSource> {
    source: &'a mut S,
    edge: ClockEdge,
    /// Next position to examine
    position: u64,
    /// Clock level at `position - 1`, None before the first read
    prev_clock: Option<bool>,
}

impl<'a, S: SignalSource> EdgeScanner<'a, S> {
    pub fn new(source: &'a mut S, edge: ClockEdge) -> Self {
        Self {
            source,
            edge,
            position: 0,
            prev_clock: None,
        }
    }

    /// Advance to the next matching clock edge
    ///
    /// Returns `Ok(None)` when the capture ends; that is the normal
    /// termination of the sequence, not an error. The sample at index 0
    /// only seeds the previous clock level, so the earliest possible edge
    /// is at index 1.
    pub fn next_edge(&mut self) -> Result<Option<EdgeSample>> {
        let total = self.source.total_samples();

        let mut prev = match self.prev_clock {
            Some(level) => level,
            None => {
                if total == 0 {
                    return Ok(None);
                }
                let first = self.source.read(0)?;
                self.position = 1;
                self.prev_clock = Some(first.clock);
                first.clock
            }
        };

        while self.position < total {
            let index = self.position;
            let lanes = self.source.read(index)?;
            self.position += 1;

            let matched = match self.edge {
                ClockEdge::Rising => !prev && lanes.clock,
                ClockEdge::Falling => prev && !lanes.clock,
            };
            prev = lanes.clock;
            self.prev_clock = Some(lanes.clock);

            if matched {
                trace!(
                    "edge at {}: frame={} data={}",
                    index,
                    lanes.frame as u8,
                    lanes.data as u8
                );
                return Ok(Some(EdgeSample {
                    sample_index: index,
                    clock: lanes.clock,
                    frame: lanes.frame,
                    data: lanes.data,
                }));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MemoryCapture;

    fn clock_only(levels: &[bool]) -> MemoryCapture {
        let mut capture = MemoryCapture::new();
        for &level in levels {
            capture.push(level, false, false);
        }
        capture
    }

    #[test]
    fn test_rising_edges_at_expected_positions() {
        // Rising edges at indices 1 and 5
        let mut capture = clock_only(&[false, true, true, false, false, true]);
        let mut scanner = EdgeScanner::new(&mut capture, ClockEdge::Rising);

        let e = scanner.next_edge().unwrap().unwrap();
        assert_eq!(e.sample_index, 1);
        assert!(e.clock);

        let e = scanner.next_edge().unwrap().unwrap();
        assert_eq!(e.sample_index, 5);

        assert!(scanner.next_edge().unwrap().is_none());
    }

    #[test]
    fn test_falling_edges_at_expected_positions() {
        let mut capture = clock_only(&[true, false, false, true, false]);
        let mut scanner = EdgeScanner::new(&mut capture, ClockEdge::Falling);

        assert_eq!(scanner.next_edge().unwrap().unwrap().sample_index, 1);
        assert_eq!(scanner.next_edge().unwrap().unwrap().sample_index, 4);
        assert!(scanner.next_edge().unwrap().is_none());
    }

    #[test]
    fn test_exhausted_scanner_stays_exhausted() {
        let mut capture = clock_only(&[false, true]);
        let mut scanner = EdgeScanner::new(&mut capture, ClockEdge::Rising);
        assert!(scanner.next_edge().unwrap().is_some());
        assert!(scanner.next_edge().unwrap().is_none());
        assert!(scanner.next_edge().unwrap().is_none());
    }

    #[test]
    fn test_empty_and_single_sample_sources() {
        let mut empty = MemoryCapture::new();
        let mut scanner = EdgeScanner::new(&mut empty, ClockEdge::Rising);
        assert!(scanner.next_edge().unwrap().is_none());

        // One sample seeds the previous level; no edge can exist yet
        let mut single = clock_only(&[true]);
        let mut scanner = EdgeScanner::new(&mut single, ClockEdge::Rising);
        assert!(scanner.next_edge().unwrap().is_none());
    }

    #[test]
    fn test_constant_clock_yields_no_edges() {
        let mut capture = clock_only(&[true; 16]);
        let mut scanner = EdgeScanner::new(&mut capture, ClockEdge::Rising);
        assert!(scanner.next_edge().unwrap().is_none());

        let mut scanner = EdgeScanner::new(&mut capture, ClockEdge::Falling);
        assert!(scanner.next_edge().unwrap().is_none());
    }

    #[test]
    fn test_edge_carries_frame_and_data_lanes() {
        let mut capture = MemoryCapture::new();
        capture.push(false, false, false);
        capture.push(true, true, false); // rising edge, frame asserted
        capture.push(false, false, false);
        capture.push(true, false, true); // rising edge, data high

        let mut scanner = EdgeScanner::new(&mut capture, ClockEdge::Rising);
        let e = scanner.next_edge().unwrap().unwrap();
        assert!(e.frame);
        assert!(!e.data);
        let e = scanner.next_edge().unwrap().unwrap();
        assert!(!e.frame);
        assert!(e.data);
    }
}
