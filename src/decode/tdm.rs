//! TDM audio decoder — edge-by-edge sequential design
//!
//! Processes the capture one clock edge at a time. Each edge shifts the
//! data bit into an accumulator; when enough bits have been collected for
//! one audio sample the decoder emits a [`SampleEvent`] and rotates to the
//! next channel. Frame sync transitions reset the channel rotation and, on
//! the first one ever seen, move the decoder from Unsynchronized to
//! Synchronized.
//!
//! Per-edge order matters and is fixed:
//!   1. Shift the data bit in, bump the bit counter
//!   2. If synchronized and the sample is complete, emit it and start the
//!      next span at this edge
//!   3. Apply frame sync tracking, which may override step 2's counters on
//!      the very same edge — frame start always wins
//!
//! An edge that both completes a sample and starts a frame therefore emits
//! first and resets afterwards; reordering those would drop or duplicate
//! boundary samples.

use crate::annotate::AnnotationSink;
use crate::capture::SignalSource;
use crate::decode::scanner::EdgeScanner;
use crate::decode::types::{EdgeSample, SampleEvent, SampleLabels, SamplingEdge, TdmConfig};
use crate::Result;
use tracing::{debug, trace};

/// Mutable decode-pass state, exclusively owned by one [`TdmDecoder`]
///
/// Zeroed at construction and discarded with the decoder; nothing is
/// process-wide or shared between passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecoderState {
    /// Channel rotation counter, taken mod channels_per_frame when used
    pub current_channel: u32,
    /// Bits collected so far, MSB first
    pub bit_accumulator: u32,
    /// Number of bits in the accumulator
    pub bit_count: u32,
    /// Samples emitted so far
    pub sample_count: u64,
    /// Frame sync level at the previous edge
    pub last_frame: bool,
    /// Start of the current sample's span; None until the first frame
    /// boundary has ever been observed
    pub block_start: Option<u64>,
}

impl DecoderState {
    /// Whether the decoder has observed at least one frame boundary
    pub fn is_synchronized(&self) -> bool {
        self.block_start.is_some()
    }
}

/// TDM audio decoder
///
/// Configuration is validated at construction and immutable afterwards.
/// [`TdmDecoder::on_edge`] is the per-edge state machine;
/// [`TdmDecoder::run`] drives it over a whole capture and feeds a sink.
pub struct TdmDecoder {
    config: TdmConfig,
    state: DecoderState,
}

impl TdmDecoder {
    /// Create a decoder, rejecting out-of-range options up front
    ///
    /// Decoding never starts with an invalid width: the modulo and shift
    /// arithmetic in the decode loop relies on the validated ranges.
    pub fn new(config: TdmConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: DecoderState::default(),
        })
    }

    pub fn config(&self) -> &TdmConfig {
        &self.config
    }

    pub fn state(&self) -> &DecoderState {
        &self.state
    }

    /// Samples emitted so far
    pub fn samples_emitted(&self) -> u64 {
        self.state.sample_count
    }

    /// Process one clock edge, possibly completing a sample
    ///
    /// Returns the completed [`SampleEvent`] if this edge finished one.
    /// While Unsynchronized (no frame boundary seen yet) nothing is ever
    /// emitted; that is a valid steady state, not an error.
    pub fn on_edge(&mut self, edge: EdgeSample) -> Option<SampleEvent> {
        let state = &mut self.state;

        // 1. Shift this edge's data bit into the accumulator
        state.bit_accumulator = (state.bit_accumulator << 1) | u32::from(edge.data);
        state.bit_count += 1;

        // 2. Emit if synchronized and the sample is complete
        let mut event = None;
        if let Some(start) = state.block_start {
            if state.bit_count >= self.config.bits_per_sample {
                state.bit_count = 0;

                let channel = state.current_channel % self.config.channels_per_frame;
                event = Some(SampleEvent {
                    channel,
                    start_sample: start,
                    end_sample: edge.sample_index,
                    value: state.bit_accumulator,
                });

                state.bit_accumulator = 0;
                state.sample_count += 1;
                state.current_channel += 1;
                // The next sample's span begins where this one ended
                state.block_start = Some(edge.sample_index);
            }
        } else if state.bit_count > self.config.bits_per_sample {
            // Pre-sync the counter has nothing to complete; clamp it so an
            // arbitrarily long unsynchronized run cannot overflow it. The
            // first frame start overwrites it anyway.
            state.bit_count = self.config.bits_per_sample;
        }

        // 3. Frame sync tracking, after accumulation on the same edge.
        // Note, frame sync may be a single clock, or active for the whole
        // first sample slot of the frame; only the rising transition counts.
        if edge.frame != state.last_frame && edge.frame {
            state.current_channel = 0;
            match self.config.sampling_edge {
                SamplingEdge::First => {
                    // This edge's data bit is the MSB of channel 0's first sample
                    state.bit_count = 1;
                    state.bit_accumulator = u32::from(edge.data);
                }
                SamplingEdge::Second => {
                    // This edge carries no data bit
                    state.bit_count = 0;
                    state.bit_accumulator = 0;
                }
            }
            if state.block_start.is_none() {
                debug!("synchronized at sample {}", edge.sample_index);
                state.block_start = Some(edge.sample_index);
            }
        }
        state.last_frame = edge.frame;

        event
    }

    /// Decode a whole capture, delivering each completed sample to the sink
    ///
    /// One deterministic pass: events reach the sink synchronously, in
    /// nondecreasing end-sample order, before the loop advances to the next
    /// edge. A partially accumulated sample at end of capture is discarded.
    /// Returns the number of samples emitted.
    pub fn run<S, A>(&mut self, source: &mut S, sink: &mut A) -> Result<u64>
    where
        S: SignalSource,
        A: AnnotationSink,
    {
        let mut scanner = EdgeScanner::new(source, self.config.clock_edge);
        let mut emitted: u64 = 0;

        while let Some(edge) = scanner.next_edge()? {
            if let Some(event) = self.on_edge(edge) {
                let labels =
                    SampleLabels::format(event.channel, event.value, self.config.bits_per_sample);
                trace!("#{}: {}", emitted + 1, event);
                sink.annotate(&event, &labels)?;
                emitted += 1;
            }
        }

        debug!("capture exhausted, {} samples emitted", emitted);
        Ok(emitted)
    }
}
