//! TDM decode pipeline
//!
//! One deterministic pass over a capture: [`EdgeScanner`] pulls clock edges
//! of the configured polarity, [`TdmDecoder`] accumulates data bits and
//! tracks frame sync, completed samples go to an annotation sink.

pub mod scanner;
pub mod tdm;
pub mod types;

// Re-export common types
pub use types::{
    ClockEdge, EdgeSample, SampleEvent, SampleLabels, SamplingEdge, TdmConfig, MAX_CHANNELS,
};

// Re-export the decoder and scanner
pub use scanner::EdgeScanner;
pub use tdm::{DecoderState, TdmDecoder};
