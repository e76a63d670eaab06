//! TDM audio decoder for DSLogic logic analyzer captures
//!
//! This library decodes a Time-Division-Multiplexed serial audio bus capture
//! (bit clock, frame sync, serial data) into per-channel sample events with
//! exact start/end sample extents, suitable for one display row per channel.
//!
//! # Architecture
//!
//! - **Captures**: [`DslCapture`] streams bits from DSLogic .dsl files with
//!   on-demand ZIP block reads; [`MemoryCapture`] holds synthetic traces
//! - **EdgeScanner**: lazy pull-based walk over clock edges of one polarity
//! - **TdmDecoder**: the per-edge state machine (bit accumulation, frame
//!   sync tracking, channel rotation)
//! - **Sinks**: [`AnnotationSink`] implementations route completed samples
//!   to display rows, logs, or CSV
//!
//! # Example
//!
//! ```no_run
//! use tdm_audio::{DslCapture, LaneMap, TdmConfig, TdmDecoder, VecSink};
//!
//! let mut capture = DslCapture::open("capture.dsl", LaneMap::new(0, 1, 2))?;
//! let mut decoder = TdmDecoder::new(TdmConfig::default())?;
//! let mut sink = VecSink::new();
//! let emitted = decoder.run(&mut capture, &mut sink)?;
//! println!("{} samples decoded", emitted);
//! # Ok::<(), tdm_audio::TdmError>(())
//! ```

use thiserror::Error;

pub mod annotate;
pub mod capture;
pub mod decode;

// Re-export capture types
pub use capture::dsl_file::{DslCapture, DslHeader};
pub use capture::{LaneMap, LaneState, MemoryCapture, SignalSource};

// Re-export decoder types
pub use decode::{
    ClockEdge, DecoderState, EdgeSample, EdgeScanner, SampleEvent, SampleLabels, SamplingEdge,
    TdmConfig, TdmDecoder, MAX_CHANNELS,
};

// Re-export annotation sinks
pub use annotate::{AnnotationPrinter, AnnotationSink, CsvAnnotationWriter, VecSink};

#[derive(Error, Debug)]
pub enum TdmError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Header parsing error: {0}")]
    ParseHeader(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid probe number: {0}")]
    InvalidProbe(usize),

    #[error("Invalid block number: {0}")]
    InvalidBlock(u64),

    #[error("Position out of bounds: {0}")]
    OutOfBounds(u64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Annotation sink error: {0}")]
    Sink(String),
}

pub type Result<T> = std::result::Result<T, TdmError>;
