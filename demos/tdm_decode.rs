//! Example: TDM audio decoding
//!
//! Decodes a TDM audio bus from a DSLogic capture and prints one annotation
//! per channel sample.
//!
//! Usage:
//!   cargo run --release --example tdm_decode -- \
//!       --file capture.dsl \
//!       --clock 0 --frame 1 --data 2 \
//!       --bits 16 --channels 8
//!
//! With CSV output:
//!   cargo run --release --example tdm_decode -- \
//!       --file capture.dsl \
//!       --clock 0 --frame 1 --data 2 \
//!       --csv-output samples.csv

use clap::Parser;
use tdm_audio::{
    AnnotationPrinter, AnnotationSink, ClockEdge, CsvAnnotationWriter, DslCapture, LaneMap,
    Result, SampleEvent, SampleLabels, SamplingEdge, TdmConfig, TdmDecoder,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to DSL file
    #[arg(short, long)]
    file: String,

    /// Probe carrying the bit clock
    #[arg(long, default_value = "0")]
    clock: usize,

    /// Probe carrying the frame sync
    #[arg(long, default_value = "1")]
    frame: usize,

    /// Probe carrying the serial data
    #[arg(long, default_value = "2")]
    data: usize,

    /// Bits per sample (1-32)
    #[arg(long, default_value = "16")]
    bits: u32,

    /// Channels per frame (1-8)
    #[arg(long, default_value = "8")]
    channels: u32,

    /// Sample on falling clock edges instead of rising
    #[arg(long)]
    falling: bool,

    /// The frame sync edge carries no data bit (second-edge sampling)
    #[arg(long)]
    second_edge: bool,

    /// Limit the number of capture samples to read (0 = whole capture)
    #[arg(long, default_value = "0")]
    max_samples: u64,

    /// CSV output file path (optional)
    #[arg(long)]
    csv_output: Option<String>,
}

/// Prints every annotation and optionally mirrors it to a CSV file
struct DemoSink {
    printer: AnnotationPrinter,
    csv: Option<CsvAnnotationWriter>,
}

impl AnnotationSink for DemoSink {
    fn annotate(&mut self, event: &SampleEvent, labels: &SampleLabels) -> Result<()> {
        self.printer.annotate(event, labels)?;
        if let Some(csv) = &mut self.csv {
            csv.annotate(event, labels)?;
        }
        Ok(())
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    info!("=== TDM Audio Decode Example ===");
    info!("File: {}", args.file);
    info!(
        "Lanes: clock={}, frame={}, data={}",
        args.clock, args.frame, args.data
    );

    let lanes = LaneMap::new(args.clock, args.frame, args.data);
    let max_samples = (args.max_samples > 0).then_some(args.max_samples);
    let mut capture = DslCapture::open(&args.file, lanes)?.with_max_samples(max_samples);

    info!(
        "Capture: {} samples at {} ({:.3}s)",
        capture.header().total_samples,
        capture.header().samplerate,
        capture.capture_duration()
    );

    let config = TdmConfig {
        bits_per_sample: args.bits,
        channels_per_frame: args.channels,
        clock_edge: if args.falling {
            ClockEdge::Falling
        } else {
            ClockEdge::Rising
        },
        sampling_edge: if args.second_edge {
            SamplingEdge::Second
        } else {
            SamplingEdge::First
        },
    };
    let mut decoder = TdmDecoder::new(config)?;

    let csv = match &args.csv_output {
        Some(path) => {
            info!("CSV output: {}", path);
            Some(CsvAnnotationWriter::create(path)?)
        }
        None => None,
    };
    let mut sink = DemoSink {
        printer: AnnotationPrinter::new(),
        csv,
    };

    info!("Decoding...");
    let emitted = decoder.run(&mut capture, &mut sink)?;

    info!("Done! {} samples decoded", emitted);

    Ok(())
}
