//! Annotation sinks
//!
//! A sink receives each completed [`SampleEvent`] exactly once, in emission
//! order, together with its three precomputed label variants. Sinks are
//! called synchronously from the decode loop and never feed back into
//! decoder state.

use crate::decode::types::{SampleEvent, SampleLabels};
use crate::{Result, TdmError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Destination for completed sample annotations
pub trait AnnotationSink {
    /// Deliver one completed sample with its label variants
    ///
    /// Called at most once per event, in nondecreasing end-sample order.
    fn annotate(&mut self, event: &SampleEvent, labels: &SampleLabels) -> Result<()>;
}

/// Sink that collects events and labels in memory
///
/// Used by tests and replay comparisons; also convenient when a caller
/// wants the whole event sequence before rendering.
#[derive(Debug, Default)]
pub struct VecSink {
    pub events: Vec<SampleEvent>,
    pub labels: Vec<SampleLabels>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotationSink for VecSink {
    fn annotate(&mut self, event: &SampleEvent, labels: &SampleLabels) -> Result<()> {
        self.events.push(*event);
        self.labels.push(labels.clone());
        Ok(())
    }
}

/// Sink that logs annotations, one display row per channel
///
/// The row index equals the channel index, matching the per-channel
/// annotation rows of the DSView display.
pub struct AnnotationPrinter {
    count: u64,
}

impl AnnotationPrinter {
    pub fn new() -> Self {
        Self { count: 0 }
    }

    /// Annotations printed so far
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl Default for AnnotationPrinter {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationSink for AnnotationPrinter {
    fn annotate(&mut self, event: &SampleEvent, labels: &SampleLabels) -> Result<()> {
        self.count += 1;
        info!(
            "#{}: row {} [{}..{}] {}",
            self.count, event.channel, event.start_sample, event.end_sample, labels.full
        );
        Ok(())
    }
}

/// Sink that writes annotations to a CSV file
pub struct CsvAnnotationWriter {
    writer: BufWriter<File>,
    count: u64,
}

impl CsvAnnotationWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        writeln!(writer, "Id,Channel,Start,End,Value")
            .map_err(|e| TdmError::Sink(format!("CSV write error: {}", e)))?;

        Ok(Self { writer, count: 0 })
    }

    /// Rows written so far
    pub fn count(&self) -> u64 {
        self.count
    }
}

impl AnnotationSink for CsvAnnotationWriter {
    fn annotate(&mut self, event: &SampleEvent, labels: &SampleLabels) -> Result<()> {
        self.count += 1;
        writeln!(
            self.writer,
            "{},{},{},{},{}",
            self.count, event.channel, event.start_sample, event.end_sample, labels.numeric
        )
        .map_err(|e| TdmError::Sink(format!("CSV write error: {}", e)))?;
        Ok(())
    }
}

impl Drop for CsvAnnotationWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event() -> (SampleEvent, SampleLabels) {
        let event = SampleEvent {
            channel: 3,
            start_sample: 10,
            end_sample: 42,
            value: 0xaa,
        };
        let labels = SampleLabels::format(event.channel, event.value, 16);
        (event, labels)
    }

    #[test]
    fn test_vec_sink_keeps_order() {
        let mut sink = VecSink::new();
        let (event, labels) = sample_event();
        sink.annotate(&event, &labels).unwrap();

        let later = SampleEvent {
            start_sample: 42,
            end_sample: 74,
            ..event
        };
        sink.annotate(&later, &labels).unwrap();

        assert_eq!(sink.events.len(), 2);
        assert_eq!(sink.events[0], event);
        assert_eq!(sink.events[1], later);
        assert_eq!(sink.labels[0].full, "Channel 3: 00aa");
    }

    #[test]
    fn test_printer_counts() {
        let mut sink = AnnotationPrinter::new();
        let (event, labels) = sample_event();
        sink.annotate(&event, &labels).unwrap();
        sink.annotate(&event, &labels).unwrap();
        assert_eq!(sink.count(), 2);
    }

    #[test]
    fn test_csv_writer_output() {
        let dir = std::env::temp_dir().join("tdm_audio_csv_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("annotations.csv");

        {
            let mut sink = CsvAnnotationWriter::create(&path).unwrap();
            let (event, labels) = sample_event();
            sink.annotate(&event, &labels).unwrap();
            assert_eq!(sink.count(), 1);
        }

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "Id,Channel,Start,End,Value");
        assert_eq!(lines.next().unwrap(), "1,3,10,42,3: 00aa");
        std::fs::remove_file(&path).unwrap();
    }
}
