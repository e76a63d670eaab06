//! DSLogic .dsl capture file reader
//!
//! Provides [`DslCapture`] - reads DSLogic .dsl capture files (ZIP archives)
//! and exposes the three TDM bus lanes as a [`SignalSource`].
//!
//! Blocks are loaded on demand and cached per (probe, block) pair, so the
//! decoder's forward walk over the capture touches each ~2MB block once per
//! referenced probe.

use crate::capture::{LaneMap, LaneState, SignalSource};
use crate::{Result, TdmError};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use zip::ZipArchive;

/// Header information from a DSL file
#[derive(Debug, Clone)]
pub struct DslHeader {
    /// Total number of probes/channels
    pub total_probes: usize,
    /// Sample rate as a string (e.g., "50 MHz")
    pub samplerate: String,
    /// Sample rate in Hz
    pub samplerate_hz: f64,
    /// Sample period in seconds (1 / sample_rate)
    pub sample_period: f64,
    /// Total number of samples captured
    pub total_samples: u64,
    /// Total number of data blocks
    pub total_blocks: u64,
    /// Samples per block (calculated)
    pub samples_per_block: u64,
    /// Probe names indexed by probe number (0-based)
    pub probe_names: Vec<String>,
}

/// Capture source that reads the TDM bus lanes from a DSLogic .dsl file
///
/// The sample rate is advisory metadata for display purposes; the decode
/// arithmetic works purely in absolute sample indices.
///
/// # Example
/// ```no_run
/// # use tdm_audio::{DslCapture, LaneMap};
/// let capture = DslCapture::open("capture.dsl", LaneMap::new(0, 1, 2))?;
/// # Ok::<(), tdm_audio::TdmError>(())
/// ```
pub struct DslCapture {
    archive: ZipArchive<File>,
    header: DslHeader,
    lanes: LaneMap,
    blocks: HashMap<(usize, u64), Arc<[u8]>>,
    max_samples: Option<u64>,
}

impl DslCapture {
    /// Open a .dsl capture file and map three of its probes to the TDM lanes
    pub fn open<P: AsRef<Path>>(path: P, lanes: LaneMap) -> Result<Self> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;
        let header = Self::parse_header(&mut archive)?;

        if header.total_probes <= lanes.max_probe() {
            return Err(TdmError::InvalidProbe(lanes.max_probe()));
        }

        info!(
            "Opened capture: {} samples at {} across {} probes",
            header.total_samples, header.samplerate, header.total_probes
        );

        Ok(Self {
            archive,
            header,
            lanes,
            blocks: HashMap::new(),
            max_samples: None,
        })
    }

    fn parse_header(archive: &mut ZipArchive<File>) -> Result<DslHeader> {
        let mut header_file = archive
            .by_name("header")
            .map_err(|e| TdmError::ParseHeader(format!("Cannot find header file: {}", e)))?;

        let mut header_content = String::new();
        header_file.read_to_string(&mut header_content)?;
        drop(header_file); // Explicitly drop to release archive borrow

        let mut total_probes: Option<usize> = None;
        let mut samplerate: Option<String> = None;
        let mut total_samples: Option<u64> = None;
        let mut total_blocks: Option<u64> = None;
        let mut probe_names_map: HashMap<usize, String> = HashMap::new();

        for line in header_content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(value) = line.strip_prefix("total probes = ") {
                total_probes = value.parse().ok();
            } else if let Some(value) = line.strip_prefix("samplerate = ") {
                samplerate = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("total samples = ") {
                total_samples = value.parse().ok();
            } else if let Some(value) = line.strip_prefix("total blocks = ") {
                total_blocks = value.parse().ok();
            } else if line.starts_with("probe") {
                if let Some((probe_part, name)) = line.split_once(" = ") {
                    if let Some(num_str) = probe_part.strip_prefix("probe") {
                        if let Ok(probe_num) = num_str.parse::<usize>() {
                            probe_names_map.insert(probe_num, name.to_string());
                        }
                    }
                }
            }
        }

        let total_probes =
            total_probes.ok_or_else(|| TdmError::MissingField("total probes".to_string()))?;
        let samplerate =
            samplerate.ok_or_else(|| TdmError::MissingField("samplerate".to_string()))?;
        let total_samples =
            total_samples.ok_or_else(|| TdmError::MissingField("total samples".to_string()))?;
        let total_blocks =
            total_blocks.ok_or_else(|| TdmError::MissingField("total blocks".to_string()))?;

        let samplerate_hz = Self::parse_sample_rate(&samplerate)
            .ok_or_else(|| TdmError::ParseHeader(format!("Invalid sample rate: {}", samplerate)))?;
        let sample_period = 1.0 / samplerate_hz;

        // Determine actual block size by reading the first block (blocks are fixed-size except last)
        let samples_per_block = {
            let block_name = "L-0/0";
            let mut file = archive
                .by_name(block_name)
                .map_err(|_| TdmError::ParseHeader("Could not read first block".to_string()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .map_err(|_| TdmError::ParseHeader("Could not read first block data".to_string()))?;
            (buf.len() * 8) as u64 // Convert bytes to bits/samples
        };

        debug!(
            "File has {} samples across {} blocks ({} samples/block standard size)",
            total_samples, total_blocks, samples_per_block
        );

        let probe_names = (0..total_probes)
            .map(|i| {
                probe_names_map
                    .get(&i)
                    .cloned()
                    .unwrap_or_else(|| format!("Probe{}", i))
            })
            .collect();

        Ok(DslHeader {
            total_probes,
            samplerate,
            samplerate_hz,
            sample_period,
            total_samples,
            total_blocks,
            samples_per_block,
            probe_names,
        })
    }

    /// Get the header information
    pub fn header(&self) -> &DslHeader {
        &self.header
    }

    /// Get the lane-to-probe mapping
    pub fn lanes(&self) -> LaneMap {
        self.lanes
    }

    /// Get the sample rate in Hz (advisory, not used for decoding)
    pub fn samplerate_hz(&self) -> f64 {
        self.header.samplerate_hz
    }

    /// Get the sample period in seconds
    pub fn sample_period(&self) -> f64 {
        self.header.sample_period
    }

    /// Get the total capture duration in seconds
    pub fn capture_duration(&self) -> f64 {
        self.header.total_samples as f64 * self.header.sample_period
    }

    /// Limit the number of samples exposed to the decoder (builder pattern)
    pub fn with_max_samples(mut self, max_samples: Option<u64>) -> Self {
        self.max_samples = max_samples;
        self
    }

    /// Read a single bit from a specific probe at a specific position
    pub fn read_bit(&mut self, probe: usize, position: u64) -> Result<bool> {
        if probe >= self.header.total_probes {
            return Err(TdmError::InvalidProbe(probe));
        }
        if position >= self.header.total_samples {
            return Err(TdmError::OutOfBounds(position));
        }

        let block_num = position / self.header.samples_per_block;
        if block_num >= self.header.total_blocks {
            return Err(TdmError::OutOfBounds(position));
        }

        let sample_in_block = (position % self.header.samples_per_block) as usize;

        let key = (probe, block_num);
        if let Some(data) = self.blocks.get(&key) {
            return Ok(Self::get_bit(data, sample_in_block));
        }

        // Load block from the archive and cache it
        let block_name = format!("L-{}/{}", probe, block_num);
        let mut file = self
            .archive
            .by_name(&block_name)
            .map_err(|_| TdmError::InvalidBlock(block_num))?;
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        let data = Arc::<[u8]>::from(data);
        drop(file);

        let result = Self::get_bit(&data, sample_in_block);
        self.blocks.insert(key, data);

        Ok(result)
    }

    // ── Associated Functions (Helpers) ──────────────────────────────────

    /// Extract a single bit from a byte array at the given bit index
    #[inline]
    fn get_bit(data: &[u8], bit_index: usize) -> bool {
        let byte_index = bit_index / 8;
        let bit_offset = bit_index % 8;

        if byte_index < data.len() {
            (data[byte_index] >> bit_offset) & 1 == 1
        } else {
            false
        }
    }

    /// Parse a sample rate string (e.g., "50 MHz") into Hz
    fn parse_sample_rate(samplerate: &str) -> Option<f64> {
        let parts: Vec<&str> = samplerate.split_whitespace().collect();
        if parts.len() >= 2 {
            if let Ok(value) = parts[0].parse::<f64>() {
                let multiplier = match parts[1] {
                    "GHz" => 1_000_000_000.0,
                    "MHz" => 1_000_000.0,
                    "KHz" | "kHz" => 1_000.0,
                    "Hz" => 1.0,
                    _ => return None,
                };
                return Some(value * multiplier);
            }
        }
        None
    }
}

impl SignalSource for DslCapture {
    fn total_samples(&self) -> u64 {
        self.max_samples
            .unwrap_or(self.header.total_samples)
            .min(self.header.total_samples)
    }

    fn read(&mut self, index: u64) -> Result<LaneState> {
        if index >= self.total_samples() {
            return Err(TdmError::OutOfBounds(index));
        }
        let lanes = self.lanes;
        Ok(LaneState {
            clock: self.read_bit(lanes.clock, index)?,
            frame: self.read_bit(lanes.frame, index)?,
            data: self.read_bit(lanes.data, index)?,
        })
    }
}
