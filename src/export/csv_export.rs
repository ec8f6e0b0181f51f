//! CSV time-series export for network observables.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

use crate::network::NetworkMetrics;

/// CSV exporter for the per-step network observables
pub struct CsvExporter {
    writer: csv::Writer<File>,
    /// Sample interval in simulation steps
    sample_interval_steps: u64,
    /// Step of the last recorded sample
    last_sample_step: Option<u64>,
    /// Path to the output file
    path: PathBuf,
}

impl CsvExporter {
    /// Create a new CSV exporter with the given sample interval.
    ///
    /// Creates the exports directory if it doesn't exist; the filename is
    /// auto-generated with a timestamp.
    pub fn new(sample_interval_steps: u64) -> Result<Self> {
        let dir = PathBuf::from("exports");
        std::fs::create_dir_all(&dir)?;

        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!("timeseries_{}.csv", timestamp);
        Self::at_path(dir.join(filename), sample_interval_steps)
    }

    /// Create an exporter writing to a specific file
    pub fn at_path<P: AsRef<Path>>(path: P, sample_interval_steps: u64) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path)?;
        let writer = csv::Writer::from_writer(file);

        log::info!("CSV export started: {}", path.display());

        Ok(Self {
            writer,
            sample_interval_steps: sample_interval_steps.max(1),
            last_sample_step: None,
            path,
        })
    }

    /// Record a sample if the step interval has elapsed
    pub fn maybe_record(&mut self, metrics: &NetworkMetrics) -> Result<bool> {
        let due = match self.last_sample_step {
            None => true,
            Some(last) => metrics.step - last >= self.sample_interval_steps,
        };
        if due {
            self.writer.serialize(metrics)?;
            self.last_sample_step = Some(metrics.step);
        }
        Ok(due)
    }

    /// Record a sample regardless of the interval
    pub fn record(&mut self, metrics: &NetworkMetrics) -> Result<()> {
        self.writer.serialize(metrics)?;
        self.last_sample_step = Some(metrics.step);
        Ok(())
    }

    /// Flush buffered rows to disk
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Path of the output file
    pub fn path(&self) -> &Path {
        &self.path
    }
}
