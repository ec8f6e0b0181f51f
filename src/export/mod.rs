//! Export functionality for simulation data.
//!
//! Provides CSV time-series export and JSON snapshot export of the
//! network observables.

mod csv_export;
mod json_export;

pub use csv_export::CsvExporter;
pub use json_export::{export_metrics_json, export_metrics_json_to};
