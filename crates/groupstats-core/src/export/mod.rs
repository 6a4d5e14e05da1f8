//! CSV export of group statistics
//!
//! Always exports the full ranked set in canonical credit order, whatever
//! filter, sort or page the table currently shows.

mod serializer;

pub use serializer::{export_filename, serialize, spawn_export, ExportOptions, BOM, HEADERS};
