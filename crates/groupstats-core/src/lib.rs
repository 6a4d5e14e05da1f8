//! # GroupStats
//!
//! Usage attribution and ranking for organization groups.
//!
//! Members carry usage totals (requests, credits, LLM calls) and belong to
//! zero or more groups. GroupStats rolls that usage up per group over a date
//! window, ranks groups by credits, and renders the sorted, filtered and
//! paginated table or a CSV export of it.
//!
//! ## Architecture
//!
//! - **Attribution**: per-group aggregation under a full or even-split policy
//! - **Ranking**: credit ranks with the catch-all bucket pinned last
//! - **View**: group filter, toggled sorting, pagination and summary totals
//! - **Export**: spreadsheet-friendly CSV with a byte-order mark
//!
//! ## Quick Start
//!
//! ```bash
//! # Rank groups over December using the bundled demo data
//! groupstats groups --start 2023-12-01 --end 2023-12-31
//!
//! # Write the CSV export
//! groupstats export --start 2023-12-01 --end 2023-12-31
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod attribution;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod models;
pub mod ranking;
pub mod view;

pub use config::Config;
pub use dashboard::{Dashboard, GroupReport};
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::attribution::AttributionPolicy;
    pub use crate::config::Config;
    pub use crate::dashboard::{Dashboard, GroupReport};
    pub use crate::error::{Error, Result};
    pub use crate::export::ExportOptions;
    pub use crate::models::*;
    pub use crate::ranking::{SortDirection, SortField, SortState};
    pub use crate::view::{Summary, ViewPage, ViewState};
}
