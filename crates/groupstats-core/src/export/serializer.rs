//! Spreadsheet-friendly CSV rendering

use csv::{QuoteStyle, Terminator, WriterBuilder};
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ExportConfig;
use crate::error::{Error, Result};
use crate::models::{DateWindow, GroupAggregate, DATE_FORMAT};
use crate::ranking::canonical_order;

/// UTF-8 byte-order mark, so spreadsheet apps pick the right encoding
pub const BOM: &str = "\u{feff}";

/// Fixed header row
pub const HEADERS: [&str; 7] = [
    "Rank",
    "Group Name",
    "Total Members",
    "Active Members",
    "Total Queries",
    "LLM Calls",
    "LLM Credit Usage",
];

/// Export settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    /// Prefix the output with [`BOM`]
    pub include_bom: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self { include_bom: true }
    }
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            include_bom: config.include_bom,
        }
    }
}

/// One CSV record, in [`HEADERS`] order
#[derive(Debug, Serialize)]
struct ExportRow {
    rank: String,
    /// Already wrapped in quotes
    group_name: String,
    total_members: u64,
    /// `active/total`
    active_members: String,
    total_queries: u64,
    llm_calls: u64,
    credits: u64,
}

impl From<&GroupAggregate> for ExportRow {
    fn from(aggregate: &GroupAggregate) -> Self {
        Self {
            // catch-all renders as "-"
            rank: aggregate.rank.to_string(),
            group_name: quoted(&aggregate.name),
            total_members: aggregate.total_members,
            active_members: format!("{}/{}", aggregate.active_members, aggregate.total_members),
            total_queries: aggregate.requests,
            llm_calls: aggregate.llm_calls,
            credits: aggregate.credits,
        }
    }
}

/// `"value"` with embedded quotes doubled
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render ranked aggregates as CSV bytes.
///
/// Rows follow canonical rank order regardless of input order. The group name
/// is always quoted; no other field can hold a separator, so the writer never
/// adds quotes itself. Lines end in `\n`.
pub fn serialize(aggregates: &[GroupAggregate], options: &ExportOptions) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    if options.include_bom {
        out.extend_from_slice(BOM.as_bytes());
    }

    let mut wtr = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(out);

    wtr.write_record(HEADERS)?;
    for aggregate in canonical_order(aggregates) {
        wtr.serialize(ExportRow::from(aggregate))?;
    }

    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    debug!(rows = aggregates.len(), bytes = bytes.len(), "Serialized group export");
    Ok(bytes)
}

/// Serialize on the blocking pool so the caller can show progress meanwhile.
///
/// Takes an owned snapshot; the aggregates it was cloned from stay usable.
pub fn spawn_export(
    aggregates: Vec<GroupAggregate>,
    options: ExportOptions,
) -> JoinHandle<Result<Vec<u8>>> {
    tokio::task::spawn_blocking(move || {
        let bytes = serialize(&aggregates, &options)?;
        info!(groups = aggregates.len(), "Group export ready");
        Ok(bytes)
    })
}

/// `{prefix}_{start}_{end}.csv`
pub fn export_filename(prefix: &str, window: &DateWindow) -> String {
    format!(
        "{prefix}_{}_{}.csv",
        window.start.format(DATE_FORMAT),
        window.end.format(DATE_FORMAT)
    )
}
