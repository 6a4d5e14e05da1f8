//! Ranking and sorting
//!
//! Groups get a stable competitive rank by credits; display sorting reorders
//! a copy without touching those ranks. The catch-all bucket never competes.

mod members;
mod rank;
mod sort;

pub use members::{group_label, rank_members, MemberRankingEntry};
pub use rank::{canonical_order, rank};
pub use sort::{sort_by, SortDirection, SortField, SortState};
