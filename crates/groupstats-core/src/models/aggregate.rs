//! Per-group aggregate model

use std::fmt;

use serde::{Deserialize, Serialize};

use super::GroupDefinition;

/// Competitive position of a group by credits
///
/// `Unranked` is the catch-all sentinel: it orders after every numbered rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Rank {
    /// 1-based rank among regular groups
    Ranked(u32),
    /// Outside the ranking (catch-all, or not ranked yet)
    #[default]
    Unranked,
}

impl Rank {
    /// The numeric rank, if any
    pub fn number(self) -> Option<u32> {
        match self {
            Self::Ranked(n) => Some(n),
            Self::Unranked => None,
        }
    }
}

impl From<Option<u32>> for Rank {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Self::Unranked, Self::Ranked)
    }
}

impl From<Rank> for Option<u32> {
    fn from(rank: Rank) -> Self {
        rank.number()
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ranked(n) => write!(f, "{n}"),
            Self::Unranked => f.write_str("-"),
        }
    }
}

/// Usage statistics for one group over a window
///
/// Derived and recomputed on every input change; equality is structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupAggregate {
    /// Group identifier
    pub group_id: String,

    /// Group display name
    pub name: String,

    /// Whether this is the unassigned bucket
    pub is_catch_all: bool,

    /// Current members of the group, regardless of the window
    pub total_members: u64,

    /// Members whose last activity falls inside the window
    pub active_members: u64,

    /// Requests attributed to the group
    pub requests: u64,

    /// Credits attributed to the group
    pub credits: u64,

    /// LLM calls attributed to the group
    pub llm_calls: u64,

    /// `round(credits / total_members)`, or 0 for an empty group
    pub avg_per_member: u64,

    /// Position by credits among regular groups
    pub rank: Rank,
}

impl GroupAggregate {
    /// A zeroed aggregate for a group definition
    pub fn empty(group: &GroupDefinition) -> Self {
        Self {
            group_id: group.id.clone(),
            name: group.name.clone(),
            is_catch_all: group.is_catch_all,
            total_members: 0,
            active_members: 0,
            requests: 0,
            credits: 0,
            llm_calls: 0,
            avg_per_member: 0,
            rank: Rank::Unranked,
        }
    }

    /// Share of members active in the window, 0.0 for an empty group
    pub fn active_ratio(&self) -> f64 {
        if self.total_members == 0 {
            0.0
        } else {
            self.active_members as f64 / self.total_members as f64
        }
    }
}
