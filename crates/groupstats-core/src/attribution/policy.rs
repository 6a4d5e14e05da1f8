//! Attribution policies for multi-group members

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::Member;

/// How a member's usage is distributed across the groups they belong to
///
/// Selected once (settings or CLI) and applied to every member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionPolicy {
    /// Every group the member belongs to receives the member's full usage.
    /// Group totals can exceed the organization total.
    #[default]
    FullAttribution,
    /// Usage is divided by the number of groups, each share rounded half-up.
    /// Per-member drift of up to `k - 1` units is accepted.
    EvenSplit,
}

impl AttributionPolicy {
    /// All policies, in display order
    pub const ALL: [Self; 2] = [Self::FullAttribution, Self::EvenSplit];

    /// Settings/CLI name of the policy
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FullAttribution => "full_attribution",
            Self::EvenSplit => "even_split",
        }
    }

    /// The usage one of `group_count` target groups receives from `member`
    pub fn share(self, member: &Member, group_count: usize) -> Usage {
        let full = Usage::of(member);
        match self {
            Self::FullAttribution => full,
            Self::EvenSplit => Usage {
                requests: split_evenly(full.requests, group_count),
                credits: split_evenly(full.credits, group_count),
                llm_calls: split_evenly(full.llm_calls, group_count),
            },
        }
    }
}

impl fmt::Display for AttributionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "full_attribution" | "full" => Ok(Self::FullAttribution),
            "even_split" | "split" => Ok(Self::EvenSplit),
            other => Err(Error::validation(format!(
                "unknown attribution policy '{other}' (expected full_attribution or even_split)"
            ))),
        }
    }
}

/// Usage quantities attributed to one group from one member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Usage {
    /// Requests
    pub requests: u64,
    /// Credits
    pub credits: u64,
    /// LLM calls
    pub llm_calls: u64,
}

impl Usage {
    /// The member's full, unsplit usage
    pub fn of(member: &Member) -> Self {
        Self {
            requests: member.request_count,
            credits: member.credits,
            llm_calls: member.llm_calls,
        }
    }
}

/// `value / parts` rounded half-up; `parts == 0` is treated as one part
pub fn split_evenly(value: u64, parts: usize) -> u64 {
    let parts = parts.max(1) as u128;
    let value = u128::from(value);
    // (2v + k) / 2k == floor(v / k + 1/2)
    ((2 * value + parts) / (2 * parts)) as u64
}
