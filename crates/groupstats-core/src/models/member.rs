//! Member data model

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DateWindow;
use crate::error::{Error, Result};

/// A member of the organization and their usage totals
///
/// `request_count`, `credits` and `llm_calls` are member-level totals. How much
/// of them lands in a window and in each group is decided by the attribution
/// engine; members never carry pre-split values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    /// Unique identifier
    pub id: String,

    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Groups the member belongs to (empty = unassigned)
    #[serde(default)]
    pub group_ids: BTreeSet<String>,

    /// Date of most recent activity
    pub last_active: NaiveDate,

    /// Total requests
    pub request_count: u64,

    /// Total credit consumption, in whole credit units
    pub credits: u64,

    /// Total LLM calls issued on the member's behalf
    #[serde(default)]
    pub llm_calls: u64,
}

impl Member {
    /// Create an unassigned member with no usage
    pub fn new(id: impl Into<String>, last_active: NaiveDate) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            group_ids: BTreeSet::new(),
            last_active,
            request_count: 0,
            credits: 0,
            llm_calls: 0,
        }
    }

    /// Set group memberships
    pub fn in_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_ids = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Set request and credit totals
    pub fn with_usage(mut self, request_count: u64, credits: u64) -> Self {
        self.request_count = request_count;
        self.credits = credits;
        self
    }

    /// Set the LLM call total
    pub fn with_llm_calls(mut self, llm_calls: u64) -> Self {
        self.llm_calls = llm_calls;
        self
    }

    /// Set display name and email
    pub fn with_contact(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self.email = Some(email.into());
        self
    }

    /// Whether the member has no explicit group membership
    pub fn is_unassigned(&self) -> bool {
        self.group_ids.is_empty()
    }

    /// Whether the member was active within the window (inclusive)
    pub fn is_active_in(&self, window: &DateWindow) -> bool {
        window.contains(self.last_active)
    }
}

/// Immutable snapshot of all members
#[derive(Debug, Clone, Default)]
pub struct MemberStore {
    members: Arc<[Member]>,
}

impl MemberStore {
    /// Build a snapshot, rejecting duplicate member ids
    pub fn new(members: Vec<Member>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(members.len());
        for member in &members {
            if !seen.insert(member.id.as_str()) {
                return Err(Error::validation(format!(
                    "duplicate member id: {}",
                    member.id
                )));
            }
        }

        Ok(Self {
            members: members.into(),
        })
    }

    /// All members in insertion order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Look up a member by id
    pub fn get(&self, id: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.id == id)
    }

    /// Number of members
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the snapshot is empty
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Members active in the window, each counted once however many groups they are in
    pub fn unique_active(&self, window: &DateWindow) -> usize {
        self.members.iter().filter(|m| m.is_active_in(window)).count()
    }
}
