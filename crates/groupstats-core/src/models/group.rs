//! Group catalog

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Identity of a group as shown in the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDefinition {
    /// Unique identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// The reserved bucket for members without a group
    #[serde(default)]
    pub is_catch_all: bool,
}

impl GroupDefinition {
    /// Create a regular group
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_catch_all: false,
        }
    }

    /// Create the catch-all bucket
    pub fn catch_all(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_catch_all: true,
        }
    }
}

/// Find the single catch-all definition.
///
/// Fails when the catalog has none, more than one, or repeats a group id.
pub fn catch_all_of(groups: &[GroupDefinition]) -> Result<&GroupDefinition> {
    let mut ids = HashSet::with_capacity(groups.len());
    for group in groups {
        if !ids.insert(group.id.as_str()) {
            return Err(Error::config(format!("duplicate group id: {}", group.id)));
        }
    }

    let mut catch_alls = groups.iter().filter(|g| g.is_catch_all);
    match (catch_alls.next(), catch_alls.next()) {
        (Some(group), None) => Ok(group),
        (None, _) => Err(Error::config("group catalog has no catch-all group")),
        (Some(first), Some(second)) => Err(Error::config(format!(
            "group catalog has more than one catch-all group ({}, {})",
            first.id, second.id
        ))),
    }
}

/// Validated, ordered set of group definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCatalog {
    groups: Vec<GroupDefinition>,
    catch_all_index: usize,
}

impl GroupCatalog {
    /// Validate and wrap the definitions, preserving their order
    pub fn new(groups: Vec<GroupDefinition>) -> Result<Self> {
        let catch_all_id = catch_all_of(&groups)?.id.clone();
        let catch_all_index = groups
            .iter()
            .position(|g| g.id == catch_all_id)
            .ok_or_else(|| Error::internal("catch-all group vanished during validation"))?;

        Ok(Self {
            groups,
            catch_all_index,
        })
    }

    /// All definitions in catalog order
    pub fn definitions(&self) -> &[GroupDefinition] {
        &self.groups
    }

    /// The catch-all bucket
    pub fn catch_all(&self) -> &GroupDefinition {
        &self.groups[self.catch_all_index]
    }

    /// Look up a group by id
    pub fn get(&self, id: &str) -> Option<&GroupDefinition> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Look up a group by id, failing if absent
    pub fn require(&self, id: &str) -> Result<&GroupDefinition> {
        self.get(id).ok_or_else(|| Error::not_found("group", id))
    }

    /// Whether the catalog defines this id
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of groups, catch-all included
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Always false for a validated catalog
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
