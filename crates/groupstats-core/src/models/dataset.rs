//! Dataset documents: a group catalog plus a member snapshot

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{GroupCatalog, GroupDefinition, Member, MemberStore};
use crate::error::Result;

const DEMO_DATASET: &str = include_str!("../../data/demo.json");

/// JSON document holding everything the engine needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// Group definitions, catch-all included
    pub groups: Vec<GroupDefinition>,
    /// Member snapshot
    #[serde(default)]
    pub members: Vec<Member>,
}

impl Dataset {
    /// Read a dataset from JSON
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Read a dataset from a JSON file
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Bundled sample organization
    pub fn demo() -> Result<Self> {
        Ok(serde_json::from_str(DEMO_DATASET)?)
    }

    /// Validate into a catalog and a member store
    pub fn into_parts(self) -> Result<(GroupCatalog, MemberStore)> {
        let catalog = GroupCatalog::new(self.groups)?;
        let store = MemberStore::new(self.members)?;
        Ok((catalog, store))
    }
}
