use crate::model::{AgentPubKey, SpaceHash};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Handle of a partition (cell) in the local runtime: the data space plus the
/// identity that runs it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionHandle {
    pub space: SpaceHash,
    pub owner: AgentPubKey,
}

impl PartitionHandle {
    pub fn new(space: SpaceHash, owner: AgentPubKey) -> Self {
        Self { space, owner }
    }
}

impl Display for PartitionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.space)
    }
}

/// A cell installed with the app itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionedCell {
    pub cell_id: PartitionHandle,
    pub name: String,
}

/// A cell cloned from a role's template with its own network seed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClonedCell {
    pub cell_id: PartitionHandle,
    pub clone_id: String,
    pub name: String,
    /// Reported by runtimes that expose clone modifiers; absent otherwise.
    pub network_seed: Option<String>,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CellInfo {
    Provisioned(ProvisionedCell),
    Cloned(ClonedCell),
}

impl CellInfo {
    pub fn cell_id(&self) -> &PartitionHandle {
        match self {
            CellInfo::Provisioned(cell) => &cell.cell_id,
            CellInfo::Cloned(cell) => &cell.cell_id,
        }
    }
}

/// Snapshot of the installed app: cells grouped by role name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AppInfo {
    pub installed_app_id: String,
    pub cell_info: HashMap<String, Vec<CellInfo>>,
}

impl AppInfo {
    pub fn cells(&self, role: &str) -> &[CellInfo] {
        self.cell_info.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cloned cells of a role, in the order the runtime reports them.
    pub fn clones<'a>(&'a self, role: &str) -> impl Iterator<Item = &'a ClonedCell> + 'a {
        self.cells(role).iter().filter_map(|cell| match cell {
            CellInfo::Cloned(clone) => Some(clone),
            CellInfo::Provisioned(_) => None,
        })
    }

    pub fn contains(&self, handle: &PartitionHandle) -> bool {
        self.cell_info
            .values()
            .flatten()
            .any(|cell| cell.cell_id() == handle)
    }
}
