use crate::model::LineItem;
use serde::{Deserialize, Serialize};

/// Name of the single group built when no item reads as a main machine.
pub const FALLBACK_MACHINE_NAME: &str = "Complete System";

/// How an item was placed by the grouper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRole {
    MainMachine,
    CommonItem,
    /// Anything else: an add-on of the open machine, or an orphan.
    AddOn,
}

/// One machine of a quote: its main item plus the add-ons listed under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineGroup {
    pub machine_name: String,
    pub main_item: LineItem,
    pub add_ons: Vec<LineItem>,
}

/// Line items partitioned into machines and items common to all machines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineGrouping {
    pub machines: Vec<MachineGroup>,
    pub common_items: Vec<LineItem>,
}

impl MachineGrouping {
    /// Total number of items across all groups and the common bucket.
    pub fn item_count(&self) -> usize {
        self.machines.iter().map(|m| 1 + m.add_ons.len()).sum::<usize>() + self.common_items.len()
    }
}
