pub mod engine;
pub mod outcome;
pub mod patterns;

pub use engine::{classify_item, group_machines, item_price, summarize_options};
pub use outcome::{ItemRole, MachineGroup, MachineGrouping, FALLBACK_MACHINE_NAME};
