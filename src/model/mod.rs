mod process_record;
mod process_tree;
mod system_snapshot;
mod ui_state;

pub use process_record::ProcessRecord;
pub use process_tree::{ProcessNode, ProcessTree};
pub use system_snapshot::*;
pub use ui_state::{SortColumn, UiState};
