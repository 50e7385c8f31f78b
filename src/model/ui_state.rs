use super::ProcessRecord;
use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Pid,
    Name,
    User,
    Cpu,
    Memory,
    Rss,
    Status,
}

impl SortColumn {
    pub const ALL: [SortColumn; 7] = [
        SortColumn::Pid,
        SortColumn::Name,
        SortColumn::User,
        SortColumn::Cpu,
        SortColumn::Memory,
        SortColumn::Rss,
        SortColumn::Status,
    ];

    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Pid => "PID",
            SortColumn::Name => "Name",
            SortColumn::User => "User",
            SortColumn::Cpu => "CPU %",
            SortColumn::Memory => "MEM %",
            SortColumn::Rss => "RSS MB",
            SortColumn::Status => "Status",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, SortColumn::Pid | SortColumn::Cpu | SortColumn::Memory | SortColumn::Rss)
    }

    /// Ascending order for this column; text columns ignore case.
    pub fn compare(self, a: &ProcessRecord, b: &ProcessRecord) -> Ordering {
        match self {
            SortColumn::Pid => a.pid.cmp(&b.pid),
            SortColumn::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortColumn::User => a.user.to_lowercase().cmp(&b.user.to_lowercase()),
            SortColumn::Cpu => a.cpu_percent.total_cmp(&b.cpu_percent),
            SortColumn::Memory => a.memory_percent.total_cmp(&b.memory_percent),
            SortColumn::Rss => a.rss_bytes.cmp(&b.rss_bytes),
            SortColumn::Status => a.status.to_lowercase().cmp(&b.status.to_lowercase()),
        }
    }
}

/// View-owned state. Never persisted.
#[derive(Debug, Clone)]
pub struct UiState {
    pub search_text: String,
    pub sort_column: SortColumn,
    pub sort_ascending: bool,
    pub auto_refresh_enabled: bool,
    pub selected_pids: HashSet<i32>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            sort_column: SortColumn::Cpu,
            sort_ascending: false,
            auto_refresh_enabled: true,
            selected_pids: HashSet::new(),
        }
    }
}
