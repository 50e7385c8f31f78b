use crate::model::SystemTotals;
use std::path::Path;
use sysinfo::{Disks, System};

/// Machine-wide CPU, memory and root filesystem usage.
pub struct SystemCollector {
    system: System,
}

impl SystemCollector {
    pub fn new() -> Self {
        let mut system = System::new();
        // Prime the CPU counters; the first usage reading is relative to this.
        system.refresh_cpu_usage();
        Self { system }
    }

    pub fn collect(&mut self) -> SystemTotals {
        self.system.refresh_cpu_usage();
        self.system.refresh_memory();

        let disks = Disks::new_with_refreshed_list();
        let disk_used_percent = disks
            .iter()
            .find(|d| d.mount_point() == Path::new("/"))
            .map(|d| used_percent(d.total_space(), d.available_space()))
            .unwrap_or(0.0);

        SystemTotals {
            cpu_percent: self.system.global_cpu_usage() as f64,
            memory_used: self.system.used_memory(),
            memory_total: self.system.total_memory(),
            disk_used_percent,
        }
    }
}

pub fn used_percent(total: u64, available: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (total.saturating_sub(available) as f64 / total as f64) * 100.0
}
