use super::ProcessTree;

/// Machine-wide figures gathered alongside the process list.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SystemTotals {
    pub cpu_percent: f64,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_used_percent: f64,
}

#[derive(Debug, Clone, Default)]
pub struct SystemSnapshot {
    pub tree: ProcessTree,
    pub cpu_percent: f64,
    pub memory_used: u64,
    pub memory_total: u64,
    pub disk_used_percent: f64,
    pub process_count: usize,
}

impl SystemSnapshot {
    pub fn new(tree: ProcessTree, totals: SystemTotals) -> Self {
        let process_count = tree.len();
        Self {
            tree,
            cpu_percent: totals.cpu_percent,
            memory_used: totals.memory_used,
            memory_total: totals.memory_total,
            disk_used_percent: totals.disk_used_percent,
            process_count,
        }
    }

    pub fn memory_percent(&self) -> f64 {
        if self.memory_total > 0 {
            (self.memory_used as f64 / self.memory_total as f64) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProcessRecord;

    #[test]
    fn process_count_follows_tree() {
        let records = (1..=3)
            .map(|pid| ProcessRecord { pid, ppid: 0, ..Default::default() })
            .collect();
        let snapshot = SystemSnapshot::new(ProcessTree::build(records), SystemTotals::default());
        assert_eq!(snapshot.process_count, 3);
    }

    #[test]
    fn memory_percent_handles_zero_total() {
        let snapshot = SystemSnapshot::default();
        assert_eq!(snapshot.memory_percent(), 0.0);

        let snapshot = SystemSnapshot::new(
            ProcessTree::default(),
            SystemTotals { memory_used: 1, memory_total: 4, ..Default::default() },
        );
        assert!((snapshot.memory_percent() - 25.0).abs() < 1e-9);
    }
}
