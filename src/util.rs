use crate::model::SystemSnapshot;

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

pub fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

pub fn format_gib(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / GIB)
}

/// RSS column text: mebibytes rounded to one decimal.
pub fn format_mib(bytes: u64) -> String {
    format!("{:.1}", bytes as f64 / MIB)
}

pub fn stats_line(snapshot: &SystemSnapshot) -> String {
    format!(
        "CPU: {} | RAM: {} ({}/{} GB) | Disk: {} | Processes: {}",
        format_percent(snapshot.cpu_percent),
        format_percent(snapshot.memory_percent()),
        format_gib(snapshot.memory_used),
        format_gib(snapshot.memory_total),
        format_percent(snapshot.disk_used_percent),
        snapshot.process_count,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProcessRecord, ProcessTree, SystemTotals};

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(12.345), "12.3%");
        assert_eq!(format_percent(150.0), "150.0%");
    }

    #[test]
    fn sizes_use_binary_units() {
        assert_eq!(format_gib(0), "0.0");
        assert_eq!(format_gib(3 * 1024 * 1024 * 1024 / 2), "1.5");
        assert_eq!(format_mib(10 * 1024 * 1024), "10.0");
        assert_eq!(format_mib(1024 * 1024 / 5), "0.2");
    }

    #[test]
    fn stats_line_lists_every_aggregate() {
        let tree = ProcessTree::build(vec![
            ProcessRecord { pid: 1, ..Default::default() },
            ProcessRecord { pid: 2, ppid: 1, ..Default::default() },
        ]);
        let snapshot = SystemSnapshot::new(
            tree,
            SystemTotals {
                cpu_percent: 7.24,
                memory_used: 2 * 1024 * 1024 * 1024,
                memory_total: 8 * 1024 * 1024 * 1024,
                disk_used_percent: 40.0,
            },
        );
        assert_eq!(
            stats_line(&snapshot),
            "CPU: 7.2% | RAM: 25.0% (2.0/8.0 GB) | Disk: 40.0% | Processes: 2"
        );
    }
}
