use crate::model::ProcessRecord;
use procfs::process::{all_processes, Process};
use procfs::{CpuTime, Current, CurrentSI, KernelStats, Meminfo, ProcResult};
use std::collections::HashMap;
use std::fs;

/// Reads every process under `/proc` and derives per-process CPU share
/// from the jiffies consumed since the previous call.
pub struct ProcessCollector {
    prev_cpu_times: HashMap<i32, u64>,
    prev_total_cpu: u64,
    total_memory: u64,
    users: HashMap<u32, String>,
}

impl ProcessCollector {
    pub fn new() -> Self {
        let passwd = fs::read_to_string("/etc/passwd").unwrap_or_default();
        Self {
            prev_cpu_times: HashMap::new(),
            prev_total_cpu: 0,
            total_memory: get_total_memory(),
            users: parse_passwd(&passwd),
        }
    }

    /// One entry per `/proc/<pid>` directory. Entries that vanished or
    /// could not be read come back as errors for the caller to drop.
    pub fn collect(&mut self) -> Vec<ProcResult<ProcessRecord>> {
        let (total_cpu, num_cores) = read_cpu_ticks();
        let delta_total = total_cpu.saturating_sub(self.prev_total_cpu);

        let entries = match all_processes() {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("Cannot enumerate /proc: {}", e);
                return Vec::new();
            }
        };

        let mut cpu_times = HashMap::new();
        let mut results = Vec::new();

        for entry in entries {
            let result = entry.and_then(|process| self.read_process(&process)).map(|(mut record, cpu_time)| {
                // A pid seen for the first time has no baseline yet.
                record.cpu_percent = match self.prev_cpu_times.get(&record.pid) {
                    Some(prev) => cpu_share(cpu_time.saturating_sub(*prev), delta_total, num_cores),
                    None => 0.0,
                };
                cpu_times.insert(record.pid, cpu_time);
                record
            });
            results.push(result);
        }

        self.prev_cpu_times = cpu_times;
        self.prev_total_cpu = total_cpu;
        results
    }

    fn read_process(&self, process: &Process) -> ProcResult<(ProcessRecord, u64)> {
        let stat = process.stat()?;
        let uid = process.uid()?;
        let rss_bytes = process.status()?.vmrss.unwrap_or(0) * 1024;

        let user = self
            .users
            .get(&uid)
            .cloned()
            .unwrap_or_else(|| uid.to_string());

        let record = ProcessRecord {
            pid: stat.pid,
            ppid: stat.ppid,
            name: stat.comm.clone(),
            user,
            cpu_percent: 0.0,
            memory_percent: memory_share(rss_bytes, self.total_memory),
            rss_bytes,
            status: status_name(stat.state).to_string(),
        };
        Ok((record, stat.utime + stat.stime))
    }
}

/// Percent of one core, so a busy multi-threaded process can exceed 100.
pub fn cpu_share(process_delta: u64, total_delta: u64, num_cores: usize) -> f64 {
    if total_delta == 0 {
        return 0.0;
    }
    (process_delta as f64 / total_delta as f64) * 100.0 * num_cores as f64
}

pub fn memory_share(rss_bytes: u64, total_memory: u64) -> f64 {
    if total_memory == 0 {
        return 0.0;
    }
    (rss_bytes as f64 / total_memory as f64) * 100.0
}

pub fn status_name(state: char) -> &'static str {
    match state {
        'R' => "running",
        'S' => "sleeping",
        'D' => "disk-sleep",
        'T' => "stopped",
        't' => "tracing-stop",
        'Z' => "zombie",
        'X' | 'x' => "dead",
        'I' => "idle",
        'P' => "parked",
        'K' => "wake-kill",
        'W' => "waking",
        _ => "?",
    }
}

fn parse_passwd(contents: &str) -> HashMap<u32, String> {
    contents
        .lines()
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let mut fields = line.split(':');
            let name = fields.next()?;
            let uid = fields.nth(1)?.parse::<u32>().ok()?;
            Some((uid, name.to_string()))
        })
        .collect()
}

/// Aggregate jiffies across all cores and the number of cores.
fn read_cpu_ticks() -> (u64, usize) {
    match KernelStats::current() {
        Ok(stats) => (total_ticks(&stats.total), stats.cpu_time.len().max(1)),
        Err(e) => {
            log::warn!("Cannot read /proc/stat: {}", e);
            (0, 1)
        }
    }
}

fn total_ticks(cpu: &CpuTime) -> u64 {
    cpu.user
        + cpu.nice
        + cpu.system
        + cpu.idle
        + cpu.iowait.unwrap_or(0)
        + cpu.irq.unwrap_or(0)
        + cpu.softirq.unwrap_or(0)
        + cpu.steal.unwrap_or(0)
}

fn get_total_memory() -> u64 {
    match Meminfo::current() {
        Ok(meminfo) => meminfo.mem_total,
        Err(e) => {
            log::warn!("Cannot read /proc/meminfo: {}", e);
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_share_scales_by_core_count() {
        assert_eq!(cpu_share(0, 0, 4), 0.0);
        assert!((cpu_share(25, 100, 1) - 25.0).abs() < 1e-9);
        assert!((cpu_share(50, 100, 4) - 200.0).abs() < 1e-9);
    }

    #[test]
    fn memory_share_guards_zero_total() {
        assert_eq!(memory_share(1024, 0), 0.0);
        assert!((memory_share(512, 2048) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn status_names_follow_kernel_state_letters() {
        assert_eq!(status_name('R'), "running");
        assert_eq!(status_name('S'), "sleeping");
        assert_eq!(status_name('Z'), "zombie");
        assert_eq!(status_name('?'), "?");
    }

    #[test]
    fn passwd_maps_uid_to_name() {
        let users = parse_passwd(
            "# comment\nroot:x:0:0:root:/root:/bin/bash\nalice:x:1000:1000::/home/alice:/bin/zsh\nbroken\n",
        );
        assert_eq!(users.get(&0).map(String::as_str), Some("root"));
        assert_eq!(users.get(&1000).map(String::as_str), Some("alice"));
        assert_eq!(users.len(), 2);
    }

    #[test]
    fn cpu_ticks_advance_between_reads() {
        let (first, cores) = read_cpu_ticks();
        assert!(first > 0);
        assert!(cores >= 1);
        std::thread::sleep(std::time::Duration::from_millis(50));
        let (second, _) = read_cpu_ticks();
        assert!(second >= first);
    }

    #[test]
    fn total_memory_is_reported_in_bytes() {
        // Any real machine has more than 1 MiB of RAM.
        assert!(get_total_memory() > 1024 * 1024);
    }

    #[test]
    fn collect_includes_the_current_process() {
        let mut collector = ProcessCollector::new();
        let me = std::process::id() as i32;
        let found = collector
            .collect()
            .into_iter()
            .filter_map(Result::ok)
            .any(|r| r.pid == me);
        assert!(found, "current process should be listed");
    }
}
