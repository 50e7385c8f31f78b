/// One row of the process table, recreated on every poll.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessRecord {
    pub pid: i32,
    pub ppid: i32,
    pub name: String,
    pub user: String,
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub rss_bytes: u64,
    pub status: String,
}

impl Default for ProcessRecord {
    fn default() -> Self {
        Self {
            pid: 0,
            ppid: 0,
            name: String::new(),
            user: String::from("?"),
            cpu_percent: 0.0,
            memory_percent: 0.0,
            rss_bytes: 0,
            status: String::from("?"),
        }
    }
}

impl ProcessRecord {
    /// Case-insensitive substring match over name, user and pid.
    /// An empty query matches everything.
    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        let needle = query.to_lowercase();
        self.name.to_lowercase().contains(&needle)
            || self.user.to_lowercase().contains(&needle)
            || self.pid.to_string().contains(&needle)
    }
}
