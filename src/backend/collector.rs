use crate::backend::process::ProcessCollector;
use crate::backend::system::SystemCollector;
use crate::model::{ProcessRecord, ProcessTree, SystemSnapshot, SystemTotals};
use flume::RecvTimeoutError;
use procfs::ProcResult;
use std::thread;
use std::time::{Duration, Instant};

/// Where a refresh gets its raw data from.
pub trait Source: Send {
    fn processes(&mut self) -> Vec<ProcResult<ProcessRecord>>;
    fn totals(&mut self) -> SystemTotals;
}

pub struct LiveSource {
    processes: ProcessCollector,
    system: SystemCollector,
}

impl LiveSource {
    pub fn new() -> Self {
        Self {
            processes: ProcessCollector::new(),
            system: SystemCollector::new(),
        }
    }
}

impl Source for LiveSource {
    fn processes(&mut self) -> Vec<ProcResult<ProcessRecord>> {
        self.processes.collect()
    }

    fn totals(&mut self) -> SystemTotals {
        self.system.collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    RefreshNow,
    SetAutoRefresh(bool),
}

/// Decides when a poll happens and turns raw data into a snapshot.
pub struct Refresher<S> {
    source: S,
    auto_refresh: bool,
}

impl<S: Source> Refresher<S> {
    pub fn new(source: S) -> Self {
        Self { source, auto_refresh: true }
    }

    #[cfg(test)]
    pub fn auto_refresh(&self) -> bool {
        self.auto_refresh
    }

    pub fn handle(&mut self, command: Command) -> Option<SystemSnapshot> {
        match command {
            Command::RefreshNow => Some(self.refresh()),
            Command::SetAutoRefresh(enabled) => {
                log::info!("Auto-refresh {}", if enabled { "enabled" } else { "paused" });
                self.auto_refresh = enabled;
                None
            }
        }
    }

    /// Periodic timer fired.
    pub fn tick(&mut self) -> Option<SystemSnapshot> {
        if self.auto_refresh {
            Some(self.refresh())
        } else {
            None
        }
    }

    pub fn refresh(&mut self) -> SystemSnapshot {
        let records: Vec<ProcessRecord> = self
            .source
            .processes()
            .into_iter()
            .filter_map(|result| match result {
                Ok(record) => Some(record),
                Err(e) => {
                    log::debug!("Skipping process: {}", e);
                    None
                }
            })
            .collect();
        let totals = self.source.totals();
        let tree = ProcessTree::build(records);
        if tree.is_empty() {
            log::warn!("No readable processes in this poll");
        }
        SystemSnapshot::new(tree, totals)
    }
}

/// UI-side handle for steering the collector thread.
#[derive(Clone)]
pub struct CollectorHandle {
    commands: flume::Sender<Command>,
}

impl CollectorHandle {
    pub fn request_refresh(&self) {
        let _ = self.commands.send(Command::RefreshNow);
    }

    pub fn set_auto_refresh(&self, enabled: bool) {
        let _ = self.commands.send(Command::SetAutoRefresh(enabled));
    }
}

pub struct Collector {
    tx: flume::Sender<SystemSnapshot>,
    commands: flume::Receiver<Command>,
    interval: Duration,
}

impl Collector {
    pub fn new(interval: Duration) -> (Self, CollectorHandle, flume::Receiver<SystemSnapshot>) {
        let (tx, rx) = flume::bounded(2);
        let (command_tx, command_rx) = flume::unbounded();
        let collector = Self {
            tx,
            commands: command_rx,
            interval,
        };
        (collector, CollectorHandle { commands: command_tx }, rx)
    }

    pub fn start(self) -> std::io::Result<()> {
        self.start_with(LiveSource::new)
    }

    /// `make_source` runs on the collector thread.
    pub fn start_with<S, F>(self, make_source: F) -> std::io::Result<()>
    where
        S: Source + 'static,
        F: FnOnce() -> S + Send + 'static,
    {
        thread::Builder::new()
            .name("collector".into())
            .spawn(move || {
                self.run(make_source());
            })?;
        Ok(())
    }

    fn run<S: Source>(self, source: S) {
        let mut refresher = Refresher::new(source);

        if self.tx.send(refresher.refresh()).is_err() {
            return;
        }

        let mut next_tick = Instant::now() + self.interval;
        loop {
            let snapshot = match self.commands.recv_deadline(next_tick) {
                Ok(command) => refresher.handle(command),
                Err(RecvTimeoutError::Timeout) => {
                    next_tick = Instant::now() + self.interval;
                    refresher.tick()
                }
                Err(RecvTimeoutError::Disconnected) => {
                    log::info!("Collector handle dropped, shutting down");
                    break;
                }
            };

            if let Some(snapshot) = snapshot {
                if self.tx.send(snapshot).is_err() {
                    log::info!("Collector channel closed, shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procfs::ProcError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeSource {
        polls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn new() -> (Self, Arc<AtomicUsize>) {
            let polls = Arc::new(AtomicUsize::new(0));
            (Self { polls: polls.clone() }, polls)
        }
    }

    impl Source for FakeSource {
        fn processes(&mut self) -> Vec<ProcResult<ProcessRecord>> {
            self.polls.fetch_add(1, Ordering::SeqCst);
            vec![
                Ok(ProcessRecord { pid: 1, ppid: 0, name: "init".into(), ..Default::default() }),
                Err(ProcError::PermissionDenied(None)),
                Ok(ProcessRecord { pid: 20, ppid: 1, name: "sshd".into(), ..Default::default() }),
                Err(ProcError::NotFound(None)),
                Ok(ProcessRecord { pid: 30, ppid: 99, name: "orphan".into(), ..Default::default() }),
            ]
        }

        fn totals(&mut self) -> SystemTotals {
            SystemTotals {
                cpu_percent: 12.5,
                memory_used: 1,
                memory_total: 2,
                disk_used_percent: 50.0,
            }
        }
    }

    #[test]
    fn failed_processes_are_dropped_from_the_count() {
        let (source, _) = FakeSource::new();
        let snapshot = Refresher::new(source).refresh();
        assert_eq!(snapshot.process_count, 3);
        assert_eq!(snapshot.tree.iter().count(), 3);
        let roots: Vec<i32> = snapshot.tree.roots().iter().map(|n| n.record.pid).collect();
        assert_eq!(roots, vec![1, 30]);
        assert_eq!(snapshot.cpu_percent, 12.5);
    }

    #[test]
    fn pausing_auto_refresh_stops_periodic_polls() {
        let (source, polls) = FakeSource::new();
        let mut refresher = Refresher::new(source);

        assert!(refresher.tick().is_some());
        assert_eq!(polls.load(Ordering::SeqCst), 1);

        assert!(refresher.handle(Command::SetAutoRefresh(false)).is_none());
        assert!(!refresher.auto_refresh());
        for _ in 0..5 {
            assert!(refresher.tick().is_none());
        }
        assert_eq!(polls.load(Ordering::SeqCst), 1);

        // A manual refresh still goes through while paused.
        assert!(refresher.handle(Command::RefreshNow).is_some());
        assert_eq!(polls.load(Ordering::SeqCst), 2);

        refresher.handle(Command::SetAutoRefresh(true));
        assert!(refresher.tick().is_some());
        assert_eq!(polls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn thread_sends_initial_and_requested_snapshots() {
        let (collector, handle, rx) = Collector::new(Duration::from_secs(3600));
        collector
            .start_with(|| FakeSource::new().0)
            .expect("spawn collector");

        let first = rx.recv_timeout(Duration::from_secs(5)).expect("initial snapshot");
        assert_eq!(first.process_count, 3);

        handle.set_auto_refresh(false);
        handle.request_refresh();
        let second = rx.recv_timeout(Duration::from_secs(5)).expect("requested snapshot");
        assert_eq!(second.process_count, 3);
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    fn drain(rx: &flume::Receiver<SystemSnapshot>) {
        while rx.try_recv().is_ok() {}
    }

    #[test]
    fn paused_thread_skips_timer_polls_until_resumed() {
        let interval = Duration::from_millis(30);
        let (collector, handle, rx) = Collector::new(interval);
        let (source, polls) = FakeSource::new();
        collector.start_with(move || source).expect("spawn collector");

        rx.recv_timeout(Duration::from_secs(5)).expect("initial snapshot");
        rx.recv_timeout(Duration::from_secs(5)).expect("timer snapshot while running");

        handle.set_auto_refresh(false);
        // A send blocked on the full channel may land after the first drain.
        for _ in 0..3 {
            thread::sleep(interval * 3);
            drain(&rx);
        }

        let paused_at = polls.load(Ordering::SeqCst);
        thread::sleep(interval * 8);
        assert!(rx.try_recv().is_err(), "no snapshots while paused");
        assert_eq!(polls.load(Ordering::SeqCst), paused_at);

        handle.set_auto_refresh(true);
        rx.recv_timeout(Duration::from_secs(5)).expect("timer snapshot after resume");
        assert!(polls.load(Ordering::SeqCst) > paused_at);
    }
}
