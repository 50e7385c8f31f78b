use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;

/// Best-effort delivery to each pid. Failures (already gone, not ours)
/// are logged and otherwise ignored. Returns how many deliveries succeeded.
pub fn send_to_all<I>(pids: I, sig: Signal) -> usize
where
    I: IntoIterator<Item = i32>,
{
    pids.into_iter()
        .filter(|pid| match deliver(*pid, sig) {
            Ok(()) => {
                log::info!("Sent {:?} to PID {}", sig, pid);
                true
            }
            Err(e) => {
                log::debug!("Ignoring failed {:?} to PID {}: {}", sig, pid, e);
                false
            }
        })
        .count()
}

fn deliver(pid: i32, sig: Signal) -> nix::Result<()> {
    // kill(0) and kill(-n) address process groups, never single rows.
    if pid <= 0 {
        return Err(nix::errno::Errno::ESRCH);
    }
    signal::kill(Pid::from_raw(pid), sig)
}
