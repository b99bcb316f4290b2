use std::process::{Child, Command};

use anyhow::{bail, Result};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use tracectl::{ptrace, Pid, Signal, SignalNumber};

#[allow(unused)]
macro_rules! pid {
    ($child: expr) => {
        tracectl::Pid::from_raw($child.id() as i32)
    };
}

/// Spawn `cmd` as a tracee, and wait for its post-exec `SIGTRAP` stop.
#[allow(unused)]
pub fn spawn_stopped(cmd: Command) -> Result<(Child, Pid)> {
    let child = tracectl::spawn(cmd)?;
    let pid = pid!(child);

    match waitpid(pid, None)? {
        WaitStatus::Stopped(stopped, Signal::SIGTRAP) if stopped == pid => {
            eprintln!("{pid}: stopped post-exec");
        },
        status => bail!("unexpected initial wait status: {:?}", status),
    }

    Ok((child, pid))
}

/// Wait for the next state change of the tracee `pid`, which may be any task.
#[allow(unused)]
pub fn wait_tracee(pid: Pid) -> Result<WaitStatus> {
    let status = waitpid(pid, Some(WaitPidFlag::__WALL))?;
    eprintln!("{pid}: {status:?}");
    Ok(status)
}

/// Restart `pid` until it exits, forwarding signals and ignoring other stops.
///
/// Returns the exit code. The tracee is reaped, so its `Child` must not be waited on.
#[allow(unused)]
pub fn run_to_exit(pid: Pid) -> Result<i32> {
    let mut pending: Option<SignalNumber> = None;

    loop {
        ptrace::cont(pid, pending)?;
        pending = None;

        match wait_tracee(pid)? {
            WaitStatus::Exited(_, code) => return Ok(code),
            WaitStatus::Signaled(_, signal, _) => bail!("tracee killed by {signal}"),
            WaitStatus::Stopped(_, Signal::SIGTRAP) => {},
            WaitStatus::Stopped(_, signal) => pending = Some(signal.into()),
            _ => {},
        }
    }
}

/// Kills and reaps the child when dropped, so a failed assertion leaves no stopped
/// process behind.
#[allow(unused)]
pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        let _ = self.0.kill();
        let _ = self.0.wait();
    }
}

/// Wait for `pid` and return the raw status word.
///
/// `nix` can't decode stops for realtime signals, so tests of those use this instead.
#[allow(unused)]
pub fn wait_raw(pid: Pid) -> Result<libc::c_int> {
    let mut status = 0;

    // SAFETY: `status` is a live local.
    let res = unsafe { libc::waitpid(pid.as_raw(), &mut status, libc::__WALL) };
    nix::errno::Errno::result(res)?;

    eprintln!("{pid}: raw status {status:#x}");
    Ok(status)
}
