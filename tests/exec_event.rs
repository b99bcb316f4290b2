use std::process::Command;

use anyhow::Result;
use nix::sys::wait::WaitStatus;
use ntest::timeout;
use pretty_assertions::assert_eq;
use tracectl::{getevent, ptrace, setoptions, EventDetail, PtraceEvent, TraceOptions};

#[macro_use]
mod support;
use support::*;

#[test]
#[timeout(2000)]
fn test_exec_event_on_leader() -> Result<()> {
    let mut cmd = Command::new("/bin/sh");
    cmd.args(&["-c", "exec /bin/true"]);
    let (_child, pid) = spawn_stopped(cmd)?;

    setoptions(pid, TraceOptions::TRACEEXEC)?;
    ptrace::cont(pid, None)?;

    let status = wait_tracee(pid)?;
    assert_eq!(status, WaitStatus::PtraceEvent(pid, tracectl::Signal::SIGTRAP, libc::PTRACE_EVENT_EXEC));

    // Exec'd on the leader, so the former thread ID is unchanged.
    let detail = getevent(pid)?.interpret(PtraceEvent::Exec)?;
    assert_eq!(detail, EventDetail::Exec { old: pid });

    assert_eq!(run_to_exit(pid)?, 0);

    Ok(())
}
