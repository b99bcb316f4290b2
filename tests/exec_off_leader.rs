//! Waits on any child, so run alone: `cargo test --features test-programs --test exec_off_leader`.
#![cfg(feature = "test-programs")]

use std::convert::TryFrom;
use std::process::Command;

use anyhow::Result;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use ntest::timeout;
use pretty_assertions::assert_eq;
use tracectl::{getevent, ptrace, setoptions, EventDetail, Pid, PtraceEvent, SignalNumber, TraceOptions};

#[macro_use]
mod support;
use support::*;

#[test]
#[timeout(3000)]
fn test_exec_event_off_leader() -> Result<()> {
    let cmd = Command::new("test-programs/exec-off-leader/target/release/exec-off-leader");
    let (_child, pid) = spawn_stopped(cmd)?;

    setoptions(pid, TraceOptions::TRACECLONE | TraceOptions::TRACEEXEC)?;
    ptrace::cont(pid, None)?;

    let any = Pid::from_raw(-1);
    let mut exec = None;

    let code = loop {
        let status = waitpid(any, Some(WaitPidFlag::__WALL))?;
        eprintln!("{status:?}");

        let (tid, pending) = match status {
            WaitStatus::Exited(tid, code) if tid == pid && exec.is_some() => break code,
            WaitStatus::Exited(..) | WaitStatus::Signaled(..) => continue,
            WaitStatus::PtraceEvent(tid, _, code) => {
                if PtraceEvent::try_from(code)? == PtraceEvent::Exec {
                    exec = Some((tid, getevent(tid)?.interpret(PtraceEvent::Exec)?));
                }
                (tid, None)
            },
            WaitStatus::Stopped(tid, tracectl::Signal::SIGSTOP) => (tid, None),
            WaitStatus::Stopped(tid, signal) => (tid, Some(SignalNumber::from(signal))),
            status => panic!("unexpected status: {:?}", status),
        };

        // The task may have been killed by the exec of another thread.
        if let Err(err) = ptrace::cont(tid, pending) {
            assert!(err.tracee_died());
        }
    };

    assert_eq!(code, 5);

    let (tid, detail) = exec.expect("no exec event");
    assert_eq!(tid, pid);

    match detail {
        EventDetail::Exec { old } => assert_ne!(old, pid),
        detail => panic!("unexpected event: {:?}", detail),
    }

    Ok(())
}
