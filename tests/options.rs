use std::process::Command;

use anyhow::Result;
use nix::errno::Errno;
use nix::sys::wait::WaitStatus;
use nix::unistd::getpid;
use ntest::timeout;
use pretty_assertions::assert_eq;
use tracectl::{ptrace, setoptions, Error, ErrorKind, Request, RequestKind, Signal, TraceOptions};

#[macro_use]
mod support;
use support::*;

type O = TraceOptions;

fn with_unknown_bit() -> TraceOptions {
    // SAFETY: deliberately constructs a value the safe API can't, to check that the
    // dispatcher rejects it.
    unsafe { O::from_bits_unchecked(O::TRACEEXIT.bits() | 0x4000_0000) }
}

#[test]
fn test_option_bits_match_libc() {
    assert_eq!(O::TRACESYSGOOD.bits(), libc::PTRACE_O_TRACESYSGOOD);
    assert_eq!(O::TRACEFORK.bits(), libc::PTRACE_O_TRACEFORK);
    assert_eq!(O::TRACEVFORK.bits(), libc::PTRACE_O_TRACEVFORK);
    assert_eq!(O::TRACECLONE.bits(), libc::PTRACE_O_TRACECLONE);
    assert_eq!(O::TRACEEXEC.bits(), libc::PTRACE_O_TRACEEXEC);
    assert_eq!(O::TRACEVFORKDONE.bits(), libc::PTRACE_O_TRACEVFORKDONE);
    assert_eq!(O::TRACEEXIT.bits(), libc::PTRACE_O_TRACEEXIT);
    assert_eq!(O::TRACESECCOMP.bits(), libc::PTRACE_O_TRACESECCOMP);
    assert_eq!(O::EXITKILL.bits(), libc::PTRACE_O_EXITKILL);
    assert_eq!(O::SUSPEND_SECCOMP.bits(), libc::PTRACE_O_SUSPEND_SECCOMP);
}

#[test]
fn test_options_from_raw() -> Result<()> {
    assert_eq!(O::from_raw(0)?, O::empty());
    assert_eq!(O::from_raw(O::all().bits())?, O::all());
    assert_eq!(O::from_raw(0x41)?, O::TRACESYSGOOD | O::TRACEEXIT);

    let err = O::from_raw(0x41 | 0x4000_0000).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);

    Ok(())
}

#[test]
fn test_from_raw_keeps_unknown_bits_visible() {
    let raw = O::TRACEEXIT.bits() | 0x4000_0000;

    // The generated truncating constructor would quietly drop the bit.
    assert_eq!(O::from_bits_truncate(raw), O::TRACEEXIT);

    let err = O::from_raw(raw).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { request: RequestKind::SetOptions, ref reason } if reason.contains("0x40000000")));
}

#[test]
fn test_setoptions_rejects_unknown_bits() {
    // Our own process is not traced, so reaching the kernel would fail with `ESRCH`.
    let err = setoptions(getpid(), with_unknown_bit()).unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { request: RequestKind::SetOptions, .. }));
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn test_seize_rejects_unknown_bits() {
    let request = Request::Seize { options: with_unknown_bit() };
    let err = ptrace(request, getpid()).unwrap_err();

    assert!(matches!(err, Error::InvalidArgument { request: RequestKind::Seize, .. }));
}

#[test]
fn test_setoptions_on_untraced() {
    let err = setoptions(getpid(), O::TRACEEXIT).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::OsError(Errno::ESRCH));
    assert!(err.tracee_died());
}

#[test]
#[timeout(2000)]
fn test_options_in_effect() -> Result<()> {
    let cmd = Command::new("true");
    let (_child, pid) = spawn_stopped(cmd)?;

    // Without options, exit is unobserved. With them, we must see the exit event.
    setoptions(pid, O::TRACEEXIT | O::TRACESYSGOOD)?;
    tracectl::ptrace::cont(pid, None)?;

    let status = wait_tracee(pid)?;
    assert_eq!(status, WaitStatus::PtraceEvent(pid, Signal::SIGTRAP, libc::PTRACE_EVENT_EXIT));

    tracectl::ptrace::cont(pid, None)?;
    assert_eq!(wait_tracee(pid)?, WaitStatus::Exited(pid, 0));

    Ok(())
}

#[test]
#[timeout(2000)]
fn test_syscall_stops_marked_with_sysgood() -> Result<()> {
    let cmd = Command::new("true");
    let (_child, pid) = spawn_stopped(cmd)?;

    setoptions(pid, O::TRACESYSGOOD)?;
    tracectl::ptrace::syscall(pid, None)?;

    // With `TRACESYSGOOD`, `nix` decodes the stop as a syscall-stop.
    assert_eq!(wait_tracee(pid)?, WaitStatus::PtraceSyscall(pid));

    assert_eq!(run_to_exit(pid)?, 0);

    Ok(())
}
