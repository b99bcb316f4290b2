use std::process::Command;

use anyhow::Result;
use nix::sys::wait::WaitStatus;
use ntest::timeout;
use pretty_assertions::assert_eq;
use tracectl::{ptrace, Pid, Request, Signal};

#[macro_use]
mod support;
use support::*;

fn pc(pid: Pid) -> Result<u64> {
    let regs = ptrace::getregs(pid)?;

    #[cfg(target_arch = "x86_64")]
    return Ok(regs.rip);

    #[cfg(target_arch = "aarch64")]
    return Ok(regs.pc);
}

// Number of the syscall a tracee is stopped at the entry of.
fn syscall_nr(pid: Pid) -> Result<u64> {
    let regs = ptrace::getregs(pid)?;

    #[cfg(target_arch = "x86_64")]
    return Ok(regs.orig_rax);

    #[cfg(target_arch = "aarch64")]
    return Ok(regs.regs[8]);
}

#[test]
#[timeout(2000)]
fn test_step_generic_and_specialised() -> Result<()> {
    let (mut child, pid) = spawn_stopped(Command::new("true"))?;

    let start = pc(pid)?;

    ptrace::step(pid, None)?;
    assert_eq!(wait_tracee(pid)?, WaitStatus::Stopped(pid, Signal::SIGTRAP));
    let one = pc(pid)?;
    assert_ne!(one, start);

    ptrace(Request::SingleStep { signal: None }, pid)?.into_unit()?;
    assert_eq!(wait_tracee(pid)?, WaitStatus::Stopped(pid, Signal::SIGTRAP));
    assert_ne!(pc(pid)?, one);

    child.kill()?;
    child.wait()?;

    Ok(())
}

#[test]
#[timeout(2000)]
fn test_sysemu_generic_and_specialised() -> Result<()> {
    let (mut a_child, a) = spawn_stopped(Command::new("true"))?;
    let (mut b_child, b) = spawn_stopped(Command::new("true"))?;

    ptrace::sysemu(a, None)?;
    ptrace(Request::SysEmu { signal: None }, b)?.into_unit()?;

    // Both stop at the entry of the same first syscall, which is not run.
    assert_eq!(wait_tracee(a)?, WaitStatus::Stopped(a, Signal::SIGTRAP));
    assert_eq!(wait_tracee(b)?, WaitStatus::Stopped(b, Signal::SIGTRAP));
    assert_eq!(syscall_nr(a)?, syscall_nr(b)?);

    a_child.kill()?;
    a_child.wait()?;
    b_child.kill()?;
    b_child.wait()?;

    Ok(())
}

#[test]
#[timeout(2000)]
fn test_sysemu_step_generic_and_specialised() -> Result<()> {
    let (mut child, pid) = spawn_stopped(Command::new("true"))?;

    let start = pc(pid)?;

    ptrace::sysemu_step(pid, None)?;
    assert_eq!(wait_tracee(pid)?, WaitStatus::Stopped(pid, Signal::SIGTRAP));
    let one = pc(pid)?;
    assert_ne!(one, start);

    ptrace(Request::SysEmuSingleStep { signal: None }, pid)?.into_unit()?;
    assert_eq!(wait_tracee(pid)?, WaitStatus::Stopped(pid, Signal::SIGTRAP));
    assert_ne!(pc(pid)?, one);

    child.kill()?;
    child.wait()?;

    Ok(())
}
