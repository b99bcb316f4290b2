//! The request dispatcher, and a specialised wrapper for each common request.
//!
//! Every wrapper is a call to [`ptrace()`] with the matching [`Request`], so the
//! generic and specialised forms are interchangeable.

use std::mem::{self, MaybeUninit};
use std::ptr;

use libc::c_void;
use nix::errno::Errno;
use tracing::{debug, trace};

use crate::error::{Error, Result, ResultExt};
use crate::event::EventMessage;
use crate::options::TraceOptions;
use crate::request::{Address, Reply, Request, RequestKind, Word};
use crate::signal::SignalNumber;
use crate::siginfo::SignalInfo;
use crate::{FpRegisters, Pid, Registers};

#[cfg(target_arch = "aarch64")]
use crate::aarch64::{NT_PRFPREG, NT_PRSTATUS};

#[cfg(target_arch = "x86_64")]
use crate::x86::{NT_PRFPREG, NT_PRSTATUS};

#[cfg(any(target_env = "musl", target_os = "android"))]
type RequestType = libc::c_int;

#[cfg(not(any(target_env = "musl", target_os = "android")))]
type RequestType = libc::c_uint;

/// Perform a ptrace request on `pid`.
///
/// Requests without semantics on this platform fail with
/// [`Error::UnsupportedOperation`], and requests with malformed operands fail with
/// [`Error::InvalidArgument`]. In both cases no syscall is made. Otherwise exactly
/// one syscall is made, and its failure is reported as [`Error::OS`].
pub fn ptrace(request: Request, pid: Pid) -> Result<Reply> {
    let kind = request.kind();

    if !kind.is_supported() {
        return Err(Error::UnsupportedOperation { request: kind });
    }

    trace!(pid = pid.as_raw(), request = kind.name(), "ptrace request");

    let reply = dispatch(request, kind, pid);

    if let Err(err) = &reply {
        debug!(pid = pid.as_raw(), request = kind.name(), %err, "ptrace request failed");
    }

    reply
}

fn dispatch(request: Request, kind: RequestKind, pid: Pid) -> Result<Reply> {
    let reply = match request {
        Request::TraceMe |
        Request::Kill |
        Request::Attach |
        Request::Interrupt |
        Request::Listen => {
            unit(kind, pid, ptr::null_mut(), ptr::null_mut())?
        },
        Request::PeekText { addr } |
        Request::PeekData { addr } => {
            Reply::Word(peek(kind, pid, address(addr))?)
        },
        Request::PeekUser { offset } => {
            Reply::Word(peek(kind, pid, address(offset))?)
        },
        Request::PokeText { addr, word } |
        Request::PokeData { addr, word } => {
            unit(kind, pid, address(addr), word as *mut c_void)?
        },
        Request::PokeUser { offset, word } => {
            unit(kind, pid, address(offset), word as *mut c_void)?
        },
        Request::Cont { signal } |
        Request::SingleStep { signal } |
        Request::Syscall { signal } |
        Request::SysEmu { signal } |
        Request::SysEmuSingleStep { signal } |
        Request::Detach { signal } => {
            unit(kind, pid, ptr::null_mut(), signal_data(kind, signal)?)?
        },
        Request::SetOptions { options } |
        Request::Seize { options } => {
            let bits = options.validate(kind)?;
            unit(kind, pid, ptr::null_mut(), bits as usize as *mut c_void)?
        },
        Request::GetEventMsg => {
            let mut msg: libc::c_ulong = 0;
            unit(kind, pid, ptr::null_mut(), &mut msg as *mut _ as *mut c_void)?;
            Reply::Event(EventMessage::new(msg))
        },
        Request::GetSigInfo => {
            Reply::SigInfo(SignalInfo::from(get_struct::<libc::siginfo_t>(kind, pid)?))
        },
        Request::SetSigInfo { info } => {
            set_struct(kind, pid, info.as_raw())?
        },
        Request::GetRegs => {
            Reply::Registers(get_struct(kind, pid)?)
        },
        Request::SetRegs { regs } => {
            set_struct(kind, pid, &regs)?
        },
        Request::GetFpRegs => {
            Reply::FpRegisters(get_struct(kind, pid)?)
        },
        Request::SetFpRegs { regs } => {
            set_struct(kind, pid, &regs)?
        },
        Request::GetFpxRegs => {
            Reply::FpxRegisters(get_struct(kind, pid)?)
        },
        Request::SetFpxRegs { regs } => {
            set_struct(kind, pid, &regs)?
        },
        Request::GetRegSet => {
            Reply::Registers(get_regset(kind, pid, NT_PRSTATUS)?)
        },
        Request::SetRegSet { regs } => {
            set_regset(kind, pid, NT_PRSTATUS, &regs)?
        },
        Request::GetFpRegSet => {
            Reply::FpRegisters(get_regset(kind, pid, NT_PRFPREG)?)
        },
        Request::SetFpRegSet { regs } => {
            set_regset(kind, pid, NT_PRFPREG, &regs)?
        },
    };

    Ok(reply)
}

// Make the syscall, with `errno` converted at the call boundary.
fn raw_request(kind: RequestKind, pid: Pid, addr: *mut c_void, data: *mut c_void) -> nix::Result<libc::c_long> {
    // SAFETY: every `addr` and `data` passed here is either an integer operand, or a
    // pointer to a live local of the size the kernel expects for `kind`.
    let res = unsafe { libc::ptrace(kind.code() as RequestType, pid.as_raw(), addr, data) };

    Errno::result(res)
}

fn unit(kind: RequestKind, pid: Pid, addr: *mut c_void, data: *mut c_void) -> Result<Reply> {
    raw_request(kind, pid, addr, data).for_request(kind, pid)?;
    Ok(Reply::Unit)
}

// Peek requests return the word read, so `-1` is ambiguous. Clear `errno` first, and
// treat `-1` as an error only if the kernel set it.
fn peek(kind: RequestKind, pid: Pid, addr: *mut c_void) -> Result<Word> {
    Errno::clear();

    match raw_request(kind, pid, addr, ptr::null_mut()) {
        Ok(word) => Ok(word),
        Err(Errno::UnknownErrno) => Ok(-1),
        Err(errno) => Err::<Word, _>(errno).for_request(kind, pid),
    }
}

// Read a kernel-filled struct through `data`.
fn get_struct<T: Copy>(kind: RequestKind, pid: Pid) -> Result<T> {
    let mut data = MaybeUninit::<T>::uninit();
    raw_request(kind, pid, ptr::null_mut(), data.as_mut_ptr() as *mut c_void).for_request(kind, pid)?;

    // SAFETY: on success, the kernel has written a complete `T`.
    Ok(unsafe { data.assume_init() })
}

// Pass a struct to the kernel through `data`. It is only read.
fn set_struct<T>(kind: RequestKind, pid: Pid, data: &T) -> Result<Reply> {
    unit(kind, pid, ptr::null_mut(), data as *const T as *mut c_void)
}

// Read the register set `note` through an iovec.
fn get_regset<T: Copy>(kind: RequestKind, pid: Pid, note: libc::c_int) -> Result<T> {
    // SAFETY: only instantiated with register images, which are plain integers, for
    // which all-zeroes is valid.
    let mut regs: T = unsafe { mem::zeroed() };
    let mut iov = libc::iovec {
        iov_base: &mut regs as *mut T as *mut c_void,
        iov_len: mem::size_of::<T>(),
    };
    unit(kind, pid, note as usize as *mut c_void, &mut iov as *mut _ as *mut c_void)?;

    Ok(regs)
}

// Write the register set `note` through an iovec. The kernel only reads `regs`.
fn set_regset<T>(kind: RequestKind, pid: Pid, note: libc::c_int, regs: &T) -> Result<Reply> {
    let mut iov = libc::iovec {
        iov_base: regs as *const T as *mut c_void,
        iov_len: mem::size_of::<T>(),
    };
    unit(kind, pid, note as usize as *mut c_void, &mut iov as *mut _ as *mut c_void)
}

fn address(addr: Address) -> *mut c_void {
    addr as usize as *mut c_void
}

fn signal_data(kind: RequestKind, signal: Option<SignalNumber>) -> Result<*mut c_void> {
    let signo = match signal {
        None => 0,
        Some(signal) if signal.is_valid() => signal.raw(),
        Some(signal) => {
            let reason = format!("{:?} is not a deliverable signal", signal);
            return Err(Error::InvalidArgument { request: kind, reason });
        },
    };

    Ok(signo as usize as *mut c_void)
}

/// Gets a ptrace event as described by `ptrace(PTRACE_GETEVENTMSG, ...)`.
///
/// Only valid while `pid` is in a ptrace-stop. Otherwise fails with `ESRCH`, and
/// [`Error::is_invalid_state()`] holds.
pub fn getevent(pid: Pid) -> Result<EventMessage> {
    ptrace(Request::GetEventMsg, pid)?.into_event()
}

/// Get siginfo as with `ptrace(PTRACE_GETSIGINFO, ...)`.
pub fn getsiginfo(pid: Pid) -> Result<SignalInfo> {
    ptrace(Request::GetSigInfo, pid)?.into_siginfo()
}

/// Set siginfo as with `ptrace(PTRACE_SETSIGINFO, ...)`.
///
/// The info replaces that of the signal pending delivery at the current stop.
pub fn setsiginfo(pid: Pid, info: &SignalInfo) -> Result<()> {
    ptrace(Request::SetSigInfo { info: *info }, pid)?.into_unit()
}

/// Set options, as with `ptrace(PTRACE_SETOPTIONS, ...)`.
///
/// Fails with [`Error::InvalidArgument`], before any syscall, if `options` holds an
/// unknown bit.
pub fn setoptions(pid: Pid, options: TraceOptions) -> Result<()> {
    ptrace(Request::SetOptions { options }, pid)?.into_unit()
}

/// Request to be traced by the parent, as with `ptrace(PTRACE_TRACEME, ...)`.
pub fn traceme() -> Result<()> {
    ptrace(Request::TraceMe, Pid::from_raw(0))?.into_unit()
}

/// Attach to `pid`, which is sent a `SIGSTOP`.
pub fn attach(pid: Pid) -> Result<()> {
    ptrace(Request::Attach, pid)?.into_unit()
}

/// Attach to `pid` without stopping it, installing `options`.
pub fn seize(pid: Pid, options: TraceOptions) -> Result<()> {
    ptrace(Request::Seize { options }, pid)?.into_unit()
}

/// Stop a seized tracee.
pub fn interrupt(pid: Pid) -> Result<()> {
    ptrace(Request::Interrupt, pid)?.into_unit()
}

/// Restart a seized tracee stopped in group-stop, without resuming it.
pub fn listen(pid: Pid) -> Result<()> {
    ptrace(Request::Listen, pid)?.into_unit()
}

pub fn detach(pid: Pid, signal: impl Into<Option<SignalNumber>>) -> Result<()> {
    let signal = signal.into();
    ptrace(Request::Detach { signal }, pid)?.into_unit()
}

/// Kill the tracee, as with `ptrace(PTRACE_KILL, ...)`.
///
/// The kernel only honours this for a tracee in a ptrace-stop. Prefer sending
/// `SIGKILL`.
pub fn kill(pid: Pid) -> Result<()> {
    ptrace(Request::Kill, pid)?.into_unit()
}

pub fn cont(pid: Pid, signal: impl Into<Option<SignalNumber>>) -> Result<()> {
    let signal = signal.into();
    ptrace(Request::Cont { signal }, pid)?.into_unit()
}

pub fn step(pid: Pid, signal: impl Into<Option<SignalNumber>>) -> Result<()> {
    let signal = signal.into();
    ptrace(Request::SingleStep { signal }, pid)?.into_unit()
}

/// Resume, stopping at the next syscall entry or exit.
pub fn syscall(pid: Pid, signal: impl Into<Option<SignalNumber>>) -> Result<()> {
    let signal = signal.into();
    ptrace(Request::Syscall { signal }, pid)?.into_unit()
}

/// Resume, stopping at the next syscall entry, which is not executed.
pub fn sysemu(pid: Pid, signal: impl Into<Option<SignalNumber>>) -> Result<()> {
    let signal = signal.into();
    ptrace(Request::SysEmu { signal }, pid)?.into_unit()
}

pub fn sysemu_step(pid: Pid, signal: impl Into<Option<SignalNumber>>) -> Result<()> {
    let signal = signal.into();
    ptrace(Request::SysEmuSingleStep { signal }, pid)?.into_unit()
}

/// Read a word of tracee memory.
pub fn read(pid: Pid, addr: Address) -> Result<Word> {
    ptrace(Request::PeekData { addr }, pid)?.into_word()
}

/// Write a word of tracee memory.
pub fn write(pid: Pid, addr: Address, word: Word) -> Result<()> {
    ptrace(Request::PokeData { addr, word }, pid)?.into_unit()
}

/// Read a word at `offset` in the tracee's `user` area.
pub fn read_user(pid: Pid, offset: u64) -> Result<Word> {
    ptrace(Request::PeekUser { offset }, pid)?.into_word()
}

/// Write a word at `offset` in the tracee's `user` area.
pub fn write_user(pid: Pid, offset: u64, word: Word) -> Result<()> {
    ptrace(Request::PokeUser { offset, word }, pid)?.into_unit()
}

#[cfg(target_arch = "x86_64")]
pub fn getregs(pid: Pid) -> Result<Registers> {
    ptrace(Request::GetRegs, pid)?.into_registers()
}

#[cfg(target_arch = "aarch64")]
pub fn getregs(pid: Pid) -> Result<Registers> {
    ptrace(Request::GetRegSet, pid)?.into_registers()
}

#[cfg(target_arch = "x86_64")]
pub fn setregs(pid: Pid, regs: Registers) -> Result<()> {
    ptrace(Request::SetRegs { regs }, pid)?.into_unit()
}

#[cfg(target_arch = "aarch64")]
pub fn setregs(pid: Pid, regs: Registers) -> Result<()> {
    ptrace(Request::SetRegSet { regs }, pid)?.into_unit()
}

#[cfg(target_arch = "x86_64")]
pub fn getfpregs(pid: Pid) -> Result<FpRegisters> {
    ptrace(Request::GetFpRegs, pid)?.into_fp_registers()
}

#[cfg(target_arch = "aarch64")]
pub fn getfpregs(pid: Pid) -> Result<FpRegisters> {
    ptrace(Request::GetFpRegSet, pid)?.into_fp_registers()
}

#[cfg(target_arch = "x86_64")]
pub fn setfpregs(pid: Pid, regs: FpRegisters) -> Result<()> {
    ptrace(Request::SetFpRegs { regs }, pid)?.into_unit()
}

#[cfg(target_arch = "aarch64")]
pub fn setfpregs(pid: Pid, regs: FpRegisters) -> Result<()> {
    ptrace(Request::SetFpRegSet { regs }, pid)?.into_unit()
}
