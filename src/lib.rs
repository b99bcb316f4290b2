//! Typed wrappers for the Linux `ptrace(2)` request surface.
//!
//! [`ptrace()`] dispatches any [`Request`], whose variants carry exactly the operands the
//! kernel reads for them. Specialised functions such as [`getevent()`],
//! [`getsiginfo()`], [`setsiginfo()`] and [`setoptions()`] are thin calls into the same
//! dispatcher.
//!
//! Every call makes at most one blocking syscall and keeps no state. Calls on distinct
//! tracees may be made from any thread. The kernel only accepts requests for a tracee
//! from the thread that attached to it, and callers are responsible for that rule.

#[cfg(not(all(
    any(target_os = "linux", target_os = "android"),
    any(target_arch = "x86_64", target_arch = "aarch64"),
)))]
compile_error!("tracectl supports Linux and Android on x86_64 and aarch64");

pub mod error;
pub mod cmd;
pub mod event;
pub mod options;
pub mod ptrace;
pub mod request;
pub mod siginfo;
pub mod signal;

#[cfg(target_arch = "aarch64")]
pub mod aarch64;

#[cfg(target_arch = "x86_64")]
pub mod x86;

pub use cmd::spawn;
pub use error::{Error, ErrorKind, Result};
pub use event::{EventDetail, EventMessage, ExitStatus, PtraceEvent};
pub use options::TraceOptions;
pub use ptrace::{getevent, getsiginfo, ptrace, setoptions, setsiginfo};
pub use request::{Address, FpxRegisters, Reply, Request, RequestKind, Word};
pub use siginfo::SignalInfo;
pub use signal::SignalNumber;

pub use nix::unistd::Pid;

/// POSIX signal.
pub use nix::sys::signal::Signal;

#[cfg(target_arch = "aarch64")]
pub use aarch64::{FpRegisters, Registers};

#[cfg(target_arch = "x86_64")]
pub use x86::{FpRegisters, Registers};
