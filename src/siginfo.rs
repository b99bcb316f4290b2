//! Signal information for the most recent stop, as read by `PTRACE_GETSIGINFO`.

use std::fmt;

use crate::signal::SignalNumber;
use crate::Pid;

/// Extra signal info, such as its cause and sender.
///
/// Which payload accessors are meaningful depends on [`SignalInfo::code()`] and the
/// signal number: `pid()`/`uid()` for signals sent by a process (`SI_USER`,
/// `SI_QUEUE`, `SIGCHLD`), `status()` for `SIGCHLD`, and `addr()` for faults such as
/// `SIGSEGV`, `SIGBUS`, `SIGILL`, `SIGFPE` and `SIGTRAP`.
#[derive(Clone, Copy)]
pub struct SignalInfo {
    raw: libc::siginfo_t,
}

impl SignalInfo {
    /// Construct info for `signal`, as if sent by `kill()` (`si_code = SI_USER`).
    pub fn new(signal: impl Into<SignalNumber>) -> Self {
        // SAFETY: `siginfo_t` is a C struct of integers and unions of integers and
        // pointers, for which all-zeroes is a valid value.
        let mut raw: libc::siginfo_t = unsafe { std::mem::zeroed() };
        raw.si_signo = signal.into().raw();
        raw.si_code = libc::SI_USER;

        Self { raw }
    }

    /// Set the `si_code` field, e.g. `SI_KERNEL` or `TRAP_BRKPT`.
    pub fn with_code(mut self, code: i32) -> Self {
        self.raw.si_code = code;
        self
    }

    /// Set the `si_errno` field.
    pub fn with_errno(mut self, errno: i32) -> Self {
        self.raw.si_errno = errno;
        self
    }

    pub fn signo(&self) -> i32 {
        self.raw.si_signo
    }

    /// The signal, standard or realtime, if `signo()` names one.
    pub fn signal(&self) -> Option<SignalNumber> {
        SignalNumber::from_raw(self.raw.si_signo)
    }

    pub fn code(&self) -> i32 {
        self.raw.si_code
    }

    pub fn errno(&self) -> i32 {
        self.raw.si_errno
    }

    /// Sending process.
    pub fn pid(&self) -> Pid {
        // SAFETY: reads an integer member of the payload union. All bit patterns are
        // valid, and the value is only meaningful for the codes listed on the type.
        Pid::from_raw(unsafe { self.raw.si_pid() })
    }

    /// Real user ID of the sending process.
    pub fn uid(&self) -> libc::uid_t {
        // SAFETY: see `pid()`.
        unsafe { self.raw.si_uid() }
    }

    /// Exit status or signal of a `SIGCHLD` child.
    pub fn status(&self) -> i32 {
        // SAFETY: see `pid()`.
        unsafe { self.raw.si_status() }
    }

    /// Faulting address.
    pub fn addr(&self) -> u64 {
        // SAFETY: see `pid()`. The pointer is never dereferenced.
        unsafe { self.raw.si_addr() as u64 }
    }

    pub fn as_raw(&self) -> &libc::siginfo_t {
        &self.raw
    }

    pub fn into_raw(self) -> libc::siginfo_t {
        self.raw
    }

    fn as_bytes(&self) -> &[u8] {
        let len = std::mem::size_of::<libc::siginfo_t>();

        // SAFETY: `siginfo_t` is plain old data with no padding between its `int`
        // header fields and the `int`-aligned payload.
        unsafe { std::slice::from_raw_parts(&self.raw as *const _ as *const u8, len) }
    }
}

impl From<libc::siginfo_t> for SignalInfo {
    fn from(raw: libc::siginfo_t) -> Self {
        Self { raw }
    }
}

impl fmt::Debug for SignalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalInfo")
            .field("signo", &self.signo())
            .field("errno", &self.errno())
            .field("code", &self.code())
            .finish()
    }
}

impl PartialEq for SignalInfo {
    fn eq(&self, other: &Self) -> bool {
        // Compare the whole record, including the payload union.
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for SignalInfo {}
