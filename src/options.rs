//! Tracing options, as set by `PTRACE_SETOPTIONS` or `PTRACE_SEIZE`.

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::request::RequestKind;

bitflags! {
    /// Independent tracing options, combined with bitwise OR.
    ///
    /// Bit values are the kernel's `PTRACE_O_*` constants. A value holding bits outside
    /// this set is never passed to the kernel.
    ///
    /// Parse raw option words with [`TraceOptions::from_raw()`], which rejects unknown
    /// bits. The generated `from_bits_truncate()` silently drops them.
    pub struct TraceOptions: libc::c_int {
        /// Set bit 7 of the signal number for syscall-stops, i.e. report `SIGTRAP | 0x80`.
        const TRACESYSGOOD = 0x1;

        /// Stop at the next `fork()`, and auto-attach the new child.
        const TRACEFORK = 0x2;

        /// Stop at the next `vfork()`, and auto-attach the new child.
        const TRACEVFORK = 0x4;

        /// Stop at the next `clone()`, and auto-attach the new task.
        const TRACECLONE = 0x8;

        /// Stop at the next successful `execve()`.
        const TRACEEXEC = 0x10;

        /// Stop at the completion of the next `vfork()`.
        const TRACEVFORKDONE = 0x20;

        /// Stop the tracee at exit, while its registers are still readable.
        const TRACEEXIT = 0x40;

        /// Stop when a seccomp `SECCOMP_RET_TRACE` rule is triggered.
        const TRACESECCOMP = 0x80;

        /// Send `SIGKILL` to every tracee if the tracer exits.
        const EXITKILL = 0x10_0000;

        /// Suspend the tracee's seccomp protections.
        const SUSPEND_SECCOMP = 0x20_0000;
    }
}

impl TraceOptions {
    /// Parse a raw option word, rejecting any bit the kernel does not define.
    pub fn from_raw(bits: libc::c_int) -> Result<Self> {
        Self::from_bits(bits).ok_or_else(|| unknown_bits(RequestKind::SetOptions, bits))
    }

    /// Check that `self` holds only known bits, and return the raw option word.
    pub(crate) fn validate(self, request: RequestKind) -> Result<libc::c_int> {
        let bits = self.bits();

        if bits & !Self::all().bits() != 0 {
            return Err(unknown_bits(request, bits));
        }

        Ok(bits)
    }
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self::empty()
    }
}

fn unknown_bits(request: RequestKind, bits: libc::c_int) -> Error {
    let unknown = bits & !TraceOptions::all().bits();
    let reason = format!("unknown option bits {:#x}", unknown);

    Error::InvalidArgument { request, reason }
}
