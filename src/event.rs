//! Ptrace-event-stops, and the event message attached to them.

use std::convert::TryFrom;

use crate::error::{Error, Result};
use crate::request::RequestKind;
use crate::signal::SignalNumber;
use crate::Pid;

/// Kind of a ptrace-event-stop, as found in bits 16..24 of a `wait(2)` status.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum PtraceEvent {
    Fork,
    Vfork,
    Clone,
    Exec,
    VforkDone,
    Exit,
    Seccomp,

    /// Group-stop or `PTRACE_INTERRUPT` stop of a seized tracee.
    Stop,
}

impl PtraceEvent {
    /// The kernel's `PTRACE_EVENT_*` code.
    pub fn code(self) -> libc::c_int {
        match self {
            PtraceEvent::Fork => libc::PTRACE_EVENT_FORK,
            PtraceEvent::Vfork => libc::PTRACE_EVENT_VFORK,
            PtraceEvent::Clone => libc::PTRACE_EVENT_CLONE,
            PtraceEvent::Exec => libc::PTRACE_EVENT_EXEC,
            PtraceEvent::VforkDone => libc::PTRACE_EVENT_VFORK_DONE,
            PtraceEvent::Exit => libc::PTRACE_EVENT_EXIT,
            PtraceEvent::Seccomp => libc::PTRACE_EVENT_SECCOMP,
            PtraceEvent::Stop => libc::PTRACE_EVENT_STOP,
        }
    }
}

impl TryFrom<libc::c_int> for PtraceEvent {
    type Error = Error;

    fn try_from(code: libc::c_int) -> Result<Self> {
        let event = match code {
            libc::PTRACE_EVENT_FORK => PtraceEvent::Fork,
            libc::PTRACE_EVENT_VFORK => PtraceEvent::Vfork,
            libc::PTRACE_EVENT_CLONE => PtraceEvent::Clone,
            libc::PTRACE_EVENT_EXEC => PtraceEvent::Exec,
            libc::PTRACE_EVENT_VFORK_DONE => PtraceEvent::VforkDone,
            libc::PTRACE_EVENT_EXIT => PtraceEvent::Exit,
            libc::PTRACE_EVENT_SECCOMP => PtraceEvent::Seccomp,
            libc::PTRACE_EVENT_STOP => PtraceEvent::Stop,
            _ => {
                let reason = format!("unknown ptrace event code {}", code);
                return Err(Error::InvalidArgument { request: RequestKind::GetEventMsg, reason });
            },
        };

        Ok(event)
    }
}

/// Payload of `PTRACE_GETEVENTMSG`.
///
/// Its meaning depends on the ptrace-event-stop the tracee is in. See [`EventMessage::interpret()`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct EventMessage(libc::c_ulong);

impl EventMessage {
    pub fn new(raw: libc::c_ulong) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> libc::c_ulong {
        self.0
    }

    /// The new task (fork, vfork, clone, vfork-done) or former thread ID (exec).
    pub fn as_pid(self) -> Pid {
        Pid::from_raw(self.0 as u32 as i32)
    }

    /// Pending wait status of an exiting tracee.
    pub fn exit_status(self) -> Result<ExitStatus> {
        // Only the low 16-bit word carries the status.
        ExitStatus::parse(self.0 as u16)
    }

    /// `SECCOMP_RET_DATA` of the rule that triggered a seccomp-stop.
    pub fn seccomp_data(self) -> u16 {
        self.0 as u16
    }

    /// Decode the message for a stop of kind `event`.
    pub fn interpret(self, event: PtraceEvent) -> Result<EventDetail> {
        let detail = match event {
            PtraceEvent::Fork => EventDetail::Fork { new: self.as_pid() },
            PtraceEvent::Vfork => EventDetail::Vfork { new: self.as_pid() },
            PtraceEvent::Clone => EventDetail::Clone { new: self.as_pid() },
            PtraceEvent::Exec => EventDetail::Exec { old: self.as_pid() },
            PtraceEvent::VforkDone => EventDetail::VforkDone { new: self.as_pid() },
            PtraceEvent::Exit => EventDetail::Exit(self.exit_status()?),
            PtraceEvent::Seccomp => EventDetail::Seccomp { data: self.seccomp_data() },
            PtraceEvent::Stop => EventDetail::Stop,
        };

        Ok(detail)
    }
}

impl From<EventMessage> for libc::c_ulong {
    fn from(msg: EventMessage) -> Self {
        msg.0
    }
}

/// A decoded [`EventMessage`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum EventDetail {
    Fork { new: Pid },
    Vfork { new: Pid },
    Clone { new: Pid },
    Exec { old: Pid },
    VforkDone { new: Pid },
    Exit(ExitStatus),
    Seccomp { data: u16 },
    Stop,
}

/// How an exiting tracee is terminating.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitStatus {
    Exited(i32),
    Signaled { signal: SignalNumber, core_dumped: bool },
}

impl ExitStatus {
    pub(crate) fn parse(status: u16) -> Result<Self> {
        // The bit layout of the word `status` is:
        //
        //   15                         8   7                     0
        //    +-------------------------+---+---------------------+
        //    |        exit_code        | c |       sig_no        |
        //    +-------------------------+---+---------------------+
        //
        // A nonzero `status[6:0]` is the terminating signal, and a set `status[7]`
        // flags a core dump. Otherwise, the exit code is `status[15:8]`.
        let sig_no = status & 0x7f;

        let ty = if sig_no == 0 {
            // Extract, zero-extend, cast.
            let exit_code = (status >> 8) as u8 as i32;

            ExitStatus::Exited(exit_code)
        } else {
            let signal = SignalNumber::from_raw(sig_no as i32).ok_or_else(|| Error::InvalidArgument {
                request: RequestKind::GetEventMsg,
                reason: format!("exit status {:#06x} has unknown signal {}", status, sig_no),
            })?;
            let core_dumped = status & (1 << 7) != 0;

            ExitStatus::Signaled { signal, core_dumped }
        };

        Ok(ty)
    }
}
