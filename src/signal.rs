//! Signal numbers as the kernel sees them, including realtime signals.

use std::convert::TryFrom;

use crate::Signal;

/// Lowest realtime signal known to the kernel. The C library may reserve a few above it.
const KERNEL_SIGRTMIN: libc::c_int = 32;

/// Highest signal number known to the kernel (`_NSIG`).
const KERNEL_SIGRTMAX: libc::c_int = 64;

/// A signal number: either a standard POSIX signal, or a realtime signal.
///
/// [`Signal`] only names the standard signals, so a tracee stopped with or killed by
/// `SIGRTMIN + n` is described by [`SignalNumber::Realtime`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SignalNumber {
    Std(Signal),

    /// Raw signal number in `32..=64`.
    Realtime(libc::c_int),
}

impl SignalNumber {
    /// Classify a raw signal number, or `None` if it names no signal.
    pub fn from_raw(signo: libc::c_int) -> Option<Self> {
        if let Ok(signal) = Signal::try_from(signo) {
            return Some(SignalNumber::Std(signal));
        }

        if (KERNEL_SIGRTMIN..=KERNEL_SIGRTMAX).contains(&signo) {
            return Some(SignalNumber::Realtime(signo));
        }

        None
    }

    /// The raw signal number.
    pub fn raw(self) -> libc::c_int {
        match self {
            SignalNumber::Std(signal) => signal as libc::c_int,
            SignalNumber::Realtime(signo) => signo,
        }
    }

    /// The standard signal, if this is one.
    pub fn signal(self) -> Option<Signal> {
        match self {
            SignalNumber::Std(signal) => Some(signal),
            SignalNumber::Realtime(_) => None,
        }
    }

    pub fn is_realtime(self) -> bool {
        matches!(self, SignalNumber::Realtime(_))
    }

    /// Whether the number names a signal the kernel can deliver.
    pub(crate) fn is_valid(self) -> bool {
        Self::from_raw(self.raw()) == Some(self)
    }
}

impl From<Signal> for SignalNumber {
    fn from(signal: Signal) -> Self {
        SignalNumber::Std(signal)
    }
}

impl PartialEq<Signal> for SignalNumber {
    fn eq(&self, other: &Signal) -> bool {
        *self == SignalNumber::Std(*other)
    }
}
