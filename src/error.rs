use std::io;

use nix::errno::Errno;

use crate::request::RequestKind;
use crate::Pid;


pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Request {request:?} is not supported on this platform")]
    UnsupportedOperation { request: RequestKind },

    #[error("Unknown ptrace request code = {code:#x}")]
    UnknownRequest { code: u32 },

    #[error("Invalid argument for request {request:?}: {reason}")]
    InvalidArgument { request: RequestKind, reason: String },

    #[error("Request {request:?} failed for tracee = {pid}")]
    OS {
        request: RequestKind,
        pid: Pid,
        source: Errno,
    },

    #[error("Input/output error")]
    IO(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// The request has no meaning on this platform, or is unknown.
    UnsupportedOperation,

    /// Malformed operand, rejected before any syscall was made.
    InvalidArgument,

    /// The syscall itself failed with the given `errno`.
    OsError(Errno),

    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnsupportedOperation { .. } | Error::UnknownRequest { .. } =>
                ErrorKind::UnsupportedOperation,
            Error::InvalidArgument { .. } =>
                ErrorKind::InvalidArgument,
            Error::OS { source, .. } =>
                ErrorKind::OsError(*source),
            Error::IO(_) | Error::Internal(_) =>
                ErrorKind::Other,
        }
    }

    /// The `errno` reported by a failed syscall, if any.
    pub fn errno(&self) -> Option<Errno> {
        match self {
            Error::OS { source, .. } => Some(*source),
            Error::IO(err) => err.raw_os_error().map(Errno::from_i32),
            _ => None,
        }
    }

    /// The tracee does not exist, or is not traced by the calling thread.
    pub fn tracee_died(&self) -> bool {
        self.errno() == Some(Errno::ESRCH)
    }

    /// The request needs the tracee to be in a ptrace-stop, and it wasn't.
    ///
    /// The kernel reports this the same way as a missing tracee, so this is
    /// true in both cases.
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Error::OS { source: Errno::ESRCH, .. })
    }
}

/// Attach request context to a raw `nix` result.
pub(crate) trait ResultExt<T> {
    fn for_request(self, request: RequestKind, pid: Pid) -> Result<T>;
}

impl<T> ResultExt<T> for nix::Result<T> {
    fn for_request(self, request: RequestKind, pid: Pid) -> Result<T> {
        self.map_err(|source| Error::OS { request, pid, source })
    }
}

macro_rules! internal_error {
    ($($arg: tt)*) => {
        return Err($crate::error::Error::Internal(format!($($arg)*)))
    };
}

pub(crate) use internal_error;
