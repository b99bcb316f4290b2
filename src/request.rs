//! Ptrace requests: wire codes, typed operands, and typed replies.

use std::convert::TryFrom;

use crate::error::{internal_error, Error, Result};
use crate::event::EventMessage;
use crate::options::TraceOptions;
use crate::signal::SignalNumber;
use crate::siginfo::SignalInfo;
use crate::{FpRegisters, Registers};

/// Address in the tracee's address space.
pub type Address = u64;

/// A machine word read from or written to a tracee.
pub type Word = libc::c_long;

/// Legacy FXSR register image (`struct user_fxsr_struct`), used by the FPX requests of
/// 32-bit x86 tracers.
#[repr(C, align(16))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FpxRegisters {
    pub bytes: [u8; 512],
}

impl Default for FpxRegisters {
    fn default() -> Self {
        Self { bytes: [0; 512] }
    }
}

/// Every request known to this crate, without operands.
///
/// Each variant maps 1:1 to its wire code, as defined in `include/uapi/linux/ptrace.h`
/// and `arch/x86/include/uapi/asm/ptrace-abi.h`. The mapping is the same on every
/// architecture that defines the request.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[repr(u32)]
pub enum RequestKind {
    TraceMe = 0,
    PeekText = 1,
    PeekData = 2,
    PeekUser = 3,
    PokeText = 4,
    PokeData = 5,
    PokeUser = 6,
    Cont = 7,
    Kill = 8,
    SingleStep = 9,
    GetRegs = 12,
    SetRegs = 13,
    GetFpRegs = 14,
    SetFpRegs = 15,
    Attach = 16,
    Detach = 17,
    GetFpxRegs = 18,
    SetFpxRegs = 19,
    Syscall = 24,
    SysEmu = 31,
    SysEmuSingleStep = 32,
    SetOptions = 0x4200,
    GetEventMsg = 0x4201,
    GetSigInfo = 0x4202,
    SetSigInfo = 0x4203,
    GetRegSet = 0x4204,
    SetRegSet = 0x4205,
    Seize = 0x4206,
    Interrupt = 0x4207,
    Listen = 0x4208,
}

impl RequestKind {
    pub const ALL: &'static [RequestKind] = &[
        RequestKind::TraceMe,
        RequestKind::PeekText,
        RequestKind::PeekData,
        RequestKind::PeekUser,
        RequestKind::PokeText,
        RequestKind::PokeData,
        RequestKind::PokeUser,
        RequestKind::Cont,
        RequestKind::Kill,
        RequestKind::SingleStep,
        RequestKind::GetRegs,
        RequestKind::SetRegs,
        RequestKind::GetFpRegs,
        RequestKind::SetFpRegs,
        RequestKind::Attach,
        RequestKind::Detach,
        RequestKind::GetFpxRegs,
        RequestKind::SetFpxRegs,
        RequestKind::Syscall,
        RequestKind::SysEmu,
        RequestKind::SysEmuSingleStep,
        RequestKind::SetOptions,
        RequestKind::GetEventMsg,
        RequestKind::GetSigInfo,
        RequestKind::SetSigInfo,
        RequestKind::GetRegSet,
        RequestKind::SetRegSet,
        RequestKind::Seize,
        RequestKind::Interrupt,
        RequestKind::Listen,
    ];

    /// Wire code passed as the first argument of `ptrace(2)`.
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Whether the request has defined semantics for a tracer built for this target.
    pub fn is_supported(self) -> bool {
        use RequestKind::*;

        match self {
            // `user` area access and the legacy register requests only exist on x86.
            PeekUser | PokeUser | GetRegs | SetRegs | GetFpRegs | SetFpRegs =>
                cfg!(any(target_arch = "x86", target_arch = "x86_64")),

            // The FXSR requests are only defined for 32-bit x86 tracers.
            GetFpxRegs | SetFpxRegs =>
                cfg!(target_arch = "x86"),

            SysEmu | SysEmuSingleStep =>
                cfg!(any(target_arch = "x86", target_arch = "x86_64", target_arch = "aarch64")),

            _ => true,
        }
    }

    /// The constant name used by the C API.
    pub fn name(self) -> &'static str {
        use RequestKind::*;

        match self {
            TraceMe => "PTRACE_TRACEME",
            PeekText => "PTRACE_PEEKTEXT",
            PeekData => "PTRACE_PEEKDATA",
            PeekUser => "PTRACE_PEEKUSER",
            PokeText => "PTRACE_POKETEXT",
            PokeData => "PTRACE_POKEDATA",
            PokeUser => "PTRACE_POKEUSER",
            Cont => "PTRACE_CONT",
            Kill => "PTRACE_KILL",
            SingleStep => "PTRACE_SINGLESTEP",
            GetRegs => "PTRACE_GETREGS",
            SetRegs => "PTRACE_SETREGS",
            GetFpRegs => "PTRACE_GETFPREGS",
            SetFpRegs => "PTRACE_SETFPREGS",
            Attach => "PTRACE_ATTACH",
            Detach => "PTRACE_DETACH",
            GetFpxRegs => "PTRACE_GETFPXREGS",
            SetFpxRegs => "PTRACE_SETFPXREGS",
            Syscall => "PTRACE_SYSCALL",
            SysEmu => "PTRACE_SYSEMU",
            SysEmuSingleStep => "PTRACE_SYSEMU_SINGLESTEP",
            SetOptions => "PTRACE_SETOPTIONS",
            GetEventMsg => "PTRACE_GETEVENTMSG",
            GetSigInfo => "PTRACE_GETSIGINFO",
            SetSigInfo => "PTRACE_SETSIGINFO",
            GetRegSet => "PTRACE_GETREGSET",
            SetRegSet => "PTRACE_SETREGSET",
            Seize => "PTRACE_SEIZE",
            Interrupt => "PTRACE_INTERRUPT",
            Listen => "PTRACE_LISTEN",
        }
    }
}

impl TryFrom<u32> for RequestKind {
    type Error = Error;

    fn try_from(code: u32) -> Result<Self> {
        RequestKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.code() == code)
            .ok_or(Error::UnknownRequest { code })
    }
}

impl From<RequestKind> for u32 {
    fn from(kind: RequestKind) -> u32 {
        kind.code()
    }
}

/// A ptrace request, with exactly the operands it uses.
///
/// Restarting requests take an optional signal to deliver to the tracee on resume. A
/// [`SignalNumber::Realtime`] outside the kernel's range is rejected before any syscall.
///
/// The regset requests share a wire code, and differ in the register set they name.
#[derive(Clone, Copy, Debug)]
pub enum Request {
    /// Make the calling process a tracee of its parent. The pid is ignored.
    TraceMe,
    PeekText { addr: Address },
    PeekData { addr: Address },

    /// Read a word at `offset` in the tracee's `user` area.
    PeekUser { offset: u64 },
    PokeText { addr: Address, word: Word },
    PokeData { addr: Address, word: Word },
    PokeUser { offset: u64, word: Word },
    Cont { signal: Option<SignalNumber> },
    Kill,
    SingleStep { signal: Option<SignalNumber> },
    GetRegs,
    SetRegs { regs: Registers },
    GetFpRegs,
    SetFpRegs { regs: FpRegisters },
    Attach,
    Detach { signal: Option<SignalNumber> },
    GetFpxRegs,
    SetFpxRegs { regs: FpxRegisters },
    Syscall { signal: Option<SignalNumber> },
    SysEmu { signal: Option<SignalNumber> },
    SysEmuSingleStep { signal: Option<SignalNumber> },
    SetOptions { options: TraceOptions },
    GetEventMsg,
    GetSigInfo,
    SetSigInfo { info: SignalInfo },

    /// Read the general-purpose register set (`NT_PRSTATUS`).
    GetRegSet,

    /// Write the general-purpose register set (`NT_PRSTATUS`).
    SetRegSet { regs: Registers },

    /// Read the floating point register set (`NT_PRFPREG`), via `PTRACE_GETREGSET`.
    GetFpRegSet,

    /// Write the floating point register set (`NT_PRFPREG`), via `PTRACE_SETREGSET`.
    SetFpRegSet { regs: FpRegisters },
    Seize { options: TraceOptions },
    Interrupt,
    Listen,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::TraceMe => RequestKind::TraceMe,
            Request::PeekText { .. } => RequestKind::PeekText,
            Request::PeekData { .. } => RequestKind::PeekData,
            Request::PeekUser { .. } => RequestKind::PeekUser,
            Request::PokeText { .. } => RequestKind::PokeText,
            Request::PokeData { .. } => RequestKind::PokeData,
            Request::PokeUser { .. } => RequestKind::PokeUser,
            Request::Cont { .. } => RequestKind::Cont,
            Request::Kill => RequestKind::Kill,
            Request::SingleStep { .. } => RequestKind::SingleStep,
            Request::GetRegs => RequestKind::GetRegs,
            Request::SetRegs { .. } => RequestKind::SetRegs,
            Request::GetFpRegs => RequestKind::GetFpRegs,
            Request::SetFpRegs { .. } => RequestKind::SetFpRegs,
            Request::Attach => RequestKind::Attach,
            Request::Detach { .. } => RequestKind::Detach,
            Request::GetFpxRegs => RequestKind::GetFpxRegs,
            Request::SetFpxRegs { .. } => RequestKind::SetFpxRegs,
            Request::Syscall { .. } => RequestKind::Syscall,
            Request::SysEmu { .. } => RequestKind::SysEmu,
            Request::SysEmuSingleStep { .. } => RequestKind::SysEmuSingleStep,
            Request::SetOptions { .. } => RequestKind::SetOptions,
            Request::GetEventMsg => RequestKind::GetEventMsg,
            Request::GetSigInfo => RequestKind::GetSigInfo,
            Request::SetSigInfo { .. } => RequestKind::SetSigInfo,
            Request::GetRegSet => RequestKind::GetRegSet,
            Request::SetRegSet { .. } => RequestKind::SetRegSet,
            Request::GetFpRegSet => RequestKind::GetRegSet,
            Request::SetFpRegSet { .. } => RequestKind::SetRegSet,
            Request::Seize { .. } => RequestKind::Seize,
            Request::Interrupt => RequestKind::Interrupt,
            Request::Listen => RequestKind::Listen,
        }
    }
}

/// Typed result of a dispatched [`Request`].
#[derive(Clone, Copy, Debug)]
pub enum Reply {
    /// The request returns nothing beyond success.
    Unit,
    Word(Word),
    Event(EventMessage),
    SigInfo(SignalInfo),
    Registers(Registers),
    FpRegisters(FpRegisters),
    FpxRegisters(FpxRegisters),
}

impl Reply {
    pub fn into_unit(self) -> Result<()> {
        match self {
            Reply::Unit => Ok(()),
            reply => internal_error!("expected unit reply, got {:?}", reply),
        }
    }

    pub fn into_word(self) -> Result<Word> {
        match self {
            Reply::Word(word) => Ok(word),
            reply => internal_error!("expected word reply, got {:?}", reply),
        }
    }

    pub fn into_event(self) -> Result<EventMessage> {
        match self {
            Reply::Event(msg) => Ok(msg),
            reply => internal_error!("expected event message reply, got {:?}", reply),
        }
    }

    pub fn into_siginfo(self) -> Result<SignalInfo> {
        match self {
            Reply::SigInfo(info) => Ok(info),
            reply => internal_error!("expected siginfo reply, got {:?}", reply),
        }
    }

    pub fn into_registers(self) -> Result<Registers> {
        match self {
            Reply::Registers(regs) => Ok(regs),
            reply => internal_error!("expected registers reply, got {:?}", reply),
        }
    }

    pub fn into_fp_registers(self) -> Result<FpRegisters> {
        match self {
            Reply::FpRegisters(regs) => Ok(regs),
            reply => internal_error!("expected FP registers reply, got {:?}", reply),
        }
    }
}
