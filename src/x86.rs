//! x86_64 register images and `user` area layout.

/// Linux constant defined in `include/uapi/linux/elf.h`.
pub(crate) const NT_PRSTATUS: libc::c_int = 0x1;

/// Linux constant defined in `include/uapi/linux/elf.h`.
pub(crate) const NT_PRFPREG: libc::c_int = 0x2;

/// General-purpose registers, as read by `PTRACE_GETREGS`.
pub type Registers = libc::user_regs_struct;

/// Floating point and SSE state, as read by `PTRACE_GETFPREGS`. The same 512-byte
/// FXSAVE image is the `NT_PRFPREG` register set.
pub type FpRegisters = libc::user_fpregs_struct;

/// Hardware debug registers, addressable through the `user` area.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DebugRegister {
    Dr0 = 0,
    Dr1,
    Dr2,
    Dr3,
    Dr4,
    Dr5,
    Dr6,
    Dr7,
}

impl DebugRegister {
    /// Offset of this register in the virtual `user` struct, for `PTRACE_PEEKUSER` and
    /// `PTRACE_POKEUSER`.
    pub fn user_offset(self) -> u64 {
        let base = memoffset::offset_of!(libc::user, u_debugreg) as u64;
        base + 8 * self as u64
    }
}

/// Offset of a general-purpose register in the virtual `user` struct.
///
/// `field_offset` is the offset of the register within [`Registers`], e.g.
/// `memoffset::offset_of!(Registers, rip)`.
pub fn user_regs_offset(field_offset: usize) -> u64 {
    (memoffset::offset_of!(libc::user, regs) + field_offset) as u64
}
