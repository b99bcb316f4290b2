use std::io;
use std::os::unix::process::CommandExt;
use std::process::{Child, Command};

use tracing::debug;

use crate::error::Result;
use crate::request::RequestKind;


/// Spawn `cmd` as a tracee of the calling thread.
///
/// The command is configured to request `PTRACE_TRACEME` after `fork()` and
/// pre-`exec()`. The child then stops with `SIGTRAP` on return from a successful
/// `execve()`, before running any of the new program, and the caller can observe that
/// stop with `waitpid()` without a race.
pub fn spawn(mut cmd: Command) -> Result<Child> {
    // The hook runs post-fork, so it may only make async-signal-safe calls. Make the
    // request directly instead of dispatching, which logs and may allocate.
    unsafe {
        cmd.pre_exec(|| {
            let code = RequestKind::TraceMe.code();
            let null = std::ptr::null_mut::<libc::c_void>();

            if libc::ptrace(code as _, 0, null, null) == -1 {
                return Err(io::Error::last_os_error());
            }

            Ok(())
        })
    };

    let child = cmd.spawn()?;
    debug!(pid = child.id(), "spawned tracee");

    Ok(child)
}
