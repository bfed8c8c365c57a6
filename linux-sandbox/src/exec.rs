use std::ffi::CString;
use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;

use crate::error::SandboxErr;

/// Replace the current process image with `command`.
///
/// Only returns when `execvp(3)` fails; the returned error is always fatal.
pub(crate) fn execvp(command: &[OsString]) -> SandboxErr {
    let Some(program) = command.first() else {
        return SandboxErr::ExecFailure {
            program: String::new(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no command specified"),
        };
    };
    let program_name = program.to_string_lossy().into_owned();

    let c_args = match command
        .iter()
        .map(|arg| CString::new(arg.as_bytes()))
        .collect::<Result<Vec<CString>, _>>()
    {
        Ok(c_args) => c_args,
        Err(err) => {
            return SandboxErr::ExecFailure {
                program: program_name,
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, err),
            };
        }
    };

    let mut c_args_ptrs: Vec<*const libc::c_char> = c_args.iter().map(|arg| arg.as_ptr()).collect();
    c_args_ptrs.push(std::ptr::null());

    // SAFETY: every pointer refers to a NUL-terminated string owned by
    // `c_args`, and the vector itself is NULL-terminated.
    unsafe {
        libc::execvp(c_args[0].as_ptr(), c_args_ptrs.as_ptr());
    }

    // If execvp returns, there was an error.
    SandboxErr::ExecFailure {
        program: program_name,
        source: std::io::Error::last_os_error(),
    }
}
