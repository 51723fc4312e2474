use std::process::Termination;

/// Process exit codes, following `<sysexits.h>` where one applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,

    /// Anything without a more specific code
    Error = 1,

    /// Invalid user input, e.g. a blank title or a malformed email (EX_DATAERR)
    DataError = 65,

    /// The referenced task doesn't exist (EX_NOINPUT)
    NoInput = 66,

    /// No session, wrong credentials or access refused by the store (EX_NOPERM)
    PermissionDenied = 77,

    /// The configuration couldn't be used (EX_CONFIG)
    ConfigError = 78,
}

impl ExitCode {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl Termination for ExitCode {
    fn report(self) -> std::process::ExitCode {
        self.code().into()
    }
}
