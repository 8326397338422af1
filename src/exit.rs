/// Based on BSD sysexits(3).
///
/// `toolchain` only ever distinguishes success from failure at the process
/// boundary, so every variant here collapses to exit code 1 via
/// [`Code::as_process_code`]; the richer tags still carry useful
/// information in diagnostics and log output before that collapse happens.
#[allow(dead_code)]
#[derive(Debug, Copy, Clone)]
pub enum Code {
    /// Command line usage error, or a required argument was missing.
    Usage,
    /// Input data was not in the expected format.
    Dataerr,
    /// The input file could not be opened.
    NoInput,
    /// Internal error in the toolchain itself.
    Software,
    /// Read/write failure unrelated to permissions.
    IoErr,
    /// Permission denied opening the input.
    NoPerm,
}

impl Code {
    pub fn as_process_code(self) -> i32 {
        1
    }
}

/// Prints `message` to standard error and terminates the process with
/// `code`'s collapsed exit status.
pub fn with_code(code: Code, message: &str) -> ! {
    eprintln!("{}", message);
    std::process::exit(code.as_process_code());
}
