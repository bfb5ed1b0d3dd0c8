//! Remote execution seam.
//!
//! The lab host's bridge table and document file are reached through this
//! trait; the core never talks to a socket directly. `SshTransport` is the
//! production implementation, tests substitute in-memory fakes.

pub mod http;
pub mod ssh;

use crate::error::Result;

/// Output of one remote command.
#[derive(Debug, Clone)]
pub struct ExecOutput {
    pub stdout: String,
    pub exit_code: i32,
}

/// Blocking command execution and whole-file I/O on the lab host.
pub trait RemoteExec {
    /// Run a shell command. Failure to issue the command is a transport
    /// error; a non-zero exit is reported in the output, not as an error
    /// (bridge commands are fire-and-forget).
    fn exec(&mut self, cmd: &str) -> Result<ExecOutput>;

    /// Read an entire file as UTF-8 text.
    fn read_file(&mut self, path: &str) -> Result<String>;

    /// Replace an entire file with `contents`.
    fn write_file(&mut self, path: &str, contents: &str) -> Result<()>;
}
