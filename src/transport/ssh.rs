//! SSH executor for the lab host.
//!
//! Password-authenticated ssh2 session. A connection or authentication
//! failure here is fatal and happens before any mutation; per-command
//! failures afterwards surface as `Transport` errors without rollback.

use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use log::debug;
use ssh2::Session;

use crate::error::{LinkError, Result};

use super::{ExecOutput, RemoteExec};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct SshTransport {
    session: Session,
}

fn transport(err: impl std::fmt::Display) -> LinkError {
    LinkError::Transport(err.to_string())
}

impl SshTransport {
    /// Open and authenticate a session to `host` (port 22).
    pub fn connect(host: &str, user: &str, password: &str) -> Result<Self> {
        let addr = format!("{}:22", host)
            .to_socket_addrs()
            .map_err(transport)?
            .next()
            .ok_or_else(|| LinkError::Transport(format!("could not resolve {}", host)))?;

        debug!("connecting to {} as {}", addr, user);
        let tcp = TcpStream::connect_timeout(&addr, CONNECT_TIMEOUT).map_err(|_| {
            LinkError::Transport(format!("could not open ssh connection to {}", host))
        })?;

        let mut session = Session::new().map_err(transport)?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(transport)?;
        session
            .userauth_password(user, password)
            .map_err(|e| LinkError::Transport(format!("ssh authentication failed: {}", e)))?;

        Ok(SshTransport { session })
    }
}

impl RemoteExec for SshTransport {
    fn exec(&mut self, cmd: &str) -> Result<ExecOutput> {
        debug!("exec: {}", cmd);
        let mut channel = self.session.channel_session().map_err(transport)?;
        channel.exec(cmd).map_err(transport)?;

        let mut stdout = String::new();
        channel.read_to_string(&mut stdout).map_err(transport)?;
        channel.wait_close().map_err(transport)?;
        let exit_code = channel.exit_status().map_err(transport)?;

        Ok(ExecOutput { stdout, exit_code })
    }

    fn read_file(&mut self, path: &str) -> Result<String> {
        let output = self.exec(&format!("cat '{}'", path))?;
        if output.exit_code != 0 {
            return Err(LinkError::Transport(format!("could not read {}", path)));
        }
        Ok(output.stdout)
    }

    fn write_file(&mut self, path: &str, contents: &str) -> Result<()> {
        let sftp = self.session.sftp().map_err(transport)?;
        let mut file = sftp.create(Path::new(path)).map_err(transport)?;
        file.write_all(contents.as_bytes()).map_err(transport)?;
        Ok(())
    }
}
