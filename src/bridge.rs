//! Live bridge state synchronization.
//!
//! Issues `ip link` commands on the lab host through the remote executor.
//! Commands are idempotent at this layer: bridge creation consults the
//! current interface table first, and issuance failure is the only error
//! surfaced; kernel-level success is not verified.

use log::{debug, info};
use serde::Deserialize;

use crate::error::{LinkError, Result};
use crate::transport::RemoteExec;

/// MTU applied to managed bridges, sized for jumbo lab traffic.
pub const BRIDGE_MTU: u32 = 9000;

#[derive(Debug, Deserialize)]
struct LiveInterface {
    ifname: String,
}

pub struct BridgeSync<'a> {
    exec: &'a mut dyn RemoteExec,
}

impl<'a> BridgeSync<'a> {
    pub fn new(exec: &'a mut dyn RemoteExec) -> Self {
        BridgeSync { exec }
    }

    /// Names of all interfaces currently present on the host.
    pub fn live_interfaces(&mut self) -> Result<Vec<String>> {
        let output = self.exec.exec("ip --json addr")?;
        let parsed: Vec<LiveInterface> = serde_json::from_str(&output.stdout)
            .map_err(|e| LinkError::Transport(format!("unparseable interface listing: {}", e)))?;
        Ok(parsed.into_iter().map(|intf| intf.ifname).collect())
    }

    /// Create and bring up `name` unless an interface with that name already
    /// exists. Never errors on "already exists".
    pub fn ensure_bridge(&mut self, name: &str) -> Result<()> {
        if self.live_interfaces()?.iter().any(|ifname| ifname == name) {
            debug!("bridge {} already present", name);
            return Ok(());
        }
        info!("creating bridge {}", name);
        self.exec
            .exec(&format!("ip link add {} mtu {} type bridge", name, BRIDGE_MTU))?;
        self.exec.exec(&format!("ip link set {} up", name))?;
        Ok(())
    }

    /// Enslave a node's virtual port to a bridge.
    pub fn attach_to_bridge(&mut self, port: &str, bridge: &str) -> Result<()> {
        info!("attaching {} to {}", port, bridge);
        self.exec
            .exec(&format!("ip link set {} master {}", port, bridge))?;
        Ok(())
    }

    /// Release a port from whatever bridge it is enslaved to.
    pub fn detach_port(&mut self, port: &str) -> Result<()> {
        info!("detaching {}", port);
        self.exec
            .exec(&format!("ip link set dev {} nomaster", port))?;
        Ok(())
    }

    /// Delete a managed bridge. Deleting the bridge releases every enslaved
    /// port, so no per-port detach precedes this.
    pub fn delete_bridge(&mut self, name: &str) -> Result<()> {
        info!("deleting bridge {}", name);
        self.exec.exec(&format!("ip link del {}", name))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ExecOutput;

    struct RecordingExec {
        live: String,
        commands: Vec<String>,
    }

    impl RecordingExec {
        fn with_interfaces(names: &[&str]) -> Self {
            let live = serde_json::to_string(
                &names
                    .iter()
                    .map(|name| serde_json::json!({ "ifname": name }))
                    .collect::<Vec<_>>(),
            )
            .unwrap();
            RecordingExec {
                live,
                commands: vec![],
            }
        }
    }

    impl RemoteExec for RecordingExec {
        fn exec(&mut self, cmd: &str) -> Result<ExecOutput> {
            self.commands.push(cmd.to_string());
            let stdout = if cmd == "ip --json addr" {
                self.live.clone()
            } else {
                String::new()
            };
            Ok(ExecOutput {
                stdout,
                exit_code: 0,
            })
        }

        fn read_file(&mut self, _path: &str) -> Result<String> {
            unimplemented!()
        }

        fn write_file(&mut self, _path: &str, _contents: &str) -> Result<()> {
            unimplemented!()
        }
    }

    #[test]
    fn test_ensure_bridge_creates_when_absent() {
        let mut exec = RecordingExec::with_interfaces(&["lo", "eth0"]);
        BridgeSync::new(&mut exec).ensure_bridge("vnet5_1").unwrap();
        assert_eq!(
            exec.commands,
            vec![
                "ip --json addr",
                "ip link add vnet5_1 mtu 9000 type bridge",
                "ip link set vnet5_1 up",
            ]
        );
    }

    #[test]
    fn test_ensure_bridge_is_idempotent() {
        let mut exec = RecordingExec::with_interfaces(&["lo", "vnet5_1"]);
        BridgeSync::new(&mut exec).ensure_bridge("vnet5_1").unwrap();
        assert_eq!(exec.commands, vec!["ip --json addr"]);
    }

    #[test]
    fn test_attach_detach_delete_commands() {
        let mut exec = RecordingExec::with_interfaces(&[]);
        {
            let mut sync = BridgeSync::new(&mut exec);
            sync.attach_to_bridge("vunl5_1_0", "vnet5_1").unwrap();
            sync.detach_port("vunl5_1_0").unwrap();
            sync.delete_bridge("vnet5_1").unwrap();
        }
        assert_eq!(
            exec.commands,
            vec![
                "ip link set vunl5_1_0 master vnet5_1",
                "ip link set dev vunl5_1_0 nomaster",
                "ip link del vnet5_1",
            ]
        );
    }

    #[test]
    fn test_garbled_interface_listing_is_transport_error() {
        struct Garbled;
        impl RemoteExec for Garbled {
            fn exec(&mut self, _cmd: &str) -> Result<ExecOutput> {
                Ok(ExecOutput {
                    stdout: "not json".to_string(),
                    exit_code: 0,
                })
            }
            fn read_file(&mut self, _path: &str) -> Result<String> {
                unimplemented!()
            }
            fn write_file(&mut self, _path: &str, _contents: &str) -> Result<()> {
                unimplemented!()
            }
        }
        let mut exec = Garbled;
        assert!(matches!(
            BridgeSync::new(&mut exec).live_interfaces(),
            Err(LinkError::Transport(_))
        ));
    }
}
