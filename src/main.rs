use clap::{Parser, Subcommand};
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};

use evelink::api::LabApi;
use evelink::cancel::CancelToken;
use evelink::endpoint::{self, EndpointSelector};
use evelink::orchestrator;
use evelink::settings::Settings;
use evelink::transport::http::EveClient;
use evelink::transport::ssh::SshTransport;

/// Link management utility for EVE-NG lab emulation hosts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List all labs on the server
    Labs,

    /// List all user accounts on the server
    Users,

    /// List the nodes of a lab, including selectable shared segments
    Nodes {
        /// Lab name or id
        #[arg(short, long)]
        lab: String,
    },

    /// List the interfaces of one node
    Interfaces {
        /// Lab name or id
        #[arg(short, long)]
        lab: String,

        /// Node id
        #[arg(short, long)]
        node: String,
    },

    /// Connect two endpoints (nodes or shared segments)
    Connect {
        /// Lab name or id
        #[arg(short, long)]
        lab: String,

        /// Node id of endpoint A (use the net<id> form for a segment)
        #[arg(long)]
        node_a: String,

        /// Interface id or name on endpoint A (omit for a segment)
        #[arg(long)]
        interface_a: Option<String>,

        /// Node id of endpoint B (use the net<id> form for a segment)
        #[arg(long)]
        node_b: String,

        /// Interface id or name on endpoint B (omit for a segment)
        #[arg(long)]
        interface_b: Option<String>,
    },

    /// Disconnect a node interface from its network
    Disconnect {
        /// Lab name or id
        #[arg(short, long)]
        lab: String,

        /// Node id
        #[arg(long)]
        node: String,

        /// Interface id or name
        #[arg(long)]
        interface: String,
    },
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Parse command-line arguments
    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run(&args) {
        eprintln!("[    Error ] ==> {}", err);
        std::process::exit(1);
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let settings = Settings::from_env()?;
    let api = EveClient::login(&settings.api_url, &settings.api_user, &settings.api_password)?;

    match &args.command {
        Command::Labs => {
            for lab in api.list_labs()? {
                println!("{:<36} {:<24} {}", lab.id, lab.name, lab.path);
            }
        }
        Command::Users => {
            for user in api.list_users()? {
                println!(
                    "{:<16} {:<24} {:<12} {}",
                    user.username,
                    user.name.unwrap_or_default(),
                    user.role.unwrap_or_default(),
                    user.email.unwrap_or_default()
                );
            }
        }
        Command::Nodes { lab } => {
            let lab = api.find_lab(lab)?;
            let networks = api.list_networks(&lab)?;
            let mut nodes = api.list_nodes(&lab)?;
            nodes.extend(endpoint::segment_nodes(&networks));
            for node in nodes {
                println!("{:<8} {:<24} {}", node.id, node.name, node.status);
            }
        }
        Command::Interfaces { lab, node } => {
            let lab = api.find_lab(lab)?;
            let nodes = api.list_nodes(&lab)?;
            let node = nodes
                .iter()
                .find(|n| n.id == *node)
                .cloned()
                .ok_or_else(|| evelink::error::LinkError::not_found(format!("node {}", node)))?;
            for intf in api.list_interfaces(&lab, &node)? {
                let state = if intf.connected() {
                    format!("network {}", intf.network_id)
                } else {
                    "unconnected".to_string()
                };
                println!("{:<4} {:<16} {}", intf.id, intf.name, state);
            }
        }
        Command::Connect {
            lab,
            node_a,
            interface_a,
            node_b,
            interface_b,
        } => {
            let lab = api.find_lab(lab)?;
            let mut ssh =
                SshTransport::connect(&settings.ssh_host, &settings.ssh_user, &settings.ssh_password)?;
            let cancel = interruptible()?;

            info!("connecting {} and {} in lab {}", node_a, node_b, lab.name);
            orchestrator::connect(
                &api,
                &mut ssh,
                &lab,
                &EndpointSelector {
                    node: node_a.clone(),
                    interface: interface_a.clone(),
                },
                &EndpointSelector {
                    node: node_b.clone(),
                    interface: interface_b.clone(),
                },
                &cancel,
            )?;
            info!("link established");
        }
        Command::Disconnect {
            lab,
            node,
            interface,
        } => {
            let lab = api.find_lab(lab)?;
            let mut ssh =
                SshTransport::connect(&settings.ssh_host, &settings.ssh_user, &settings.ssh_password)?;
            let cancel = interruptible()?;

            info!("disconnecting {} {} in lab {}", node, interface, lab.name);
            orchestrator::disconnect(
                &api,
                &mut ssh,
                &lab,
                &EndpointSelector {
                    node: node.clone(),
                    interface: Some(interface.clone()),
                },
                &cancel,
            )?;
            info!("link removed");
        }
    }
    Ok(())
}

/// A token tripped by SIGINT; the orchestrator stops at its next checkpoint.
fn interruptible() -> Result<CancelToken> {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    ctrlc::set_handler(move || {
        warn!("interrupt received, stopping before the next mutation");
        token.cancel();
    })?;
    Ok(cancel)
}
