//! Link orchestration.
//!
//! Ties resolution, id allocation, document mutation, and live bridge
//! synchronization together per endpoint-kind combination. The ordering
//! contract: pre-conditions and document integrity are checked before any
//! mutation, the document is persisted before any live command, and a
//! live-side transport failure after the write is surfaced without rollback
//! because the written document is the authoritative intended topology.

use std::collections::BTreeSet;

use log::info;

use crate::api::{LabApi, LabRef};
use crate::bridge::BridgeSync;
use crate::cancel::CancelToken;
use crate::document::{mutate, store};
use crate::endpoint::{self, Endpoint, EndpointKind, EndpointSelector};
use crate::error::{LinkError, Result};
use crate::model::{Network, Node, NodeStatus};
use crate::naming;
use crate::transport::RemoteExec;

/// Connect two endpoints.
pub fn connect(
    api: &dyn LabApi,
    exec: &mut dyn RemoteExec,
    lab: &LabRef,
    selector_a: &EndpointSelector,
    selector_b: &EndpointSelector,
    cancel: &CancelToken,
) -> Result<()> {
    let networks = api.list_networks(lab)?;
    let mut nodes = api.list_nodes(lab)?;
    nodes.extend(endpoint::segment_nodes(&networks));

    let a = resolve_for_connect(api, lab, &nodes, selector_a)?;
    let b = resolve_for_connect(api, lab, &nodes, selector_b)?;

    match (a.kind, b.kind) {
        (EndpointKind::Network, EndpointKind::Network) => Err(LinkError::InvalidTopology(
            "cannot join two network segments directly".to_string(),
        )),
        (EndpointKind::Node, EndpointKind::Node) => {
            connect_nodes(api, exec, lab, &networks, &a, &b, cancel)
        }
        (EndpointKind::Node, EndpointKind::Network) => {
            connect_node_to_segment(api, exec, lab, &networks, &a, &b, cancel)
        }
        (EndpointKind::Network, EndpointKind::Node) => {
            connect_node_to_segment(api, exec, lab, &networks, &b, &a, cancel)
        }
    }
}

/// Resolve one side and enforce the connect pre-condition: a concrete
/// node's interface must not already be attached.
fn resolve_for_connect(
    api: &dyn LabApi,
    lab: &LabRef,
    nodes: &[Node],
    selector: &EndpointSelector,
) -> Result<Endpoint> {
    let ep = endpoint::resolve(api, lab, nodes, selector)?;
    if let Some(interface) = &ep.interface {
        if interface.connected() {
            return Err(LinkError::AlreadyConnected {
                node: ep.node.name.clone(),
                interface: interface.name.clone(),
            });
        }
    }
    Ok(ep)
}

/// Node-to-node: a fresh private network joins the two interfaces.
fn connect_nodes(
    api: &dyn LabApi,
    exec: &mut dyn RemoteExec,
    lab: &LabRef,
    networks: &[Network],
    a: &Endpoint,
    b: &Endpoint,
    cancel: &CancelToken,
) -> Result<()> {
    let tenant = api.tenant();
    let intf_a = a.interface.as_ref().expect("node endpoint has an interface");
    let intf_b = b.interface.as_ref().expect("node endpoint has an interface");

    let used: BTreeSet<u32> = networks.iter().map(|network| network.id).collect();
    let network_id = naming::allocate_network_id(&used);
    let bridge = naming::bridge_name(tenant, network_id);
    let port_a = naming::veth_name(tenant, &a.node.id, &intf_a.id);
    let port_b = naming::veth_name(tenant, &b.node.id, &intf_b.id);
    info!("allocated network {} (bridge {})", network_id, bridge);

    let mut doc = store::load(exec, &lab.path)?;
    let topology = &mut doc.lab.topology;
    mutate::add_network(
        topology,
        network_id,
        &format!("Net-{}iface_{}", a.node.name, intf_a.id),
    );
    mutate::attach_interface(topology, &a.node.id, intf_a, network_id)?;
    mutate::attach_interface(topology, &b.node.id, intf_b, network_id)?;

    cancel.checkpoint()?;
    info!("updating lab document");
    store::save(exec, &lab.path, &doc)?;

    cancel.checkpoint()?;
    let mut sync = BridgeSync::new(exec);
    sync.ensure_bridge(&bridge)?;
    attach_if_powered(&mut sync, a, &port_a, &bridge, cancel)?;
    attach_if_powered(&mut sync, b, &port_b, &bridge, cancel)?;
    Ok(())
}

/// Node-to-segment: the segment's id is the target network, no allocation.
fn connect_node_to_segment(
    api: &dyn LabApi,
    exec: &mut dyn RemoteExec,
    lab: &LabRef,
    networks: &[Network],
    node_ep: &Endpoint,
    segment_ep: &Endpoint,
    cancel: &CancelToken,
) -> Result<()> {
    let tenant = api.tenant();
    let interface = node_ep
        .interface
        .as_ref()
        .expect("node endpoint has an interface");
    let network_id = segment_ep
        .network_id()
        .ok_or_else(|| LinkError::not_found(format!("network for {}", segment_ep.node.id)))?;
    let network = networks
        .iter()
        .find(|network| network.id == network_id)
        .ok_or_else(|| LinkError::not_found(format!("network {}", network_id)))?;

    let mut doc = store::load(exec, &lab.path)?;
    mutate::attach_interface(&mut doc.lab.topology, &node_ep.node.id, interface, network_id)?;

    cancel.checkpoint()?;
    info!("updating lab document");
    store::save(exec, &lab.path, &doc)?;

    let bridge = naming::bridge_device(tenant, network);
    let port = naming::veth_name(tenant, &node_ep.node.id, &interface.id);

    cancel.checkpoint()?;
    let mut sync = BridgeSync::new(exec);
    // Cloud-type segments name an existing host device; only managed
    // bridges are created on demand.
    if network.is_managed_bridge() {
        sync.ensure_bridge(&bridge)?;
    }
    attach_if_powered(&mut sync, node_ep, &port, &bridge, cancel)?;
    Ok(())
}

/// Disconnect a node interface from whatever network it is attached to.
pub fn disconnect(
    api: &dyn LabApi,
    exec: &mut dyn RemoteExec,
    lab: &LabRef,
    selector: &EndpointSelector,
    cancel: &CancelToken,
) -> Result<()> {
    let tenant = api.tenant();
    let networks = api.list_networks(lab)?;
    let nodes = api.list_nodes(lab)?;

    let ep = endpoint::resolve(api, lab, &nodes, selector)?;
    let interface = ep
        .interface
        .as_ref()
        .ok_or_else(|| LinkError::not_found(format!("interface on {}", ep.node.name)))?;
    if !interface.connected() {
        return Err(LinkError::NotConnected {
            node: ep.node.name.clone(),
            interface: interface.name.clone(),
        });
    }

    // Stale selection: the API no longer reports the interface's network.
    let network_id: u32 = interface
        .network_id
        .parse()
        .map_err(|_| LinkError::not_found(format!("network {}", interface.network_id)))?;
    let network = networks
        .iter()
        .find(|network| network.id == network_id)
        .ok_or_else(|| LinkError::not_found(format!("network {}", network_id)))?;

    let mut doc = store::load(exec, &lab.path)?;
    let topology = &mut doc.lab.topology;
    if network.is_private() {
        // A private segment exists only for this link: strip every
        // attachment (the peer's included) and drop the network element.
        mutate::detach_by_network(topology, network_id)?;
        mutate::remove_network(topology, network_id);
    } else {
        // Shared segment: the other members keep their attachments.
        mutate::detach_node_interface(topology, &ep.node.id, &interface.id)?;
    }

    cancel.checkpoint()?;
    info!("updating lab document");
    store::save(exec, &lab.path, &doc)?;

    cancel.checkpoint()?;
    let mut sync = BridgeSync::new(exec);
    if network.is_private() {
        // Deleting the bridge releases both enslaved ports, the peer's
        // included.
        sync.delete_bridge(&naming::bridge_name(tenant, network_id))?;
    } else {
        let port = naming::veth_name(tenant, &ep.node.id, &interface.id);
        sync.detach_port(&port)?;
    }
    Ok(())
}

fn attach_if_powered(
    sync: &mut BridgeSync<'_>,
    ep: &Endpoint,
    port: &str,
    bridge: &str,
    cancel: &CancelToken,
) -> Result<()> {
    if ep.node.status == NodeStatus::On {
        cancel.checkpoint()?;
        sync.attach_to_bridge(port, bridge)
    } else {
        // A powered-off node has no live port yet; the attachment takes
        // effect when the node starts.
        info!(
            "node {} is {}, skipping live attach of {}",
            ep.node.name, ep.node.status, port
        );
        Ok(())
    }
}
