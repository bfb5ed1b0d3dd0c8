//! Structural edits to the lab document.
//!
//! All edits run against the in-memory tree and are all-or-nothing relative
//! to the live network plane: a malformed document aborts the whole
//! operation with `CorruptDocument` before any bridge command is issued.

use serde_json::Map;

use crate::error::{LinkError, Result};
use crate::model::Interface;

use super::poly::PolySet;
use super::types::{DocAttachment, DocNetwork, NetworkSection, Topology};

// Placement given to networks created by link operations; the topology
// canvas position is irrelevant for point-to-point segments.
const DEFAULT_LEFT: u32 = 504;
const DEFAULT_TOP: u32 = 289;

/// Insert a private bridge network with the fixed link-operation defaults.
pub fn add_network(topology: &mut Topology, id: u32, name: &str) {
    let network = DocNetwork {
        id,
        net_type: "bridge".to_string(),
        name: name.to_string(),
        left: DEFAULT_LEFT,
        top: DEFAULT_TOP,
        visibility: 0,
        rest: Map::new(),
    };
    let section = topology.networks.get_or_insert_with(NetworkSection::default);
    section.network = Some(match section.network.take() {
        None => PolySet::One(network),
        Some(set) => set.push(network),
    });
}

/// Attach `interface` of the node `node_id` to `network_id`.
///
/// Attaching an interface that already has an attachment record replaces it
/// in place, so a repeated attach is idempotent.
pub fn attach_interface(
    topology: &mut Topology,
    node_id: &str,
    interface: &Interface,
    network_id: u32,
) -> Result<()> {
    let nodes = topology
        .nodes
        .as_mut()
        .ok_or_else(|| LinkError::CorruptDocument("topology has no nodes section".to_string()))?;

    let node = nodes
        .node
        .iter_mut()
        .find(|node| node.id == node_id)
        .ok_or_else(|| {
            LinkError::CorruptDocument(format!("node {} missing from lab document", node_id))
        })?;

    let attachment = DocAttachment::ethernet(&interface.id, &interface.name, network_id);
    node.interface = Some(match node.interface.take() {
        None => PolySet::One(attachment),
        Some(set) => {
            let id = interface.id.clone();
            set.upsert(attachment, |existing| existing.id == id)
        }
    });
    Ok(())
}

/// Remove every attachment referencing `network_id`, across all nodes,
/// collapsing each node's collection per the single-or-list rule.
pub fn detach_by_network(topology: &mut Topology, network_id: u32) -> Result<()> {
    let nodes = topology
        .nodes
        .as_mut()
        .ok_or_else(|| LinkError::CorruptDocument("topology has no nodes section".to_string()))?;

    for node in nodes.node.iter_mut() {
        if let Some(set) = node.interface.take() {
            node.interface = set.retain(|attachment| attachment.network_id != network_id);
        }
    }
    Ok(())
}

/// Remove one node's attachment record for `interface_id`, collapsing the
/// node's collection per the single-or-list rule. Used when leaving a
/// shared network, where the other members keep their attachments.
pub fn detach_node_interface(
    topology: &mut Topology,
    node_id: &str,
    interface_id: &str,
) -> Result<()> {
    let nodes = topology
        .nodes
        .as_mut()
        .ok_or_else(|| LinkError::CorruptDocument("topology has no nodes section".to_string()))?;

    let node = nodes
        .node
        .iter_mut()
        .find(|node| node.id == node_id)
        .ok_or_else(|| {
            LinkError::CorruptDocument(format!("node {} missing from lab document", node_id))
        })?;

    if let Some(set) = node.interface.take() {
        node.interface = set.retain(|attachment| attachment.id != interface_id);
    }
    Ok(())
}

/// Drop the network element for `network_id`. A missing element is a no-op;
/// callers only invoke this for private (visibility 0) networks.
pub fn remove_network(topology: &mut Topology, network_id: u32) {
    if let Some(section) = topology.networks.as_mut() {
        if let Some(set) = section.network.take() {
            section.network = set.retain(|network| network.id != network_id);
        }
    }
}
