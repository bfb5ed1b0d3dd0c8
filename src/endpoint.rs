//! Endpoint resolution.
//!
//! A selector names a node (and, for concrete nodes, an interface by id or
//! name); resolution classifies it as a concrete node endpoint or a shared
//! network-segment endpoint. Shared (visibility 1) networks are surfaced as
//! selectable `net<id>` pseudo-nodes alongside the real nodes. Resolution
//! never mutates anything and never prompts; the CLI layer owns interaction.

use crate::api::{LabApi, LabRef};
use crate::error::{LinkError, Result};
use crate::model::{Interface, Network, Node, NodeStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Node,
    Network,
}

/// A raw, already-chosen selection for one side of a link operation.
#[derive(Debug, Clone)]
pub struct EndpointSelector {
    pub node: String,
    pub interface: Option<String>,
}

/// A resolved endpoint. `interface` is present exactly when `kind` is
/// `Node`.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub node: Node,
    pub interface: Option<Interface>,
    pub kind: EndpointKind,
}

impl Endpoint {
    /// The network id a segment endpoint stands for.
    pub fn network_id(&self) -> Option<u32> {
        self.node.segment_network_id()
    }
}

/// Pseudo-nodes for every shared network, so segments can be selected the
/// same way nodes are. Private networks are internal plumbing and stay
/// hidden.
pub fn segment_nodes(networks: &[Network]) -> Vec<Node> {
    networks
        .iter()
        .filter(|network| !network.is_private())
        .map(|network| Node {
            id: format!("net{}", network.id),
            name: network.name.clone(),
            status: NodeStatus::Passive,
        })
        .collect()
}

/// Resolve a selector against the lab's node list (concrete nodes plus
/// segment pseudo-nodes).
pub fn resolve(
    api: &dyn LabApi,
    lab: &LabRef,
    nodes: &[Node],
    selector: &EndpointSelector,
) -> Result<Endpoint> {
    let node = nodes
        .iter()
        .find(|node| node.id == selector.node)
        .cloned()
        .ok_or_else(|| LinkError::not_found(format!("node {}", selector.node)))?;

    if node.segment_network_id().is_some() {
        return Ok(Endpoint {
            node,
            interface: None,
            kind: EndpointKind::Network,
        });
    }

    let wanted = selector
        .interface
        .as_deref()
        .ok_or_else(|| LinkError::not_found(format!("interface selection for node {}", node.name)))?;

    let interfaces = api.list_interfaces(lab, &node)?;
    let interface = interfaces
        .into_iter()
        .find(|intf| intf.id == wanted || intf.name == wanted)
        .ok_or_else(|| {
            LinkError::not_found(format!("interface {} on node {}", wanted, node.name))
        })?;

    Ok(Endpoint {
        node,
        interface: Some(interface),
        kind: EndpointKind::Node,
    })
}
