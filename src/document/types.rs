//! Typed view of the persisted lab document.
//!
//! Only the topology subtree is modeled structurally; everything else the
//! file carries (lab metadata, node placement, configs) is preserved
//! verbatim through flattened passthrough maps so a read-modify-write cycle
//! never drops fields this tool does not understand.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::poly::PolySet;

/// Root of the lab document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabFile {
    pub lab: Lab,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub topology: Topology,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networks: Option<NetworkSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nodes: Option<NodeSection>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NetworkSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<PolySet<DocNetwork>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSection {
    pub node: PolySet<DocNode>,
}

/// A network element of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNetwork {
    pub id: u32,
    #[serde(rename = "type")]
    pub net_type: String,
    pub name: String,
    pub left: u32,
    pub top: u32,
    pub visibility: u8,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// A node element; only the id and the attachment collection matter here,
/// the remaining attributes ride along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<PolySet<DocAttachment>>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// An interface-to-network attachment record under a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocAttachment {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub network_id: u32,
}

impl DocAttachment {
    pub fn ethernet(id: &str, name: &str, network_id: u32) -> Self {
        DocAttachment {
            id: id.to_string(),
            name: name.to_string(),
            kind: "ethernet".to_string(),
            network_id,
        }
    }
}
