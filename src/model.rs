//! Semantic lab types.
//!
//! These are the normalized forms of the raw lab-API payloads: string ids,
//! an explicit status enum, and a derived connected flag. The transport
//! layer is responsible for producing them; the core never sees raw JSON.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Power state of an emulated node.
///
/// `Passive` is reserved for synthesized network-segment pseudo-nodes, which
/// have no power state of their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    On,
    Off,
    Passive,
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeStatus::On => write!(f, "ON"),
            NodeStatus::Off => write!(f, "OFF"),
            NodeStatus::Passive => write!(f, "PASSIVE"),
        }
    }
}

/// An emulated device instance within a lab, or a network-segment
/// pseudo-node synthesized from a shared network.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub name: String,
    pub status: NodeStatus,
}

impl Node {
    /// Returns the network id when this node is a synthesized network
    /// segment (`net<id>` composite id), `None` for concrete nodes.
    pub fn segment_network_id(&self) -> Option<u32> {
        self.id.strip_prefix("net")?.parse().ok()
    }
}

/// A single interface of a node. `network_id == "0"` means unattached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interface {
    pub id: String,
    pub name: String,
    pub network_id: String,
}

impl Interface {
    /// An interface is connected iff it references a non-zero network.
    pub fn connected(&self) -> bool {
        self.network_id != "0"
    }
}

/// A virtual layer-2 segment within a lab.
///
/// Visibility 0 is a private point-to-point segment created solely to join
/// two nodes; visibility 1 is a persistent shared segment that may host many
/// attachments and is never auto-deleted by link operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: u32,
    #[serde(rename = "type")]
    pub net_type: String,
    pub name: String,
    pub visibility: u8,
    /// Number of attachments currently on the segment, as reported by the API.
    pub count: u32,
}

impl Network {
    pub fn is_private(&self) -> bool {
        self.visibility == 0
    }

    /// True when the segment is backed by a managed Linux bridge rather than
    /// an existing physical or cloud device.
    pub fn is_managed_bridge(&self) -> bool {
        self.net_type == "bridge"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_network_id() {
        let seg = Node {
            id: "net3".to_string(),
            name: "Cloud0".to_string(),
            status: NodeStatus::Passive,
        };
        assert_eq!(seg.segment_network_id(), Some(3));

        let node = Node {
            id: "3".to_string(),
            name: "R1".to_string(),
            status: NodeStatus::On,
        };
        assert_eq!(node.segment_network_id(), None);

        // "network" does not parse as a segment id
        let odd = Node {
            id: "network".to_string(),
            name: "x".to_string(),
            status: NodeStatus::Off,
        };
        assert_eq!(odd.segment_network_id(), None);
    }

    #[test]
    fn test_interface_connected() {
        let mut intf = Interface {
            id: "0".to_string(),
            name: "e0".to_string(),
            network_id: "0".to_string(),
        };
        assert!(!intf.connected());

        intf.network_id = "4".to_string();
        assert!(intf.connected());
    }
}
