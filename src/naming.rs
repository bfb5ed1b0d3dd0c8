//! Network id allocation and deterministic live-interface naming.
//!
//! Bridge and port names are namespaced by the tenant id so multiple users
//! sharing one lab host never collide. All functions here are pure.

use std::collections::BTreeSet;

use crate::model::Network;

/// Returns the next free network id.
///
/// Retired ids are reused: the smallest positive integer missing from
/// `existing` wins, falling back to `max + 1` when the set is gapless and to
/// `1` when it is empty. Reuse keeps numbering dense across many
/// connect/disconnect cycles.
pub fn allocate_network_id(existing: &BTreeSet<u32>) -> u32 {
    let max = match existing.iter().next_back() {
        Some(&max) => max,
        None => return 1,
    };
    (1..=max).find(|id| !existing.contains(id)).unwrap_or(max + 1)
}

/// Name of the managed Linux bridge backing a private network.
pub fn bridge_name(tenant: &str, network_id: u32) -> String {
    format!("vnet{}_{}", tenant, network_id)
}

/// Name of the virtual port the emulator creates for a node interface.
pub fn veth_name(tenant: &str, node_id: &str, interface_id: &str) -> String {
    format!("vunl{}_{}_{}", tenant, node_id, interface_id)
}

/// Live device name for an existing network.
///
/// Managed segments use the `vnet<tenant>_<id>` convention; cloud-type
/// segments name an existing host device verbatim in their `type` field.
pub fn bridge_device(tenant: &str, network: &Network) -> String {
    if network.is_managed_bridge() {
        bridge_name(tenant, network.id)
    } else {
        network.net_type.clone()
    }
}
