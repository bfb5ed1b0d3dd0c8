//! Lab API collaborator contract.
//!
//! The orchestrator consumes this trait; `transport::http::EveClient` is the
//! production implementation and tests provide fixture-backed fakes. All
//! calls are read-only queries returning the normalized types of `model`.

use crate::error::Result;
use crate::model::{Interface, Network, Node};

/// A lab as listed by the management API.
#[derive(Debug, Clone)]
pub struct LabRef {
    pub id: String,
    pub name: String,
    /// File name of the lab document, e.g. `demo.unl`.
    pub filename: String,
    /// Path below the labs root, e.g. `/folder/demo.unl`.
    pub path: String,
}

/// Read-only queries against the lab management API.
pub trait LabApi {
    /// The authenticated user's tenant id, used to namespace live
    /// interface and bridge names on the shared host.
    fn tenant(&self) -> &str;

    fn list_nodes(&self, lab: &LabRef) -> Result<Vec<Node>>;

    fn list_interfaces(&self, lab: &LabRef, node: &Node) -> Result<Vec<Interface>>;

    fn list_networks(&self, lab: &LabRef) -> Result<Vec<Network>>;
}
