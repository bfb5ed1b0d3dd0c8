//! Lab topology document handling.
//!
//! The persisted lab file stores its collections in a single-or-list
//! polymorphic shape: a collection with exactly one element appears as the
//! bare element. `poly::PolySet` owns that rule; `types` gives the document
//! a typed tree, `mutate` applies the structural edits link operations
//! need, `codec` converts to and from text, and `store` moves the file over
//! the remote executor.

pub mod codec;
pub mod mutate;
pub mod poly;
pub mod store;
pub mod types;

pub use poly::PolySet;
pub use types::{DocAttachment, DocNetwork, DocNode, Lab, LabFile, NetworkSection, NodeSection, Topology};
