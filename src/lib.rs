//! # Evelink - Link management utility for EVE-NG lab emulation hosts
//!
//! Evelink connects and disconnects endpoints inside an emulated lab by
//! reconciling two independently-failable planes: the persisted lab
//! topology document and the host's live Linux bridge table.
//!
//! ## Architecture
//!
//! - `model`: normalized lab types (nodes, interfaces, networks)
//! - `endpoint`: selector resolution into typed node/segment endpoints
//! - `naming`: network id allocation and deterministic device naming
//! - `document`: the polymorphic lab document, its mutations and codec
//! - `bridge`: idempotent live-bridge command synchronization
//! - `orchestrator`: the per-endpoint-kind link state machine
//! - `api` / `transport`: collaborator seams (management API, lab host
//!   shell) with the production HTTP and SSH implementations
//! - `cancel`: cooperative interruption checked before each mutation
//!
//! ## Consistency model
//!
//! One link operation per invocation, strictly sequential. The document is
//! written before live commands are issued; if the live side then fails,
//! the document stands as the intended topology and a later run reconciles
//! the bridges. There is no rollback and no cross-invocation locking.
//!
//! ## Error Handling
//!
//! Domain failures are `error::LinkError` values; the CLI prints one
//! message per failure and exits non-zero, without stack traces or retries.

pub mod api;
pub mod bridge;
pub mod cancel;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod model;
pub mod naming;
pub mod orchestrator;
pub mod settings;
pub mod transport;
