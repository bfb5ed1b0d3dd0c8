//! Cooperative cancellation.
//!
//! A `CancelToken` is handed to the orchestrator and checked before each
//! external mutation. An interrupted run stops at the next checkpoint with
//! `LinkError::Interrupted` and performs no rollback; the document and live
//! bridges may then disagree until a later run reconciles them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{LinkError, Result};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trip the token. Safe to call from a signal handler thread.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Fails with `Interrupted` once the token has been tripped.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(LinkError::Interrupted)
        } else {
            Ok(())
        }
    }
}
