// src/page/mod.rs
mod element;
mod render;

pub use element::{Color, ElementState, StatusElement};
pub use render::{format_line, render_changes};

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::watch;

/// Host for display elements, keyed by identifier, plus a one-shot
/// "structure loaded" signal that startup callbacks can wait on.
pub struct Page {
    elements: DashMap<String, Arc<StatusElement>>,
    ready_tx: watch::Sender<bool>,
}

impl Page {
    pub fn new() -> Self {
        let (ready_tx, _) = watch::channel(false);
        Self {
            elements: DashMap::new(),
            ready_tx,
        }
    }

    /// Adds an empty element, or returns the existing one with that id.
    pub fn insert_element(&self, id: &str) -> Arc<StatusElement> {
        self.elements
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(StatusElement::new(id)))
            .clone()
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<Arc<StatusElement>> {
        self.elements.get(id).map(|e| e.clone())
    }

    pub fn remove_element(&self, id: &str) -> Option<Arc<StatusElement>> {
        self.elements.remove(id).map(|(_, element)| element)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Fires the ready signal. Later calls are no-ops.
    pub fn mark_ready(&self) {
        let changed = self.ready_tx.send_if_modified(|ready| {
            if *ready {
                false
            } else {
                *ready = true;
                true
            }
        });
        if changed {
            tracing::debug!(elements = self.len(), "page ready");
        }
    }

    pub fn is_ready(&self) -> bool {
        *self.ready_tx.borrow()
    }

    /// Resolves once [`Page::mark_ready`] has been called.
    pub async fn ready(&self) {
        let mut rx = self.ready_tx.subscribe();
        // The sender lives in `self`, so this only errors if the page is gone.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}
