//! Host messaging channel.
//!
//! One-way enable/disable broadcasts from the control surface to page
//! contexts. Page contexts register an endpoint under their tab id; sends
//! are best-effort and never acknowledged.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub type TabId = u64;

/// Message sent to a page context. Serializes as `{"type":"enable"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostMessage {
    Enable,
    Disable,
}

/// Delivery failure. Callers log these; they are never retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// No page context registered for the tab.
    NoEndpoint(TabId),
    /// The page context went away.
    Disconnected(TabId),
}

impl std::fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryError::NoEndpoint(tab) => write!(f, "no page context for tab {}", tab),
            DeliveryError::Disconnected(tab) => write!(f, "page context for tab {} is gone", tab),
        }
    }
}

impl std::error::Error for DeliveryError {}

/// Receiving side held by a page context.
pub struct PageEndpoint {
    tab: TabId,
    rx: Receiver<HostMessage>,
}

impl PageEndpoint {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    /// Next pending message without blocking.
    pub fn try_next(&self) -> Option<HostMessage> {
        self.rx.try_recv().ok()
    }
}

/// Cloneable broadcaster shared between the control surface and tabs.
#[derive(Clone, Default)]
pub struct HostChannel {
    endpoints: Arc<Mutex<HashMap<TabId, Sender<HostMessage>>>>,
}

impl HostChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a page context for `tab`, replacing any earlier one.
    pub fn connect(&self, tab: TabId) -> PageEndpoint {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut endpoints) = self.endpoints.lock() {
            endpoints.insert(tab, tx);
        }
        log::debug!("Page context connected for tab {}", tab);
        PageEndpoint { tab, rx }
    }

    pub fn disconnect(&self, tab: TabId) {
        if let Ok(mut endpoints) = self.endpoints.lock() {
            endpoints.remove(&tab);
        }
    }

    pub fn send(&self, tab: TabId, message: HostMessage) -> Result<(), DeliveryError> {
        let mut endpoints = match self.endpoints.lock() {
            Ok(e) => e,
            Err(poisoned) => poisoned.into_inner(),
        };
        let tx = endpoints.get(&tab).ok_or(DeliveryError::NoEndpoint(tab))?;
        if tx.send(message).is_err() {
            endpoints.remove(&tab);
            return Err(DeliveryError::Disconnected(tab));
        }
        log::debug!("Sent {:?} to tab {}", message, tab);
        Ok(())
    }

    /// `send`, logging and swallowing delivery failures.
    pub fn send_or_log(&self, tab: TabId, message: HostMessage) {
        if let Err(e) = self.send(tab, message) {
            log::info!("Dropped {:?}: {}", message, e);
        }
    }
}
