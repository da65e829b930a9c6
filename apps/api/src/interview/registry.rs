//! Process-wide guard ensuring at most one live capture per (interview, question).

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

type CaptureKey = (String, usize);

#[derive(Clone, Default)]
pub struct CaptureRegistry {
    active: Arc<Mutex<HashSet<CaptureKey>>>,
}

impl CaptureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` if another capture already holds it.
    /// The slot is released when the returned claim is dropped.
    pub fn claim(&self, mock_id: &str, question_index: usize) -> Option<CaptureClaim> {
        let key = (mock_id.to_string(), question_index);
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if !active.insert(key.clone()) {
            return None;
        }
        Some(CaptureClaim {
            registry: self.clone(),
            key,
        })
    }
}

pub struct CaptureClaim {
    registry: CaptureRegistry,
    key: CaptureKey,
}

impl Drop for CaptureClaim {
    fn drop(&mut self) {
        let mut active = self
            .registry
            .active
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        active.remove(&self.key);
    }
}
