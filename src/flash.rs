use crate::capabilities::FlashStore;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::warn;

/// In-memory flash store for a single session
///
/// Messages are kept per category in arrival order and removed when taken.
#[derive(Debug, Default)]
pub struct MemoryFlash {
    messages: Mutex<HashMap<String, Vec<String>>>,
}

impl MemoryFlash {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` when no message is queued in any category
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self.messages.lock() {
            Ok(guard) => guard.values().all(Vec::is_empty),
            Err(poisoned) => poisoned.into_inner().values().all(Vec::is_empty),
        }
    }
}

impl FlashStore for MemoryFlash {
    fn flash(&self, category: &str, message: &str) {
        let mut guard = match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!("Flash store lock poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard
            .entry(category.to_string())
            .or_default()
            .push(message.to_string());
    }

    fn take(&self, category: &str) -> Vec<String> {
        let mut guard = match self.messages.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.remove(category).unwrap_or_default()
    }
}
