//! In-memory paste store, interchangeable with the sqlite one behind the
//! `PasteStore` trait. Used by tests; the map lock doubles as the per-id
//! critical section.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::domain::paste::aggregate::{ConsumeOutcome, ConsumedPaste, Paste};

use super::store::{NewPaste, PasteStore};

#[derive(Default)]
pub struct MemoryPasteStore {
    pastes: Mutex<HashMap<String, Paste>>,
}

impl MemoryPasteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of a stored paste, for assertions in tests.
    pub fn get(&self, id: &str) -> Option<Paste> {
        let pastes = self.pastes.lock().expect("paste map poisoned");
        pastes.get(id).cloned()
    }
}

#[async_trait]
impl PasteStore for MemoryPasteStore {
    async fn create(&self, new: NewPaste) -> anyhow::Result<Paste> {
        let mut pastes = self.pastes.lock().expect("paste map poisoned");
        loop {
            let paste = Paste::new_for_insert(
                new.content.clone(),
                new.created_at,
                new.expires_at,
                new.max_views,
            );
            if pastes.contains_key(paste.id.value()) {
                continue;
            }
            pastes.insert(paste.id.value().to_owned(), paste.clone());
            return Ok(paste);
        }
    }

    async fn consume_view(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ConsumeOutcome> {
        let mut pastes = self.pastes.lock().expect("paste map poisoned");
        let paste = match pastes.get_mut(id) {
            Some(p) => p,
            None => return Ok(ConsumeOutcome::NotFound),
        };
        if !paste.is_available(now) {
            return Ok(ConsumeOutcome::Unavailable);
        }
        paste.view_count += 1;
        Ok(ConsumeOutcome::Consumed(ConsumedPaste {
            content: paste.content.clone(),
            remaining_views: paste.remaining_views(),
            expires_at: paste.expires_at,
        }))
    }
}
