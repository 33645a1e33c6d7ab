use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::domain::paste::aggregate::{ConsumeOutcome, Paste};

/// What the service hands a store when persisting a new paste.
#[derive(Debug, Clone)]
pub struct NewPaste {
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<i64>,
}

/// Persistence seam for pastes.
///
/// `consume_view` is the only mutator and must behave as one atomic unit
/// per id: read the snapshot, judge availability, and increment the view
/// count on that same snapshot. No interleaving may push `view_count` past
/// `max_views`, even transiently.
#[async_trait]
pub trait PasteStore: Send + Sync {
    /// Persist a new record under a freshly generated id, with a view count
    /// of zero. The paste is fully visible once this returns.
    async fn create(&self, new: NewPaste) -> anyhow::Result<Paste>;

    /// Read the paste and spend one view in the same atomic step. A missing
    /// or unavailable paste is never mutated.
    async fn consume_view(&self, id: &str, now: DateTime<Utc>)
        -> anyhow::Result<ConsumeOutcome>;
}
