use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use contracts::domain::paste::aggregate::{ConsumeOutcome, CreatePasteDto, PasteCreated};

use super::store::{NewPaste, PasteStore};

/// Orchestrates the clock input and the store.
///
/// Both the JSON API and the HTML pages go through `fetch_and_consume`;
/// there is no way to read a paste without spending a view.
pub struct PasteService {
    store: Arc<dyn PasteStore>,
}

impl PasteService {
    pub fn new(store: Arc<dyn PasteStore>) -> Self {
        Self { store }
    }

    /// Create a paste. `expires_at` is fixed here, once, as
    /// `now + ttl_seconds`; the DTO has already been validated at the edge.
    pub async fn create_paste(
        &self,
        dto: CreatePasteDto,
        now: DateTime<Utc>,
    ) -> anyhow::Result<PasteCreated> {
        let expires_at = dto.ttl_seconds.map(|ttl| now + Duration::seconds(ttl));
        let paste = self
            .store
            .create(NewPaste {
                content: dto.content,
                created_at: now,
                expires_at,
                max_views: dto.max_views,
            })
            .await?;
        Ok(PasteCreated {
            id: paste.id.value().to_owned(),
            created_at: paste.created_at,
            expires_at: paste.expires_at,
            max_views: paste.max_views,
        })
    }

    /// The single consume path; one view is spent exactly when the outcome
    /// is `Consumed`.
    pub async fn fetch_and_consume(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ConsumeOutcome> {
        self.store.consume_view(id, now).await
    }
}
