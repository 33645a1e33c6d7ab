use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use contracts::domain::paste::aggregate::{ConsumeOutcome, ConsumedPaste, Paste, PasteId};

use sea_orm::entity::prelude::*;
use sea_orm::{DatabaseConnection, Set, TransactionTrait};

use super::store::{NewPaste, PasteStore};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "pastes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub created_at: DateTimeUtc,
    pub expires_at: Option<DateTimeUtc>,
    pub max_views: Option<i64>,
    pub view_count: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Paste {
    fn from(m: Model) -> Self {
        Paste {
            id: PasteId::new(m.id),
            content: m.content,
            created_at: m.created_at,
            expires_at: m.expires_at,
            max_views: m.max_views,
            view_count: m.view_count,
        }
    }
}

/// Sqlite-backed paste store.
///
/// Consumes are serialized per id with an in-process lock table on top of
/// the database transaction, so two transactions for the same paste never
/// race to upgrade their write and abort.
pub struct SqlitePasteStore {
    conn: DatabaseConnection,
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl SqlitePasteStore {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self {
            conn,
            locks: Mutex::new(HashMap::new()),
        }
    }

    fn lock_for(&self, id: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.locks.lock().expect("paste lock table poisoned");
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[async_trait]
impl PasteStore for SqlitePasteStore {
    async fn create(&self, new: NewPaste) -> anyhow::Result<Paste> {
        // Token space is 62^10; a collision is practically a re-roll.
        loop {
            let paste = Paste::new_for_insert(
                new.content.clone(),
                new.created_at,
                new.expires_at,
                new.max_views,
            );
            let taken = Entity::find_by_id(paste.id.value().to_owned())
                .one(&self.conn)
                .await?;
            if taken.is_some() {
                continue;
            }

            let active = ActiveModel {
                id: Set(paste.id.value().to_owned()),
                content: Set(paste.content.clone()),
                created_at: Set(paste.created_at),
                expires_at: Set(paste.expires_at),
                max_views: Set(paste.max_views),
                view_count: Set(paste.view_count),
            };
            active.insert(&self.conn).await?;
            return Ok(paste);
        }
    }

    async fn consume_view(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<ConsumeOutcome> {
        let lock = self.lock_for(id);
        let _guard = lock.lock().await;

        let txn = self.conn.begin().await?;

        let model = match Entity::find_by_id(id.to_owned()).one(&txn).await? {
            Some(m) => m,
            None => {
                txn.commit().await?;
                return Ok(ConsumeOutcome::NotFound);
            }
        };

        let snapshot: Paste = model.clone().into();
        if !snapshot.is_available(now) {
            // Unavailable pastes are never mutated.
            txn.commit().await?;
            return Ok(ConsumeOutcome::Unavailable);
        }

        let new_count = snapshot.view_count + 1;
        let mut active: ActiveModel = model.into();
        active.view_count = Set(new_count);
        active.update(&txn).await?;
        txn.commit().await?;

        let remaining = snapshot.max_views.map(|max| (max - new_count).max(0));
        Ok(ConsumeOutcome::Consumed(ConsumedPaste {
            content: snapshot.content,
            remaining_views: remaining,
            expires_at: snapshot.expires_at,
        }))
    }
}
