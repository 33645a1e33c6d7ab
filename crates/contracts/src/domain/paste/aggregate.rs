use chrono::{DateTime, Utc};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// ID Type
// ============================================================================

/// Length of a generated paste token.
pub const PASTE_ID_LEN: usize = 10;

/// URL-safe token identifying a paste.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PasteId(pub String);

impl PasteId {
    pub fn new(value: String) -> Self {
        Self(value)
    }

    /// Fresh random token; alphanumeric, so it needs no URL escaping.
    pub fn generate() -> Self {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(PASTE_ID_LEN)
            .map(char::from)
            .collect();
        Self(token)
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PasteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Aggregate Root
// ============================================================================

/// A stored text artifact with optional time and view-count expiry.
///
/// Every field except `view_count` is fixed at creation. `view_count` starts
/// at zero and only moves up, by one, when a consume succeeds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paste {
    pub id: PasteId,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<i64>,
    pub view_count: i64,
}

impl Paste {
    /// Build a new paste for insertion, with a freshly generated id.
    pub fn new_for_insert(
        content: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        max_views: Option<i64>,
    ) -> Self {
        Self {
            id: PasteId::generate(),
            content,
            created_at,
            expires_at,
            max_views,
            view_count: 0,
        }
    }

    /// Views left before exhaustion, clamped so the read-back value can
    /// never display as negative. Absent when there is no view limit.
    pub fn remaining_views(&self) -> Option<i64> {
        self.max_views.map(|max| (max - self.view_count).max(0))
    }
}

// ============================================================================
// Forms / DTOs
// ============================================================================

/// Why a create request was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("content must not be empty")]
    EmptyContent,
    #[error("ttl_seconds must be at least 1")]
    TtlTooSmall,
    #[error("max_views must be at least 1")]
    MaxViewsTooSmall,
}

/// Fields of a create request. Validated at the edge; the service and the
/// stores assume a DTO that passed `validate`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CreatePasteDto {
    pub content: String,
    pub ttl_seconds: Option<i64>,
    pub max_views: Option<i64>,
}

impl CreatePasteDto {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.content.trim().is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        if matches!(self.ttl_seconds, Some(ttl) if ttl < 1) {
            return Err(ValidationError::TtlTooSmall);
        }
        if matches!(self.max_views, Some(max) if max < 1) {
            return Err(ValidationError::MaxViewsTooSmall);
        }
        Ok(())
    }
}

/// Create result from which callers build the user-facing id/url pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasteCreated {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_views: Option<i64>,
}

/// A successful consume: the content plus what is left of the budgets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedPaste {
    pub content: String,
    pub remaining_views: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Result of one fetch-and-consume call. A view is spent if and only if the
/// outcome is `Consumed`.
#[derive(Debug, Clone)]
pub enum ConsumeOutcome {
    /// No record under that id.
    NotFound,
    /// Record exists but is expired or view-exhausted; not mutated.
    Unavailable,
    /// Record was available and its view count moved up by one.
    Consumed(ConsumedPaste),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn dto(content: &str, ttl_seconds: Option<i64>, max_views: Option<i64>) -> CreatePasteDto {
        CreatePasteDto {
            content: content.into(),
            ttl_seconds,
            max_views,
        }
    }

    #[test]
    fn test_generated_ids_are_url_safe() {
        let id = PasteId::generate();
        assert_eq!(id.value().len(), PASTE_ID_LEN);
        assert!(id.value().chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_new_paste_starts_with_zero_views() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let paste = Paste::new_for_insert("hello".into(), now, None, Some(3));
        assert_eq!(paste.view_count, 0);
        assert_eq!(paste.created_at, now);
        assert_eq!(paste.remaining_views(), Some(3));
    }

    #[test]
    fn test_remaining_views_is_clamped_at_zero() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut paste = Paste::new_for_insert("hello".into(), now, None, Some(2));
        paste.view_count = 5;
        assert_eq!(paste.remaining_views(), Some(0));
    }

    #[test]
    fn test_remaining_views_absent_without_limit() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let paste = Paste::new_for_insert("hello".into(), now, None, None);
        assert_eq!(paste.remaining_views(), None);
    }

    #[test]
    fn test_validate_rejects_empty_content() {
        assert_eq!(
            dto("", None, None).validate(),
            Err(ValidationError::EmptyContent)
        );
        assert_eq!(
            dto("   ", None, None).validate(),
            Err(ValidationError::EmptyContent)
        );
    }

    #[test]
    fn test_validate_rejects_non_positive_budgets() {
        assert_eq!(
            dto("x", Some(0), None).validate(),
            Err(ValidationError::TtlTooSmall)
        );
        assert_eq!(
            dto("x", None, Some(0)).validate(),
            Err(ValidationError::MaxViewsTooSmall)
        );
        assert_eq!(
            dto("x", None, Some(-3)).validate(),
            Err(ValidationError::MaxViewsTooSmall)
        );
    }

    #[test]
    fn test_validate_accepts_minimal_and_full_requests() {
        assert!(dto("x", None, None).validate().is_ok());
        assert!(dto("x", Some(1), Some(1)).validate().is_ok());
    }

    #[test]
    fn test_consumed_paste_serializes_nulls_for_absent_budgets() {
        let consumed = ConsumedPaste {
            content: "Y".into(),
            remaining_views: None,
            expires_at: None,
        };
        let json = serde_json::to_value(&consumed).unwrap();
        assert_eq!(json["content"], "Y");
        assert!(json["remaining_views"].is_null());
        assert!(json["expires_at"].is_null());
    }

    #[test]
    fn test_consumed_paste_serializes_iso8601_expiry() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 1, 0).unwrap();
        let consumed = ConsumedPaste {
            content: "Y".into(),
            remaining_views: Some(2),
            expires_at: Some(at),
        };
        let json = serde_json::to_value(&consumed).unwrap();
        assert_eq!(json["remaining_views"], 2);
        assert_eq!(json["expires_at"], "2024-05-01T12:01:00Z");
    }
}
