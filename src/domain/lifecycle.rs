use crate::domain::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lifecycle {
    #[serde(default, skip_serializing_if = "Timestamp::is_zero")]
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Timestamp::is_zero")]
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Timestamp::is_zero")]
    pub deleted_at: Timestamp,
}

impl Lifecycle {
    #[must_use]
    pub fn created(now: Timestamp) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: Timestamp::ZERO,
        }
    }

    /// Lifecycle for a record being written over `previous`, if it existed.
    #[must_use]
    pub fn written(previous: Option<&Lifecycle>, now: Timestamp) -> Self {
        match previous {
            Some(previous) if !previous.created_at.is_zero() => Self {
                created_at: previous.created_at,
                updated_at: now,
                deleted_at: Timestamp::ZERO,
            },
            _ => Self::created(now),
        }
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        !self.deleted_at.is_zero()
    }

    pub fn delete(&mut self, now: Timestamp) {
        self.deleted_at = now;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_written_keeps_creation_time() {
        let first = Timestamp::from(datetime!(2024-01-01 00:00 UTC));
        let second = Timestamp::from(datetime!(2024-02-01 00:00 UTC));
        let original = Lifecycle::created(first);

        let rewritten = Lifecycle::written(Some(&original), second);

        assert_eq!(rewritten.created_at, first);
        assert_eq!(rewritten.updated_at, second);
        assert!(!rewritten.is_deleted());
    }

    #[test]
    fn test_written_without_previous() {
        let now = Timestamp::now();
        let lifecycle = Lifecycle::written(None, now);
        assert_eq!(lifecycle.created_at, now);
        assert_eq!(lifecycle.updated_at, now);
    }

    #[test]
    fn test_rewrite_revives_deleted() {
        let now = Timestamp::now();
        let mut lifecycle = Lifecycle::created(now);
        lifecycle.delete(now);
        assert!(lifecycle.is_deleted());
        assert!(!Lifecycle::written(Some(&lifecycle), now).is_deleted());
    }

    #[test]
    fn test_zero_fields_are_elided() {
        let json = serde_json::to_value(Lifecycle::default()).unwrap();
        assert_eq!(json, serde_json::json!({}));
    }
}
