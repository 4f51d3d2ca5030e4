use crate::domain::{
    Card, CardFilter, CardInput, Rarity, Set, SetFilter, SetInput, UpsertResult,
};
use async_trait::async_trait;
use std::fmt::Display;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Record not found")]
    NotFound,
    #[error("Invalid input: {0}")]
    Invalid(String),
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("Store operation exceeded the request deadline")]
    DeadlineExceeded,
}

impl StoreError {
    #[must_use]
    pub fn backend(why: impl Display) -> Self {
        Self::Backend(why.to_string())
    }

    #[must_use]
    pub fn invalid(why: impl Display) -> Self {
        Self::Invalid(why.to_string())
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}

/// Read capabilities every backend offers. Reads never return soft-deleted records.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CardReader: Send + Sync {
    async fn get_card(&self, id: &str) -> Result<Card, StoreError>;
    async fn get_set(&self, id: &str) -> Result<Set, StoreError>;
    async fn get_rarity(&self, id: &str) -> Result<Rarity, StoreError>;
    /// Sorted by set name, external order, then name. An empty filter yields no cards.
    async fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError>;
    /// Sorted by name. An empty filter yields every set.
    async fn find_sets(&self, filter: &SetFilter) -> Result<Vec<Set>, StoreError>;
}

/// Write capabilities. Timestamps are always assigned here, never by callers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CardWriter: Send + Sync {
    async fn upsert_set(&self, input: SetInput) -> Result<Set, StoreError>;
    async fn upsert_rarity(&self, rarity: Rarity) -> Result<Rarity, StoreError>;
    /// Commits the whole batch or nothing.
    async fn upsert_cards(&self, inputs: Vec<CardInput>) -> Result<UpsertResult, StoreError>;
    async fn delete_card(&self, id: &str) -> Result<(), StoreError>;
}

pub trait CardStore: CardReader + CardWriter {}

impl<T: CardReader + CardWriter> CardStore for T {}
