pub mod document;
pub mod postgres;

use crate::adapters::outbound::card_store::document::Document;
use crate::adapters::outbound::card_store::postgres::Postgres;
use crate::adapters::outbound::document_client::firestore::Firestore;
use crate::adapters::outbound::document_client::memory::Memory;
use crate::config::{Config, DataStore};
use crate::domain::{
    Card, CardFilter, CardInput, Rarity, Set, SetFilter, SetInput, UpsertResult,
};
use crate::ports::outbound::card_store::{CardReader, CardWriter, StoreError};
use async_trait::async_trait;
use std::sync::Arc;

/// The backend chosen at startup.
pub enum Store {
    Postgres(Postgres),
    Document(Document),
}

pub async fn init_card_store(config: &Config) -> Result<Store, StoreError> {
    match config.data_store {
        DataStore::Postgres => Ok(Store::Postgres(Postgres::connect(&config.relational).await?)),
        DataStore::Firestore => {
            let client = Firestore::new(&config.document).map_err(StoreError::backend)?;
            Ok(Store::Document(Document::new(
                Arc::new(client),
                &config.document.environment,
            )))
        }
        DataStore::Memory => Ok(Store::Document(Document::new(
            Arc::new(Memory::new()),
            &config.document.environment,
        ))),
    }
}

#[async_trait]
impl CardReader for Store {
    async fn get_card(&self, id: &str) -> Result<Card, StoreError> {
        match self {
            Store::Postgres(store) => store.get_card(id).await,
            Store::Document(store) => store.get_card(id).await,
        }
    }

    async fn get_set(&self, id: &str) -> Result<Set, StoreError> {
        match self {
            Store::Postgres(store) => store.get_set(id).await,
            Store::Document(store) => store.get_set(id).await,
        }
    }

    async fn get_rarity(&self, id: &str) -> Result<Rarity, StoreError> {
        match self {
            Store::Postgres(store) => store.get_rarity(id).await,
            Store::Document(store) => store.get_rarity(id).await,
        }
    }

    async fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError> {
        match self {
            Store::Postgres(store) => store.find_cards(filter).await,
            Store::Document(store) => store.find_cards(filter).await,
        }
    }

    async fn find_sets(&self, filter: &SetFilter) -> Result<Vec<Set>, StoreError> {
        match self {
            Store::Postgres(store) => store.find_sets(filter).await,
            Store::Document(store) => store.find_sets(filter).await,
        }
    }
}

#[async_trait]
impl CardWriter for Store {
    async fn upsert_set(&self, input: SetInput) -> Result<Set, StoreError> {
        match self {
            Store::Postgres(store) => store.upsert_set(input).await,
            Store::Document(store) => store.upsert_set(input).await,
        }
    }

    async fn upsert_rarity(&self, rarity: Rarity) -> Result<Rarity, StoreError> {
        match self {
            Store::Postgres(store) => store.upsert_rarity(rarity).await,
            Store::Document(store) => store.upsert_rarity(rarity).await,
        }
    }

    async fn upsert_cards(&self, inputs: Vec<CardInput>) -> Result<UpsertResult, StoreError> {
        match self {
            Store::Postgres(store) => store.upsert_cards(inputs).await,
            Store::Document(store) => store.upsert_cards(inputs).await,
        }
    }

    async fn delete_card(&self, id: &str) -> Result<(), StoreError> {
        match self {
            Store::Postgres(store) => store.delete_card(id).await,
            Store::Document(store) => store.delete_card(id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_starts_empty() {
        let config = Config::from_lookup(|name| {
            (name == "data_store").then(|| String::from("memory"))
        })
        .unwrap();

        let store = init_card_store(&config).await.unwrap();
        assert!(matches!(store, Store::Document(_)));
        assert_eq!(store.get_set("s1").await, Err(StoreError::NotFound));
    }
}
