pub mod composer;
mod queries;

use crate::adapters::outbound::card_store::postgres::composer::{
    compose_cards, compose_sets, Composed, SqlArg,
};
use crate::adapters::outbound::card_store::postgres::queries::{
    CARD_FROM_ID, LIVE_RARITY_IDS, LIVE_SET_IDS, RARITY_FROM_ID, SET_FROM_ID, SOFT_DELETE_CARD,
    UPSERT_CARD, UPSERT_RARITY, UPSERT_SET,
};
use crate::config::RelationalConfig;
use crate::domain::{
    Card, CardFilter, CardInput, Lifecycle, Object, Rarity, Set, SetFilter, SetInput, Timestamp,
    UpsertResult, RARITIES,
};
use crate::ports::outbound::card_store::{CardReader, CardWriter, StoreError};
use async_trait::async_trait;
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::types::Json;
use sqlx::{Pool, Row};
use std::collections::{BTreeMap, HashSet};
use time::OffsetDateTime;

pub struct Postgres {
    pool: Pool<sqlx::Postgres>,
}

impl Postgres {
    pub async fn connect(config: &RelationalConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.dsn)
            .await
            .map_err(|why| {
                log::error!("Failed Postgres connection - {why}");
                StoreError::backend(why)
            })?;

        Ok(Self { pool })
    }

    #[must_use]
    pub fn from_pool(pool: Pool<sqlx::Postgres>) -> Self {
        Self { pool }
    }

    async fn fetch_optional<T>(
        &self,
        sql: &'static str,
        id: &str,
        what: &str,
        map: fn(&PgRow) -> Result<T, sqlx::Error>,
    ) -> Result<T, StoreError> {
        match sqlx::query(sql).bind(id).fetch_optional(&self.pool).await {
            Err(why) => {
                log::warn!("Failed {what} fetch - {why}");
                Err(StoreError::backend(why))
            }
            Ok(None) => Err(StoreError::NotFound),
            Ok(Some(row)) => map(&row).map_err(StoreError::backend),
        }
    }

    async fn fetch_composed<T>(
        &self,
        composed: Composed,
        what: &str,
        map: fn(&PgRow) -> Result<T, sqlx::Error>,
    ) -> Result<Vec<T>, StoreError> {
        let Composed { sql, args } = composed;
        let query = args.into_iter().fold(sqlx::query(&sql), bind_arg);

        match query.fetch_all(&self.pool).await {
            Err(why) => {
                log::warn!("Failed {what} find - {why}");
                Err(StoreError::backend(why))
            }
            Ok(rows) => rows
                .iter()
                .map(map)
                .collect::<Result<Vec<_>, _>>()
                .map_err(StoreError::backend),
        }
    }
}

fn bind_arg<'q>(
    query: Query<'q, sqlx::Postgres, PgArguments>,
    arg: SqlArg,
) -> Query<'q, sqlx::Postgres, PgArguments> {
    match arg {
        SqlArg::Text(value) => query.bind(value),
        SqlArg::Float(value) => query.bind(value),
    }
}

fn distinct(ids: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(id.clone())).collect()
}

#[async_trait]
impl CardReader for Postgres {
    async fn get_card(&self, id: &str) -> Result<Card, StoreError> {
        self.fetch_optional(CARD_FROM_ID, id, "card", card_from_row)
            .await
    }

    async fn get_set(&self, id: &str) -> Result<Set, StoreError> {
        self.fetch_optional(SET_FROM_ID, id, "set", set_from_row)
            .await
    }

    async fn get_rarity(&self, id: &str) -> Result<Rarity, StoreError> {
        self.fetch_optional(RARITY_FROM_ID, id, "rarity", rarity_from_row)
            .await
    }

    async fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError> {
        let filter = filter.clone().normalized();
        match compose_cards(&filter).map_err(StoreError::backend)? {
            None => Ok(Vec::new()),
            Some(composed) => self.fetch_composed(composed, "card", card_from_row).await,
        }
    }

    async fn find_sets(&self, filter: &SetFilter) -> Result<Vec<Set>, StoreError> {
        let composed = compose_sets(&filter.clone().normalized()).map_err(StoreError::backend)?;
        self.fetch_composed(composed, "set", set_from_row).await
    }
}

#[async_trait]
impl CardWriter for Postgres {
    async fn upsert_set(&self, input: SetInput) -> Result<Set, StoreError> {
        input.validate().map_err(StoreError::Invalid)?;
        let set = input.into_set(None, Timestamp::now());

        match sqlx::query(UPSERT_SET)
            .bind(&set.id)
            .bind(&set.name)
            .bind(&set.alias)
            .bind(Json(&set.assets))
            .bind(set.lifecycle.updated_at.datetime())
            .fetch_one(&self.pool)
            .await
        {
            Err(why) => {
                log::warn!("Failed set upsert - {why}");
                Err(StoreError::backend(why))
            }
            Ok(row) => set_from_row(&row).map_err(StoreError::backend),
        }
    }

    async fn upsert_rarity(&self, rarity: Rarity) -> Result<Rarity, StoreError> {
        match sqlx::query(UPSERT_RARITY)
            .bind(&rarity.id)
            .bind(&rarity.name)
            .bind(&rarity.alias)
            .bind(Timestamp::now().datetime())
            .fetch_one(&self.pool)
            .await
        {
            Err(why) => {
                log::warn!("Failed rarity upsert - {why}");
                Err(StoreError::backend(why))
            }
            Ok(row) => rarity_from_row(&row).map_err(StoreError::backend),
        }
    }

    async fn upsert_cards(&self, inputs: Vec<CardInput>) -> Result<UpsertResult, StoreError> {
        for input in &inputs {
            input.validate().map_err(StoreError::Invalid)?;
        }
        if inputs.is_empty() {
            return Ok(UpsertResult {
                affected_records: 0,
                committed_at: Timestamp::now(),
            });
        }

        let now = Timestamp::now();
        let cards: Vec<Card> = inputs
            .into_iter()
            .map(|input| input.into_card(None, now))
            .collect();

        let mut tx = self.pool.begin().await.map_err(StoreError::backend)?;

        let set_ids = distinct(cards.iter().map(|card| card.id_set.clone()));
        let live_sets: HashSet<String> = sqlx::query(LIVE_SET_IDS)
            .bind(&set_ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(StoreError::backend)?
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<_, _>>()
            .map_err(StoreError::backend)?;

        let rarity_ids = distinct(
            cards
                .iter()
                .map(|card| card.id_rarity.clone())
                .filter(|id| !RARITIES.contains_id(id)),
        );
        let live_rarities: HashSet<String> = sqlx::query(LIVE_RARITY_IDS)
            .bind(&rarity_ids)
            .fetch_all(&mut *tx)
            .await
            .map_err(StoreError::backend)?
            .iter()
            .map(|row| row.try_get::<String, _>("id"))
            .collect::<Result<_, _>>()
            .map_err(StoreError::backend)?;

        for card in &cards {
            if !live_sets.contains(&card.id_set) {
                return Err(StoreError::Invalid(format!(
                    "card {:?} references unknown set {:?}",
                    card.id, card.id_set
                )));
            }
            if !RARITIES.contains_id(&card.id_rarity) && !live_rarities.contains(&card.id_rarity)
            {
                return Err(StoreError::Invalid(format!(
                    "card {:?} references unknown rarity {:?}",
                    card.id, card.id_rarity
                )));
            }
        }

        for card in &cards {
            if let Err(why) = sqlx::query(UPSERT_CARD)
                .bind(&card.id)
                .bind(&card.name)
                .bind(&card.types)
                .bind(&card.costs)
                .bind(card.number_cost)
                .bind(&card.id_external)
                .bind(card.order_external)
                .bind(&card.id_rarity)
                .bind(&card.id_set)
                .bind(&card.id_asset)
                .bind(&card.rules)
                .bind(card.rate)
                .bind(card.rate_votes)
                .bind(&card.artist)
                .bind(&card.flavor)
                .bind(Json(card.data.as_map()))
                .bind(now.datetime())
                .execute(&mut *tx)
                .await
            {
                log::warn!("Failed card upsert for {} - {why}", card.id);
                return Err(StoreError::backend(why));
            }
        }

        tx.commit().await.map_err(|why| {
            log::warn!("Failed card batch commit - {why}");
            StoreError::backend(why)
        })?;

        Ok(UpsertResult {
            affected_records: cards.len(),
            committed_at: Timestamp::now(),
        })
    }

    async fn delete_card(&self, id: &str) -> Result<(), StoreError> {
        match sqlx::query(SOFT_DELETE_CARD)
            .bind(id)
            .bind(Timestamp::now().datetime())
            .execute(&self.pool)
            .await
        {
            Err(why) => {
                log::warn!("Failed card delete - {why}");
                Err(StoreError::backend(why))
            }
            Ok(result) if result.rows_affected() == 0 => Err(StoreError::NotFound),
            Ok(_) => Ok(()),
        }
    }
}

fn lifecycle_from_row(row: &PgRow) -> Result<Lifecycle, sqlx::Error> {
    Ok(Lifecycle {
        created_at: Timestamp::from(row.try_get::<Option<OffsetDateTime>, _>("created_at")?),
        updated_at: Timestamp::from(row.try_get::<Option<OffsetDateTime>, _>("updated_at")?),
        deleted_at: Timestamp::from(row.try_get::<Option<OffsetDateTime>, _>("deleted_at")?),
    })
}

fn card_from_row(row: &PgRow) -> Result<Card, sqlx::Error> {
    Ok(Card {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        types: row.try_get::<Option<Vec<String>>, _>("types")?.unwrap_or_default(),
        costs: row.try_get::<Option<Vec<String>>, _>("costs")?.unwrap_or_default(),
        number_cost: row.try_get("number_cost")?,
        id_external: row.try_get("id_external")?,
        order_external: row.try_get("order_external")?,
        id_rarity: row.try_get("id_rarity")?,
        id_set: row.try_get("id_set")?,
        id_asset: row.try_get("id_asset")?,
        rules: row.try_get::<Option<Vec<String>>, _>("rules")?.unwrap_or_default(),
        rate: row.try_get("rate")?,
        rate_votes: row.try_get("rate_votes")?,
        artist: row.try_get("artist")?,
        flavor: row.try_get("flavor")?,
        data: row
            .try_get::<Option<Json<serde_json::Map<String, serde_json::Value>>>, _>("data")?
            .map(|Json(map)| Object::from(map))
            .unwrap_or_default(),
        set: None,
        rarity: None,
        lifecycle: lifecycle_from_row(row)?,
    })
}

fn set_from_row(row: &PgRow) -> Result<Set, sqlx::Error> {
    Ok(Set {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        alias: row.try_get("alias")?,
        assets: row
            .try_get::<Option<Json<BTreeMap<String, String>>>, _>("assets")?
            .map(|Json(assets)| assets)
            .unwrap_or_default(),
        lifecycle: lifecycle_from_row(row)?,
    })
}

fn rarity_from_row(row: &PgRow) -> Result<Rarity, sqlx::Error> {
    Ok(Rarity {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        alias: row.try_get("alias")?,
        lifecycle: lifecycle_from_row(row)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_keeps_first_occurrence_order() {
        let ids = distinct(
            ["s2", "s1", "s2", "s3", "s1"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(ids, vec!["s2", "s1", "s3"]);
    }
}
