use crate::domain::{
    any_pattern, Card, CardFilter, CardInput, Embedded, Lifecycle, Rarity, Set, SetFilter, SetInput, Timestamp,
    UpsertResult, RARITIES,
};
use crate::ports::outbound::card_store::{CardReader, CardWriter, StoreError};
use crate::ports::outbound::document_client::{
    CollectionPath, DocumentClient, DocumentError, DocumentPath, Fields, Query, WriteBatch,
};
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

pub const CARDS: &str = "cards";
pub const SETS: &str = "sets";
pub const RARITIES_COLLECTION: &str = "rarities";

/// Card store over a document backend. Cards carry embedded set and rarity
/// projections, so reads never join.
pub struct Document {
    client: Arc<dyn DocumentClient>,
    cards: CollectionPath,
    sets: CollectionPath,
    rarities: CollectionPath,
}

impl Document {
    #[must_use]
    pub fn new(client: Arc<dyn DocumentClient>, env: &str) -> Self {
        Self {
            client,
            cards: CollectionPath::new(env, CARDS),
            sets: CollectionPath::new(env, SETS),
            rarities: CollectionPath::new(env, RARITIES_COLLECTION),
        }
    }

    async fn read<T: DeserializeOwned>(
        &self,
        path: &DocumentPath,
    ) -> Result<Option<T>, StoreError> {
        match self.client.get(path).await {
            Err(why) => {
                log::warn!("Failed document read of {path} - {why}");
                Err(backend(why))
            }
            Ok(None) => Ok(None),
            Ok(Some(fields)) => decode(fields).map(Some),
        }
    }

    async fn read_all<T: DeserializeOwned>(
        &self,
        paths: &[DocumentPath],
    ) -> Result<HashMap<String, T>, StoreError> {
        if paths.is_empty() {
            return Ok(HashMap::new());
        }

        let found = self.client.get_all(paths).await.map_err(|why| {
            log::warn!("Failed document batch read - {why}");
            backend(why)
        })?;

        let mut records = HashMap::with_capacity(found.len());
        for (path, fields) in paths.iter().zip(found) {
            if let Some(fields) = fields {
                records.insert(path.id().to_string(), decode(fields)?);
            }
        }
        Ok(records)
    }

    async fn query<T: DeserializeOwned>(&self, query: &Query) -> Result<Vec<T>, StoreError> {
        match self.client.run_query(query).await {
            Err(why) => {
                log::warn!("Failed document query on {} - {why}", query.collection);
                Err(backend(why))
            }
            Ok(documents) => documents.into_iter().map(decode).collect(),
        }
    }

    async fn commit(&self, batch: WriteBatch) -> Result<Timestamp, StoreError> {
        match self.client.commit(batch).await {
            Err(why) => {
                log::warn!("Failed document commit - {why}");
                Err(backend(why))
            }
            Ok(response) => Ok(response
                .commit_time
                .filter(|time| !time.is_zero())
                .unwrap_or_else(Timestamp::now)),
        }
    }

    async fn live_rarity(&self, id: &str) -> Result<Option<Rarity>, StoreError> {
        if let Some(rarity) = RARITIES.by_id(id) {
            return Ok(Some(rarity.clone()));
        }
        Ok(self
            .read::<Rarity>(&self.rarities.doc(id))
            .await?
            .filter(|rarity| !rarity.lifecycle.is_deleted()))
    }
}

fn backend(why: DocumentError) -> StoreError {
    StoreError::backend(why)
}

fn decode<T: DeserializeOwned>(fields: Fields) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(fields)).map_err(|why| {
        log::warn!("Failed document decode - {why}");
        StoreError::backend(why)
    })
}

fn encode<T: Serialize>(record: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(record).map_err(StoreError::backend)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::backend(format!(
            "expected a document object, got {other}"
        ))),
    }
}

/// Any element matches, case-insensitively, as the relational `~*` does.
fn types_matcher(wanted: &[String]) -> Result<Regex, StoreError> {
    RegexBuilder::new(&any_pattern(wanted))
        .case_insensitive(true)
        .build()
        .map_err(StoreError::invalid)
}

/// Matched against the concatenated symbols, as the relational filter does.
fn costs_matcher(wanted: &[String]) -> Result<Regex, StoreError> {
    Regex::new(&any_pattern(wanted)).map_err(StoreError::invalid)
}

fn types_match(card: &Card, matcher: &Regex) -> bool {
    card.types.iter().any(|kind| matcher.is_match(kind))
}

fn costs_match(card: &Card, matcher: &Regex) -> bool {
    matcher.is_match(&card.costs.concat())
}

fn card_order(left: &Card, right: &Card) -> Ordering {
    left.set_name()
        .cmp(right.set_name())
        .then(left.order_external.cmp(&right.order_external))
        .then_with(|| left.name.cmp(&right.name))
}

fn card_query(cards: &CollectionPath, filter: &CardFilter) -> Query {
    let mut query = Query::new(cards.clone());

    // Range on name approximates substring matching.
    if let Some(name) = &filter.name {
        query = query.where_gte("name", name.as_str());
    }
    if let Some(number_cost) = filter.number_cost {
        query = query.where_eq("numberCost", number_cost);
    }

    for (prefix, id_field, reference) in [
        ("set", "idSet", &filter.set),
        ("rarity", "idRarity", &filter.rarity),
    ] {
        let Some(reference) = reference else {
            continue;
        };
        if let Some(id) = &reference.id {
            query = query.where_eq(id_field, id.as_str());
        }
        if let Some(name) = &reference.name {
            query = query.where_eq(&format!("{prefix}.name"), name.as_str());
        }
        if let Some(alias) = &reference.alias {
            query = query.where_eq(&format!("{prefix}.alias"), alias.as_str());
        }
    }

    query.order_by("name")
}

#[async_trait]
impl CardReader for Document {
    async fn get_card(&self, id: &str) -> Result<Card, StoreError> {
        match self.read::<Card>(&self.cards.doc(id)).await? {
            Some(card) if !card.is_deleted() => Ok(card),
            _ => Err(StoreError::NotFound),
        }
    }

    async fn get_set(&self, id: &str) -> Result<Set, StoreError> {
        match self.read::<Set>(&self.sets.doc(id)).await? {
            Some(set) if !set.lifecycle.is_deleted() => Ok(set),
            _ => Err(StoreError::NotFound),
        }
    }

    async fn get_rarity(&self, id: &str) -> Result<Rarity, StoreError> {
        match self.read::<Rarity>(&self.rarities.doc(id)).await? {
            Some(rarity) if !rarity.lifecycle.is_deleted() => Ok(rarity),
            _ => Err(StoreError::NotFound),
        }
    }

    async fn find_cards(&self, filter: &CardFilter) -> Result<Vec<Card>, StoreError> {
        let filter = filter.clone().normalized();
        if filter.is_empty() {
            return Ok(Vec::new());
        }

        let types = filter.types.as_deref().map(types_matcher).transpose()?;
        let costs = filter.costs.as_deref().map(costs_matcher).transpose()?;

        let mut cards: Vec<Card> = self
            .query::<Card>(&card_query(&self.cards, &filter))
            .await?
            .into_iter()
            .filter(|card| !card.is_deleted())
            .filter(|card| types.as_ref().map_or(true, |matcher| types_match(card, matcher)))
            .filter(|card| costs.as_ref().map_or(true, |matcher| costs_match(card, matcher)))
            .collect();

        cards.sort_by(card_order);
        Ok(cards)
    }

    async fn find_sets(&self, filter: &SetFilter) -> Result<Vec<Set>, StoreError> {
        let filter = filter.clone().normalized();
        let mut query = Query::new(self.sets.clone());
        if let Some(name) = &filter.name {
            query = query.where_gte("name", name.as_str());
        }
        if let Some(alias) = &filter.alias {
            query = query.where_eq("alias", alias.as_str());
        }

        Ok(self
            .query::<Set>(&query.order_by("name"))
            .await?
            .into_iter()
            .filter(|set| !set.lifecycle.is_deleted())
            .collect())
    }
}

#[async_trait]
impl CardWriter for Document {
    async fn upsert_set(&self, input: SetInput) -> Result<Set, StoreError> {
        input.validate().map_err(StoreError::Invalid)?;
        let path = self.sets.doc(&input.resolved_id());
        let previous = self.read::<Set>(&path).await?;

        let set = input.into_set(previous.as_ref(), Timestamp::now());
        let mut batch = WriteBatch::new();
        batch.set(path, encode(&set)?);
        self.commit(batch).await?;
        Ok(set)
    }

    async fn upsert_rarity(&self, rarity: Rarity) -> Result<Rarity, StoreError> {
        if rarity.name.trim().is_empty() || rarity.alias.trim().is_empty() {
            return Err(StoreError::invalid("rarity needs a name and an alias"));
        }
        let path = self.rarities.doc(&rarity.id);
        let previous = self.read::<Rarity>(&path).await?;

        let rarity = Rarity {
            lifecycle: Lifecycle::written(
                previous.as_ref().map(|rarity| &rarity.lifecycle),
                Timestamp::now(),
            ),
            ..rarity
        };
        let mut batch = WriteBatch::new();
        batch.set(path, encode(&rarity)?);
        self.commit(batch).await?;
        Ok(rarity)
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

        let set_paths: Vec<DocumentPath> = distinct(inputs.iter().map(|input| &input.id_set))
            .map(|id| self.sets.doc(id))
            .collect();
        let sets: HashMap<String, Set> = self.read_all(&set_paths).await?;

        let mut rarities: HashMap<String, Rarity> = HashMap::new();
        for id in distinct(inputs.iter().map(|input| &input.id_rarity)) {
            if let Some(rarity) = self.live_rarity(id).await? {
                rarities.insert(id.to_string(), rarity);
            }
        }

        let card_paths: Vec<DocumentPath> = inputs
            .iter()
            .map(|input| self.cards.doc(&input.resolved_id()))
            .collect();
        let existing: HashMap<String, Card> = self.read_all(&card_paths).await?;

        let now = Timestamp::now();
        let mut batch = WriteBatch::new();
        for (input, path) in inputs.into_iter().zip(card_paths) {
            let set = sets
                .get(&input.id_set)
                .filter(|set| !set.lifecycle.is_deleted())
                .ok_or_else(|| {
                    StoreError::Invalid(format!(
                        "card {:?} references unknown set {:?}",
                        path.id(),
                        input.id_set
                    ))
                })?;
            let rarity = rarities.get(&input.id_rarity).ok_or_else(|| {
                StoreError::Invalid(format!(
                    "card {:?} references unknown rarity {:?}",
                    path.id(),
                    input.id_rarity
                ))
            })?;

            let mut card = input.into_card(existing.get(path.id()), now);
            card.set = Some(Embedded::from(set));
            card.rarity = Some(Embedded::from(rarity));
            batch.set(path, encode(&card)?);
        }

        let affected_records = batch.len();
        let committed_at = self.commit(batch).await?;
        Ok(UpsertResult {
            affected_records,
            committed_at,
        })
    }

    async fn delete_card(&self, id: &str) -> Result<(), StoreError> {
        let path = self.cards.doc(id);
        let mut card = match self.read::<Card>(&path).await? {
            Some(card) if !card.is_deleted() => card,
            _ => return Err(StoreError::NotFound),
        };

        card.lifecycle.delete(Timestamp::now());
        let mut batch = WriteBatch::new();
        batch.set(path, encode(&card)?);
        self.commit(batch).await.map(|_| ())
    }
}

fn distinct<'a>(ids: impl Iterator<Item = &'a String>) -> impl Iterator<Item = &'a str> {
    let mut seen = std::collections::HashSet::new();
    ids.map(String::as_str).filter(move |id| seen.insert(*id))
}
