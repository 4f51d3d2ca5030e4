//! Store error translation and nested reference resolution shared by the resolvers.

use crate::adapters::inbound::graphql::context::RequestContext;
use crate::adapters::inbound::graphql::types::{RarityNode, SetNode};
use crate::domain::{Card, SetInput, RARITIES};
use crate::ports::outbound::card_store::StoreError;
use async_graphql::{Context, Error, Result};

pub fn request<'a>(ctx: &Context<'a>) -> Result<&'a RequestContext> {
    ctx.data::<RequestContext>()
}

/// Not-found becomes a null field; anything else becomes an error entry.
pub fn nullable<T>(
    request: &RequestContext,
    field: &str,
    result: Result<T, StoreError>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NotFound) => Ok(None),
        Err(why) => {
            log::warn!("[{}] {field} failed - {why}", request.request_id);
            Err(Error::new(why.to_string()))
        }
    }
}

/// Embedded projection first, then a store lookup, then an id-only stub.
pub async fn resolve_set(request: &RequestContext, card: &Card) -> SetNode {
    if let Some(embedded) = card.set.as_ref().filter(|set| set.id == card.id_set) {
        return SetNode::from(embedded);
    }

    match request.call(request.store.get_set(&card.id_set)).await {
        Ok(set) => SetNode::from(&set),
        Err(StoreError::NotFound) => SetNode::stub(&card.id_set),
        Err(why) => {
            log::warn!(
                "[{}] Falling back to a stub for set {} - {why}",
                request.request_id,
                card.id_set
            );
            SetNode::stub(&card.id_set)
        }
    }
}

/// Embedded projection, then the canonical registry, then the store, then a stub.
pub async fn resolve_rarity(request: &RequestContext, card: &Card) -> RarityNode {
    if let Some(embedded) = card.rarity.as_ref().filter(|rarity| rarity.id == card.id_rarity) {
        return RarityNode::from(embedded);
    }
    if let Some(rarity) = RARITIES.by_id(&card.id_rarity) {
        return RarityNode::from(rarity);
    }

    match request.call(request.store.get_rarity(&card.id_rarity)).await {
        Ok(rarity) => RarityNode::from(&rarity),
        Err(StoreError::NotFound) => RarityNode::stub(&card.id_rarity),
        Err(why) => {
            log::warn!(
                "[{}] Falling back to a stub for rarity {} - {why}",
                request.request_id,
                card.id_rarity
            );
            RarityNode::stub(&card.id_rarity)
        }
    }
}

/// Asset-map keys must name a known rarity.
pub async fn validate_assets(request: &RequestContext, input: &SetInput) -> Result<(), StoreError> {
    for id_rarity in input.assets.keys() {
        if RARITIES.contains_id(id_rarity) {
            continue;
        }
        match request.call(request.store.get_rarity(id_rarity)).await {
            Ok(_) => {}
            Err(StoreError::NotFound) => {
                return Err(StoreError::Invalid(format!(
                    "set {:?} maps an asset to unknown rarity {id_rarity:?}",
                    input.name
                )))
            }
            Err(why) => return Err(why),
        }
    }
    Ok(())
}
