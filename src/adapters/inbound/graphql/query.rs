use crate::adapters::inbound::graphql::card::CardNode;
use crate::adapters::inbound::graphql::resolve::{nullable, request};
use crate::adapters::inbound::graphql::types::{CardFilterInput, SetFilterInput, SetNode};
use crate::domain::{CardFilter, SetFilter};
use async_graphql::{Context, Object, Result, ID};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// A card by id, or null when there is none.
    async fn card(&self, ctx: &Context<'_>, id: ID) -> Result<Option<CardNode>> {
        let request = request(ctx)?;
        let result = request.call(request.store.get_card(&id)).await;
        Ok(nullable(request, "card", result)?.map(CardNode))
    }

    /// Cards matching every given predicate, ordered by set name, external order and name.
    async fn card_by(
        &self,
        ctx: &Context<'_>,
        filter: CardFilterInput,
    ) -> Result<Option<Vec<CardNode>>> {
        let request = request(ctx)?;
        let filter = CardFilter::from(filter);
        let result = request.call(request.store.find_cards(&filter)).await;
        Ok(nullable(request, "cardBy", result)?
            .map(|cards| cards.into_iter().map(CardNode).collect()))
    }

    async fn set(&self, ctx: &Context<'_>, id: ID) -> Result<Option<SetNode>> {
        let request = request(ctx)?;
        let result = request.call(request.store.get_set(&id)).await;
        Ok(nullable(request, "set", result)?.map(|set| SetNode::from(&set)))
    }

    /// Sets ordered by name. Without a filter every set is returned.
    async fn set_by(
        &self,
        ctx: &Context<'_>,
        filter: Option<SetFilterInput>,
    ) -> Result<Option<Vec<SetNode>>> {
        let request = request(ctx)?;
        let filter = filter.map(SetFilter::from).unwrap_or_default();
        let result = request.call(request.store.find_sets(&filter)).await;
        Ok(nullable(request, "setBy", result)?
            .map(|sets| sets.iter().map(SetNode::from).collect()))
    }
}
