use crate::adapters::inbound::graphql::resolve::{nullable, request, validate_assets};
use crate::adapters::inbound::graphql::types::{
    CardInputObject, SetInputObject, SetNode, UpsertResultNode,
};
use crate::domain::{CardInput, SetInput};
use async_graphql::{Context, Object, Result};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn upsert_set(&self, ctx: &Context<'_>, input: SetInputObject) -> Result<Option<SetNode>> {
        let request = request(ctx)?;
        let input = SetInput::from(input);

        let result = match validate_assets(request, &input).await {
            Ok(()) => request.call(request.store.upsert_set(input)).await,
            Err(why) => Err(why),
        };
        Ok(nullable(request, "upsertSet", result)?.map(|set| SetNode::from(&set)))
    }

    /// Writes the whole batch or nothing.
    async fn upsert_cards(
        &self,
        ctx: &Context<'_>,
        input: Vec<CardInputObject>,
    ) -> Result<Option<UpsertResultNode>> {
        let request = request(ctx)?;
        let inputs: Vec<CardInput> = input.into_iter().map(CardInput::from).collect();
        log::info!("[{}] Upserting {} cards", request.request_id, inputs.len());

        let result = request.call(request.store.upsert_cards(inputs)).await;
        Ok(nullable(request, "upsertCards", result)?.map(UpsertResultNode::from))
    }
}
