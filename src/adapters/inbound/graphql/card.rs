use crate::adapters::inbound::graphql::resolve::{request, resolve_rarity, resolve_set};
use crate::adapters::inbound::graphql::types::{present, RarityNode, SetNode};
use crate::domain::object::Object as FreeForm;
use crate::domain::{Card, Timestamp};
use async_graphql::{Context, Object, Result, ID};

pub struct CardNode(pub Card);

#[Object(name = "Card")]
impl CardNode {
    async fn id(&self) -> ID {
        ID::from(&self.0.id)
    }

    async fn name(&self) -> String {
        self.0.name.clone()
    }

    async fn types(&self) -> Vec<String> {
        self.0.types.clone()
    }

    /// Single-character cost symbols in printed order.
    async fn costs(&self) -> Vec<String> {
        self.0.costs.clone()
    }

    async fn number_cost(&self) -> f64 {
        self.0.number_cost
    }

    async fn id_external(&self) -> String {
        self.0.id_external.clone()
    }

    async fn order_external(&self) -> i32 {
        self.0.order_external
    }

    async fn id_rarity(&self) -> String {
        self.0.id_rarity.clone()
    }

    async fn id_set(&self) -> String {
        self.0.id_set.clone()
    }

    async fn id_asset(&self) -> String {
        self.0.id_asset.clone()
    }

    async fn rules(&self) -> Vec<String> {
        self.0.rules.clone()
    }

    async fn rate(&self) -> f64 {
        self.0.rate
    }

    async fn rate_votes(&self) -> i32 {
        self.0.rate_votes
    }

    async fn artist(&self) -> Option<String> {
        self.0.artist.clone()
    }

    async fn flavor(&self) -> Option<String> {
        self.0.flavor.clone()
    }

    async fn data(&self) -> FreeForm {
        self.0.data.clone()
    }

    /// The owning set. `id` always matches `idSet`; other fields are best effort.
    async fn set(&self, ctx: &Context<'_>) -> Result<SetNode> {
        Ok(resolve_set(request(ctx)?, &self.0).await)
    }

    /// `id` always matches `idRarity`; other fields are best effort.
    async fn rarity(&self, ctx: &Context<'_>) -> Result<RarityNode> {
        Ok(resolve_rarity(request(ctx)?, &self.0).await)
    }

    async fn created_at(&self) -> Option<Timestamp> {
        present(self.0.lifecycle.created_at)
    }

    async fn updated_at(&self) -> Option<Timestamp> {
        present(self.0.lifecycle.updated_at)
    }

    async fn deleted_at(&self) -> Option<Timestamp> {
        present(self.0.lifecycle.deleted_at)
    }
}
