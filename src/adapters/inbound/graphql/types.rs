use crate::domain::object::Object as FreeForm;
use crate::domain::{
    CardFilter, CardInput, Embedded, Lifecycle, Rarity, RefFilter, Set, SetFilter, SetInput,
    Timestamp, UpsertResult,
};
use async_graphql::{InputObject, SimpleObject, ID};
use std::collections::BTreeMap;

pub(crate) fn present(timestamp: Timestamp) -> Option<Timestamp> {
    (!timestamp.is_zero()).then_some(timestamp)
}

/// One entry of a set's rarity to asset map.
#[derive(SimpleObject, Clone, Debug, PartialEq)]
pub struct SetAsset {
    pub id_rarity: String,
    pub id_asset: String,
}

/// A set as seen through the schema. Only `id` is guaranteed when the set
/// was reached through a card.
#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(name = "Set")]
pub struct SetNode {
    pub id: ID,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub assets: Vec<SetAsset>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
}

impl SetNode {
    #[must_use]
    pub fn stub(id: &str) -> Self {
        Self {
            id: ID::from(id),
            name: None,
            alias: None,
            assets: Vec::new(),
            created_at: None,
            updated_at: None,
            deleted_at: None,
        }
    }
}

impl From<&Set> for SetNode {
    fn from(set: &Set) -> Self {
        let Lifecycle {
            created_at,
            updated_at,
            deleted_at,
        } = set.lifecycle;
        Self {
            id: ID::from(&set.id),
            name: Some(set.name.clone()),
            alias: Some(set.alias.clone()),
            assets: set
                .assets
                .iter()
                .map(|(id_rarity, id_asset)| SetAsset {
                    id_rarity: id_rarity.clone(),
                    id_asset: id_asset.clone(),
                })
                .collect(),
            created_at: present(created_at),
            updated_at: present(updated_at),
            deleted_at: present(deleted_at),
        }
    }
}

impl From<&Embedded> for SetNode {
    fn from(embedded: &Embedded) -> Self {
        Self {
            name: Some(embedded.name.clone()),
            alias: Some(embedded.alias.clone()),
            ..Self::stub(&embedded.id)
        }
    }
}

#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(name = "Rarity")]
pub struct RarityNode {
    pub id: ID,
    pub name: Option<String>,
    pub alias: Option<String>,
    pub created_at: Option<Timestamp>,
    pub updated_at: Option<Timestamp>,
}

impl RarityNode {
    #[must_use]
    pub fn stub(id: &str) -> Self {
        Self {
            id: ID::from(id),
            name: None,
            alias: None,
            created_at: None,
            updated_at: None,
        }
    }
}

impl From<&Rarity> for RarityNode {
    fn from(rarity: &Rarity) -> Self {
        Self {
            id: ID::from(&rarity.id),
            name: Some(rarity.name.clone()),
            alias: Some(rarity.alias.clone()),
            created_at: present(rarity.lifecycle.created_at),
            updated_at: present(rarity.lifecycle.updated_at),
        }
    }
}

impl From<&Embedded> for RarityNode {
    fn from(embedded: &Embedded) -> Self {
        Self {
            name: Some(embedded.name.clone()),
            alias: Some(embedded.alias.clone()),
            ..Self::stub(&embedded.id)
        }
    }
}

#[derive(SimpleObject, Clone, Debug, PartialEq)]
#[graphql(name = "UpsertResult")]
pub struct UpsertResultNode {
    pub affected_records: i32,
    pub committed_at: Option<Timestamp>,
}

impl From<UpsertResult> for UpsertResultNode {
    fn from(result: UpsertResult) -> Self {
        Self {
            affected_records: i32::try_from(result.affected_records).unwrap_or(i32::MAX),
            committed_at: present(result.committed_at),
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
#[graphql(name = "RefFilter")]
pub struct RefFilterInput {
    pub id: Option<ID>,
    pub name: Option<String>,
    pub alias: Option<String>,
}

impl From<RefFilterInput> for RefFilter {
    fn from(input: RefFilterInput) -> Self {
        Self {
            id: input.id.map(|id| id.to_string()),
            name: input.name,
            alias: input.alias,
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
#[graphql(name = "CardFilter")]
pub struct CardFilterInput {
    pub name: Option<String>,
    pub types: Option<Vec<String>>,
    pub costs: Option<Vec<String>>,
    pub number_cost: Option<f64>,
    pub set: Option<RefFilterInput>,
    pub rarity: Option<RefFilterInput>,
}

impl From<CardFilterInput> for CardFilter {
    fn from(input: CardFilterInput) -> Self {
        Self {
            name: input.name,
            types: input.types,
            costs: input.costs,
            number_cost: input.number_cost,
            set: input.set.map(RefFilter::from),
            rarity: input.rarity.map(RefFilter::from),
        }
    }
}

#[derive(InputObject, Clone, Debug, Default)]
#[graphql(name = "SetFilter")]
pub struct SetFilterInput {
    pub name: Option<String>,
    pub alias: Option<String>,
}

impl From<SetFilterInput> for SetFilter {
    fn from(input: SetFilterInput) -> Self {
        Self {
            name: input.name,
            alias: input.alias,
        }
    }
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "SetAssetInput")]
pub struct SetAssetInput {
    pub id_rarity: String,
    pub id_asset: String,
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "SetInput")]
pub struct SetInputObject {
    pub id: Option<ID>,
    pub name: String,
    pub alias: String,
    #[graphql(default)]
    pub assets: Vec<SetAssetInput>,
}

impl From<SetInputObject> for SetInput {
    fn from(input: SetInputObject) -> Self {
        Self {
            id: input.id.map(|id| id.to_string()),
            name: input.name,
            alias: input.alias,
            assets: input
                .assets
                .into_iter()
                .map(|asset| (asset.id_rarity, asset.id_asset))
                .collect::<BTreeMap<_, _>>(),
        }
    }
}

#[derive(InputObject, Clone, Debug)]
#[graphql(name = "CardInput")]
pub struct CardInputObject {
    pub id: Option<ID>,
    pub name: String,
    #[graphql(default)]
    pub types: Vec<String>,
    #[graphql(default)]
    pub costs: Vec<String>,
    #[graphql(default)]
    pub number_cost: f64,
    #[graphql(default)]
    pub id_external: String,
    #[graphql(default)]
    pub order_external: i32,
    pub id_rarity: String,
    pub id_set: String,
    #[graphql(default)]
    pub id_asset: String,
    #[graphql(default)]
    pub rules: Vec<String>,
    #[graphql(default)]
    pub rate: f64,
    #[graphql(default)]
    pub rate_votes: i32,
    pub artist: Option<String>,
    pub flavor: Option<String>,
    pub data: Option<FreeForm>,
}

impl From<CardInputObject> for CardInput {
    fn from(input: CardInputObject) -> Self {
        Self {
            id: input.id.map(|id| id.to_string()),
            name: input.name,
            types: input.types,
            costs: input.costs,
            number_cost: input.number_cost,
            id_external: input.id_external,
            order_external: input.order_external,
            id_rarity: input.id_rarity,
            id_set: input.id_set,
            id_asset: input.id_asset,
            rules: input.rules,
            rate: input.rate,
            rate_votes: input.rate_votes,
            artist: input.artist,
            flavor: input.flavor,
            data: input.data.unwrap_or_default(),
        }
    }
}
