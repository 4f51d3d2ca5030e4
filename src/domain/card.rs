use crate::domain::id;
use crate::domain::lifecycle::Lifecycle;
use crate::domain::object::Object;
use crate::domain::rarity::Rarity;
use crate::domain::set::Set;
use crate::domain::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

/// Denormalised `{id, name, alias}` copy of a set or rarity carried on a card.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Embedded {
    pub id: String,
    pub name: String,
    pub alias: String,
}

impl From<&Set> for Embedded {
    fn from(set: &Set) -> Self {
        Self {
            id: set.id.clone(),
            name: set.name.clone(),
            alias: set.alias.clone(),
        }
    }
}

impl From<&Rarity> for Embedded {
    fn from(rarity: &Rarity) -> Self {
        Self {
            id: rarity.id.clone(),
            name: rarity.name.clone(),
            alias: rarity.alias.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub costs: Vec<String>,
    #[serde(default)]
    pub number_cost: f64,
    #[serde(default)]
    pub id_external: String,
    #[serde(default)]
    pub order_external: i32,
    pub id_rarity: String,
    pub id_set: String,
    #[serde(default)]
    pub id_asset: String,
    #[serde(default)]
    pub rules: Vec<String>,
    #[serde(default)]
    pub rate: f64,
    #[serde(default)]
    pub rate_votes: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default)]
    pub data: Object,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Embedded>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<Embedded>,
    #[serde(flatten)]
    pub lifecycle: Lifecycle,
}

impl Card {
    /// Name of the embedded set, empty when the backend does not embed it.
    #[must_use]
    pub fn set_name(&self) -> &str {
        self.set.as_ref().map_or("", |set| set.name.as_str())
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.lifecycle.is_deleted()
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CardInput {
    pub id: Option<String>,
    pub name: String,
    pub types: Vec<String>,
    pub costs: Vec<String>,
    pub number_cost: f64,
    pub id_external: String,
    pub order_external: i32,
    pub id_rarity: String,
    pub id_set: String,
    pub id_asset: String,
    pub rules: Vec<String>,
    pub rate: f64,
    pub rate_votes: i32,
    pub artist: Option<String>,
    pub flavor: Option<String>,
    pub data: Object,
}

impl CardInput {
    #[must_use]
    pub fn resolved_id(&self) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => id::card_id(&self.id_set, &self.name),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(String::from("card name must not be empty"));
        }
        if self.id_set.trim().is_empty() {
            return Err(format!("card {:?} has no set", self.name));
        }
        if self.id_rarity.trim().is_empty() {
            return Err(format!("card {:?} has no rarity", self.name));
        }
        if let Some(cost) = self.costs.iter().find(|cost| cost.chars().count() != 1) {
            return Err(format!(
                "card {:?} has cost symbol {cost:?}, expected a single character",
                self.name
            ));
        }
        if self.rate_votes < 0 {
            return Err(format!("card {:?} has negative rate votes", self.name));
        }
        Ok(())
    }

    #[must_use]
    pub fn into_card(self, previous: Option<&Card>, now: Timestamp) -> Card {
        Card {
            id: self.resolved_id(),
            lifecycle: Lifecycle::written(previous.map(|card| &card.lifecycle), now),
            name: self.name,
            types: self.types,
            costs: self.costs,
            number_cost: self.number_cost,
            id_external: self.id_external,
            order_external: self.order_external,
            id_rarity: self.id_rarity,
            id_set: self.id_set,
            id_asset: self.id_asset,
            rules: self.rules,
            rate: self.rate,
            rate_votes: self.rate_votes,
            artist: self.artist,
            flavor: self.flavor,
            data: self.data,
            set: None,
            rarity: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UpsertResult {
    pub affected_records: usize,
    pub committed_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    fn create_test_card() -> Card {
        let mut data = Object::new();
        data.insert("legalities", json!({"modern": "legal"}));
        Card {
            id: String::from("c1"),
            name: String::from("Card Mock"),
            types: vec![
                String::from("Legendary"),
                String::from("Creature"),
                String::from("Goblin"),
            ],
            costs: vec![
                String::from("1"),
                String::from("R"),
                String::from("R"),
                String::from("R"),
            ],
            number_cost: 4.0,
            id_external: String::from("123"),
            order_external: 7,
            id_rarity: String::from("r1"),
            id_set: String::from("s1"),
            id_asset: String::from("a1"),
            rules: vec![String::from("Haste")],
            rate: 4.5,
            rate_votes: 12,
            artist: Some(String::from("Christopher Rush")),
            flavor: None,
            data,
            set: Some(Embedded {
                id: String::from("s1"),
                name: String::from("Set Mock"),
                alias: String::from("stm"),
            }),
            rarity: None,
            lifecycle: Lifecycle::created(Timestamp::from(datetime!(2024-05-01 12:00 UTC))),
        }
    }

    fn create_test_input() -> CardInput {
        CardInput {
            name: String::from("Card Mock"),
            costs: vec![String::from("B")],
            id_rarity: String::from("r1"),
            id_set: String::from("s1"),
            ..CardInput::default()
        }
    }

    #[test]
    fn test_serde_round_trip() {
        let card = create_test_card();
        let json = serde_json::to_string(&card).unwrap();
        let back: Card = serde_json::from_str(&json).unwrap();
        assert_eq!(back, card);
    }

    #[test]
    fn test_serialized_shape() {
        let value = serde_json::to_value(create_test_card()).unwrap();
        assert_eq!(value["numberCost"], json!(4.0));
        assert_eq!(value["types"], json!(["Legendary", "Creature", "Goblin"]));
        assert_eq!(value["createdAt"], json!("2024-05-01T12:00:00Z"));
        assert_eq!(value["data"]["legalities"]["modern"], json!("legal"));
        assert!(value.get("deletedAt").is_none());
        assert!(value.get("flavor").is_none());
        assert!(value.get("rarity").is_none());
    }

    #[test]
    fn test_empty_lists_stay_lists() {
        let mut card = create_test_card();
        card.types.clear();
        card.costs.clear();
        let value = serde_json::to_value(&card).unwrap();
        assert_eq!(value["types"], json!([]));
        assert_eq!(value["costs"], json!([]));
    }

    #[test]
    fn test_missing_lists_decode_empty() {
        let card: Card =
            serde_json::from_value(json!({"id": "c", "name": "n", "idRarity": "r", "idSet": "s"}))
                .unwrap();
        assert!(card.types.is_empty());
        assert!(card.costs.is_empty());
        assert!(card.lifecycle.created_at.is_zero());
    }

    #[test]
    fn test_set_name() {
        assert_eq!(create_test_card().set_name(), "Set Mock");
        assert_eq!(Card::default().set_name(), "");
    }

    #[test]
    fn test_input_validate() {
        assert!(create_test_input().validate().is_ok());

        let mut input = create_test_input();
        input.costs = vec![String::from("10")];
        assert!(input.validate().is_err());

        let mut input = create_test_input();
        input.id_set = String::new();
        assert!(input.validate().is_err());

        let mut input = create_test_input();
        input.id_rarity = String::new();
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_input_into_card_keeps_created_at() {
        let previous = create_test_card();
        let now = Timestamp::now();
        let mut input = create_test_input();
        input.id = Some(String::from("c1"));

        let card = input.into_card(Some(&previous), now);

        assert_eq!(card.id, "c1");
        assert_eq!(card.lifecycle.created_at, previous.lifecycle.created_at);
        assert_eq!(card.lifecycle.updated_at, now);
        assert!(card.set.is_none());
    }

    #[test]
    fn test_input_resolved_id_is_derived() {
        assert_eq!(
            create_test_input().resolved_id(),
            id::card_id("s1", "Card Mock")
        );
    }
}
